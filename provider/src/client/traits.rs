//! Remote storage client trait.

use super::types::{ByteStream, FileLocation, RemoteUploadResult, UploadParams};
use crate::error::ClientError;
use std::future::Future;

/// Outbound interface to the object-storage service.
///
/// Implementations own authentication and transport. Retries, if any,
/// belong here rather than in the provider.
pub trait RemoteStorageClient: Clone + Send + Sync + 'static {
    fn upload(
        &self,
        params: UploadParams,
    ) -> impl Future<Output = Result<RemoteUploadResult, ClientError>> + Send;

    fn delete_file(
        &self,
        location: FileLocation<'_>,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn download_file(
        &self,
        location: FileLocation<'_>,
    ) -> impl Future<Output = Result<ByteStream, ClientError>> + Send;

    /// Builds the permanent public URL of a file. Pure, no network.
    fn build_url(&self, location: FileLocation<'_>) -> Result<String, ClientError>;
}
