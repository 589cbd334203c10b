//! Provider capability trait.

use super::stream::StreamUploadHandle;
use super::types::{DeleteBatch, StreamUploadRequest, UploadRequest, UploadResult};
use crate::client::ByteStream;
use crate::error::ProviderError;
use bytes::Bytes;
use std::future::Future;

/// The capability set a host application delegates file handling to.
///
/// See [module documentation](super) for usage examples.
pub trait StorageProvider: Clone + Send + Sync + 'static {
    fn upload(
        &self,
        request: UploadRequest,
    ) -> impl Future<Output = Result<UploadResult, ProviderError>> + Send;

    /// Starts an upload whose body is written through the returned handle.
    ///
    /// Returns as soon as the remote upload is started. Fails with
    /// `UploadFailed` when `filename` names no file or no Tokio runtime is
    /// running.
    fn get_upload_stream(
        &self,
        request: StreamUploadRequest,
    ) -> Result<StreamUploadHandle, ProviderError>;

    /// Best-effort batch delete. Never fails; item failures are only logged.
    fn delete(&self, files: impl Into<DeleteBatch> + Send) -> impl Future<Output = ()> + Send;

    /// Permanent public URL of a file. Not signed and never expires.
    fn get_presigned_download_url(&self, file_key: &str) -> Result<String, ProviderError>;

    fn get_download_stream(
        &self,
        file_key: &str,
    ) -> impl Future<Output = Result<ByteStream, ProviderError>> + Send;

    fn get_as_buffer(
        &self,
        file_key: &str,
    ) -> impl Future<Output = Result<Bytes, ProviderError>> + Send;
}
