//! Remote storage client.
//!
//! [`RemoteStorageClient`] is the only outbound seam of the provider.
//! [`HttpStorageClient`] talks to the storage HTTP API, [`MockStorageClient`]
//! keeps everything in memory for tests.

mod http;
mod mock;
mod traits;
mod types;

pub use http::HttpStorageClient;
pub use mock::MockStorageClient;
pub use traits::RemoteStorageClient;
pub use types::{
    ByteStream, FileLocation, RemoteUploadResult, UploadContent, UploadParams, UploadPath,
};

use crate::error::ClientError;
use reqwest::Url;

/// Builds the public CDN URL of a file: `{cdn}/{account}/raw{file_path}`.
///
/// Path segments are percent-encoded. Every client uses this rule, so a URL
/// predicted before an upload matches the one reported after it.
pub fn public_url(cdn_url: &str, location: FileLocation<'_>) -> Result<String, ClientError> {
    let FileLocation {
        account_id,
        file_path,
    } = location;

    if account_id.trim().is_empty() {
        return Err(ClientError::InvalidPath("account id is empty".to_owned()));
    }
    if !file_path.starts_with('/') || file_path.ends_with('/') {
        return Err(ClientError::InvalidPath(format!(
            "{file_path:?} must be an absolute file path"
        )));
    }
    if file_path.chars().any(char::is_control) {
        return Err(ClientError::InvalidPath(format!(
            "{file_path:?} contains control characters"
        )));
    }

    let mut url = Url::parse(cdn_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| ClientError::InvalidUrl(format!("{cdn_url} cannot be a base URL")))?
        .pop_if_empty()
        .push(account_id)
        .push("raw")
        .extend(file_path.split('/').skip(1));

    Ok(url.into())
}
