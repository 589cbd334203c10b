//! Error types for the provider and its remote client.

/// Error raised by a [`RemoteStorageClient`](crate::client::RemoteStorageClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Body error: {0}")]
    Body(String),

    #[error("Upload aborted: {0}")]
    Aborted(String),
}

/// Error surfaced to the host by the provider.
///
/// Operation-time variants wrap the client error unchanged, so callers can
/// still match on what the remote side reported.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to upload {filename}: {source}")]
    UploadFailed {
        filename: String,
        #[source]
        source: ClientError,
    },

    #[error("Failed to download {file_key}: {source}")]
    DownloadFailed {
        file_key: String,
        #[source]
        source: ClientError,
    },

    #[error("Failed to build URL for {file_key}: {source}")]
    UrlGenerationFailed {
        file_key: String,
        #[source]
        source: ClientError,
    },
}

impl ProviderError {
    /// The remote client error behind an operation failure, if any.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::InvalidConfiguration(_) => None,
            Self::UploadFailed { source, .. }
            | Self::DownloadFailed { source, .. }
            | Self::UrlGenerationFailed { source, .. } => Some(source),
        }
    }
}
