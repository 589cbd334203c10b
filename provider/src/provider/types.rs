//! Provider request and result types.

use crate::client::UploadContent;
use crate::error::ClientError;

/// A file to upload. Consumed by the upload.
#[derive(Debug)]
pub struct UploadRequest {
    pub content: UploadContent,
    pub mime_type: String,
    pub filename: String,
}

impl UploadRequest {
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<UploadContent>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            mime_type: mime_type.into(),
            filename: filename.into(),
        }
    }
}

/// A streaming upload. The body is written through the returned handle.
#[derive(Debug, Clone)]
pub struct StreamUploadRequest {
    pub mime_type: String,
    pub filename: String,
}

impl StreamUploadRequest {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            filename: filename.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub url: String,
    /// Canonical path of the object on the remote side.
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub file_key: String,
}

impl DeleteRequest {
    pub fn new(file_key: impl Into<String>) -> Self {
        Self {
            file_key: file_key.into(),
        }
    }
}

impl From<&str> for DeleteRequest {
    fn from(file_key: &str) -> Self {
        Self::new(file_key)
    }
}

impl From<String> for DeleteRequest {
    fn from(file_key: String) -> Self {
        Self::new(file_key)
    }
}

/// One or many deletions, executed as a single batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteBatch {
    One(DeleteRequest),
    Many(Vec<DeleteRequest>),
}

impl DeleteBatch {
    pub fn into_requests(self) -> Vec<DeleteRequest> {
        match self {
            Self::One(request) => vec![request],
            Self::Many(requests) => requests,
        }
    }
}

impl From<DeleteRequest> for DeleteBatch {
    fn from(request: DeleteRequest) -> Self {
        Self::One(request)
    }
}

impl From<Vec<DeleteRequest>> for DeleteBatch {
    fn from(requests: Vec<DeleteRequest>) -> Self {
        Self::Many(requests)
    }
}

/// Per-item result of a batch delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub file_key: String,
    pub success: bool,
    pub error: Option<String>,
}

impl DeleteOutcome {
    pub(crate) fn deleted(file_key: String) -> Self {
        Self {
            file_key,
            success: true,
            error: None,
        }
    }

    pub(crate) fn failed(file_key: String, error: &ClientError) -> Self {
        Self {
            file_key,
            success: false,
            error: Some(error.to_string()),
        }
    }
}
