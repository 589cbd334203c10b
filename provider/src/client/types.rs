//! Remote client request and response types.

use bytes::Bytes;
use futures::stream::BoxStream;
use std::fmt;
use std::io;

/// A pull-based byte stream, used both for upload bodies and download responses.
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// Upload payload, handed to the remote client untouched.
pub enum UploadContent {
    Bytes(Bytes),
    Text(String),
    Stream(ByteStream),
}

impl fmt::Debug for UploadContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl From<Bytes> for UploadContent {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for UploadContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes.into())
    }
}

impl From<String> for UploadContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for UploadContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<ByteStream> for UploadContent {
    fn from(stream: ByteStream) -> Self {
        Self::Stream(stream)
    }
}

/// Destination of an upload.
///
/// Without a `file_name` the remote side picks the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPath {
    pub folder_path: String,
    pub file_name: Option<String>,
}

#[derive(Debug)]
pub struct UploadParams {
    pub data: UploadContent,
    pub mime: String,
    pub original_file_name: String,
    pub path: UploadPath,
}

/// What the remote side reports for a finished upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUploadResult {
    pub file_url: String,
    pub file_path: String,
}

/// Addresses one stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileLocation<'a> {
    pub account_id: &'a str,
    pub file_path: &'a str,
}
