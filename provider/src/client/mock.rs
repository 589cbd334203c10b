//! In-memory storage client for testing.

use super::public_url;
use super::traits::RemoteStorageClient;
use super::types::{ByteStream, FileLocation, RemoteUploadResult, UploadContent, UploadParams};
use crate::config::DEFAULT_CDN_URL;
use crate::error::ClientError;
use crate::folder::object_key;
use bytes::{Bytes, BytesMut};
use futures::{StreamExt, TryStreamExt, stream};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

/// Chunk size used when replaying stored files as a download stream.
const DOWNLOAD_CHUNK_SIZE: usize = 4;

/// In-memory implementation of [`RemoteStorageClient`].
///
/// Follows the same naming and URL rules as the real service and supports
/// failure injection. Clones share state.
#[derive(Clone)]
pub struct MockStorageClient {
    account_id: String,
    cdn_url: String,
    state: Arc<MockState>,
}

struct MockState {
    files: RwLock<HashMap<String, MockFile>>,
    failing_deletes: RwLock<HashSet<String>>,
    fail_uploads: RwLock<bool>,
    fail_downloads: RwLock<bool>,
    upload_gate: watch::Sender<bool>,
    upload_calls: AtomicUsize,
    download_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

#[derive(Clone)]
struct MockFile {
    content: Bytes,
    mime: String,
}

impl MockStorageClient {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self::with_cdn_url(account_id, DEFAULT_CDN_URL)
    }

    pub fn with_cdn_url(account_id: impl Into<String>, cdn_url: impl Into<String>) -> Self {
        let (upload_gate, _) = watch::channel(true);
        Self {
            account_id: account_id.into(),
            cdn_url: cdn_url.into(),
            state: Arc::new(MockState {
                files: RwLock::default(),
                failing_deletes: RwLock::default(),
                fail_uploads: RwLock::new(false),
                fail_downloads: RwLock::new(false),
                upload_gate,
                upload_calls: AtomicUsize::new(0),
                download_calls: AtomicUsize::new(0),
                delete_calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Stores a file directly, bypassing `upload`.
    pub fn insert(&self, file_path: impl Into<String>, content: impl Into<Bytes>) {
        self.state.files.write().expect("lock poisoned").insert(
            file_path.into(),
            MockFile {
                content: content.into(),
                mime: "application/octet-stream".to_owned(),
            },
        );
    }

    pub fn get(&self, file_path: &str) -> Option<Bytes> {
        let files = self.state.files.read().expect("lock poisoned");
        files.get(file_path).map(|f| f.content.clone())
    }

    pub fn mime_of(&self, file_path: &str) -> Option<String> {
        let files = self.state.files.read().expect("lock poisoned");
        files.get(file_path).map(|f| f.mime.clone())
    }

    pub fn contains(&self, file_path: &str) -> bool {
        self.state
            .files
            .read()
            .expect("lock poisoned")
            .contains_key(file_path)
    }

    pub fn len(&self) -> usize {
        self.state.files.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Uploads read their whole body, then fail with a 500.
    pub fn fail_uploads(&self, fail: bool) {
        *self.state.fail_uploads.write().expect("lock poisoned") = fail;
    }

    pub fn fail_downloads(&self, fail: bool) {
        *self.state.fail_downloads.write().expect("lock poisoned") = fail;
    }

    /// Deleting `file_path` fails until the mock is dropped.
    pub fn fail_delete_of(&self, file_path: impl Into<String>) {
        self.state
            .failing_deletes
            .write()
            .expect("lock poisoned")
            .insert(file_path.into());
    }

    /// While closed, uploads wait before reading any of their body.
    pub fn set_upload_gate(&self, open: bool) {
        self.state.upload_gate.send_replace(open);
    }

    pub fn upload_calls(&self) -> usize {
        self.state.upload_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.state.download_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.state.delete_calls.load(Ordering::SeqCst)
    }

    /// Number of calls that would have hit the network.
    pub fn network_calls(&self) -> usize {
        self.upload_calls() + self.download_calls() + self.delete_calls()
    }
}

async fn read_content(data: UploadContent) -> Result<Bytes, ClientError> {
    match data {
        UploadContent::Bytes(bytes) => Ok(bytes),
        UploadContent::Text(text) => Ok(Bytes::from(text)),
        UploadContent::Stream(stream) => stream
            .try_fold(BytesMut::new(), |mut buffer, chunk| async move {
                buffer.extend_from_slice(&chunk);
                Ok(buffer)
            })
            .await
            .map(BytesMut::freeze)
            .map_err(|e| ClientError::Body(e.to_string())),
    }
}

impl RemoteStorageClient for MockStorageClient {
    async fn upload(&self, params: UploadParams) -> Result<RemoteUploadResult, ClientError> {
        let call = self.state.upload_calls.fetch_add(1, Ordering::SeqCst);

        let mut gate = self.state.upload_gate.subscribe();
        gate.wait_for(|open| *open)
            .await
            .map_err(|e| ClientError::Aborted(e.to_string()))?;

        let UploadParams {
            data,
            mime,
            original_file_name,
            path,
        } = params;
        let content = read_content(data).await?;

        if *self.state.fail_uploads.read().expect("lock poisoned") {
            return Err(ClientError::Remote {
                status: 500,
                message: "mock upload failure".to_owned(),
            });
        }

        // The service derives a unique name when the caller does not pick one.
        let file_name = path
            .file_name
            .unwrap_or_else(|| format!("{call:04}-{original_file_name}"));
        let file_path = object_key(&path.folder_path, &file_name);
        let file_url = self.build_url(FileLocation {
            account_id: &self.account_id,
            file_path: &file_path,
        })?;

        self.state
            .files
            .write()
            .expect("lock poisoned")
            .insert(file_path.clone(), MockFile { content, mime });

        Ok(RemoteUploadResult {
            file_url,
            file_path,
        })
    }

    async fn delete_file(&self, location: FileLocation<'_>) -> Result<(), ClientError> {
        self.state.delete_calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .state
            .failing_deletes
            .read()
            .expect("lock poisoned")
            .contains(location.file_path);
        if failing {
            return Err(ClientError::Remote {
                status: 500,
                message: "mock delete failure".to_owned(),
            });
        }

        let mut files = self.state.files.write().expect("lock poisoned");
        match files.remove(location.file_path) {
            Some(_) => Ok(()),
            None => Err(ClientError::NotFound(location.file_path.to_owned())),
        }
    }

    async fn download_file(&self, location: FileLocation<'_>) -> Result<ByteStream, ClientError> {
        self.state.download_calls.fetch_add(1, Ordering::SeqCst);

        if *self.state.fail_downloads.read().expect("lock poisoned") {
            return Err(ClientError::Remote {
                status: 503,
                message: "mock download failure".to_owned(),
            });
        }

        let content = self
            .get(location.file_path)
            .ok_or_else(|| ClientError::NotFound(location.file_path.to_owned()))?;

        let chunks: Vec<std::io::Result<Bytes>> = content
            .chunks(DOWNLOAD_CHUNK_SIZE)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(stream::iter(chunks).boxed())
    }

    fn build_url(&self, location: FileLocation<'_>) -> Result<String, ClientError> {
        public_url(&self.cdn_url, location)
    }
}
