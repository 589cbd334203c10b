//! Provider backed by a remote storage client.

use super::stream::{StreamUploadHandle, UploadCompletion, UploadWriter};
use super::traits::StorageProvider;
use super::types::{
    DeleteBatch, DeleteOutcome, StreamUploadRequest, UploadRequest, UploadResult,
};
use crate::client::{
    ByteStream, FileLocation, HttpStorageClient, RemoteStorageClient, UploadContent, UploadParams,
    UploadPath,
};
use crate::config::{ProviderConfig, validate_options};
use crate::error::{ClientError, ProviderError};
use crate::folder::{normalize_upload_folder, object_key, upload_file_name};
use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use futures::future::join_all;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, warn};

/// Adapts a [`RemoteStorageClient`] to the [`StorageProvider`] contract.
///
/// Holds only the validated configuration, the normalized upload folder and
/// the client handle. Cheap to clone.
#[derive(Clone)]
pub struct StorageProviderAdapter<C> {
    config: Arc<ProviderConfig>,
    folder: Arc<str>,
    client: C,
}

impl StorageProviderAdapter<HttpStorageClient> {
    /// Validates `config` and builds an HTTP-backed provider.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        validate_options(&config)?;
        let client = HttpStorageClient::new(&config)
            .map_err(|e| ProviderError::InvalidConfiguration(e.to_string()))?;
        Ok(Self::assemble(config, client))
    }
}

impl<C: RemoteStorageClient> StorageProviderAdapter<C> {
    /// Validates `config` and wraps an existing client.
    pub fn with_client(config: ProviderConfig, client: C) -> Result<Self, ProviderError> {
        validate_options(&config)?;
        Ok(Self::assemble(config, client))
    }

    fn assemble(config: ProviderConfig, client: C) -> Self {
        let folder = normalize_upload_folder(config.prefix.as_deref());
        Self {
            config: Arc::new(config),
            folder: folder.into(),
            client,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Normalized folder every upload lands in.
    pub fn folder_path(&self) -> &str {
        &self.folder
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn location<'a>(&'a self, file_key: &'a str) -> FileLocation<'a> {
        FileLocation {
            account_id: &self.config.account_id,
            file_path: file_key,
        }
    }

    /// Deletes every file concurrently and reports each outcome, in input order.
    ///
    /// Failures are logged as warnings and never abort sibling deletions.
    pub async fn delete_with_report(&self, files: impl Into<DeleteBatch>) -> Vec<DeleteOutcome> {
        let requests = files.into().into_requests();
        debug!(count = requests.len(), "Deleting files");

        let deletions = requests.into_iter().map(|request| async move {
            let file_key = request.file_key;
            match self.client.delete_file(self.location(&file_key)).await {
                Ok(()) => DeleteOutcome::deleted(file_key),
                Err(e) => {
                    warn!(file_key = %file_key, error = %e, "Failed to delete file");
                    DeleteOutcome::failed(file_key, &e)
                }
            }
        });

        join_all(deletions).await
    }

    fn download_failed(file_key: &str, source: ClientError) -> ProviderError {
        error!(file_key = %file_key, error = %source, "Download failed");
        ProviderError::DownloadFailed {
            file_key: file_key.to_owned(),
            source,
        }
    }
}

impl<C: RemoteStorageClient> StorageProvider for StorageProviderAdapter<C> {
    async fn upload(&self, request: UploadRequest) -> Result<UploadResult, ProviderError> {
        let UploadRequest {
            content,
            mime_type,
            filename,
        } = request;
        debug!(filename = %filename, folder = %self.folder, "Uploading file");

        let params = UploadParams {
            data: content,
            mime: mime_type,
            original_file_name: filename.clone(),
            path: UploadPath {
                folder_path: self.folder.to_string(),
                file_name: None,
            },
        };

        match self.client.upload(params).await {
            Ok(uploaded) => Ok(UploadResult {
                url: uploaded.file_url,
                key: uploaded.file_path,
            }),
            Err(source) => {
                error!(filename = %filename, error = %source, "Upload failed");
                Err(ProviderError::UploadFailed { filename, source })
            }
        }
    }

    fn get_upload_stream(
        &self,
        request: StreamUploadRequest,
    ) -> Result<StreamUploadHandle, ProviderError> {
        let StreamUploadRequest {
            mime_type,
            filename,
        } = request;

        let rejected = |source: ClientError| {
            error!(filename = %filename, error = %source, "Cannot start streaming upload");
            ProviderError::UploadFailed {
                filename: filename.clone(),
                source,
            }
        };

        let runtime = Handle::try_current()
            .map_err(|e| rejected(ClientError::Aborted(e.to_string())))?;
        let file_name = upload_file_name(&filename)
            .ok_or_else(|| {
                rejected(ClientError::InvalidPath(format!(
                    "{filename:?} is not a file name"
                )))
            })?
            .to_owned();

        let file_key = object_key(&self.folder, &file_name);
        let url = self
            .client
            .build_url(self.location(&file_key))
            .map_err(rejected)?;
        debug!(filename = %filename, file_key = %file_key, "Starting streaming upload");

        let (writer, reader) = tokio::io::duplex(self.config.stream_buffer_size);
        let body: ByteStream = Box::pin(ReaderStream::new(reader));
        let params = UploadParams {
            data: UploadContent::Stream(body),
            mime: mime_type,
            original_file_name: filename.clone(),
            path: UploadPath {
                folder_path: self.folder.to_string(),
                file_name: Some(file_name),
            },
        };

        let client = self.client.clone();
        let task_filename = filename.clone();
        let task = runtime.spawn(async move {
            match client.upload(params).await {
                Ok(uploaded) => Ok(UploadResult {
                    url: uploaded.file_url,
                    key: uploaded.file_path,
                }),
                Err(source) => {
                    error!(filename = %task_filename, error = %source, "Streaming upload failed");
                    Err(ProviderError::UploadFailed {
                        filename: task_filename,
                        source,
                    })
                }
            }
        });

        Ok(StreamUploadHandle {
            writer: UploadWriter::new(writer),
            completion: UploadCompletion::new(filename, task),
            url,
            file_key,
        })
    }

    async fn delete(&self, files: impl Into<DeleteBatch> + Send) {
        self.delete_with_report(files).await;
    }

    fn get_presigned_download_url(&self, file_key: &str) -> Result<String, ProviderError> {
        self.client
            .build_url(self.location(file_key))
            .map_err(|source| {
                error!(file_key = %file_key, error = %source, "URL generation failed");
                ProviderError::UrlGenerationFailed {
                    file_key: file_key.to_owned(),
                    source,
                }
            })
    }

    async fn get_download_stream(&self, file_key: &str) -> Result<ByteStream, ProviderError> {
        self.client
            .download_file(self.location(file_key))
            .await
            .map_err(|source| Self::download_failed(file_key, source))
    }

    async fn get_as_buffer(&self, file_key: &str) -> Result<Bytes, ProviderError> {
        let mut stream = self
            .client
            .download_file(self.location(file_key))
            .await
            .map_err(|source| Self::download_failed(file_key, source))?;

        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream
            .try_next()
            .await
            .map_err(|e| Self::download_failed(file_key, ClientError::Body(e.to_string())))?
        {
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.freeze())
    }
}
