//! HTTP client for the storage API.

use super::public_url;
use super::traits::RemoteStorageClient;
use super::types::{ByteStream, FileLocation, RemoteUploadResult, UploadContent, UploadParams};
use crate::config::ProviderConfig;
use crate::error::ClientError;
use futures::TryStreamExt;
use reqwest::{Body, Response, StatusCode, header};
use serde::Deserialize;
use std::io;
use tracing::debug;

/// Storage client speaking the upload API over reqwest.
///
/// Uploads and deletes go to the API host, downloads to the CDN. Every
/// request is authenticated with the secret API key.
#[derive(Clone)]
pub struct HttpStorageClient {
    http: reqwest::Client,
    api_key: String,
    account_id: String,
    api_url: String,
    cdn_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_url: String,
    file_path: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpStorageClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            account_id: config.account_id.clone(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            cdn_url: config.cdn_url.clone(),
        })
    }

    fn account_url(&self, account_id: &str, resource: &str) -> String {
        format!("{}/v2/accounts/{account_id}/{resource}", self.api_url)
    }
}

impl RemoteStorageClient for HttpStorageClient {
    async fn upload(&self, params: UploadParams) -> Result<RemoteUploadResult, ClientError> {
        let UploadParams {
            data,
            mime,
            original_file_name,
            path,
        } = params;

        let mut query = vec![
            ("folderPath", path.folder_path.as_str()),
            ("originalFileName", original_file_name.as_str()),
        ];
        if let Some(file_name) = path.file_name.as_deref() {
            query.push(("fileName", file_name));
        }

        let body = match data {
            UploadContent::Bytes(bytes) => Body::from(bytes),
            UploadContent::Text(text) => Body::from(text),
            UploadContent::Stream(stream) => Body::wrap_stream(stream),
        };

        debug!(folder = %path.folder_path, file = %original_file_name, "POST binary upload");

        let response = self
            .http
            .post(self.account_url(&self.account_id, "uploads/binary"))
            .bearer_auth(&self.api_key)
            .header(header::CONTENT_TYPE, mime)
            .query(&query)
            .body(body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let uploaded: UploadResponse = check_status(response, &original_file_name)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Body(e.to_string()))?;

        Ok(RemoteUploadResult {
            file_url: uploaded.file_url,
            file_path: uploaded.file_path,
        })
    }

    async fn delete_file(&self, location: FileLocation<'_>) -> Result<(), ClientError> {
        debug!(file_path = %location.file_path, "DELETE file");

        let response = self
            .http
            .delete(self.account_url(location.account_id, "files"))
            .bearer_auth(&self.api_key)
            .query(&[("filePath", location.file_path)])
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        check_status(response, location.file_path).await?;
        Ok(())
    }

    async fn download_file(&self, location: FileLocation<'_>) -> Result<ByteStream, ClientError> {
        let url = public_url(&self.cdn_url, location)?;
        debug!(url = %url, "GET file");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let response = check_status(response, location.file_path).await?;
        Ok(Box::pin(response.bytes_stream().map_err(io::Error::other)))
    }

    fn build_url(&self, location: FileLocation<'_>) -> Result<String, ClientError> {
        public_url(&self.cdn_url, location)
    }
}

/// Maps non-2xx responses to client errors.
async fn check_status(response: Response, subject: &str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(subject.to_owned()));
    }

    let reason = status.canonical_reason().unwrap_or("Unknown status");
    let message = match response.text().await {
        Ok(text) if !text.trim().is_empty() => serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.error.message)
            .unwrap_or(text),
        Ok(_) => reason.to_owned(),
        Err(e) => {
            debug!(status = status.as_u16(), error = %e, "Unreadable error body");
            reason.to_owned()
        }
    };

    Err(ClientError::Remote {
        status: status.as_u16(),
        message,
    })
}
