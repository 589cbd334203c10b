use crate::error::ProviderError;
use serde::Deserialize;
use std::env::vars;
use std::fmt;
use tracing::info;

/// Storage API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.bytescale.com";

/// Public CDN endpoint that serves uploaded files.
pub const DEFAULT_CDN_URL: &str = "https://upcdn.io";

/// Capacity in bytes of the pipe behind a streaming upload.
pub const DEFAULT_STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// Host-supplied provider configuration.
///
/// Immutable once handed to the provider. Required fields are checked by
/// [`validate_options`] when the provider is constructed.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Secret API key. Must carry delete privilege.
    pub api_key: String,
    pub account_id: String,
    /// Folder namespace for uploads, normalized before use.
    pub prefix: Option<String>,
    pub api_url: String,
    pub cdn_url: String,
    pub stream_buffer_size: usize,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            account_id: account_id.into(),
            prefix: None,
            api_url: DEFAULT_API_URL.to_owned(),
            cdn_url: DEFAULT_CDN_URL.to_owned(),
            stream_buffer_size: DEFAULT_STREAM_BUFFER_SIZE,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_cdn_url(mut self, cdn_url: impl Into<String>) -> Self {
        self.cdn_url = cdn_url.into();
        self
    }

    pub fn with_stream_buffer_size(mut self, size: usize) -> Self {
        self.stream_buffer_size = size;
        self
    }

    /// Reads the configuration from `STORAGE_*` environment variables.
    ///
    /// Missing credentials are not an error here; they are rejected when the
    /// provider is constructed.
    pub fn init() -> anyhow::Result<Self> {
        info!("Loading storage provider configuration from environment variables");

        let raw_config: RawConfig = serde_env::from_iter(vars())?;
        Ok(Self::from_raw(raw_config))
    }

    fn from_raw(raw_config: RawConfig) -> Self {
        let RawConfig {
            storage_api_key,
            storage_account_id,
            storage_prefix,
            storage_api_url,
            storage_cdn_url,
            storage_stream_buffer_size,
        } = raw_config;

        let api_url = storage_api_url.unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let cdn_url = storage_cdn_url.unwrap_or_else(|| DEFAULT_CDN_URL.to_owned());
        let stream_buffer_size = match storage_stream_buffer_size {
            Some(size) => size,
            None => {
                info!(
                    "STORAGE_STREAM_BUFFER_SIZE not set, defaulting to {} bytes",
                    DEFAULT_STREAM_BUFFER_SIZE
                );
                DEFAULT_STREAM_BUFFER_SIZE
            }
        };

        Self {
            api_key: storage_api_key.unwrap_or_default(),
            account_id: storage_account_id.unwrap_or_default(),
            prefix: storage_prefix,
            api_url,
            cdn_url,
            stream_buffer_size,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("prefix", &self.prefix)
            .field("api_url", &self.api_url)
            .field("cdn_url", &self.cdn_url)
            .field("stream_buffer_size", &self.stream_buffer_size)
            .finish()
    }
}

// Intermediate struct for deserializing environment variables.
#[derive(Deserialize)]
struct RawConfig {
    storage_api_key: Option<String>,
    storage_account_id: Option<String>,
    storage_prefix: Option<String>,
    storage_api_url: Option<String>,
    storage_cdn_url: Option<String>,
    storage_stream_buffer_size: Option<usize>,
}

/// Checks the fields the provider cannot work without.
///
/// Runs before any client is built, so a bad configuration never reaches
/// the network.
pub fn validate_options(config: &ProviderConfig) -> Result<(), ProviderError> {
    if config.api_key.trim().is_empty() {
        return Err(ProviderError::InvalidConfiguration(
            "api_key is required".to_owned(),
        ));
    }
    if config.account_id.trim().is_empty() {
        return Err(ProviderError::InvalidConfiguration(
            "account_id is required".to_owned(),
        ));
    }
    if config.stream_buffer_size == 0 {
        return Err(ProviderError::InvalidConfiguration(
            "stream_buffer_size must be greater than zero".to_owned(),
        ));
    }
    Ok(())
}
