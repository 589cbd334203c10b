//! Storage provider contract and its remote-backed implementation.
//!
//! # Example
//!
//! ```no_run
//! use storage_provider::{
//!     DeleteRequest, ProviderConfig, StorageProvider, StorageProviderAdapter,
//!     StreamUploadRequest, UploadRequest,
//! };
//! use tokio::io::AsyncWriteExt;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let provider = StorageProviderAdapter::new(
//!     ProviderConfig::new("secret_key", "W142hJk").with_prefix("media"),
//! )?;
//!
//! let uploaded = provider
//!     .upload(UploadRequest::new("hello.txt", "hello", "text/plain"))
//!     .await?;
//! println!("{} -> {}", uploaded.key, uploaded.url);
//!
//! let mut handle = provider.get_upload_stream(StreamUploadRequest::new("log.txt", "text/plain"))?;
//! handle.writer.write_all(b"line 1\n").await?;
//! handle.writer.shutdown().await?;
//! let streamed = handle.completion.await?;
//! assert_eq!(streamed.key, handle.file_key);
//!
//! provider
//!     .delete(vec![DeleteRequest::new(uploaded.key), DeleteRequest::new(streamed.key)])
//!     .await;
//! # Ok(())
//! # }
//! ```

mod adapter;
mod stream;
mod traits;
mod types;

pub use adapter::StorageProviderAdapter;
pub use stream::{StreamUploadHandle, UploadCompletion, UploadWriter};
pub use traits::StorageProvider;
pub use types::{
    DeleteBatch, DeleteOutcome, DeleteRequest, StreamUploadRequest, UploadRequest, UploadResult,
};
