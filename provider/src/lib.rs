//! Storage provider adapter.
//!
//! Lets a host application delegate file upload, download and deletion to a
//! remote object-storage service through the [`StorageProvider`] contract.
//! The adapter keeps no state beyond its configuration and a client handle.

pub mod client;
pub mod config;
pub mod error;
pub mod folder;
pub mod provider;
pub mod telemetry;

pub use client::{
    ByteStream, HttpStorageClient, MockStorageClient, RemoteStorageClient, UploadContent,
};
pub use config::{ProviderConfig, validate_options};
pub use error::{ClientError, ProviderError};
pub use folder::normalize_upload_folder;
pub use provider::{
    DeleteBatch, DeleteOutcome, DeleteRequest, StorageProvider, StorageProviderAdapter,
    StreamUploadHandle, StreamUploadRequest, UploadCompletion, UploadRequest, UploadResult,
    UploadWriter,
};
