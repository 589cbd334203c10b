//! Duplex bridge between a caller writing an upload and the remote client reading it.

use super::types::UploadResult;
use crate::error::{ClientError, ProviderError};
use futures::ready;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncWrite, DuplexStream};
use tokio::task::JoinHandle;
use tracing::error;

/// A streaming upload in flight.
///
/// `file_key` and `url` are predicted from the naming rule and match the
/// result of `completion` when the upload succeeds.
#[derive(Debug)]
pub struct StreamUploadHandle {
    pub writer: UploadWriter,
    pub completion: UploadCompletion,
    pub url: String,
    pub file_key: String,
}

/// Write end of the upload pipe.
///
/// Writes suspend while the pipe buffer is full. Call `shutdown` (or drop
/// the writer) to end the body.
#[derive(Debug)]
pub struct UploadWriter {
    inner: DuplexStream,
}

impl UploadWriter {
    pub(crate) fn new(inner: DuplexStream) -> Self {
        Self { inner }
    }
}

impl AsyncWrite for UploadWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// Resolves once the writer is closed and the remote upload has finished.
#[derive(Debug)]
pub struct UploadCompletion {
    filename: String,
    task: JoinHandle<Result<UploadResult, ProviderError>>,
}

impl UploadCompletion {
    pub(crate) fn new(
        filename: String,
        task: JoinHandle<Result<UploadResult, ProviderError>>,
    ) -> Self {
        Self { filename, task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Future for UploadCompletion {
    type Output = Result<UploadResult, ProviderError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let joined = ready!(Pin::new(&mut self.task).poll(cx));
        Poll::Ready(joined.unwrap_or_else(|join_error| {
            // The upload task itself logs remote failures; only a panicked
            // or cancelled task ends up here.
            error!(filename = %self.filename, error = %join_error, "Upload task did not complete");
            Err(ProviderError::UploadFailed {
                filename: self.filename.clone(),
                source: ClientError::Aborted(join_error.to_string()),
            })
        }))
    }
}
