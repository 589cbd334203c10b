//! Provider contract tests against the in-memory storage client.

mod common;

use std::time::Duration;

use bytes::Bytes;
use common::{TEST_ACCOUNT, capture_logs, test_config, test_provider};
use futures::{StreamExt, TryStreamExt, stream};
use storage_provider::{
    ByteStream, ClientError, DeleteRequest, MockStorageClient, ProviderConfig, ProviderError,
    StorageProvider, StorageProviderAdapter, StreamUploadHandle, StreamUploadRequest,
    UploadRequest, normalize_upload_folder,
};
use tokio::io::AsyncWriteExt;
use tracing::Level;

#[test]
fn construction_requires_credentials() {
    let client = MockStorageClient::new(TEST_ACCOUNT);

    for config in [
        ProviderConfig::new("", TEST_ACCOUNT),
        ProviderConfig::new("secret_test_key", ""),
        ProviderConfig::new("   ", "   "),
    ] {
        let result = StorageProviderAdapter::with_client(config, client.clone());
        assert!(matches!(result, Err(ProviderError::InvalidConfiguration(_))));
    }
    assert_eq!(client.network_calls(), 0);

    assert!(StorageProviderAdapter::with_client(test_config(), client).is_ok());
}

#[test]
fn upload_folder_normalization() {
    assert_eq!(normalize_upload_folder(None), "/uploads");
    assert_eq!(normalize_upload_folder(Some("")), "/uploads");
    assert_eq!(normalize_upload_folder(Some("media")), "/media");
    assert_eq!(normalize_upload_folder(Some("/media/")), "/media");
    assert_eq!(normalize_upload_folder(Some("/")), "/");
}

#[tokio::test]
async fn upload_returns_remote_result_verbatim() {
    let (provider, client) = test_provider();

    let result = provider
        .upload(UploadRequest::new("avatar.png", b"png".to_vec(), "image/png"))
        .await
        .unwrap();

    assert!(result.key.starts_with("/uploads/"));
    assert!(result.key.ends_with("avatar.png"));
    assert_eq!(
        result.url,
        format!("https://upcdn.io/{TEST_ACCOUNT}/raw{}", result.key)
    );
    assert_eq!(client.get(&result.key), Some(Bytes::from_static(b"png")));
    assert_eq!(client.mime_of(&result.key).as_deref(), Some("image/png"));
    assert_eq!(client.upload_calls(), 1);
}

#[tokio::test]
async fn upload_passes_stream_content_through() {
    let (provider, client) = test_provider();
    let body: ByteStream = stream::iter(vec![
        Ok(Bytes::from_static(b"part one ")),
        Ok(Bytes::from_static(b"part two")),
    ])
    .boxed();

    let result = provider
        .upload(UploadRequest::new("parts.txt", body, "text/plain"))
        .await
        .unwrap();

    assert_eq!(
        client.get(&result.key),
        Some(Bytes::from_static(b"part one part two"))
    );
}

#[tokio::test]
async fn upload_failure_is_logged_once_and_propagated() {
    let (logs, _guard) = capture_logs();
    let (provider, client) = test_provider();
    client.fail_uploads(true);

    let err = provider
        .upload(UploadRequest::new("broken.png", b"png".to_vec(), "image/png"))
        .await
        .unwrap_err();

    match err {
        ProviderError::UploadFailed { filename, source } => {
            assert_eq!(filename, "broken.png");
            assert!(matches!(source, ClientError::Remote { status: 500, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(logs.matching(Level::ERROR, "filename", "broken.png"), 1);
    assert_eq!(logs.at(Level::ERROR).len(), 1);
}

#[tokio::test]
async fn stream_upload_prediction_matches_result() {
    let (provider, client) = test_provider();

    let StreamUploadHandle {
        mut writer,
        completion,
        url,
        file_key,
    } = provider
        .get_upload_stream(StreamUploadRequest::new("report.csv", "text/csv"))
        .unwrap();

    assert_eq!(file_key, "/uploads/report.csv");
    assert_eq!(url, format!("https://upcdn.io/{TEST_ACCOUNT}/raw/uploads/report.csv"));

    writer.write_all(b"id,name\n").await.unwrap();
    writer.write_all(b"1,alpha\n").await.unwrap();
    writer.shutdown().await.unwrap();

    let result = completion.await.unwrap();
    assert_eq!(result.key, file_key);
    assert_eq!(result.url, url);
    assert_eq!(
        client.get(&file_key),
        Some(Bytes::from_static(b"id,name\n1,alpha\n"))
    );
}

#[tokio::test]
async fn stream_upload_prediction_matches_for_any_prefix() {
    for prefix in ["media", "/nested/dir/", "/"] {
        let client = MockStorageClient::new(TEST_ACCOUNT);
        let provider =
            StorageProviderAdapter::with_client(test_config().with_prefix(prefix), client.clone())
                .unwrap();

        let handle = provider
            .get_upload_stream(StreamUploadRequest::new("my file.txt", "text/plain"))
            .unwrap();
        drop(handle.writer);
        let result = handle.completion.await.unwrap();

        assert_eq!(result.key, handle.file_key, "prefix {prefix:?}");
        assert_eq!(result.url, handle.url, "prefix {prefix:?}");
        assert!(client.contains(&handle.file_key));
    }
}

#[tokio::test]
async fn stream_upload_without_file_name_is_rejected() {
    let (logs, _guard) = capture_logs();
    let (provider, client) = test_provider();

    let Err(err) = provider.get_upload_stream(StreamUploadRequest::new("", "text/plain")) else {
        panic!("an empty file name must not start an upload");
    };
    assert!(matches!(
        err,
        ProviderError::UploadFailed {
            source: ClientError::InvalidPath(_),
            ..
        }
    ));
    assert_eq!(logs.matching(Level::ERROR, "filename", ""), 1);
    assert_eq!(logs.at(Level::ERROR).len(), 1);
    assert_eq!(client.network_calls(), 0);
}

#[tokio::test]
async fn stream_upload_applies_backpressure() {
    let client = MockStorageClient::new(TEST_ACCOUNT);
    let provider = StorageProviderAdapter::with_client(
        test_config().with_stream_buffer_size(8),
        client.clone(),
    )
    .unwrap();
    client.set_upload_gate(false);

    let mut handle = provider
        .get_upload_stream(StreamUploadRequest::new("big.bin", "application/octet-stream"))
        .unwrap();

    // The pipe holds 8 bytes; nothing drains it while the gate is closed.
    handle.writer.write_all(&[1u8; 8]).await.unwrap();
    let blocked = tokio::time::timeout(
        Duration::from_millis(50),
        handle.writer.write_all(&[2u8; 8]),
    )
    .await;
    assert!(blocked.is_err(), "write should wait for the reader");
    assert!(!handle.completion.is_finished());

    client.set_upload_gate(true);
    handle.writer.write_all(&[2u8; 8]).await.unwrap();
    handle.writer.shutdown().await.unwrap();

    let result = handle.completion.await.unwrap();
    let stored = client.get(&result.key).unwrap();
    assert_eq!(stored.len(), 16);
    assert_eq!(&stored[..8], &[1u8; 8]);
}

#[tokio::test]
async fn stream_upload_failure_rejects_completion() {
    let (logs, _guard) = capture_logs();
    let (provider, client) = test_provider();
    client.fail_uploads(true);

    let mut handle = provider
        .get_upload_stream(StreamUploadRequest::new("doomed.txt", "text/plain"))
        .unwrap();
    handle.writer.write_all(b"some data").await.unwrap();
    handle.writer.shutdown().await.unwrap();

    let err = handle.completion.await.unwrap_err();
    assert!(matches!(
        err,
        ProviderError::UploadFailed {
            source: ClientError::Remote { status: 500, .. },
            ..
        }
    ));
    assert_eq!(logs.matching(Level::ERROR, "filename", "doomed.txt"), 1);
    assert!(!client.contains(&handle.file_key));
}

#[tokio::test]
async fn batch_delete_never_fails() {
    let (logs, _guard) = capture_logs();
    let (provider, client) = test_provider();
    for key in ["/uploads/a.png", "/uploads/b.png", "/uploads/c.png"] {
        client.insert(key, b"x".to_vec());
    }
    client.fail_delete_of("/uploads/b.png");

    provider
        .delete(vec![
            DeleteRequest::new("/uploads/a.png"),
            DeleteRequest::new("/uploads/b.png"),
            DeleteRequest::new("/uploads/missing.png"),
            DeleteRequest::new("/uploads/c.png"),
        ])
        .await;

    assert_eq!(client.delete_calls(), 4);
    assert!(!client.contains("/uploads/a.png"));
    assert!(client.contains("/uploads/b.png"));
    assert!(!client.contains("/uploads/c.png"));

    assert_eq!(logs.at(Level::WARN).len(), 2);
    assert_eq!(logs.matching(Level::WARN, "file_key", "/uploads/b.png"), 1);
    assert_eq!(logs.matching(Level::WARN, "file_key", "/uploads/missing.png"), 1);
    assert!(logs.at(Level::ERROR).is_empty());
}

#[tokio::test]
async fn batch_delete_all_failing_and_all_succeeding() {
    let (logs, _guard) = capture_logs();
    let (provider, client) = test_provider();

    // Nothing exists, so every delete fails.
    provider
        .delete(vec![
            DeleteRequest::new("/uploads/x"),
            DeleteRequest::new("/uploads/y"),
        ])
        .await;
    assert_eq!(logs.at(Level::WARN).len(), 2);

    client.insert("/uploads/x", b"x".to_vec());
    client.insert("/uploads/y", b"y".to_vec());
    provider
        .delete(vec![
            DeleteRequest::new("/uploads/x"),
            DeleteRequest::new("/uploads/y"),
        ])
        .await;
    assert_eq!(logs.at(Level::WARN).len(), 2);
    assert!(client.is_empty());

    // A single request is a one-element batch.
    provider.delete(DeleteRequest::new("/uploads/x")).await;
    assert_eq!(client.delete_calls(), 5);
}

#[tokio::test]
async fn delete_report_lists_each_item() {
    let (provider, client) = test_provider();
    client.insert("/uploads/a.png", b"a".to_vec());
    client.insert("/uploads/b.png", b"b".to_vec());
    client.fail_delete_of("/uploads/b.png");

    let report = provider
        .delete_with_report(vec![
            DeleteRequest::new("/uploads/a.png"),
            DeleteRequest::new("/uploads/b.png"),
        ])
        .await;

    assert_eq!(report.len(), 2);
    assert_eq!(report[0].file_key, "/uploads/a.png");
    assert!(report[0].success);
    assert_eq!(report[1].file_key, "/uploads/b.png");
    assert!(!report[1].success);
    assert!(report[1].error.as_deref().unwrap().contains("mock delete failure"));
}

#[test]
fn public_url_is_pure() {
    let (provider, client) = test_provider();

    let first = provider
        .get_presigned_download_url("/uploads/photo.png")
        .unwrap();
    let second = provider
        .get_presigned_download_url("/uploads/photo.png")
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first, format!("https://upcdn.io/{TEST_ACCOUNT}/raw/uploads/photo.png"));
    assert_eq!(client.network_calls(), 0);

    let other_account = StorageProviderAdapter::with_client(
        ProviderConfig::new("secret_test_key", "OtherAcc"),
        MockStorageClient::new("OtherAcc"),
    )
    .unwrap();
    assert_eq!(
        other_account
            .get_presigned_download_url("/uploads/photo.png")
            .unwrap(),
        "https://upcdn.io/OtherAcc/raw/uploads/photo.png"
    );
}

#[test]
fn public_url_failure_is_logged_once() {
    let (logs, _guard) = capture_logs();
    let (provider, _client) = test_provider();

    let err = provider.get_presigned_download_url("no-leading-slash").unwrap_err();
    assert!(matches!(
        err,
        ProviderError::UrlGenerationFailed {
            source: ClientError::InvalidPath(_),
            ..
        }
    ));
    assert_eq!(logs.matching(Level::ERROR, "file_key", "no-leading-slash"), 1);
}

#[tokio::test]
async fn buffer_equals_concatenated_stream() {
    let (provider, client) = test_provider();
    let content = Bytes::from_static(b"the quick brown fox jumps over the lazy dog");
    client.insert("/uploads/fox.txt", content.clone());

    let chunks: Vec<Bytes> = provider
        .get_download_stream("/uploads/fox.txt")
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert!(chunks.len() > 1, "fixture should arrive in several chunks");

    let buffer = provider.get_as_buffer("/uploads/fox.txt").await.unwrap();
    assert_eq!(buffer, chunks.concat());
    assert_eq!(buffer, content);
    assert_eq!(client.download_calls(), 2);
}

#[tokio::test]
async fn download_errors_keep_their_kind() {
    let (logs, _guard) = capture_logs();
    let (provider, client) = test_provider();

    let missing = provider.get_as_buffer("/uploads/missing.txt").await.unwrap_err();
    assert!(matches!(
        missing,
        ProviderError::DownloadFailed {
            source: ClientError::NotFound(_),
            ..
        }
    ));

    client.fail_downloads(true);
    let Err(unavailable) = provider.get_download_stream("/uploads/any.txt").await else {
        panic!("download should fail");
    };
    assert!(matches!(
        unavailable.client_error(),
        Some(ClientError::Remote { status: 503, .. })
    ));

    assert_eq!(logs.matching(Level::ERROR, "file_key", "/uploads/missing.txt"), 1);
    assert_eq!(logs.matching(Level::ERROR, "file_key", "/uploads/any.txt"), 1);
    assert_eq!(logs.at(Level::ERROR).len(), 2);
}
