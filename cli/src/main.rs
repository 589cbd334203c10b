//! Command-line host for the storage provider.

mod cli;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use cli::{Cli, Commands, CredentialArgs};
use futures::TryStreamExt;
use output::Output;
use storage_provider::{
    DeleteRequest, HttpStorageClient, ProviderConfig, StorageProvider, StorageProviderAdapter,
    StreamUploadRequest, UploadRequest, telemetry,
};
use tokio::io::{self, AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{info, instrument};

type Provider = StorageProviderAdapter<HttpStorageClient>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    match run(cli, &output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    telemetry::init_tracing(cli.verbose)?;

    let config = apply_overrides(ProviderConfig::init()?, cli.credentials);
    let provider = StorageProviderAdapter::new(config)?;

    match cli.command {
        Commands::Upload { file, mime } => run_upload(&provider, output, file, mime).await,
        Commands::Stream { source, name, mime } => {
            run_stream(&provider, output, &source, name, mime).await
        }
        Commands::Delete { keys } => run_delete(&provider, output, keys).await,
        Commands::Url { key } => provider
            .get_presigned_download_url(&key)
            .map(|url| output.value(url))
            .map_err(Into::into),
        Commands::Download { key, out, buffer } => {
            run_download(&provider, output, &key, out, buffer).await
        }
    }
}

/// Flags take precedence over the environment.
fn apply_overrides(mut config: ProviderConfig, args: CredentialArgs) -> ProviderConfig {
    if let Some(api_key) = args.api_key {
        config.api_key = api_key;
    }
    if let Some(account_id) = args.account_id {
        config.account_id = account_id;
    }
    if let Some(prefix) = args.prefix {
        config.prefix = Some(prefix);
    }
    config
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .with_context(|| format!("{} has no usable file name", path.display()))
}

fn mime_for(name: &str, explicit: Option<String>) -> String {
    explicit.unwrap_or_else(|| {
        mime_guess::from_path(name)
            .first_or_octet_stream()
            .essence_str()
            .to_owned()
    })
}

#[instrument(skip_all, fields(file = %file.display()))]
async fn run_upload(
    provider: &Provider,
    output: &Output,
    file: PathBuf,
    mime: Option<String>,
) -> Result<()> {
    let filename = file_name_of(&file)?;
    let mime_type = mime_for(&filename, mime);
    let content = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    info!(bytes = content.len(), mime = %mime_type, "Uploading");

    let result = provider
        .upload(UploadRequest::new(filename.as_str(), content, mime_type))
        .await?;
    output.uploaded(&filename, &result);
    Ok(())
}

#[instrument(skip_all, fields(source = %source))]
async fn run_stream(
    provider: &Provider,
    output: &Output,
    source: &str,
    name: Option<String>,
    mime: Option<String>,
) -> Result<()> {
    let (filename, mut reader): (String, Box<dyn AsyncRead + Unpin + Send>) = if source == "-" {
        let Some(name) = name else {
            bail!("--name is required when streaming from stdin");
        };
        (name, Box::new(io::stdin()))
    } else {
        let path = Path::new(source);
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open {source}"))?;
        let filename = match name {
            Some(name) => name,
            None => file_name_of(path)?,
        };
        (filename, Box::new(file))
    };
    let mime_type = mime_for(&filename, mime);

    let mut handle =
        provider.get_upload_stream(StreamUploadRequest::new(filename.as_str(), mime_type))?;
    output.labeled("key", &handle.file_key);

    let copied = io::copy(&mut reader, &mut handle.writer)
        .await
        .context("Failed to stream upload body")?;
    handle.writer.shutdown().await?;
    info!(bytes = copied, "Upload body written");

    let result = handle.completion.await?;
    output.uploaded(&filename, &result);
    Ok(())
}

async fn run_delete(provider: &Provider, output: &Output, keys: Vec<String>) -> Result<()> {
    let requests: Vec<DeleteRequest> = keys.into_iter().map(DeleteRequest::from).collect();
    let report = provider.delete_with_report(requests).await;
    output.delete_report(&report);

    let failed = report.iter().filter(|outcome| !outcome.success).count();
    if failed > 0 {
        bail!("{failed} of {} deletions failed", report.len());
    }
    Ok(())
}

#[instrument(skip_all, fields(key = %key, buffer = buffer))]
async fn run_download(
    provider: &Provider,
    output: &Output,
    key: &str,
    out: Option<PathBuf>,
    buffer: bool,
) -> Result<()> {
    let mut sink: Box<dyn AsyncWrite + Unpin + Send> = match &out {
        Some(path) => Box::new(
            tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };

    let written = if buffer {
        let content = provider.get_as_buffer(key).await?;
        sink.write_all(&content).await?;
        content.len()
    } else {
        let mut stream = provider.get_download_stream(key).await?;
        let mut written = 0;
        while let Some(chunk) = stream.try_next().await? {
            sink.write_all(&chunk).await?;
            written += chunk.len();
        }
        written
    };
    sink.flush().await?;

    if let Some(path) = out {
        output.success(format!("Downloaded {written} bytes to {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(api_key: Option<&str>, prefix: Option<&str>) -> CredentialArgs {
        CredentialArgs {
            api_key: api_key.map(str::to_owned),
            account_id: None,
            prefix: prefix.map(str::to_owned),
        }
    }

    #[test]
    fn test_flags_override_environment() {
        let base = ProviderConfig::new("env_key", "acct").with_prefix("env");
        let config = apply_overrides(base, args(Some("flag_key"), Some("media")));
        assert_eq!(config.api_key, "flag_key");
        assert_eq!(config.account_id, "acct");
        assert_eq!(config.prefix.as_deref(), Some("media"));
    }

    #[test]
    fn test_missing_flags_keep_environment() {
        let base = ProviderConfig::new("env_key", "acct");
        let config = apply_overrides(base, args(None, None));
        assert_eq!(config.api_key, "env_key");
        assert!(config.prefix.is_none());
    }

    #[test]
    fn test_mime_is_guessed_from_name() {
        assert_eq!(mime_for("photo.png", None), "image/png");
        assert_eq!(mime_for("blob", None), "application/octet-stream");
        assert_eq!(mime_for("photo.png", Some("image/webp".to_owned())), "image/webp");
    }

    #[test]
    fn test_file_name_of_path() {
        assert_eq!(file_name_of(Path::new("/tmp/report.pdf")).unwrap(), "report.pdf");
        assert!(file_name_of(Path::new("/")).is_err());
    }
}
