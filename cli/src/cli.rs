use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "storage-provider")]
#[command(about = "Upload, fetch and delete files in remote storage", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Overrides for values otherwise read from `STORAGE_*` variables.
#[derive(Args)]
pub struct CredentialArgs {
    /// Secret API key
    #[arg(long, env = "STORAGE_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Account identifier
    #[arg(long, env = "STORAGE_ACCOUNT_ID", global = true)]
    pub account_id: Option<String>,

    /// Folder uploads land in (defaults to /uploads)
    #[arg(long, env = "STORAGE_PREFIX", global = true)]
    pub prefix: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a file in one request
    Upload {
        /// File to upload
        file: PathBuf,

        /// MIME type (guessed from the file extension when omitted)
        #[arg(long, short = 'm')]
        mime: Option<String>,
    },
    /// Stream a file or stdin into storage
    Stream {
        /// File to stream, or `-` for stdin
        source: String,

        /// Stored file name (defaults to the source file name)
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// MIME type (guessed from the file name when omitted)
        #[arg(long, short = 'm')]
        mime: Option<String>,
    },
    /// Delete one or more files
    Delete {
        /// Keys of the files to delete
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Print the public URL of a file
    Url {
        /// File key
        key: String,
    },
    /// Download a file
    Download {
        /// File key
        key: String,

        /// Output path (stdout when omitted)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Read the whole file into memory before writing it out
        #[arg(long)]
        buffer: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_delete_many() {
        let cli = Cli::try_parse_from(["storage-provider", "delete", "/uploads/a", "/uploads/b"])
            .unwrap();
        match cli.command {
            Commands::Delete { keys } => assert_eq!(keys, ["/uploads/a", "/uploads/b"]),
            _ => panic!("expected delete"),
        }
    }

    #[test]
    fn test_delete_requires_a_key() {
        assert!(Cli::try_parse_from(["storage-provider", "delete"]).is_err());
    }

    #[test]
    fn test_parse_stream_from_stdin() {
        let cli = Cli::try_parse_from([
            "storage-provider",
            "stream",
            "-",
            "--name",
            "log.txt",
            "--account-id",
            "acct",
        ])
        .unwrap();
        assert_eq!(cli.credentials.account_id.as_deref(), Some("acct"));
        match cli.command {
            Commands::Stream { source, name, mime } => {
                assert_eq!(source, "-");
                assert_eq!(name.as_deref(), Some("log.txt"));
                assert!(mime.is_none());
            }
            _ => panic!("expected stream"),
        }
    }
}
