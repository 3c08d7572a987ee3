use clap::Parser;
use std::env;
use std::path::PathBuf;

use crate::cli::command::Command;
use crate::configuration::DEFAULT_WORKERS;
use crate::storage::sqlite::DEFAULT_BUSY_TIMEOUT_MS;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Store and look up named identities with their face images",
    long_about = "Keeps a SQLite table of identity keys and names next to a directory of JPEG face images, and runs every operation on a bounded pool of background workers."
)]
pub struct Cli {
    #[arg(
        long,
        env = "IDENTITY_STORE_DATA_DIR",
        default_value = ".identity-store/",
        value_name = "DIR",
        help = "Directory holding the identity database and the faces/ directory"
    )]
    pub data_dir: PathBuf,

    #[arg(
        long = "log-file",
        env = "IDENTITY_STORE_LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        short = 'w',
        long,
        env = "IDENTITY_STORE_WORKERS",
        default_value_t = DEFAULT_WORKERS,
        value_name = "N",
        help = "Maximum number of storage operations running at once"
    )]
    pub workers: usize,

    #[arg(
        long = "busy-timeout-ms",
        env = "IDENTITY_STORE_BUSY_TIMEOUT_MS",
        default_value_t = DEFAULT_BUSY_TIMEOUT_MS,
        value_name = "MS",
        help = "How long a connection waits on a locked database"
    )]
    pub busy_timeout_ms: u64,

    #[command(subcommand)]
    pub cmd: Command,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    dotenvy::from_filename(&dotenv_path).ok();

    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults_and_subcommand() {
        let cli = Cli::try_parse_from(["identity-store", "count"]).unwrap();
        assert_eq!(cli.workers, DEFAULT_WORKERS);
        assert_eq!(cli.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
        assert!(matches!(cli.cmd, Command::Count));
    }

    #[test]
    fn parses_store_arguments() {
        let cli = Cli::try_parse_from([
            "identity-store",
            "--data-dir",
            "/tmp/ids",
            "store",
            "--key",
            "-5",
            "--name",
            "Alice",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/ids"));
        match cli.cmd {
            Command::Store { key, name, image } => {
                assert_eq!(key, -5);
                assert_eq!(name.as_deref(), Some("Alice"));
                assert!(image.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn fetch_requires_key() {
        assert!(Cli::try_parse_from(["identity-store", "fetch"]).is_err());
    }
}
