use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the identity stores and the query executor.
///
/// A missing identity or face is never an error; lookups report it as `None`.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("sqlite error: {0}")]
    Engine(#[from] rusqlite::Error),
    #[error("database schema version mismatch: found {found}, supported up to {supported}")]
    SchemaVersion { found: i64, supported: i64 },
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode face image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode face image for key {key}: {source}")]
    Encode {
        key: i64,
        #[source]
        source: image::ImageError,
    },
    #[error("query worker panicked: {0}")]
    TaskPanicked(String),
    #[error("query worker aborted: {0}")]
    TaskAborted(String),
}

impl IdentityError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        IdentityError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IdentityError>;
