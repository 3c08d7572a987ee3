//! Local identity storage: a SQLite table of `(key, name)` rows next to a
//! directory of JPEG face images, with background execution of every
//! operation.

pub mod app;
pub mod cli;
pub mod commands;
pub mod configuration;
pub mod context;
pub mod query;
pub mod storage;
pub mod tracing;
pub mod types;

pub use configuration::StorageConfig;
pub use query::{AsyncIdentityStorage, AsyncQuery, Outcome, QueryCallbacks, QueryExecutor};
pub use storage::IdentityStorage;
pub use types::{Identity, IdentityError};
