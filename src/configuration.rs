use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::storage::sqlite::DEFAULT_BUSY_TIMEOUT_MS;

pub const DEFAULT_WORKERS: usize = 4;

#[derive(Clone, Debug)]
pub struct Configuration {
    pub data_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    pub workers: usize,
    pub busy_timeout_ms: u64,
}

impl Configuration {
    pub fn storage(&self) -> StorageConfig {
        StorageConfig {
            data_dir: self.data_dir.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
        }
    }
}

/// The part of the configuration the identity repository needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub busy_timeout_ms: u64,
}

impl StorageConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_config_inherits_data_dir_and_timeout() {
        let cfg = Configuration {
            data_dir: PathBuf::from("/tmp/identities"),
            log_file: None,
            workers: DEFAULT_WORKERS,
            busy_timeout_ms: 250,
        };
        let storage = cfg.storage();
        assert_eq!(storage.data_dir, PathBuf::from("/tmp/identities"));
        assert_eq!(storage.busy_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn storage_config_defaults_busy_timeout() {
        let storage = StorageConfig::new("data");
        assert_eq!(storage.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }
}
