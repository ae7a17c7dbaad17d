//! Server configuration from the environment.

use floorplan_core::storage::{FileStorage, MemoryStorage, ProjectStorage, StorageResult};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub const ADDR_VAR: &str = "FLOORPLAN_ADDR";
pub const DATA_DIR_VAR: &str = "FLOORPLAN_DATA_DIR";
pub const STORAGE_VAR: &str = "FLOORPLAN_STORAGE";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3030";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid FLOORPLAN_ADDR {value:?}: {source}")]
    InvalidAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid FLOORPLAN_STORAGE {0:?}: expected \"memory\" or \"file\"")]
    InvalidStorage(String),
}

/// Where projects are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    /// JSON files under the per-user data directory.
    DefaultDir,
    /// JSON files under an explicit directory.
    Dir(PathBuf),
}

/// Where to listen and where to keep projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub storage: StorageBackend,
}

impl ServerConfig {
    /// Read `FLOORPLAN_ADDR`, `FLOORPLAN_DATA_DIR` and `FLOORPLAN_STORAGE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any variable source.
    ///
    /// An explicit data directory always means file storage. Otherwise
    /// `FLOORPLAN_STORAGE=file` picks the per-user data directory and anything
    /// else but `memory` (the default) is an error.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = get(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = value
            .parse()
            .map_err(|source| ConfigError::InvalidAddr { value, source })?;

        let data_dir = get(DATA_DIR_VAR).filter(|d| !d.is_empty()).map(PathBuf::from);
        let storage = match (data_dir, get(STORAGE_VAR).as_deref()) {
            (Some(dir), _) => StorageBackend::Dir(dir),
            (None, None | Some("") | Some("memory")) => StorageBackend::Memory,
            (None, Some("file")) => StorageBackend::DefaultDir,
            (None, Some(other)) => return Err(ConfigError::InvalidStorage(other.to_string())),
        };
        Ok(Self { addr, storage })
    }

    /// Open the configured storage backend.
    pub fn open_storage(&self) -> StorageResult<Arc<dyn ProjectStorage>> {
        Ok(match &self.storage {
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
            StorageBackend::DefaultDir => Arc::new(FileStorage::default_location()?),
            StorageBackend::Dir(dir) => Arc::new(FileStorage::new(dir.clone())?),
        })
    }
}
