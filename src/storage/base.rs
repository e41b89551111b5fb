use std::sync::Arc;

use tracing::info;

use super::{file_storage::FileStorage, memory_storage::MemoryStorage};
use crate::config::StorageConfig;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage document is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A simple key/value persistence surface (get/set/remove by string key).
///
/// Access is synchronous. Removing a key that does not exist is not an error.
pub trait DurableStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn describe(&self) -> &str;
}

/// Creates a concrete storage implementation based on the StorageConfig.
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn DurableStorage>, StorageError> {
    match config {
        StorageConfig::Memory => {
            info!("Session storage is in-memory; nothing will persist across runs.");
            Ok(Arc::new(MemoryStorage::new()))
        }
        StorageConfig::File { path } => {
            let storage = FileStorage::open(path)?;
            info!("Session storage backed by file '{}'.", path.display());
            Ok(Arc::new(storage))
        }
    }
}
