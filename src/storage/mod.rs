pub mod base;
pub mod file_storage;
pub mod memory_storage;

// Re-export the primary storage items so code outside can do
// "use crate::storage::{DurableStorage, create_storage};"
pub use base::{create_storage, DurableStorage, StorageError};
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
