/// JSON files on disk.
pub mod file;
/// In-process map, for tests and ephemeral runs.
pub mod memory;

use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;

pub use self::{file::FileLocalStore, memory::MemoryLocalStore};

/// Key/value persistence that survives restarts, addressed by fixed string keys.
pub trait LocalStore: Send + Sync {
    /// Read the raw value stored under `key`, if any.
    fn read(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<String>>>;
    /// Replace the value stored under `key`.
    fn write(&self, key: &str, value: String) -> BoxFuture<'static, StorageResult<()>>;
}
