use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::dao::{local_store::LocalStore, storage::StorageResult};

/// Process-local store, mainly for tests and ephemeral deployments.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocalStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryLocalStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, as if a previous session had written it.
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Current raw value under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }
}

impl LocalStore for MemoryLocalStore {
    fn read(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let value = self.get(key);
        Box::pin(async move { Ok(value) })
    }

    fn write(&self, key: &str, value: String) -> BoxFuture<'static, StorageResult<()>> {
        self.entries.insert(key.to_string(), value);
        Box::pin(async { Ok(()) })
    }
}
