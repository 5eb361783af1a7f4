use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::core::{KeyValueStore, PersistenceError, PersistenceResult};

/// In-process store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite an entry without going through the async surface.
    pub fn insert(&self, key: impl Into<String>, bytes: Vec<u8>) -> PersistenceResult<()> {
        self.lock()?.insert(key.into(), bytes);
        Ok(())
    }

    pub fn get_blocking(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().ok()?.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| PersistenceError::Backend("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> PersistenceResult<()> {
        self.lock()?.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> PersistenceResult<Vec<u8>> {
        self.lock()?
            .get(key)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(key.to_string()))
    }
}
