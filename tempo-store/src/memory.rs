//! In-memory store implementation, used by tests and examples.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::{KeyValueStore, StorageError};

/// Key-value store backed by an in-memory HashMap.
///
/// Cloning is cheap and clones share the same underlying map, which lets a
/// test hold on to the store across a simulated engine restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry, builder-style.
    pub fn with_entry(self, key: impl Into<String>, value: Value) -> Self {
        {
            let mut entries = self.entries.write().unwrap();
            entries.insert(key.into(), value);
        }
        self
    }

    /// Read back a stored value (for test assertions).
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError> {
        let entries = self.entries.read().unwrap();
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    async fn save(&self, new_entries: HashMap<String, Value>) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap();
        entries.extend(new_entries);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn load_returns_only_known_keys() {
        let store = MemoryStore::new().with_entry("tasks", json!([]));

        let loaded = store.load(&["tasks", "projects"]).await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["tasks"], json!([]));
    }

    #[tokio::test]
    async fn save_overwrites_and_preserves_other_keys() {
        let store = MemoryStore::new().with_entry("tasks", json!([1]));

        store
            .save(HashMap::from([("projects".to_string(), json!([2]))]))
            .await
            .unwrap();

        assert_eq!(store.get("tasks"), Some(json!([1])));
        assert_eq!(store.get("projects"), Some(json!([2])));
    }
}
