//! Store backend keeping all keys in a single JSON document on disk.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::{KeyValueStore, StorageError};

/// Key-value store persisted as one pretty-printed JSON object.
///
/// A missing file reads as an empty store. Saves read-merge-write the whole
/// document, creating parent directories as needed.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_document(&self) -> Result<HashMap<String, Value>, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn load(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError> {
        let mut document = self.read_document().await?;
        Ok(keys
            .iter()
            .filter_map(|key| document.remove(*key).map(|value| (key.to_string(), value)))
            .collect())
    }

    async fn save(&self, entries: HashMap<String, Value>) -> Result<(), StorageError> {
        let mut document = self.read_document().await?;
        document.extend(entries);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(&document)?;
        tokio::fs::write(&self.path, raw).await?;
        tracing::debug!(path = %self.path.display(), "store document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        let loaded = store.load(&["tasks"]).await.unwrap();

        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn save_merges_into_existing_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("state.json"));

        store
            .save(HashMap::from([("tasks".to_string(), json!([{"id": "1"}]))]))
            .await
            .unwrap();
        store
            .save(HashMap::from([("projects".to_string(), json!([]))]))
            .await
            .unwrap();

        let loaded = store.load(&["tasks", "projects"]).await.unwrap();
        assert_eq!(loaded["tasks"], json!([{"id": "1"}]));
        assert_eq!(loaded["projects"], json!([]));
    }

    #[tokio::test]
    async fn corrupt_document_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);

        let err = store.load(&["tasks"]).await.unwrap_err();

        assert!(matches!(err, StorageError::Corrupt(_)));
    }
}
