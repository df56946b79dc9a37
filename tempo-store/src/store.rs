use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::StorageError;

/// Outbound port for durable key-value persistence.
///
/// Values are opaque JSON; the engine owns the schema behind each key.
/// `load` returns only the requested keys that exist, so absent keys are a
/// normal outcome, not an error. `save` overwrites each given key and leaves
/// every other key untouched.
///
/// Concurrent writers are unsupported: exactly one engine instance per
/// process is expected to own a store. Last write wins at this layer, so two
/// processes sharing a backend can silently drop each other's updates.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Fetch the subset of `keys` that have a stored value.
    async fn load(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError>;

    /// Durably write every entry in `entries`.
    async fn save(&self, entries: HashMap<String, Value>) -> Result<(), StorageError>;
}
