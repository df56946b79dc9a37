//! String-keyed JSON persistence for the tempo engine.
//!
//! The engine only ever talks to [`KeyValueStore`]; hosts pick a backend.
//! [`JsonFileStore`] keeps everything in one JSON document on disk,
//! [`MemoryStore`] is the in-memory variant used by tests.

mod error;
mod json_file;
mod memory;
mod store;

pub use error::StorageError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::KeyValueStore;
