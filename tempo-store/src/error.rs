use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt store document: {0}")]
    Corrupt(#[from] serde_json::Error),
}
