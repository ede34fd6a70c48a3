use thiserror::Error;

/// Failures reading or writing the local key-value file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Store file {0} does not hold a JSON object")]
    Corrupt(String),
}
