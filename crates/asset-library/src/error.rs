//! Error types for asset storage and import

use thiserror::Error;

/// Errors raised while reading, importing or persisting assets
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize asset table: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to read the file: {0}")]
    FileRead(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
