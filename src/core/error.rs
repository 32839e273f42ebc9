use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Item not found: {0:?}")]
    ItemNotFound(crate::core::types::ItemId),

    #[error("User not found: {0:?}")]
    UserNotFound(crate::core::types::UserId),

    #[error("Targeting error: {0}")]
    Targeting(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, RepoError>;
