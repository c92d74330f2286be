use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClockError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid value for option '{name}' ({reason})")]
    InvalidOption { name: String, reason: String },
    #[error("Unknown option '{0}'")]
    UnknownOption(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage read error: {0}")]
    StorageRead(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClockError>;
