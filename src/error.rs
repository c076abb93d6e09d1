use thiserror::Error;

/// Main error type for twlint operations
#[derive(Error, Debug)]
pub enum TwlintError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Invalid source pattern '{pattern}': {reason}")]
    InvalidSource { pattern: String, reason: String },

    #[error("Design system error: {0}")]
    DesignSystem(String),
}

pub type Result<T> = std::result::Result<T, TwlintError>;
