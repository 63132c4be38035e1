/// Centralized error types for ast-chunker using thiserror
///
/// Unsupported languages and parse failures never surface here as hard errors
/// from `split`; they are routed to the fallback splitter. What reaches the
/// caller is resource exhaustion, configuration problems and I/O at the edges.
use std::time::Duration;
use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Main error type for the chunking engine
#[derive(Error, Debug)]
pub enum ChunkerError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Parser pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised while turning source text into a syntax tree or chunks
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to set grammar for '{language}': {reason}")]
    GrammarMismatch { language: String, reason: String },

    #[error("Parser produced no tree for '{0}'")]
    NoTree(String),

    #[error("Syntax errors present in '{0}'")]
    SyntaxErrors(String),

    #[error("Node rows {start}..={end} fall outside the {line_count}-line source")]
    RowOutOfRange {
        start: usize,
        end: usize,
        line_count: usize,
    },
}

/// Errors raised by the parser resource pool
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("No parser became available within {0:?}")]
    Exhausted(Duration),

    #[error("Parser pool has been destroyed")]
    Closed,

    #[error("Parser pool lock was poisoned: {0}")]
    LockPoisoned(String),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors related to input validation
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Path does not exist: {0}")]
    PathNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

// Conversion from anyhow::Error to ChunkerError
impl From<anyhow::Error> for ChunkerError {
    fn from(err: anyhow::Error) -> Self {
        ChunkerError::Other(format!("{:#}", err))
    }
}

impl ChunkerError {
    /// Check if this is a user error (validation, bad config) vs system error
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ChunkerError::Validation(_) | ChunkerError::Config(ConfigError::InvalidValue { .. })
        )
    }

    /// Resource-unavailable conditions are surfaced to callers instead of
    /// being absorbed by the fallback splitter
    pub fn is_resource_unavailable(&self) -> bool {
        matches!(
            self,
            ChunkerError::Pool(PoolError::Exhausted(_)) | ChunkerError::Pool(PoolError::Closed)
        )
    }
}
