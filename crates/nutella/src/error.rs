//! Error types for Nutella

use thiserror::Error;

/// Main error type for Nutella operations
#[derive(Error, Debug)]
pub enum NutellaError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP errors from the admin API or the AI proxy
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed JSON (upstream responses or cached payloads)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Answer-generation errors (AI proxy call failures)
    #[error("Answer error: {0}")]
    Answer(String),

    /// Invalid pipeline input (missing query, etc.)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Nutella operations
pub type Result<T> = std::result::Result<T, NutellaError>;
