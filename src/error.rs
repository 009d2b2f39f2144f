//! Error types for the chat-memory-rust library.
//!
//! Parsing and analysis never fail on input content; these errors cover
//! configuration, I/O, export, and the sentiment classifier boundary.

use thiserror::Error;

/// Errors that can occur in the chat-memory-rust application.
#[derive(Error, Debug)]
pub enum ChatMemoryError {
    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A header dialect pattern failed to compile
    #[error("Invalid header pattern: {0}")]
    Regex(#[from] regex::Error),

    /// A header dialect compiled but lacks a required capture group
    #[error("Header dialect '{name}' is missing the '{group}' capture group")]
    InvalidDialect {
        /// Dialect name from configuration
        name: String,
        /// Name of the missing capture group
        group: &'static str,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration source errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The export contained no recognisable messages
    #[error("No messages found, check the file format")]
    NoMessages,

    /// A classifier returned a label outside the supported set
    #[error("Unknown sentiment label: {0}")]
    UnknownSentiment(String),

    /// The sentiment classifier failed for a message
    #[error("Sentiment classifier error: {0}")]
    Classifier(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with ChatMemoryError
pub type Result<T> = std::result::Result<T, ChatMemoryError>;

impl From<anyhow::Error> for ChatMemoryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
