//! Chat Memory - Chat Export Parsing and Reply Analytics
//!
//! A Rust library for turning exported chat logs into typed messages,
//! tagging their sentiment, and measuring how quickly participants reply.
//!
//! # Features
//!
//! - Parse bracketed and dashed export dialects, mixed within one file
//! - Recover multi-line messages and drop omitted-media placeholders
//! - Reply-latency samples, responsiveness score and hourly histogram
//! - Pluggable sentiment classifier with an offline default
//! - Export to TXT, CSV and JSON

/// Reply-latency analytics
pub mod analysis;
/// Configuration management
pub mod config;
/// Error types
pub mod error;
/// Writing messages and reports to disk
pub mod export;
/// Message search and filtering
pub mod filter;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Chat export parsing
pub mod parser;
/// Sentiment classification
pub mod sentiment;
/// Timestamp resolution
pub mod timestamp;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use analysis::analyze;
pub use filter::MessageFilter;
pub use models::{AnalysisSummary, Message, OutputFormat, ParsedChat, Sender, Sentiment};
pub use parser::{parse_chat, ChatParser};
pub use sentiment::{LexiconClassifier, SentimentClassifier};
