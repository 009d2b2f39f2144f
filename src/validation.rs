use anyhow::{anyhow, Result};
use std::path::Path;

use crate::error::ChatMemoryError;
use crate::models::ParsedChat;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a chat export path before reading it
    pub fn validate_chat_file(path: &Path, max_size_mb: u64) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(anyhow!("Chat file path cannot be empty"));
        }

        if !path.exists() {
            return Err(anyhow!("Chat file does not exist: {path:?}"));
        }

        if !path.is_file() {
            return Err(anyhow!("Chat file path is not a file: {path:?}"));
        }

        let size = std::fs::metadata(path)
            .map_err(|e| anyhow!("Cannot access chat file: {e}"))?
            .len();
        if size > max_size_mb.saturating_mul(BYTES_PER_MB) {
            return Err(anyhow!(
                "Chat file too large ({size} bytes, max {max_size_mb} MB)"
            ));
        }

        Ok(())
    }

    /// An export that produced no messages is a user-facing error
    pub fn validate_parsed_chat(chat: &ParsedChat) -> std::result::Result<(), ChatMemoryError> {
        if chat.is_empty() {
            return Err(ChatMemoryError::NoMessages);
        }
        Ok(())
    }

    /// Validate batch size for sentiment tagging
    pub fn validate_batch_size(batch_size: usize) -> Result<()> {
        if batch_size == 0 {
            return Err(anyhow!("Batch size must be greater than 0"));
        }

        if batch_size > 10000 {
            return Err(anyhow!("Batch size too large (max 10,000)"));
        }

        Ok(())
    }

    /// Validate a message search query
    pub fn validate_search_query(query: &str) -> Result<()> {
        if query.len() > 500 {
            return Err(anyhow!("Search query too long (max 500 characters)"));
        }

        if query.contains('\0') {
            return Err(anyhow!("Search query contains invalid characters"));
        }

        Ok(())
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
            .trim()
            .to_string()
    }
}
