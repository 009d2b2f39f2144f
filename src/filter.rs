//! Message search and filtering

use crate::models::{Message, Sentiment};

/// Criteria for selecting messages; unset criteria match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    query: Option<String>,
    sentiment: Option<Sentiment>,
    sender: Option<String>,
}

impl MessageFilter {
    /// A filter that matches every message
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring search on message text
    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        let query = query.trim();
        self.query = (!query.is_empty()).then(|| query.to_lowercase());
        self
    }

    /// Only messages tagged with this sentiment
    #[must_use]
    pub const fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    /// Only messages from this sender (exact name)
    #[must_use]
    pub fn with_sender(mut self, sender: &str) -> Self {
        self.sender = Some(sender.trim().to_string());
        self
    }

    /// Check a single message
    #[must_use]
    pub fn matches(&self, message: &Message) -> bool {
        if let Some(sentiment) = self.sentiment {
            if message.sentiment != Some(sentiment) {
                return false;
            }
        }
        if let Some(sender) = &self.sender {
            if &message.sender != sender {
                return false;
            }
        }
        self.query
            .as_ref()
            .map_or(true, |q| message.text.to_lowercase().contains(q))
    }

    /// Select matching messages, preserving order
    #[must_use]
    pub fn apply<'a>(&self, messages: &'a [Message]) -> Vec<&'a Message> {
        messages.iter().filter(|m| self.matches(m)).collect()
    }
}
