//! Data models for parsed chats and reply analytics
//!
//! Everything here is plain owned data. A parse produces a [`ParsedChat`];
//! later enrichment (sentiment) builds new values instead of mutating it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChatMemoryError;

/// A single message recovered from a chat export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Position in the export, starting at 0 with no gaps
    pub id: usize,
    /// Date/time substring exactly as it appeared in the export
    pub timestamp_raw: String,
    /// Resolved local time used for ordering and delay arithmetic
    pub occurred_at: NaiveDateTime,
    /// Normalized sender name, a key into [`ParsedChat::senders`]
    pub sender: String,
    /// Message body; continuation lines are joined with `\n`
    pub text: String,
    /// Sentiment label, attached after parsing
    pub sentiment: Option<Sentiment>,
}

impl Message {
    /// Return this message with a sentiment label attached
    #[must_use]
    pub fn with_sentiment(self, sentiment: Sentiment) -> Self {
        Self {
            sentiment: Some(sentiment),
            ..self
        }
    }
}

/// Closed set of sentiment labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Positive message
    Happy,
    /// Negative, downcast message
    Sad,
    /// Negative, hostile message
    Angry,
    /// No clear sentiment
    Neutral,
}

impl Sentiment {
    /// All labels in display order
    pub const ALL: [Self; 4] = [Self::Happy, Self::Sad, Self::Angry, Self::Neutral];

    /// Lower-case label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Neutral => "neutral",
        }
    }

    /// Parse a classifier label, substituting neutral for anything unknown
    #[must_use]
    pub fn from_label_or_neutral(label: &str) -> Self {
        label.parse().unwrap_or(Self::Neutral)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = ChatMemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Ok(Self::Happy),
            "sad" => Ok(Self::Sad),
            "angry" => Ok(Self::Angry),
            "neutral" => Ok(Self::Neutral),
            other => Err(ChatMemoryError::UnknownSentiment(other.to_string())),
        }
    }
}

/// A chat participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Display name, trimmed
    pub name: String,
    /// Best-effort guess that this participant exported the chat
    pub is_user: bool,
}

/// Why a parsed line produced a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseWarningKind {
    /// The timestamp could not be resolved and the current time was used
    WallClockFallback,
    /// The timestamp resolved earlier than the previous message
    OutOfOrder,
}

/// A non-fatal problem found while parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based line number of the message header
    pub line_number: usize,
    /// Raw timestamp of the affected message
    pub timestamp_raw: String,
    /// What went wrong
    pub kind: ParseWarningKind,
}

/// Output of a single parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedChat {
    /// Messages in order of appearance
    pub messages: Vec<Message>,
    /// Distinct senders in order of first appearance
    pub senders: Vec<Sender>,
    /// Non-fatal problems found while parsing
    pub warnings: Vec<ParseWarning>,
}

impl ParsedChat {
    /// True when no messages were recognised
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Look up a sender by normalized name
    #[must_use]
    pub fn sender(&self, name: &str) -> Option<&Sender> {
        self.senders.iter().find(|s| s.name == name)
    }

    /// The participant flagged as the exporting account, if any
    #[must_use]
    pub fn account_owner(&self) -> Option<&Sender> {
        self.senders.iter().find(|s| s.is_user)
    }

    /// The first participant not flagged as the exporting account
    #[must_use]
    pub fn other_participant(&self) -> Option<&Sender> {
        self.senders.iter().find(|s| !s.is_user)
    }
}

/// One measured reply delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyDelaySample {
    /// Seconds between the reply and the preceding message from someone else
    pub delay_seconds: i64,
    /// Time of the replying message
    pub occurred_at: NaiveDateTime,
}

/// Average reply delay for one hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyDelay {
    /// Hour of day, 0 to 23
    pub hour: u32,
    /// Mean delay of replies sent in this hour, 0 when there were none
    pub average_delay_seconds: f64,
    /// Number of replies sent in this hour
    pub sample_count: usize,
}

/// Reply-latency analytics for a conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Retained reply delays in conversation order
    pub samples: Vec<ReplyDelaySample>,
    /// Mean of `samples`, 0 when empty
    pub average_delay_seconds: f64,
    /// 0 to 100, higher means faster replies
    pub responsiveness_score: u8,
    /// Number of messages analysed
    pub total_message_count: usize,
}

impl AnalysisSummary {
    /// Per-hour average reply delay, always 24 entries
    #[must_use]
    pub fn hourly_histogram(&self) -> Vec<HourlyDelay> {
        crate::analysis::hourly_histogram(&self.samples)
    }
}

/// Output format for exported messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values format
    Csv,
    /// Plain text format
    Txt,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ChatMemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ChatMemoryError::InvalidConfig(format!(
                "Invalid output format: {other}. Must be one of: txt, csv, json"
            ))),
        }
    }
}
