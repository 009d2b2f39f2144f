//! Chat export parser
//!
//! Turns the line-oriented text export of a messaging app into ordered,
//! typed messages. Each line is either a message header, a continuation of
//! the open message, or noise. Header dialects are data: a list of named
//! patterns tried in order, so new export variants only need configuration.

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

use crate::config::ParserConfig;
use crate::error::{ChatMemoryError, Result};
use crate::models::{Message, ParseWarning, ParseWarningKind, ParsedChat, Sender};
use crate::timestamp::{Resolution, TimestampResolver};

/// Capture groups every header dialect must define
const REQUIRED_GROUPS: [&str; 3] = ["timestamp", "sender", "body"];

/// Date and time token shared by the built-in dialects
const DATE_TIME_TOKEN: &str =
    r"\d{1,2}[/.]\d{1,2}[/.]\d{2,4},?\s\d{1,2}:\d{2}(?::\d{2})?(?:\s?[aApP]\.?\s?[mM]\.?)?";

/// Bodies the export writes in place of omitted attachments
pub const DEFAULT_MEDIA_PLACEHOLDERS: &[&str] = &[
    "<Media omitted>",
    "image omitted",
    "video omitted",
    "audio omitted",
    "sticker omitted",
    "GIF omitted",
    "document omitted",
];

/// Bidi marks and BOMs some exports put in front of lines and bodies
const INVISIBLE_MARKS: &[char] = &['\u{200e}', '\u{200f}', '\u{feff}'];

/// A named header pattern with `timestamp`, `sender` and `body` groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderDialect {
    /// Label used in logs and errors
    pub name: String,
    /// Regular expression matched against each line
    pub pattern: String,
}

/// `[1/1/24, 10:00:00] Alice: text` and `1/1/24, 10:00 - Alice: text`
#[must_use]
pub fn default_header_dialects() -> Vec<HeaderDialect> {
    vec![
        HeaderDialect {
            name: "bracketed".to_string(),
            pattern: format!(
                r"^\[(?P<timestamp>{DATE_TIME_TOKEN})\]\s(?P<sender>[^:]+):(?:\s(?P<body>.*))?$"
            ),
        },
        HeaderDialect {
            name: "dashed".to_string(),
            pattern: format!(
                r"^(?P<timestamp>{DATE_TIME_TOKEN})\s-\s(?P<sender>[^:]+):(?:\s(?P<body>.*))?$"
            ),
        },
    ]
}

#[derive(Debug, Clone)]
struct CompiledDialect {
    name: String,
    regex: Regex,
}

/// A recognised message header
#[derive(Debug)]
struct Header<'a> {
    timestamp: &'a str,
    sender: &'a str,
    body: &'a str,
}

/// Insertion-ordered sender registry
#[derive(Debug, Default)]
struct SenderRegistry {
    senders: Vec<Sender>,
    index: HashMap<String, usize>,
}

impl SenderRegistry {
    /// Record a name on first sight; the second distinct name is the user
    fn register(&mut self, name: &str) {
        if self.index.contains_key(name) {
            return;
        }
        let position = self.senders.len();
        self.index.insert(name.to_string(), position);
        self.senders.push(Sender {
            name: name.to_string(),
            is_user: position == 1,
        });
    }

    fn into_senders(self) -> Vec<Sender> {
        self.senders
    }
}

/// Accumulator threaded through the line fold
#[derive(Debug, Default)]
struct ParseState {
    messages: Vec<Message>,
    registry: SenderRegistry,
    warnings: Vec<ParseWarning>,
    open: Option<Message>,
    next_id: usize,
    last_occurred_at: Option<NaiveDateTime>,
}

impl ParseState {
    fn close_open(&mut self) {
        if let Some(message) = self.open.take() {
            self.messages.push(message);
        }
    }

    fn finish(mut self) -> ParsedChat {
        self.close_open();
        ParsedChat {
            messages: self.messages,
            senders: self.registry.into_senders(),
            warnings: self.warnings,
        }
    }
}

/// Parser for chat export text
#[derive(Debug, Clone)]
pub struct ChatParser {
    dialects: Vec<CompiledDialect>,
    media_placeholders: Vec<String>,
    resolver: TimestampResolver,
}

impl ChatParser {
    /// Compile the configured header dialects
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let dialects = config
            .header_dialects
            .iter()
            .map(compile_dialect)
            .collect::<Result<Vec<_>>>()?;

        if dialects.is_empty() {
            return Err(ChatMemoryError::InvalidConfig(
                "At least one header dialect is required".to_string(),
            ));
        }

        Ok(Self {
            dialects,
            media_placeholders: config
                .media_placeholders
                .iter()
                .map(|p| p.trim().to_string())
                .collect(),
            resolver: TimestampResolver::new(config.date_order)?,
        })
    }

    /// Parse export text into messages and senders
    ///
    /// Never fails: unrecognised lines are dropped and unresolvable
    /// timestamps are reported in [`ParsedChat::warnings`].
    #[must_use]
    pub fn parse(&self, text: &str) -> ParsedChat {
        let state = text
            .lines()
            .enumerate()
            .fold(ParseState::default(), |state, (index, line)| {
                self.step(state, index + 1, line)
            });

        let parsed = state.finish();
        debug!(
            messages = parsed.messages.len(),
            senders = parsed.senders.len(),
            warnings = parsed.warnings.len(),
            "Parsed chat export"
        );
        parsed
    }

    fn step(&self, mut state: ParseState, line_number: usize, line: &str) -> ParseState {
        let line = line.trim_start_matches(INVISIBLE_MARKS);

        if let Some(header) = self.match_header(line) {
            state.close_open();

            let body = header.body.trim().trim_start_matches(INVISIBLE_MARKS).trim();
            if body.is_empty() || self.is_media_placeholder(body) {
                trace!(line_number, "Skipping empty or media message");
                return state;
            }

            let sender = header.sender.trim();
            if sender.is_empty() {
                trace!(line_number, "Skipping header without a sender");
                return state;
            }

            let occurred_at = self.resolve_timestamp(&mut state, line_number, header.timestamp);
            state.registry.register(sender);

            state.open = Some(Message {
                id: state.next_id,
                timestamp_raw: header.timestamp.to_string(),
                occurred_at,
                sender: sender.to_string(),
                text: body.to_string(),
                sentiment: None,
            });
            state.next_id += 1;
            return state;
        }

        let content = line.trim();
        match state.open.as_mut() {
            Some(open) if !content.is_empty() => {
                open.text.push('\n');
                open.text.push_str(content);
            }
            _ => trace!(line_number, "Dropping line outside a message"),
        }
        state
    }

    fn match_header<'a>(&self, line: &'a str) -> Option<Header<'a>> {
        self.dialects.iter().find_map(|dialect| {
            let caps = dialect.regex.captures(line)?;
            trace!(dialect = %dialect.name, "Header matched");
            Some(Header {
                timestamp: caps.name("timestamp")?.as_str(),
                sender: caps.name("sender")?.as_str(),
                body: caps.name("body").map_or("", |m| m.as_str()),
            })
        })
    }

    fn is_media_placeholder(&self, body: &str) -> bool {
        self.media_placeholders.iter().any(|p| p == body)
    }

    fn resolve_timestamp(
        &self,
        state: &mut ParseState,
        line_number: usize,
        raw: &str,
    ) -> NaiveDateTime {
        let (occurred_at, resolution) = self.resolver.resolve(raw);

        // A substituted "now" says nothing about ordering, so it is not tracked
        if resolution == Resolution::WallClock {
            warn!(line_number, timestamp = raw, "Unresolvable timestamp, using current time");
            state.warnings.push(ParseWarning {
                line_number,
                timestamp_raw: raw.to_string(),
                kind: ParseWarningKind::WallClockFallback,
            });
            return occurred_at;
        }

        if state.last_occurred_at.is_some_and(|last| occurred_at < last) {
            debug!(line_number, timestamp = raw, "Timestamp earlier than previous message");
            state.warnings.push(ParseWarning {
                line_number,
                timestamp_raw: raw.to_string(),
                kind: ParseWarningKind::OutOfOrder,
            });
        }

        state.last_occurred_at = Some(occurred_at);
        occurred_at
    }
}

impl Default for ChatParser {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self::new(&ParserConfig::default()).expect("built-in header dialects compile")
    }
}

fn compile_dialect(dialect: &HeaderDialect) -> Result<CompiledDialect> {
    let regex = Regex::new(&dialect.pattern)?;
    let names: Vec<&str> = regex.capture_names().flatten().collect();

    if let Some(group) = REQUIRED_GROUPS.iter().copied().find(|g| !names.contains(g)) {
        return Err(ChatMemoryError::InvalidDialect {
            name: dialect.name.clone(),
            group,
        });
    }

    Ok(CompiledDialect {
        name: dialect.name.clone(),
        regex,
    })
}

/// Parse export text with the built-in dialects
#[must_use]
pub fn parse_chat(text: &str) -> ParsedChat {
    ChatParser::default().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dialects_compile() {
        let parser = ChatParser::new(&ParserConfig::default());
        assert!(parser.is_ok());
    }

    #[test]
    fn test_dialect_without_body_group_is_rejected() {
        let config = ParserConfig {
            header_dialects: vec![HeaderDialect {
                name: "broken".to_string(),
                pattern: r"^(?P<timestamp>\S+) (?P<sender>\w+): .*$".to_string(),
            }],
            ..ParserConfig::default()
        };
        let err = ChatParser::new(&config).unwrap_err();
        assert!(matches!(err, ChatMemoryError::InvalidDialect { group: "body", .. }));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = ParserConfig {
            header_dialects: vec![HeaderDialect {
                name: "unbalanced".to_string(),
                pattern: "(".to_string(),
            }],
            ..ParserConfig::default()
        };
        assert!(matches!(ChatParser::new(&config), Err(ChatMemoryError::Regex(_))));
    }

    #[test]
    fn test_registry_flags_second_sender() {
        let mut registry = SenderRegistry::default();
        registry.register("Bob");
        registry.register("Alice");
        registry.register("Bob");
        registry.register("Carol");
        let flags: Vec<_> = registry
            .into_senders()
            .into_iter()
            .map(|s| (s.name, s.is_user))
            .collect();
        assert_eq!(
            flags,
            vec![
                ("Bob".to_string(), false),
                ("Alice".to_string(), true),
                ("Carol".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_header_without_trailing_space_has_empty_body() {
        let parser = ChatParser::default();
        let header = parser.match_header("1/1/24, 10:00 - Alice:").unwrap();
        assert_eq!(header.sender, "Alice");
        assert_eq!(header.body, "");
    }
}
