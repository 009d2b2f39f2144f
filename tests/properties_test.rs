//! Property-based tests for parsing and reply analytics

use chat_memory_rust::analysis::{analyze, MAX_REPLY_GAP_SECS};
use chat_memory_rust::parser::ChatParser;
use proptest::prelude::*;

const NAMES: [&str; 4] = ["Alice", "Bob", "Carol", "Dan"];

fn header_line() -> impl Strategy<Value = String> {
    (
        1_u32..=28,
        1_u32..=12,
        0_u32..24,
        0_u32..60,
        0_usize..NAMES.len(),
        "[a-z ]{0,12}",
        any::<bool>(),
    )
        .prop_map(|(day, month, hour, minute, who, body, bracketed)| {
            if bracketed {
                format!("[{day}/{month}/24, {hour:02}:{minute:02}:00] {}: {body}", NAMES[who])
            } else {
                format!("{day}/{month}/24, {hour:02}:{minute:02} - {}: {body}", NAMES[who])
            }
        })
}

fn export_line() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => header_line(),
        2 => "[a-z ]{1,16}",
        1 => Just(String::new()),
        1 => Just("1/1/24, 09:00 - Alice: <Media omitted>".to_string()),
    ]
}

fn export_text() -> impl Strategy<Value = String> {
    prop::collection::vec(export_line(), 0..60).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn test_ids_are_contiguous(text in export_text()) {
        let chat = ChatParser::default().parse(&text);
        for (expected, message) in chat.messages.iter().enumerate() {
            prop_assert_eq!(message.id, expected);
        }
    }

    #[test]
    fn test_parsing_is_idempotent(text in export_text()) {
        let parser = ChatParser::default();
        prop_assert_eq!(parser.parse(&text), parser.parse(&text));
    }

    #[test]
    fn test_sender_registry_is_consistent(text in export_text()) {
        let chat = ChatParser::default().parse(&text);

        for message in &chat.messages {
            prop_assert!(chat.sender(&message.sender).is_some());
            prop_assert!(!message.text.is_empty());
        }

        let users: Vec<usize> = chat
            .senders
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_user)
            .map(|(i, _)| i)
            .collect();
        if chat.senders.len() >= 2 {
            prop_assert_eq!(users, vec![1]);
        } else {
            prop_assert!(users.is_empty());
        }
    }

    #[test]
    fn test_analysis_invariants(text in export_text()) {
        let chat = ChatParser::default().parse(&text);
        let summary = analyze(&chat.messages);

        prop_assert_eq!(summary.total_message_count, chat.messages.len());
        prop_assert!(summary.responsiveness_score <= 100);
        for sample in &summary.samples {
            prop_assert!(sample.delay_seconds > 0);
            prop_assert!(sample.delay_seconds < MAX_REPLY_GAP_SECS);
        }

        let histogram = summary.hourly_histogram();
        prop_assert_eq!(histogram.len(), 24);
        let counted: usize = histogram.iter().map(|b| b.sample_count).sum();
        prop_assert_eq!(counted, summary.samples.len());
        if summary.samples.is_empty() {
            prop_assert_eq!(summary.responsiveness_score, 0);
        }
    }
}
