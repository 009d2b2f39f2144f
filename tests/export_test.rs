//! Integration tests for export.rs

use std::fs;

use chrono::NaiveDate;
use chat_memory_rust::analysis::analyze;
use chat_memory_rust::export::{
    analysis_to_json, write_filtered_report, write_histogram_csv, write_messages, write_report,
};
use chat_memory_rust::filter::MessageFilter;
use chat_memory_rust::models::{Message, OutputFormat, Sentiment};
use chat_memory_rust::parser::parse_chat;
use tempfile::TempDir;

const CHAT: &str = "\
1/1/24, 10:00 - Alice: Hello, world
second line
1/1/24, 10:02 - Bob: Hi \"there\"
1/1/24, 11:30 - Alice: bye";

fn sample_messages() -> Vec<Message> {
    parse_chat(CHAT).messages
}

#[test]
fn test_write_txt_messages() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("messages.txt");

    write_messages(&sample_messages(), OutputFormat::Txt, &path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("[1/1/24, 10:00] Alice: Hello, world\nsecond line\n\n"));
    assert!(content.contains("[1/1/24, 10:02] Bob: Hi \"there\"\n\n"));
    assert!(content.ends_with("[1/1/24, 11:30] Alice: bye\n\n"));
}

#[test]
fn test_write_csv_messages() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("messages.csv");
    let messages: Vec<Message> = sample_messages()
        .into_iter()
        .map(|m| m.with_sentiment(Sentiment::Happy))
        .collect();

    write_messages(&messages, OutputFormat::Csv, &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["ID", "Sender", "Timestamp", "Sentiment", "Message"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][0], "0");
    assert_eq!(&rows[0][1], "Alice");
    assert_eq!(&rows[0][3], "happy");
    assert_eq!(&rows[0][4], "Hello, world\nsecond line");
    assert_eq!(&rows[1][4], "Hi \"there\"");
}

#[test]
fn test_csv_leaves_missing_sentiment_blank() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("messages.csv");

    write_messages(&sample_messages(), OutputFormat::Csv, &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let first = reader.records().next().unwrap().unwrap();
    assert_eq!(&first[3], "");
}

#[test]
fn test_write_json_messages() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("messages.json");
    let messages = sample_messages();

    write_messages(&messages, OutputFormat::Json, &path).unwrap();

    let restored: Vec<Message> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(restored, messages);
    assert_eq!(
        restored[0].occurred_at.date(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    );
}

#[test]
fn test_analysis_json_fields() {
    let summary = analyze(&sample_messages());
    let json: serde_json::Value = serde_json::from_str(&analysis_to_json(&summary).unwrap()).unwrap();

    assert_eq!(json["total_message_count"], 3);
    assert_eq!(json["reply_count"], 2);
    assert_eq!(json["responsiveness_score"], summary.responsiveness_score);
    assert_eq!(json["average_delay"], "45m 0s");
    assert_eq!(json["hourly"].as_array().unwrap().len(), 24);
}

#[test]
fn test_histogram_csv_has_every_hour() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hourly.csv");
    let summary = analyze(&sample_messages());

    write_histogram_csv(&summary.hourly_histogram(), &path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 25);
    assert_eq!(lines[0], "Hour,Average Reply Seconds,Samples");
    assert_eq!(lines[1], "0:00,0,0");
    assert_eq!(lines[11], "10:00,120,1");
    assert_eq!(lines[12], "11:00,5280,1");
}

#[test]
fn test_write_report_creates_all_files() {
    let dir = TempDir::new().unwrap();
    let messages = sample_messages();
    let summary = analyze(&messages);

    let files = write_report(
        &messages,
        &summary,
        OutputFormat::Csv,
        dir.path(),
        "2024-01-01_12-00-00",
    )
    .unwrap();

    let report_dir = dir.path().join("2024-01-01_12-00-00");
    assert_eq!(
        files,
        vec![
            report_dir.join("messages.csv"),
            report_dir.join("analysis.json"),
            report_dir.join("hourly.csv"),
        ]
    );
    for file in &files {
        assert!(file.is_file(), "missing {}", file.display());
    }
}

#[test]
fn test_write_report_with_no_messages() {
    let dir = TempDir::new().unwrap();
    let summary = analyze(&[]);

    let files = write_report(&[], &summary, OutputFormat::Txt, dir.path(), "empty").unwrap();

    assert_eq!(fs::read_to_string(&files[0]).unwrap(), "");
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&files[1]).unwrap()).unwrap();
    assert_eq!(json["reply_count"], 0);
    assert_eq!(json["responsiveness_score"], 0);
}

const DINNER_CHAT: &str = "\
1/1/24, 9:00 - Alice: dinner tonight?
1/1/24, 9:01 - Bob: maybe
1/1/24, 9:02 - Alice: let me know
1/1/24, 20:00 - Bob: dinner was great";

#[test]
fn test_filtered_report_analyses_whole_chat() {
    let dir = TempDir::new().unwrap();
    let messages = parse_chat(DINNER_CHAT).messages;
    let filter = MessageFilter::new().with_query("dinner");

    let (summary, files) =
        write_filtered_report(&messages, &filter, OutputFormat::Json, dir.path(), "run").unwrap();

    let full = analyze(&messages);
    assert_eq!(summary, full);
    let delays: Vec<_> = summary.samples.iter().map(|s| s.delay_seconds).collect();
    assert_eq!(delays, vec![60, 60, 39_480]);

    // Pairing the two matches directly would invent a 9:00 to 20:00 reply
    let narrowed: Vec<Message> = filter.apply(&messages).into_iter().cloned().collect();
    assert_eq!(analyze(&narrowed).samples[0].delay_seconds, 39_600);

    let exported: Vec<Message> = serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    let ids: Vec<_> = exported.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![0, 3]);

    let written = fs::read_to_string(&files[1]).unwrap();
    assert_eq!(written, analysis_to_json(&full).unwrap());

    let hourly = fs::read_to_string(&files[2]).unwrap();
    let lines: Vec<&str> = hourly.lines().collect();
    assert_eq!(lines[10], "9:00,60,2");
    assert_eq!(lines[21], "20:00,39480,1");
}
