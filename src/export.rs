//! File writing utilities for parsed chats and analytics.
//!
//! Messages can be written as TXT, CSV, or JSON. Analytics are written as a
//! JSON summary plus a CSV hourly histogram, grouped under a timestamped
//! directory by [`write_report`].

use crate::analysis::{analyze, format_delay};
use crate::error::Result;
use crate::filter::MessageFilter;
use crate::models::{AnalysisSummary, HourlyDelay, Message, OutputFormat};
use csv::Writer;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// JSON shape of an analytics report
#[derive(Debug, Serialize)]
struct AnalysisReport<'a> {
    total_message_count: usize,
    reply_count: usize,
    average_delay_seconds: f64,
    average_delay: String,
    responsiveness_score: u8,
    hourly: &'a [HourlyDelay],
}

/// Write messages and analytics into `output_dir/timestamp/`.
///
/// Creates `messages.<ext>`, `analysis.json` and `hourly.csv`.
///
/// # Returns
///
/// Paths of the created files, message file first
pub fn write_report(
    messages: &[Message],
    summary: &AnalysisSummary,
    format: OutputFormat,
    output_dir: &Path,
    timestamp: &str,
) -> Result<Vec<PathBuf>> {
    let report_dir = output_dir.join(timestamp);
    create_dir_all(&report_dir)?;

    let messages_path = report_dir.join(format!("messages.{}", format.extension()));
    write_messages(messages, format, &messages_path)?;

    let analysis_path = report_dir.join("analysis.json");
    write_analysis_json(summary, &analysis_path)?;

    let hourly_path = report_dir.join("hourly.csv");
    write_histogram_csv(&summary.hourly_histogram(), &hourly_path)?;

    Ok(vec![messages_path, analysis_path, hourly_path])
}

/// Write the messages matching `filter`, with analytics over the whole chat.
///
/// Reply delays only make sense between adjacent messages of the full
/// conversation, so the filter narrows the message file but never the
/// analysis.
pub fn write_filtered_report(
    messages: &[Message],
    filter: &MessageFilter,
    format: OutputFormat,
    output_dir: &Path,
    timestamp: &str,
) -> Result<(AnalysisSummary, Vec<PathBuf>)> {
    let summary = analyze(messages);
    let selected: Vec<Message> = filter.apply(messages).into_iter().cloned().collect();
    let files = write_report(&selected, &summary, format, output_dir, timestamp)?;
    Ok((summary, files))
}

/// Write messages to a file in the specified format.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn write_messages(messages: &[Message], format: OutputFormat, file_path: &Path) -> Result<()> {
    match format {
        OutputFormat::Txt => write_txt_file(messages, file_path),
        OutputFormat::Csv => write_csv_file(messages, file_path),
        OutputFormat::Json => write_json_file(messages, file_path),
    }
}

/// Format: `[timestamp] sender: text` with a blank line between messages
fn write_txt_file(messages: &[Message], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = BufWriter::new(file);

    for message in messages {
        writeln!(
            writer,
            "[{}] {}: {}",
            message.timestamp_raw, message.sender, message.text
        )?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Includes header row: `ID, Sender, Timestamp, Sentiment, Message`
fn write_csv_file(messages: &[Message], file_path: &Path) -> Result<()> {
    let mut writer = Writer::from_path(file_path)?;

    writer.write_record(["ID", "Sender", "Timestamp", "Sentiment", "Message"])?;

    for message in messages {
        writer.write_record([
            message.id.to_string().as_str(),
            message.sender.as_str(),
            message.timestamp_raw.as_str(),
            message.sentiment.map_or("", |s| s.as_str()),
            message.text.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Outputs a JSON array of message objects.
fn write_json_file(messages: &[Message], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, messages)?;
    Ok(())
}

/// Render the summary and hourly breakdown as pretty JSON
pub fn analysis_to_json(summary: &AnalysisSummary) -> Result<String> {
    let hourly = summary.hourly_histogram();
    let report = AnalysisReport {
        total_message_count: summary.total_message_count,
        reply_count: summary.samples.len(),
        average_delay_seconds: summary.average_delay_seconds,
        average_delay: format_delay(summary.average_delay_seconds),
        responsiveness_score: summary.responsiveness_score,
        hourly: &hourly,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Write the summary and hourly breakdown as pretty JSON
pub fn write_analysis_json(summary: &AnalysisSummary, file_path: &Path) -> Result<()> {
    std::fs::write(file_path, analysis_to_json(summary)?)?;
    Ok(())
}

/// Includes header row: `Hour, Average Reply Seconds, Samples`
pub fn write_histogram_csv(hourly: &[HourlyDelay], file_path: &Path) -> Result<()> {
    let mut writer = Writer::from_path(file_path)?;
    writer.write_record(["Hour", "Average Reply Seconds", "Samples"])?;

    for bucket in hourly {
        writer.write_record([
            format!("{}:00", bucket.hour),
            format!("{:.0}", bucket.average_delay_seconds),
            bucket.sample_count.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
