use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use chat_memory_rust::analysis::{analyze, format_delay};
use chat_memory_rust::config::AppConfig;
use chat_memory_rust::export;
use chat_memory_rust::filter::MessageFilter;
use chat_memory_rust::logging::{init_logging, OperationTimer};
use chat_memory_rust::metrics::MetricsCollector;
use chat_memory_rust::models::{AnalysisSummary, Message, OutputFormat, ParsedChat, Sentiment};
use chat_memory_rust::parser::ChatParser;
use chat_memory_rust::sentiment::{tag_messages, LexiconClassifier};
use chat_memory_rust::validation::InputValidator;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file layered over the defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write JSON logs to this file as well
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a chat export and list or export its messages
    Parse {
        /// Path to the exported chat text file
        file: PathBuf,

        /// Only messages containing this text (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Only messages from this sender
        #[arg(long)]
        sender: Option<String>,

        /// Output format (txt, csv or json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write the messages and analytics to this directory
        #[arg(short, long)]
        output_dir: Option<String>,
    },
    /// Print reply-latency analytics for a chat export
    Analyze {
        /// Path to the exported chat text file
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Tag every message with a sentiment label
    Sentiment {
        /// Path to the exported chat text file
        file: PathBuf,

        /// Messages classified concurrently per batch
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Only keep messages with this label (happy, sad, angry, neutral)
        #[arg(long)]
        filter: Option<String>,

        /// Output format (txt, csv or json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write the tagged messages and analytics to this directory
        #[arg(short, long)]
        output_dir: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.config.as_deref())?;

    let log_level = cli.log_level.clone().unwrap_or_else(|| config.get_log_level());
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.logging.file_path.as_ref().map(PathBuf::from));
    let _log_guard = init_logging(
        Some(log_level.as_str()),
        log_file.as_deref(),
        config.logging.format == "json",
    )?;

    if let Err(e) = MetricsCollector::init() {
        debug!("Metrics recorder not installed: {}", e);
    }
    let metrics = MetricsCollector::default();

    let result = match &cli.command {
        Commands::Parse {
            file,
            search,
            sender,
            format,
            output_dir,
        } => parse_command(
            &config,
            &metrics,
            file,
            search.as_deref(),
            sender.as_deref(),
            format.as_deref(),
            output_dir.as_deref(),
        ),
        Commands::Analyze { file, json } => analyze_command(&config, &metrics, file, *json),
        Commands::Sentiment {
            file,
            batch_size,
            filter,
            format,
            output_dir,
        } => {
            sentiment_command(
                &config,
                &metrics,
                file,
                *batch_size,
                filter.as_deref(),
                format.as_deref(),
                output_dir.as_deref(),
            )
            .await
        },
    };

    if result.is_err() {
        metrics.record_error("command", "main");
    }
    result
}

/// Read, parse and validate a chat export
fn load_chat(config: &AppConfig, metrics: &MetricsCollector, file: &Path) -> Result<ParsedChat> {
    InputValidator::validate_chat_file(file, config.input.max_file_size_mb)?;

    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let text = String::from_utf8_lossy(&bytes);

    let parser = ChatParser::new(&config.parser).context("Invalid parser configuration")?;

    let timer = OperationTimer::new("parse");
    let chat = parser.parse(&text);
    let duration = timer.finish();
    metrics.record_parse(chat.messages.len(), chat.warnings.len(), duration);

    for warning in &chat.warnings {
        warn!(
            line = warning.line_number,
            timestamp = %warning.timestamp_raw,
            kind = ?warning.kind,
            "Parse warning"
        );
    }

    InputValidator::validate_parsed_chat(&chat)?;
    info!(
        "Parsed {} messages from {} senders",
        chat.messages.len(),
        chat.senders.len()
    );
    Ok(chat)
}

fn run_analysis(metrics: &MetricsCollector, messages: &[Message]) -> AnalysisSummary {
    let timer = OperationTimer::new("analyze");
    let summary = analyze(messages);
    let duration = timer.finish();
    metrics.record_analysis(summary.samples.len(), summary.responsiveness_score, duration);
    summary
}

fn resolve_format(config: &AppConfig, format: Option<&str>) -> OutputFormat {
    let requested = format.unwrap_or(&config.export.default_format);
    requested.parse().unwrap_or_else(|_| {
        warn!("Invalid format: {}. Using txt as default.", requested);
        OutputFormat::Txt
    })
}

/// Export the messages selected by `filter` plus analytics over all of `messages`
fn export_report(
    config: &AppConfig,
    metrics: &MetricsCollector,
    messages: &[Message],
    filter: &MessageFilter,
    format: OutputFormat,
    output_dir: &str,
) -> Result<()> {
    let effective_output_dir: &str = if output_dir.is_empty() {
        &config.export.output_directory
    } else {
        output_dir
    };

    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let timer = OperationTimer::new("report");
    let (summary, files) = export::write_filtered_report(
        messages,
        filter,
        format,
        Path::new(effective_output_dir),
        &stamp,
    )?;
    let duration = timer.finish();
    metrics.record_analysis(summary.samples.len(), summary.responsiveness_score, duration);
    metrics.record_export(format.extension(), files.len());

    for file in &files {
        info!("Wrote {}", file.display());
    }
    Ok(())
}

/// Parse a chat export, filter, and print or export the messages
fn parse_command(
    config: &AppConfig,
    metrics: &MetricsCollector,
    file: &Path,
    search: Option<&str>,
    sender: Option<&str>,
    format: Option<&str>,
    output_dir: Option<&str>,
) -> Result<()> {
    let chat = load_chat(config, metrics, file)?;

    let mut filter = MessageFilter::new();
    if let Some(query) = search {
        InputValidator::validate_search_query(query)?;
        filter = filter.with_query(&InputValidator::sanitize_text(query));
    }
    if let Some(name) = sender {
        filter = filter.with_sender(name);
    }

    let selected = filter.apply(&chat.messages);
    info!("{} of {} messages match", selected.len(), chat.messages.len());

    let mut out = io::stdout().lock();
    for sender in &chat.senders {
        let role = if sender.is_user { "you" } else { "participant" };
        writeln!(out, "{} ({role})", sender.name)?;
    }
    writeln!(out)?;
    for message in &selected {
        writeln!(out, "[{}] {}: {}", message.timestamp_raw, message.sender, message.text)?;
    }

    if let Some(dir) = output_dir {
        export_report(config, metrics, &chat.messages, &filter, resolve_format(config, format), dir)?;
    }

    Ok(())
}

/// Print reply-latency analytics
fn analyze_command(config: &AppConfig, metrics: &MetricsCollector, file: &Path, json: bool) -> Result<()> {
    let chat = load_chat(config, metrics, file)?;
    let summary = run_analysis(metrics, &chat.messages);

    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", export::analysis_to_json(&summary)?)?;
        return Ok(());
    }

    if let Some(other) = chat.other_participant() {
        writeln!(out, "Conversation with {}", other.name)?;
    }
    writeln!(out, "Total messages:        {}", summary.total_message_count)?;
    writeln!(out, "Replies measured:      {}", summary.samples.len())?;
    writeln!(
        out,
        "Average reply time:    {}",
        format_delay(summary.average_delay_seconds)
    )?;
    writeln!(out, "Responsiveness score:  {}/100", summary.responsiveness_score)?;
    writeln!(out)?;
    writeln!(out, "Hour  Avg reply  Replies")?;
    for bucket in summary.hourly_histogram() {
        writeln!(
            out,
            "{:>2}:00 {:>9} {:>8}",
            bucket.hour,
            format_delay(bucket.average_delay_seconds),
            bucket.sample_count
        )?;
    }

    Ok(())
}

/// Tag messages with sentiment and print label counts
async fn sentiment_command(
    config: &AppConfig,
    metrics: &MetricsCollector,
    file: &Path,
    batch_size: Option<usize>,
    label_filter: Option<&str>,
    format: Option<&str>,
    output_dir: Option<&str>,
) -> Result<()> {
    if !config.sentiment.enabled {
        warn!("Sentiment tagging is disabled in configuration");
        return Ok(());
    }

    // Use configuration batch size if not provided
    let effective_batch_size = batch_size.unwrap_or(config.sentiment.batch_size);
    InputValidator::validate_batch_size(effective_batch_size)?;

    let wanted = label_filter
        .map(str::parse::<Sentiment>)
        .transpose()
        .context("Invalid sentiment filter")?;

    let chat = load_chat(config, metrics, file)?;
    let classifier = Arc::new(LexiconClassifier::new()?);

    let timer = OperationTimer::new("sentiment");
    let tagged = tag_messages(chat.messages, classifier, effective_batch_size).await;
    metrics.record_sentiment(effective_batch_size, timer.finish());

    let mut out = io::stdout().lock();
    for label in Sentiment::ALL {
        let count = tagged.iter().filter(|m| m.sentiment == Some(label)).count();
        metrics.record_sentiment_label(label.as_str(), count);
        writeln!(out, "{:<8} {count}", label.as_str())?;
    }

    let mut filter = MessageFilter::new();
    if let Some(label) = wanted {
        filter = filter.with_sentiment(label);
        writeln!(out)?;
        for message in filter.apply(&tagged) {
            writeln!(out, "[{}] {}: {}", message.timestamp_raw, message.sender, message.text)?;
        }
    }

    if let Some(dir) = output_dir {
        export_report(config, metrics, &tagged, &filter, resolve_format(config, format), dir)?;
    }

    Ok(())
}
