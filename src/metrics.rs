use anyhow::Result;
use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Metric names recorded by the pipeline
pub struct MetricsCollector {
    // Parsing metrics
    pub parse_operations_total: &'static str,
    pub parse_duration: &'static str,
    pub messages_parsed_total: &'static str,
    pub parse_warnings_total: &'static str,

    // Analysis metrics
    pub reply_samples_total: &'static str,
    pub responsiveness_score: &'static str,
    pub analysis_duration: &'static str,

    // Sentiment metrics
    pub sentiment_batch_size: &'static str,
    pub sentiment_duration: &'static str,
    pub sentiment_labels_total: &'static str,
    pub sentiment_failures_total: &'static str,

    // Export metrics
    pub export_files_created_total: &'static str,

    // Error metrics
    pub errors_total: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            parse_operations_total: "chat_memory_parse_operations_total",
            parse_duration: "chat_memory_parse_duration_seconds",
            messages_parsed_total: "chat_memory_messages_parsed_total",
            parse_warnings_total: "chat_memory_parse_warnings_total",

            reply_samples_total: "chat_memory_reply_samples_total",
            responsiveness_score: "chat_memory_responsiveness_score",
            analysis_duration: "chat_memory_analysis_duration_seconds",

            sentiment_batch_size: "chat_memory_sentiment_batch_size",
            sentiment_duration: "chat_memory_sentiment_duration_seconds",
            sentiment_labels_total: "chat_memory_sentiment_labels_total",
            sentiment_failures_total: "chat_memory_sentiment_failures_total",

            export_files_created_total: "chat_memory_export_files_created_total",

            errors_total: "chat_memory_errors_total",
        }
    }
}

impl MetricsCollector {
    /// Install a no-op recorder so metric calls are cheap until a real one exists
    pub fn init() -> Result<()> {
        metrics::set_global_recorder(metrics::NoopRecorder)
            .map_err(|_| anyhow::anyhow!("Failed to initialize metrics recorder: already set"))?;

        Ok(())
    }

    /// Record a completed parse
    pub fn record_parse(&self, messages: usize, warnings: usize, duration: Duration) {
        counter!(self.parse_operations_total).increment(1);
        counter!(self.messages_parsed_total).increment(messages as u64);
        counter!(self.parse_warnings_total).increment(warnings as u64);
        histogram!(self.parse_duration).record(duration.as_secs_f64());
    }

    /// Record a completed reply-latency analysis
    pub fn record_analysis(&self, samples: usize, score: u8, duration: Duration) {
        counter!(self.reply_samples_total).increment(samples as u64);
        gauge!(self.responsiveness_score).set(f64::from(score));
        histogram!(self.analysis_duration).record(duration.as_secs_f64());
    }

    /// Record one sentiment tagging run
    pub fn record_sentiment(&self, batch_size: usize, duration: Duration) {
        gauge!(self.sentiment_batch_size).set(batch_size as f64);
        histogram!(self.sentiment_duration).record(duration.as_secs_f64());
    }

    /// Count messages per sentiment label
    pub fn record_sentiment_label(&self, label: &'static str, count: usize) {
        counter!(self.sentiment_labels_total, "label" => label).increment(count as u64);
    }

    /// Count a message whose classification fell back to neutral
    pub fn record_sentiment_failure(&self, reason: &'static str) {
        counter!(self.sentiment_failures_total, "reason" => reason).increment(1);
    }

    /// Record export metrics
    pub fn record_export(&self, format: &'static str, file_count: usize) {
        counter!(self.export_files_created_total, "format" => format).increment(file_count as u64);
    }

    /// Record error metrics
    pub fn record_error(&self, error_type: &'static str, operation: &'static str) {
        counter!(self.errors_total, "type" => error_type, "operation" => operation).increment(1);
    }
}
