//! Reply-latency analytics
//!
//! Assumes messages arrive in chronological order, as produced by the
//! parser. A reply is any message whose sender differs from the message
//! directly before it; gaps of a day or more are conversation breaks.

use chrono::Timelike;
use tracing::debug;

use crate::models::{AnalysisSummary, HourlyDelay, Message, ReplyDelaySample};

/// Replies must arrive strictly within this many seconds to count
pub const MAX_REPLY_GAP_SECS: i64 = 86_400;

/// Compute reply delays, their average and the responsiveness score
#[must_use]
pub fn analyze(messages: &[Message]) -> AnalysisSummary {
    let empty = AnalysisSummary {
        total_message_count: messages.len(),
        ..AnalysisSummary::default()
    };

    if messages.len() < 2 {
        return empty;
    }

    let samples = reply_delays(messages);
    if samples.is_empty() {
        debug!(messages = messages.len(), "No qualifying reply delays");
        return empty;
    }

    let total: i64 = samples.iter().map(|s| s.delay_seconds).sum();
    let average_delay_seconds = total as f64 / samples.len() as f64;

    AnalysisSummary {
        responsiveness_score: responsiveness_score(average_delay_seconds),
        average_delay_seconds,
        total_message_count: messages.len(),
        samples,
    }
}

/// Delays between each sender change, excluding non-positive and day-long gaps
#[must_use]
pub fn reply_delays(messages: &[Message]) -> Vec<ReplyDelaySample> {
    messages
        .windows(2)
        .filter(|pair| pair[0].sender != pair[1].sender)
        .filter_map(|pair| {
            let delay_seconds = (pair[1].occurred_at - pair[0].occurred_at).num_seconds();
            (delay_seconds > 0 && delay_seconds < MAX_REPLY_GAP_SECS).then_some(ReplyDelaySample {
                delay_seconds,
                occurred_at: pair[1].occurred_at,
            })
        })
        .collect()
}

/// Map an average delay in seconds onto a 0 to 100 score
///
/// `100 * (1 - ln(m + 1) / ln(60))` with `m` the delay in minutes, floored
/// at one minute. The result is clamped at 0 and rounded.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn responsiveness_score(average_delay_seconds: f64) -> u8 {
    let minutes = (average_delay_seconds / 60.0).max(1.0);
    let score = 100.0 * (1.0 - (minutes + 1.0).ln() / 60_f64.ln());
    score.max(0.0).round() as u8
}

/// Mean reply delay per local hour of the replying message, hours 0 to 23
#[must_use]
pub fn hourly_histogram(samples: &[ReplyDelaySample]) -> Vec<HourlyDelay> {
    let mut totals = [(0_i64, 0_usize); 24];
    for sample in samples {
        let bucket = &mut totals[sample.occurred_at.hour() as usize];
        bucket.0 += sample.delay_seconds;
        bucket.1 += 1;
    }

    (0_u32..)
        .zip(totals)
        .map(|(hour, (total, count))| HourlyDelay {
            hour,
            average_delay_seconds: if count == 0 {
                0.0
            } else {
                total as f64 / count as f64
            },
            sample_count: count,
        })
        .collect()
}

/// Render a delay as `45s` or `5m 3s`
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_delay(seconds: f64) -> String {
    let total = seconds.round() as u64;
    if total < 60 {
        return format!("{total}s");
    }
    format!("{}m {}s", total / 60, total % 60)
}
