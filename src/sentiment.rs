//! Sentiment tagging
//!
//! The classifier is an external collaborator: text in, label out. Parsing
//! and analysis never wait on it; labels are attached afterwards by
//! rebuilding each message.

use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use whatlang::{detect_script, Script};

use crate::error::{ChatMemoryError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{Message, Sentiment};

/// Classifies a single message's text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Return a raw label such as `happy` or `Angry`
    async fn classify(&self, text: &str) -> Result<String>;
}

const POSITIVE_WORDS: &[(&str, f32)] = &[
    ("good", 1.0),
    ("great", 1.5),
    ("excellent", 2.0),
    ("amazing", 2.0),
    ("wonderful", 1.8),
    ("fantastic", 1.8),
    ("happy", 1.2),
    ("joy", 1.5),
    ("love", 2.0),
    ("like", 1.0),
    ("best", 1.5),
    ("better", 1.2),
    ("awesome", 1.8),
    ("perfect", 2.0),
    ("brilliant", 1.8),
    ("delightful", 1.5),
    ("pleased", 1.2),
    ("excited", 1.5),
    ("thrilled", 1.8),
    ("grateful", 1.5),
    ("thanks", 1.0),
    ("congrats", 1.5),
    ("lucky", 1.0),
    ("haha", 1.0),
    ("lol", 0.8),
    ("yay", 1.5),
];

const SAD_WORDS: &[(&str, f32)] = &[
    ("sad", -1.2),
    ("sorry", -0.8),
    ("miss", -1.0),
    ("lonely", -1.5),
    ("disappointing", -1.5),
    ("disappointed", -1.5),
    ("upset", -1.2),
    ("worried", -1.2),
    ("anxious", -1.2),
    ("scared", -1.5),
    ("afraid", -1.2),
    ("depressed", -1.8),
    ("miserable", -1.8),
    ("hopeless", -1.8),
    ("devastated", -2.0),
    ("cry", -1.5),
    ("crying", -1.5),
    ("tired", -0.8),
    ("bad", -1.0),
    ("poor", -1.2),
];

const ANGRY_WORDS: &[(&str, f32)] = &[
    ("angry", -1.5),
    ("hate", -2.0),
    ("furious", -2.0),
    ("annoyed", -1.2),
    ("annoying", -1.2),
    ("irritated", -1.2),
    ("frustrated", -1.5),
    ("disgusted", -1.8),
    ("disgusting", -1.8),
    ("terrible", -2.0),
    ("awful", -2.0),
    ("horrible", -2.0),
    ("worst", -2.0),
    ("pathetic", -1.5),
    ("useless", -1.5),
    ("ridiculous", -1.5),
    ("stupid", -1.8),
    ("shut", -1.0),
];

const INTENSIFIERS: &[(&str, f32)] = &[
    ("very", 1.5),
    ("extremely", 2.0),
    ("incredibly", 2.0),
    ("absolutely", 2.0),
    ("completely", 1.8),
    ("totally", 1.8),
    ("really", 1.3),
    ("so", 1.2),
    ("quite", 1.2),
    ("somewhat", 0.8),
    ("slightly", 0.7),
    ("barely", 0.5),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "nobody", "neither", "nor", "dont", "cant", "isnt",
    "wasnt",
];

/// Net score beyond which a message is considered positive or negative
const LABEL_THRESHOLD: f32 = 0.2;

/// Offline word-list classifier
pub struct LexiconClassifier {
    url_regex: Regex,
    special_chars_regex: Regex,
    extra_spaces_regex: Regex,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct LexiconScore {
    positive: f32,
    sad: f32,
    angry: f32,
    hits: usize,
}

impl LexiconClassifier {
    /// Create a classifier with compiled cleaning patterns
    pub fn new() -> Result<Self> {
        Ok(Self {
            url_regex: Regex::new(r"https?://\S+|www\.\S+")?,
            special_chars_regex: Regex::new(r"[^\w\s]")?,
            extra_spaces_regex: Regex::new(r"\s+")?,
        })
    }

    /// Normalize, strip URLs and punctuation, collapse whitespace, lower-case
    #[must_use]
    pub fn clean_text(&self, text: &str) -> String {
        let normalized = text.nfc().collect::<String>();
        let no_urls = self.url_regex.replace_all(&normalized, " ");
        // Apostrophes are dropped so "don't" becomes the negation "dont"
        let no_apostrophes = no_urls.replace(['\'', '\u{2019}'], "");
        let no_special = self.special_chars_regex.replace_all(&no_apostrophes, " ");
        let collapsed = self.extra_spaces_regex.replace_all(&no_special, " ");
        collapsed.trim().to_lowercase()
    }

    /// Classify text without going through the async trait
    #[must_use]
    pub fn label(&self, text: &str) -> Sentiment {
        let cleaned = self.clean_text(text);
        if cleaned.is_empty() {
            return Sentiment::Neutral;
        }

        // The word lists are English only
        if let Some(script) = detect_script(&cleaned) {
            if script != Script::Latin {
                debug!(?script, "Skipping non-Latin text");
                return Sentiment::Neutral;
            }
        }

        let score = score_words(&cleaned);
        if score.hits == 0 {
            return Sentiment::Neutral;
        }

        let hits = score.hits as f32;
        let net = (score.positive + score.sad + score.angry) / hits;
        if net > LABEL_THRESHOLD {
            Sentiment::Happy
        } else if net < -LABEL_THRESHOLD {
            if score.angry <= score.sad {
                Sentiment::Angry
            } else {
                Sentiment::Sad
            }
        } else {
            Sentiment::Neutral
        }
    }
}

fn lookup(words: &[(&str, f32)], word: &str) -> Option<f32> {
    words.iter().find(|(w, _)| *w == word).map(|(_, weight)| *weight)
}

fn score_words(cleaned: &str) -> LexiconScore {
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let mut score = LexiconScore::default();

    for (i, word) in words.iter().enumerate() {
        let (weight, bucket) = if let Some(w) = lookup(POSITIVE_WORDS, word) {
            (w, 0)
        } else if let Some(w) = lookup(ANGRY_WORDS, word) {
            (w, 2)
        } else if let Some(w) = lookup(SAD_WORDS, word) {
            (w, 1)
        } else {
            continue;
        };

        let mut sentiment = weight;
        if let Some(intensity) = i.checked_sub(1).and_then(|p| lookup(INTENSIFIERS, words[p])) {
            sentiment *= intensity;
        }

        let negated = (1..=2)
            .filter_map(|back| i.checked_sub(back))
            .any(|p| NEGATIONS.contains(&words[p]));

        score.hits += 1;
        if negated {
            // "not happy" reads as sad, "not bad" reads as mildly positive
            let flipped = -sentiment * 0.8;
            if flipped < 0.0 {
                score.sad += flipped;
            } else {
                score.positive += flipped;
            }
            continue;
        }

        match bucket {
            0 => score.positive += sentiment,
            1 => score.sad += sentiment,
            _ => score.angry += sentiment,
        }
    }

    score
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<String> {
        Ok(self.label(text).to_string())
    }
}

/// Attach sentiment labels to every message
///
/// Each batch is classified concurrently and awaited together. Failed
/// calls, panicked tasks and unknown labels all fall back to neutral, so
/// the output always has one labelled message per input, in input order.
pub async fn tag_messages(
    messages: Vec<Message>,
    classifier: Arc<dyn SentimentClassifier>,
    batch_size: usize,
) -> Vec<Message> {
    let mut labels = vec![Sentiment::Neutral; messages.len()];
    let batch_size = batch_size.max(1);
    let metrics = MetricsCollector::default();

    for (batch_index, batch) in messages.chunks(batch_size).enumerate() {
        let offset = batch_index * batch_size;
        let mut tasks = JoinSet::new();

        for (i, message) in batch.iter().enumerate() {
            let classifier = Arc::clone(&classifier);
            let text = message.text.clone();
            tasks.spawn(async move { (offset + i, classifier.classify(&text).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(label))) => {
                    labels[index] = label.parse().unwrap_or_else(|e: ChatMemoryError| {
                        warn!(index, error = %e, "Classifier returned unknown label");
                        metrics.record_sentiment_failure("unknown_label");
                        Sentiment::Neutral
                    });
                }
                Ok((index, Err(e))) => {
                    warn!(index, error = %e, "Sentiment classification failed");
                    metrics.record_sentiment_failure("classifier_error");
                }
                Err(e) => {
                    warn!(error = %e, "Sentiment task did not complete");
                    metrics.record_sentiment_failure("task_failed");
                }
            }
        }
        debug!(batch = batch_index, size = batch.len(), "Tagged sentiment batch");
    }

    messages
        .into_iter()
        .zip(labels)
        .map(|(message, label)| message.with_sentiment(label))
        .collect()
}
