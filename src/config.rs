use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::parser::{default_header_dialects, HeaderDialect, DEFAULT_MEDIA_PLACEHOLDERS};
use crate::timestamp::DateOrder;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub parser: ParserConfig,
    pub sentiment: SentimentConfig,
    pub input: InputConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

/// Header dialects and placeholder markers used by the chat parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    pub date_order: DateOrder,
    pub media_placeholders: Vec<String>,
    /// Tried in order, first match wins
    pub header_dialects: Vec<HeaderDialect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    pub enabled: bool,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub max_file_size_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub default_format: String,
    pub output_directory: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            date_order: DateOrder::DayFirst,
            media_placeholders: DEFAULT_MEDIA_PLACEHOLDERS
                .iter()
                .map(ToString::to_string)
                .collect(),
            header_dialects: default_header_dialects(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            parser: ParserConfig::default(),
            sentiment: SentimentConfig {
                enabled: true,
                batch_size: 50,
            },
            input: InputConfig {
                max_file_size_mb: 100,
            },
            export: ExportConfig {
                default_format: "txt".to_string(),
                output_directory: "./output".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_file: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = Config::builder()
            // Start with default values
            .add_source(defaults)
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("chat-memory").required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            // Add environment variables with prefix, e.g. CHAT_MEMORY__LOGGING__LEVEL
            .add_source(
                Environment::with_prefix("CHAT_MEMORY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        // Validate parser config
        if self.parser.header_dialects.is_empty() {
            return Err(anyhow::anyhow!("At least one header dialect is required"));
        }
        for dialect in &self.parser.header_dialects {
            if dialect.name.trim().is_empty() || dialect.pattern.trim().is_empty() {
                return Err(anyhow::anyhow!("Header dialects need a name and a pattern"));
            }
        }
        if self.parser.media_placeholders.iter().any(|p| p.trim().is_empty()) {
            return Err(anyhow::anyhow!("Media placeholders cannot be blank"));
        }

        // Validate sentiment config
        if self.sentiment.batch_size == 0 {
            return Err(anyhow::anyhow!("batch_size must be greater than 0"));
        }

        // Validate input config
        if self.input.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("max_file_size_mb must be greater than 0"));
        }

        // Validate export config
        let valid_formats = ["txt", "csv", "json"];
        if !valid_formats.contains(&self.export.default_format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid export format: {}. Must be one of: {:?}",
                self.export.default_format,
                valid_formats
            ));
        }

        Ok(())
    }

    /// Get log level from environment or config
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}
