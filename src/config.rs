use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{MinerError, Result};
use crate::search::{HighlightOptions, DEFAULT_CONTEXT_LENGTH, DEFAULT_SEARCH_LIMIT};
use crate::sentiment::SentimentLexicon;
use crate::summary::DEFAULT_SUMMARY_KEYWORDS;
use crate::topics::{DEFAULT_KEYWORD_LIMIT, DEFAULT_MAX_TOPICS};

/// Application configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Store location and pool size
    pub database: DatabaseConfig,
    /// Log level, format and optional file
    pub logging: LoggingConfig,
    /// Limits used by the analytics components
    pub analysis: AnalysisConfig,
    /// Sentiment word lists
    pub sentiment: SentimentLexicon,
}

/// SQLite store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite file
    pub path: String,
    /// Pool size
    pub max_connections: u32,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub level: String,
    /// Optional log file; its directory receives daily-rotated JSON logs
    pub file_path: Option<String>,
    /// `text` or `json` console output
    pub format: String,
}

/// Analytics limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Keywords extracted before topic ranking
    pub topic_keyword_limit: usize,
    /// Topics kept after ranking
    pub max_topics: usize,
    /// Keywords named in a summary
    pub summary_keyword_limit: usize,
    /// Topic names written back to the conversation
    pub stored_topic_count: usize,
    /// Default number of search results
    pub search_limit: usize,
    /// Characters of context around each highlight
    pub highlight_context: usize,
    /// Maximum highlights per search result
    pub max_highlights: usize,
    /// Idea captures must be longer than this
    pub min_idea_length: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/ideas.db".to_string(),
            max_connections: 4,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            format: "text".to_string(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            topic_keyword_limit: DEFAULT_KEYWORD_LIMIT,
            max_topics: DEFAULT_MAX_TOPICS,
            summary_keyword_limit: DEFAULT_SUMMARY_KEYWORDS,
            stored_topic_count: 5,
            search_limit: DEFAULT_SEARCH_LIMIT,
            highlight_context: DEFAULT_CONTEXT_LENGTH,
            max_highlights: 3,
            min_idea_length: 10,
        }
    }
}

impl AnalysisConfig {
    /// Highlight settings derived from this config
    #[must_use]
    pub fn highlight_options(&self) -> HighlightOptions {
        HighlightOptions {
            context_length: self.highlight_context,
            max_highlights: self.max_highlights,
            ..HighlightOptions::default()
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// defaults, `config/default`, `config/local`, `config`, then
    /// `IDEAS_MINER__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self> {
        Self::build(None)
    }

    /// Like [`AppConfig::load`] with an explicit file layered on top of the
    /// standard files and below the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::build(Some(path))
    }

    fn build(extra: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("config").required(false));

        if let Some(path) = extra {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("IDEAS_MINER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(MinerError::InvalidConfig(msg));

        if self.database.path.trim().is_empty() {
            return invalid("database.path must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return invalid("database.max_connections must be greater than 0".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level, valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return invalid(format!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format, valid_formats
            ));
        }

        let limits = [
            ("analysis.topic_keyword_limit", self.analysis.topic_keyword_limit),
            ("analysis.max_topics", self.analysis.max_topics),
            ("analysis.summary_keyword_limit", self.analysis.summary_keyword_limit),
            ("analysis.search_limit", self.analysis.search_limit),
            ("analysis.max_highlights", self.analysis.max_highlights),
        ];
        for (name, value) in limits {
            if value == 0 {
                return invalid(format!("{name} must be greater than 0"));
            }
        }

        if self.sentiment.positive.iter().all(|w| w.trim().is_empty()) {
            return invalid("sentiment.positive must contain at least one word".to_string());
        }
        if self.sentiment.negative.iter().all(|w| w.trim().is_empty()) {
            return invalid("sentiment.negative must contain at least one word".to_string());
        }

        Ok(())
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}
