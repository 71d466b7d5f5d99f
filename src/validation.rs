use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use unicode_normalization::UnicodeNormalization;

use crate::error::{MinerError, Result};
use crate::models::DateRange;

/// Longest accepted search query, in characters
pub const MAX_QUERY_CHARS: usize = 1000;

/// Validation utilities for user-supplied input
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Reject blank, oversized or control-character queries before they reach the engine
    pub fn validate_search_query(query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(MinerError::InvalidQuery(
                "Search query cannot be empty".to_string(),
            ));
        }

        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(MinerError::InvalidQuery(format!(
                "Search query too long (max {MAX_QUERY_CHARS} characters)"
            )));
        }

        if query.contains('\0') {
            return Err(MinerError::InvalidQuery(
                "Search query contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate a conversation identifier
    pub fn validate_conversation_id(id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(MinerError::InvalidQuery(
                "Conversation id cannot be empty".to_string(),
            ));
        }

        if id.len() > 128 {
            return Err(MinerError::InvalidQuery(
                "Conversation id too long (max 128 characters)".to_string(),
            ));
        }

        if id.chars().any(char::is_control) {
            return Err(MinerError::InvalidQuery(
                "Conversation id contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate a result limit
    pub fn validate_limit(limit: usize) -> Result<()> {
        if limit == 0 {
            return Err(MinerError::InvalidQuery(
                "Limit must be greater than 0".to_string(),
            ));
        }

        if limit > 10_000 {
            return Err(MinerError::InvalidQuery(
                "Limit too large (max 10,000)".to_string(),
            ));
        }

        Ok(())
    }

    /// Build a date range, rejecting a start after the end
    pub fn validate_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<DateRange> {
        if start > end {
            return Err(MinerError::InvalidQuery(
                "Start date cannot be after end date".to_string(),
            ));
        }

        let days = (end - start).num_days();
        if days > 365 * 5 {
            tracing::warn!(days, "Large date range requested");
        }

        Ok(DateRange { start, end })
    }

    /// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC)
    pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
        let input = input.trim();
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
            return Ok(timestamp.with_timezone(&Utc));
        }

        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| {
                MinerError::InvalidQuery(format!(
                    "Invalid date: {input}. Expected YYYY-MM-DD or RFC 3339"
                ))
            })
    }

    /// Validate an import file path
    pub fn validate_import_path(path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(MinerError::Import("File path cannot be empty".to_string()));
        }

        if !path.is_file() {
            return Err(MinerError::Import(format!(
                "Import file does not exist: {}",
                path.display()
            )));
        }

        Ok(())
    }

    /// Clean imported message text: NFC-normalize, drop control characters
    /// other than line breaks and tabs, and trim
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.nfc()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
            .trim()
            .to_string()
    }
}
