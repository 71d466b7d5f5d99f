//! Input validation used by the command line

use chrono::{TimeZone, Utc};
use ideas_miner::validation::{InputValidator, MAX_QUERY_CHARS};
use ideas_miner::MinerError;

#[test]
fn test_validate_search_query_valid() {
    assert!(InputValidator::validate_search_query("budget planning").is_ok());
}

#[test]
fn test_validate_search_query_blank() {
    for query in ["", "   ", "\t\n"] {
        assert!(matches!(
            InputValidator::validate_search_query(query),
            Err(MinerError::InvalidQuery(_))
        ));
    }
}

#[test]
fn test_validate_search_query_length() {
    let at_limit = "a".repeat(MAX_QUERY_CHARS);
    assert!(InputValidator::validate_search_query(&at_limit).is_ok());

    let too_long = "a".repeat(MAX_QUERY_CHARS + 1);
    assert!(InputValidator::validate_search_query(&too_long).is_err());
}

#[test]
fn test_validate_search_query_null_byte() {
    assert!(InputValidator::validate_search_query("bud\0get").is_err());
}

#[test]
fn test_validate_conversation_id() {
    assert!(InputValidator::validate_conversation_id("6f1c2e9a-1d2b-4c3d-9e8f-001122334455").is_ok());
    assert!(InputValidator::validate_conversation_id("").is_err());
    assert!(InputValidator::validate_conversation_id("abc\ndef").is_err());
    assert!(InputValidator::validate_conversation_id(&"x".repeat(129)).is_err());
}

#[test]
fn test_validate_limit() {
    assert!(InputValidator::validate_limit(1).is_ok());
    assert!(InputValidator::validate_limit(10_000).is_ok());
    assert!(InputValidator::validate_limit(0).is_err());
    assert!(InputValidator::validate_limit(10_001).is_err());
}

#[test]
fn test_validate_date_range() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

    let range = InputValidator::validate_date_range(start, end).expect("Valid range rejected");
    assert_eq!(range.start, start);
    assert_eq!(range.end, end);
    assert!(InputValidator::validate_date_range(start, start).is_ok());
    assert!(InputValidator::validate_date_range(end, start).is_err());
}

#[test]
fn test_parse_date_formats() {
    let day = InputValidator::parse_date("2024-03-15").expect("Date rejected");
    assert_eq!(day, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());

    let instant = InputValidator::parse_date("2024-03-15T10:30:00+02:00").expect("Timestamp rejected");
    assert_eq!(instant, Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 0).unwrap());

    assert!(InputValidator::parse_date("15/03/2024").is_err());
    assert!(InputValidator::parse_date("2024-02-30").is_err());
}

#[test]
fn test_validate_import_path() {
    let file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    assert!(InputValidator::validate_import_path(file.path()).is_ok());
    assert!(InputValidator::validate_import_path(std::path::Path::new("/no/such/export.json")).is_err());
}

#[test]
fn test_sanitize_text() {
    assert_eq!(InputValidator::sanitize_text("  hello\u{0007} world \n"), "hello world");
    assert_eq!(InputValidator::sanitize_text("line one\nline two"), "line one\nline two");
    assert_eq!(InputValidator::sanitize_text("cafe\u{301}"), "caf\u{e9}");
}
