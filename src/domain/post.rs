use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Statuses and accounts are passed through as raw JSON; only the keys the
/// renderer needs are ever looked at.
pub type Post = Value;

static FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2}:\d{2}:\d{2})\.\d+").expect("valid fraction regex"));

/// A non-empty string field, or `None`.
pub fn text<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Any language tag starting with `en`, and a missing tag, count as `en`.
pub fn normalize_language(tag: Option<&str>) -> &str {
    match tag {
        Some(tag) if !tag.starts_with("en") => tag,
        _ => "en",
    }
}

/// `2024-03-01T12:30:05.123Z` → `2024-03-01 12:30:05Z`
pub fn format_timestamp(raw: &str) -> String {
    FRACTION.replace(raw, "$1").replacen('T', " ", 1)
}
