//! `Link` response header parsing for cursor pagination.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::app::{FedicatError, Result};

static ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^<([^>]*)>; rel="([^"]*)"(?:(, )|$)"#).expect("valid link entry regex")
});

/// Relation name to target URL.
pub type LinkMap = HashMap<String, String>;

/// Parse a header of the form `<url>; rel="next", <url>; rel="prev"`.
///
/// Anything that does not fit the grammar fails the whole header.
pub fn parse(header: &str) -> Result<LinkMap> {
    let mut links = LinkMap::new();
    let mut cursor = 0;

    while cursor < header.len() {
        let rest = &header[cursor..];
        let caps = ENTRY
            .captures(rest)
            .ok_or_else(|| FedicatError::MalformedLinkHeader(rest.to_string()))?;
        links.insert(caps[2].to_string(), caps[1].to_string());
        cursor += caps[0].len();
        if caps.get(3).is_some() && cursor == header.len() {
            return Err(FedicatError::MalformedLinkHeader(header.to_string()));
        }
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_entry() {
        let links = parse(r#"<https://a/x?limit=1>; rel="next""#).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links["next"], "https://a/x?limit=1");
    }

    #[test]
    fn test_multiple_entries() {
        let header = concat!(
            r#"<https://m.test/api/v1/accounts/1/statuses?limit=40&max_id=10>; rel="next", "#,
            r#"<https://m.test/api/v1/accounts/1/statuses?limit=40&min_id=20>; rel="prev""#
        );
        let links = parse(header).unwrap();
        assert_eq!(
            links["next"],
            "https://m.test/api/v1/accounts/1/statuses?limit=40&max_id=10"
        );
        assert_eq!(
            links["prev"],
            "https://m.test/api/v1/accounts/1/statuses?limit=40&min_id=20"
        );
    }

    #[test]
    fn test_empty_header() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_missing_closing_quote() {
        let err = parse(r#"<https://a/x>; rel="next"#).unwrap_err();
        assert!(matches!(err, FedicatError::MalformedLinkHeader(_)));
    }

    #[test]
    fn test_garbage_after_valid_entry() {
        let err = parse(r#"<https://a/x>; rel="next"; title="x""#).unwrap_err();
        assert!(matches!(err, FedicatError::MalformedLinkHeader(ref rest) if rest.contains("title")));
    }

    #[test]
    fn test_trailing_separator() {
        assert!(parse(r#"<https://a/x>; rel="next", "#).is_err());
    }
}
