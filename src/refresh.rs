//! Refresh-hint and charset scanning over response bodies.
//!
//! Detection is a two-step lookup with explicit precedence: the body's
//! meta tag wins, and the `Refresh` header is only consulted when the body
//! has no match.

use std::sync::LazyLock;

use regex::{Captures, Regex};

// Patterns mirror the tolerant grammar browsers accept for these hints
const META_CHARSET_PATTERN: &str = r#"(?i)<meta[^>]+charset *= *["']?([a-zA-Z0-9\-]+)"#;
const META_REFRESH_PATTERN: &str =
    r#"(?i)<meta[^>]+http-equiv="refresh" content="(\d*)\s*;?\s*url=(.*?)""#;
const HEADER_REFRESH_PATTERN: &str = r"(\d*);?url=(.*)";

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(META_CHARSET_PATTERN).expect("Failed to parse meta charset pattern - this is a bug")
});

static META_REFRESH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(META_REFRESH_PATTERN).expect("Failed to parse meta refresh pattern - this is a bug")
});

static HEADER_REFRESH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(HEADER_REFRESH_PATTERN)
        .expect("Failed to parse header refresh pattern - this is a bug")
});

/// A refresh instruction found in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RefreshTarget {
    /// Seconds before the refresh fires. `None` when unspecified or zero;
    /// such refreshes always redirect regardless of the configured maximum.
    pub interval: Option<u32>,
    /// The target, possibly relative.
    pub url: String,
}

/// The charset declared in the markup, if any (`<meta charset="utf-8">` or
/// the `content="...; charset=..."` form).
pub(crate) fn find_meta_charset(body: &str) -> Option<&str> {
    META_CHARSET
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Looks for a refresh hint: the body's meta tag first, then the `Refresh`
/// header with the same `interval;url=...` grammar.
pub(crate) fn find_refresh(body: &str, refresh_header: Option<&str>) -> Option<RefreshTarget> {
    if let Some(caps) = META_REFRESH.captures(body) {
        return Some(refresh_from_captures(&caps));
    }
    let header = refresh_header?;
    HEADER_REFRESH
        .captures(header)
        .map(|caps| refresh_from_captures(&caps))
}

fn refresh_from_captures(caps: &Captures<'_>) -> RefreshTarget {
    // an interval of 0 behaves like no interval at all
    let interval = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|&seconds| seconds != 0);
    RefreshTarget {
        interval,
        url: caps.get(2).map_or_else(String::new, |m| m.as_str().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_refresh_immediate() {
        let body = r#"<html><head><meta http-equiv="refresh" content="0;url=/next"></head></html>"#;
        let refresh = find_refresh(body, None).unwrap();
        assert_eq!(refresh.interval, None);
        assert_eq!(refresh.url, "/next");
    }

    #[test]
    fn test_meta_refresh_with_interval_and_space() {
        let body = r#"<meta http-equiv="refresh" content="5; url=http://example.com/">"#;
        let refresh = find_refresh(body, None).unwrap();
        assert_eq!(refresh.interval, Some(5));
        assert_eq!(refresh.url, "http://example.com/");
    }

    #[test]
    fn test_meta_refresh_case_insensitive() {
        let body = r#"<META HTTP-EQUIV="refresh" CONTENT="0;url=/x">"#;
        assert!(find_refresh(body, None).is_some());
    }

    #[test]
    fn test_meta_refresh_without_url_does_not_match() {
        // A bare reload hint carries no target; nothing to synthesize.
        let body = r#"<meta http-equiv="refresh" content="5">"#;
        assert!(find_refresh(body, None).is_none());
    }

    #[test]
    fn test_header_refresh_fallback() {
        let refresh = find_refresh("<html></html>", Some("3;url=/elsewhere")).unwrap();
        assert_eq!(refresh.interval, Some(3));
        assert_eq!(refresh.url, "/elsewhere");
    }

    #[test]
    fn test_header_without_interval() {
        let refresh = find_refresh("", Some("url=/elsewhere")).unwrap();
        assert_eq!(refresh.interval, None);
    }

    #[test]
    fn test_meta_tag_beats_refresh_header() {
        // Precedence is explicit: the header is only consulted when the
        // body has no match.
        let body = r#"<meta http-equiv="refresh" content="0;url=/from-body">"#;
        let refresh = find_refresh(body, Some("0;url=/from-header")).unwrap();
        assert_eq!(refresh.url, "/from-body");
    }

    #[test]
    fn test_no_match_anywhere() {
        assert!(find_refresh("<html><body>static</body></html>", None).is_none());
        assert!(find_refresh("", Some("not a refresh value")).is_none());
    }

    #[test]
    fn test_zero_interval_treated_as_unspecified() {
        let refresh = find_refresh("", Some("0;url=/x")).unwrap();
        assert_eq!(refresh.interval, None);
    }

    #[test]
    fn test_find_meta_charset_standalone_attribute() {
        let body = r#"<html><head><meta charset="utf-8"></head></html>"#;
        assert_eq!(find_meta_charset(body), Some("utf-8"));
    }

    #[test]
    fn test_find_meta_charset_in_content_attribute() {
        let body =
            r#"<meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1">"#;
        assert_eq!(find_meta_charset(body), Some("ISO-8859-1"));
    }

    #[test]
    fn test_find_meta_charset_absent() {
        assert_eq!(find_meta_charset("<html></html>"), None);
    }
}
