//! Absolute-resolution helpers for request and redirect targets.

use url::Url;

use crate::error_handling::BridgeError;
use crate::history::History;

/// Appends a root-relative `path` to `base`, keeping the base's scheme,
/// authority, and path but dropping its query and fragment.
///
/// `append_path("http://host/app", "/next?p=1")` yields
/// `http://host/app/next?p=1`.
pub(crate) fn append_path(base: &Url, path: &str) -> Result<Url, BridgeError> {
    let mut origin = base.clone();
    origin.set_query(None);
    origin.set_fragment(None);
    let absolute = format!("{}{}", origin.as_str().trim_end_matches('/'), path);
    Url::parse(&absolute).map_err(|source| BridgeError::InvalidUri {
        uri: absolute,
        source,
    })
}

/// Resolves `relative` against `base` with standard reference-resolution
/// rules; an absolute `relative` passes through unchanged.
pub(crate) fn merge_urls(base: &Url, relative: &str) -> Result<Url, BridgeError> {
    base.join(relative).map_err(|source| BridgeError::InvalidUri {
        uri: relative.to_string(),
        source,
    })
}

/// Resolves a target the way the harness's browser would.
///
/// Absolute URLs are used as-is. Root-relative URLs are appended to the
/// base URI. Any other relative URL resolves against the current history
/// entry, falling back to the base when nothing has been visited yet.
pub(crate) fn absolute_uri(
    target: &str,
    base: &Url,
    history: &History,
) -> Result<Url, BridgeError> {
    if !target.contains("://") {
        if target.starts_with('/') {
            return append_path(base, target);
        }
        if let Some(current) = history.current() {
            return merge_urls(current, target);
        }
    }
    merge_urls(base, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_append_path_to_origin() {
        let base = url("http://localhost:8000/");
        let joined = append_path(&base, "/next").unwrap();
        assert_eq!(joined.as_str(), "http://localhost:8000/next");
    }

    #[test]
    fn test_append_path_keeps_base_path() {
        // A base URI pointing below the root keeps its prefix.
        let base = url("http://localhost:8000/app/");
        let joined = append_path(&base, "/next").unwrap();
        assert_eq!(joined.as_str(), "http://localhost:8000/app/next");
    }

    #[test]
    fn test_append_path_drops_base_query() {
        let base = url("http://localhost:8000/?stale=1");
        let joined = append_path(&base, "/next?p=1").unwrap();
        assert_eq!(joined.as_str(), "http://localhost:8000/next?p=1");
    }

    #[test]
    fn test_merge_urls_absolute_passes_through() {
        let base = url("https://example.com/path");
        let merged = merge_urls(&base, "https://other.com/new").unwrap();
        assert_eq!(merged.as_str(), "https://other.com/new");
    }

    #[test]
    fn test_merge_urls_relative_path() {
        // Relative path (not starting with /) resolves against the base's
        // directory, the common redirect gotcha.
        let base = url("https://example.com/old/path");
        let merged = merge_urls(&base, "new").unwrap();
        assert_eq!(merged.as_str(), "https://example.com/old/new");
    }

    #[test]
    fn test_absolute_uri_root_relative_uses_base() {
        let base = url("http://localhost:8000/");
        let mut history = History::new();
        history.push(url("http://localhost:8000/deep/page"));
        let resolved = absolute_uri("/next", &base, &history).unwrap();
        assert_eq!(resolved.as_str(), "http://localhost:8000/next");
    }

    #[test]
    fn test_absolute_uri_relative_uses_history() {
        let base = url("http://localhost:8000/");
        let mut history = History::new();
        history.push(url("http://localhost:8000/deep/page"));
        let resolved = absolute_uri("next", &base, &history).unwrap();
        assert_eq!(resolved.as_str(), "http://localhost:8000/deep/next");
    }

    #[test]
    fn test_absolute_uri_relative_with_empty_history_uses_base() {
        let base = url("http://localhost:8000/");
        let resolved = absolute_uri("next", &base, &History::new()).unwrap();
        assert_eq!(resolved.as_str(), "http://localhost:8000/next");
    }

    #[test]
    fn test_absolute_uri_absolute_ignores_history() {
        let base = url("http://localhost:8000/");
        let mut history = History::new();
        history.push(url("http://localhost:8000/deep/page"));
        let resolved = absolute_uri("http://other.test/x", &base, &history).unwrap();
        assert_eq!(resolved.as_str(), "http://other.test/x");
    }
}
