//! Server-variable to HTTP header normalization.
//!
//! The harness hands over transport-style pseudo-headers (`HTTP_ACCEPT`,
//! `CONTENT_TYPE`). Keys with the `HTTP_` prefix are real headers with the
//! prefix stripped; a small allow-list of content headers passes through
//! without it; every other key is dropped on purpose.

use std::collections::HashMap;

use url::Url;

use crate::config::{DEFAULT_PORTS, HEADER_HOST};

/// Canonicalized marker of the transport prefix (`HTTP_FOO` -> `Http-Foo`).
const HTTP_PREFIX: &str = "Http-";

/// Non-prefixed server variables that still become headers.
const CONTENT_HEADERS: &[&str] = &["Content-Length", "Content-Md5", "Content-Type"];

/// Canonicalizes a server-variable or header key: underscores become
/// dashes and every dash-separated word is capitalized, so `HTTP_X_FOO`
/// reads `Http-X-Foo` and `content-type` reads `Content-Type`.
pub(crate) fn canonicalize(key: &str) -> String {
    key.to_ascii_lowercase()
        .replace('_', "-")
        .split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("-")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// The Host header value for `url`: the host, with the port appended only
/// when it is explicit and not one of the defaults.
pub(crate) fn host_header(url: &Url) -> String {
    let mut host = url.host_str().unwrap_or_default().to_string();
    if let Some(port) = url.port() {
        if !DEFAULT_PORTS.contains(&port) {
            host.push(':');
            host.push_str(&port.to_string());
        }
    }
    host
}

/// Maps the request's server variables onto wire headers for `url`.
///
/// Pure function of its inputs. The Host header is always present and
/// derived from the URL, overriding any `HTTP_HOST` server variable.
pub(crate) fn extract_headers(
    server: &HashMap<String, String>,
    url: &Url,
) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for (key, value) in server {
        let canonical = canonicalize(key);
        if let Some(name) = canonical.strip_prefix(HTTP_PREFIX) {
            headers.insert(name.to_string(), value.clone());
        } else if CONTENT_HEADERS.contains(&canonical.as_str()) {
            headers.insert(canonical, value.clone());
        }
        // anything else is dropped silently; the filter is deliberate
    }
    headers.insert(HEADER_HOST.to_string(), host_header(url));
    headers
}
