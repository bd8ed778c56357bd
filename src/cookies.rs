//! The harness cookie jar and its wire-level translation.
//!
//! The jar is harness state: responses merge into it via
//! [`CookieJar::update_from_response`], and every outgoing request reads a
//! fresh snapshot through [`CookieJar::for_request`]. The snapshot, not the
//! jar itself, travels with the wire request; cookies with no recorded
//! domain get the fixed local placeholder so same-origin matching still
//! succeeds against a local test server.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::debug;
use url::Url;

use crate::config::{DEFAULT_COOKIE_DOMAIN, HEADER_SET_COOKIE};

/// A single cookie held by the harness jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Owning domain; empty means "none recorded" and is serialized as the
    /// local placeholder.
    pub domain: String,
    /// Owning path.
    pub path: String,
    /// Expiry instant; `None` is a session cookie.
    pub expires: Option<DateTime<Utc>>,
    /// Only sent over https when set.
    pub secure: bool,
    /// Hidden from scripts; carried along for fidelity, not enforced here.
    pub http_only: bool,
}

impl Cookie {
    /// A session cookie with no domain, rooted at `/`.
    pub fn new(name: &str, value: &str) -> Self {
        Cookie {
            name: name.to_string(),
            value: value.to_string(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// True when this cookie applies to a request against `url` at `now`.
    pub(crate) fn matches(&self, url: &Url, now: DateTime<Utc>) -> bool {
        if let Some(expires) = self.expires {
            if expires <= now {
                return false;
            }
        }
        if self.secure && url.scheme() != "https" {
            return false;
        }
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        domain_matches(&host, &self.domain) && url.path().starts_with(&self.path)
    }
}

/// Host-suffix match with a dot boundary: `www.example.com` matches
/// `example.com` but `notexample.com` does not.
fn domain_matches(host: &str, domain: &str) -> bool {
    let domain = domain.trim_start_matches('.').to_ascii_lowercase();
    if host == domain {
        return true;
    }
    host.len() > domain.len()
        && host.ends_with(&domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

/// The collection of cookies currently held by the harness.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    /// An empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// All cookies in the jar, oldest first.
    pub fn all(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Adds `cookie`, replacing any existing cookie with the same name,
    /// domain, and path.
    pub fn add(&mut self, cookie: Cookie) {
        self.cookies.retain(|c| {
            !(c.name == cookie.name && c.domain == cookie.domain && c.path == cookie.path)
        });
        self.cookies.push(cookie);
    }

    /// Empties the jar.
    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// Merges a response's `Set-Cookie` header into the jar.
    ///
    /// Defaults the domain to the request host and the path to the request
    /// path's directory when the attributes are absent, the way a browser
    /// does.
    pub fn update_from_response(&mut self, url: &Url, headers: &HashMap<String, String>) {
        let Some(raw) = headers.get(HEADER_SET_COOKIE) else {
            return;
        };
        if let Some(cookie) = parse_set_cookie(raw, url) {
            debug!("jar stores {}={} for {}", cookie.name, cookie.value, cookie.domain);
            self.add(cookie);
        }
    }

    /// The wire cookie set for one outgoing call.
    ///
    /// Every jar cookie is serialized; a cookie without a domain gets the
    /// local placeholder. The snapshot is independent of the jar, which is
    /// never mutated mid-request.
    pub(crate) fn for_request(&self) -> Vec<Cookie> {
        self.cookies
            .iter()
            .map(|cookie| {
                let mut wire = cookie.clone();
                if wire.domain.is_empty() {
                    wire.domain = DEFAULT_COOKIE_DOMAIN.to_string();
                }
                wire
            })
            .collect()
    }
}

/// Parses one `Set-Cookie` value: `name=value` followed by `;`-separated
/// attributes. Unknown attributes are ignored.
fn parse_set_cookie(header: &str, url: &Url) -> Option<Cookie> {
    let mut pieces = header.split(';');
    let name_value = pieces.next()?.trim();
    let eq = name_value.find('=')?;
    let name = name_value[..eq].trim();
    let value = name_value[eq + 1..].trim();
    if name.is_empty() {
        return None;
    }

    let mut cookie = Cookie::new(name, value);
    cookie.domain = url.host_str().unwrap_or_default().to_ascii_lowercase();
    cookie.path = directory_of(url.path());

    for attribute in pieces {
        let attribute = attribute.trim();
        let (key, val) = match attribute.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => (attribute, ""),
        };
        if key.eq_ignore_ascii_case("domain") {
            let domain = val.trim_start_matches('.');
            if !domain.is_empty() {
                cookie.domain = domain.to_ascii_lowercase();
            }
        } else if key.eq_ignore_ascii_case("path") {
            if !val.is_empty() {
                cookie.path = val.to_string();
            }
        } else if key.eq_ignore_ascii_case("expires") {
            if let Ok(instant) = DateTime::parse_from_rfc2822(val) {
                cookie.expires = Some(instant.with_timezone(&Utc));
            }
        } else if key.eq_ignore_ascii_case("max-age") {
            if let Ok(seconds) = val.parse::<i64>() {
                // Max-Age beats Expires when both are present
                cookie.expires = Some(Utc::now() + chrono::Duration::seconds(seconds));
            }
        } else if key.eq_ignore_ascii_case("secure") {
            cookie.secure = true;
        } else if key.eq_ignore_ascii_case("httponly") {
            cookie.http_only = true;
        }
    }
    Some(cookie)
}

/// Trims a request path to its directory, the default cookie path.
fn directory_of(path: &str) -> String {
    match path.rfind('/') {
        Some(slash) => path[..slash + 1].to_string(),
        None => "/".to_string(),
    }
}

/// Builds the `Cookie` header value for a request from the per-call cookie
/// set, or `None` when nothing applies.
pub(crate) fn cookie_header(cookies: &[Cookie], url: &Url) -> Option<String> {
    let now = Utc::now();
    let pairs: Vec<String> = cookies
        .iter()
        .filter(|cookie| cookie.matches(url, now))
        .map(|cookie| format!("{}={}", cookie.name, cookie.value))
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}
