//! Bridge configuration and fixed protocol constants.

use std::collections::HashMap;

/// Domain substituted for jar cookies that carry none, so same-origin
/// matching still succeeds against a local test server.
pub const DEFAULT_COOKIE_DOMAIN: &str = "localhost";

/// Content type assumed when a response does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// The exact content type that selects the urlencoded-form body path.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Methods that may carry an encoded form body.
pub const FORM_METHODS: &[&str] = &["POST", "PUT", "PATCH"];

/// Ports never appended to the Host header.
pub const DEFAULT_PORTS: &[u16] = &[80, 443];

// Header names the bridge reads or writes by name
/// The Host request header.
pub const HEADER_HOST: &str = "Host";
/// The Content-Type header, on both requests and responses.
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
/// The Location response header set when a refresh is rewritten.
pub const HEADER_LOCATION: &str = "Location";
/// The Refresh response header, the fallback refresh source.
pub const HEADER_REFRESH: &str = "Refresh";
/// The Set-Cookie response header consumed by the jar.
pub const HEADER_SET_COOKIE: &str = "Set-Cookie";

/// Mutable per-bridge configuration.
///
/// Owned by the bridge value and mutated only through setters during setup;
/// a call in flight reads it and never writes it.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    /// Headers applied to every outgoing request on top of the normalized
    /// server variables. A header that should not be sent is simply absent.
    pub(crate) headers: HashMap<String, String>,
    /// Basic auth credentials, applied by the transport.
    pub(crate) auth: Option<(String, String)>,
    /// Refresh intervals at or above this value do not auto-redirect.
    pub(crate) refresh_max_interval: u32,
}

impl BridgeConfig {
    /// Creates an empty configuration: no default headers, no auth, and a
    /// refresh max interval of zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header sent with every subsequent request.
    ///
    /// Passing an empty value clears the header instead, the equivalent of
    /// calling [`delete_header`](Self::delete_header).
    pub fn set_header(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            self.delete_header(name);
        } else {
            self.headers.insert(name.to_string(), value.to_string());
        }
    }

    /// Removes a header from the set sent with every request.
    pub fn delete_header(&mut self, name: &str) {
        self.headers.remove(name);
    }

    /// Sets basic auth credentials for every subsequent request.
    pub fn set_auth(&mut self, username: &str, password: &str) {
        self.auth = Some((username.to_string(), password.to_string()));
    }

    /// Sets the maximum allowable interval for a refresh hint to redirect
    /// automatically.
    ///
    /// A refresh with an interval at or above `seconds` is left alone; one
    /// below it, or with no interval at all, redirects.
    pub fn set_refresh_max_interval(&mut self, seconds: u32) {
        self.refresh_max_interval = seconds;
    }
}
