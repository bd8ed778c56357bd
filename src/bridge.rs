//! The bridge itself.
//!
//! Composes header normalization, body encoding, and cookie translation
//! into one outgoing wire request, performs the call through the
//! transport, classifies its failures, and interprets the response.

use log::{debug, error};

use url::Url;

use crate::body::build_body;
use crate::config::BridgeConfig;
use crate::cookies::CookieJar;
use crate::error_handling::{BridgeError, TransportError};
use crate::headers::extract_headers;
use crate::history::History;
use crate::request::BrowserRequest;
use crate::response::{interpret_response, BrowserResponse};
use crate::transport::{HttpTransport, Transport, WireRequest};

/// Translates abstract harness requests into wire-level calls and back.
///
/// Owns the process-lifetime state: the configuration, the harness cookie
/// jar, and the navigation history. A [`perform`](Self::perform) call
/// holds no request-scoped mutable state of its own; configure through the
/// setters during setup, not while a call is in flight.
#[derive(Debug)]
pub struct Bridge<T: Transport> {
    transport: T,
    config: BridgeConfig,
    cookie_jar: CookieJar,
    history: History,
}

impl Bridge<HttpTransport> {
    /// A bridge over a fresh [`HttpTransport`] against `base_uri`.
    pub fn http(base_uri: Url) -> Result<Self, BridgeError> {
        Ok(Bridge::new(HttpTransport::new(base_uri)?))
    }
}

impl<T: Transport> Bridge<T> {
    /// Wraps `transport` with empty configuration, jar, and history.
    pub fn new(transport: T) -> Self {
        Bridge {
            transport,
            config: BridgeConfig::new(),
            cookie_jar: CookieJar::new(),
            history: History::new(),
        }
    }

    /// Sets a header sent with every subsequent request. An empty value
    /// clears the header, the equivalent of
    /// [`delete_header`](Self::delete_header).
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.config.set_header(name, value);
    }

    /// Removes a header from the set sent with every request.
    pub fn delete_header(&mut self, name: &str) {
        self.config.delete_header(name);
    }

    /// Sets basic auth credentials for every subsequent request.
    pub fn set_auth(&mut self, username: &str, password: &str) {
        self.config.set_auth(username, password);
    }

    /// Sets the maximum allowable interval for a refresh hint to redirect
    /// automatically; see
    /// [`BridgeConfig::set_refresh_max_interval`].
    pub fn set_refresh_max_interval(&mut self, seconds: u32) {
        self.config.set_refresh_max_interval(seconds);
    }

    /// The harness cookie jar.
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookie_jar
    }

    /// Mutable access to the jar, for merging responses and seeding tests.
    pub fn cookie_jar_mut(&mut self) -> &mut CookieJar {
        &mut self.cookie_jar
    }

    /// The navigation history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Mutable access to the history, for the harness to record
    /// navigation.
    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Performs one bridged request.
    ///
    /// Headers are the normalized server variables with the configured
    /// default headers written over them; the body follows the encoder's
    /// fixed decision order; the cookie set is a fresh snapshot of the
    /// jar. Connect-class transport failures surface as
    /// [`BridgeError::ConnectionFailed`] naming the base URI; request
    /// failures that still carry a response are unwrapped and interpreted
    /// normally; everything else is fatal for the call.
    pub async fn perform(&self, request: &BrowserRequest) -> Result<BrowserResponse, BridgeError> {
        let url = crate::uri::absolute_uri(&request.uri, self.transport.base_uri(), &self.history)?;
        debug!("bridging {} {}", request.method, url);

        let mut headers = extract_headers(&request.server, &url);
        for (name, value) in &self.config.headers {
            headers.insert(name.clone(), value.clone());
        }

        let wire = WireRequest {
            method: request.method.clone(),
            url,
            headers,
            body: build_body(request).await?,
            cookies: self.cookie_jar.for_request(),
            auth: self.config.auth.clone(),
        };

        let response = match self.transport.send(wire).await {
            Ok(response) => response,
            Err(TransportError::Connect(source)) => {
                error!("connect failure against {}: {source}", self.transport.base_uri());
                return Err(BridgeError::ConnectionFailed {
                    url: self.transport.base_uri().to_string(),
                });
            }
            Err(TransportError::Request {
                response: Some(response),
                ..
            }) => response,
            Err(other) => return Err(BridgeError::Transport(other)),
        };

        interpret_response(
            response,
            self.transport.base_uri(),
            &self.history,
            self.config.refresh_max_interval,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::WireResponse;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Transport double: hands back one canned reply and records what was
    /// sent.
    struct FakeTransport {
        base: Url,
        reply: Mutex<Option<Result<WireResponse, TransportError>>>,
        seen: Mutex<Option<WireRequest>>,
    }

    impl FakeTransport {
        fn new(reply: Result<WireResponse, TransportError>) -> Self {
            FakeTransport {
                base: Url::parse("http://svc.test/").unwrap(),
                reply: Mutex::new(Some(reply)),
                seen: Mutex::new(None),
            }
        }

        fn ok(status: u16) -> Self {
            Self::new(Ok(WireResponse {
                status,
                headers: HashMap::new(),
                body: b"<html></html>".to_vec(),
            }))
        }

        fn sent(&self) -> WireRequest {
            self.seen.lock().unwrap().clone().expect("nothing sent")
        }
    }

    impl Transport for FakeTransport {
        fn base_uri(&self) -> &Url {
            &self.base
        }

        async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
            *self.seen.lock().unwrap() = Some(request);
            self.reply.lock().unwrap().take().expect("reply consumed")
        }
    }

    #[tokio::test]
    async fn test_connect_failure_names_base_uri() {
        let bridge = Bridge::new(FakeTransport::new(Err(TransportError::Connect(
            "refused".into(),
        ))));
        let error = bridge
            .perform(&BrowserRequest::new("GET", "/"))
            .await
            .unwrap_err();
        assert!(matches!(error, BridgeError::ConnectionFailed { .. }));
        assert!(error.to_string().contains("http://svc.test/"));
    }

    #[tokio::test]
    async fn test_request_failure_with_response_is_unwrapped() {
        // The transport treats the status as exceptional, but the embedded
        // response is processed as if nothing went wrong.
        let embedded = WireResponse {
            status: 500,
            headers: HashMap::new(),
            body: b"oops".to_vec(),
        };
        let bridge = Bridge::new(FakeTransport::new(Err(TransportError::Request {
            response: Some(embedded),
            source: "server error".into(),
        })));
        let response = bridge
            .perform(&BrowserRequest::new("GET", "/"))
            .await
            .unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.body, "oops");
    }

    #[tokio::test]
    async fn test_request_failure_without_response_is_fatal() {
        let bridge = Bridge::new(FakeTransport::new(Err(TransportError::Request {
            response: None,
            source: "broken pipe".into(),
        })));
        let error = bridge
            .perform(&BrowserRequest::new("GET", "/"))
            .await
            .unwrap_err();
        assert!(matches!(error, BridgeError::Transport(_)));
    }

    #[tokio::test]
    async fn test_default_headers_overlay_normalized_ones() {
        let transport = FakeTransport::ok(200);
        let mut bridge = Bridge::new(transport);
        bridge.set_header("X-Requested-With", "XMLHttpRequest");

        let mut request = BrowserRequest::new("GET", "/");
        request
            .server
            .insert("HTTP_X_REQUESTED_WITH".to_string(), "nope".to_string());
        bridge.perform(&request).await.unwrap();

        let sent = bridge.transport().sent();
        assert_eq!(
            sent.headers.get("X-Requested-With"),
            Some(&"XMLHttpRequest".to_string())
        );
    }

    #[tokio::test]
    async fn test_emptied_header_is_absent_from_the_wire() {
        let mut bridge = Bridge::new(FakeTransport::ok(200));
        bridge.set_header("X-Custom", "value");
        bridge.set_header("X-Custom", "");

        bridge
            .perform(&BrowserRequest::new("GET", "/"))
            .await
            .unwrap();
        let sent = bridge.transport().sent();
        assert!(!sent.headers.contains_key("X-Custom"));
    }

    #[tokio::test]
    async fn test_relative_target_resolves_against_base() {
        let bridge = Bridge::new(FakeTransport::ok(200));
        bridge
            .perform(&BrowserRequest::new("GET", "/login"))
            .await
            .unwrap();
        let sent = bridge.transport().sent();
        assert_eq!(sent.url.as_str(), "http://svc.test/login");
        assert_eq!(sent.headers.get("Host"), Some(&"svc.test".to_string()));
    }

    #[tokio::test]
    async fn test_jar_snapshot_travels_with_the_request() {
        let mut bridge = Bridge::new(FakeTransport::ok(200));
        bridge
            .cookie_jar_mut()
            .add(crate::cookies::Cookie::new("session", "abc"));

        bridge
            .perform(&BrowserRequest::new("GET", "/"))
            .await
            .unwrap();
        let sent = bridge.transport().sent();
        assert_eq!(sent.cookies.len(), 1);
        // the snapshot carries the placeholder domain, the jar keeps none
        assert_eq!(sent.cookies[0].domain, "localhost");
        assert_eq!(bridge.cookie_jar().all()[0].domain, "");
    }

    #[tokio::test]
    async fn test_auth_travels_with_the_request() {
        let mut bridge = Bridge::new(FakeTransport::ok(200));
        bridge.set_auth("user", "secret");
        bridge
            .perform(&BrowserRequest::new("GET", "/"))
            .await
            .unwrap();
        assert_eq!(
            bridge.transport().sent().auth,
            Some(("user".to_string(), "secret".to_string()))
        );
    }

    #[tokio::test]
    async fn test_refresh_heuristic_runs_on_unwrapped_responses() {
        let embedded = WireResponse {
            status: 200,
            headers: HashMap::new(),
            body: br#"<meta http-equiv="refresh" content="0;url=/next">"#.to_vec(),
        };
        let mut bridge = Bridge::new(FakeTransport::new(Ok(embedded)));
        bridge
            .history_mut()
            .push(Url::parse("http://svc.test/start").unwrap());

        let response = bridge
            .perform(&BrowserRequest::new("GET", "/start"))
            .await
            .unwrap();
        assert_eq!(response.status, 302);
        assert_eq!(
            response.headers.get("Location"),
            Some(&"http://svc.test/next".to_string())
        );
    }
}
