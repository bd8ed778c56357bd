//! The wire-level transport seam and its reqwest-backed implementation.
//!
//! The bridge drives every request through the narrow [`Transport`] trait;
//! redirect following stays disabled so the response interpreter owns
//! redirect semantics end to end.

use std::collections::HashMap;

use log::debug;
use reqwest::multipart;
use url::Url;

use crate::body::{Part, RequestBody};
use crate::cookies::{cookie_header, Cookie};
use crate::error_handling::TransportError;
use crate::headers::canonicalize;

/// A fully assembled outgoing request.
#[derive(Debug, Clone)]
pub struct WireRequest {
    /// HTTP method.
    pub method: String,
    /// Absolute target.
    pub url: Url,
    /// Flattened header map; a header that must not be sent is absent,
    /// never present with an empty value.
    pub headers: HashMap<String, String>,
    /// The body, already decided by the encoder.
    pub body: RequestBody,
    /// Cookie set for this single call; a snapshot, not the harness jar.
    pub cookies: Vec<Cookie>,
    /// Basic auth credentials, if configured.
    pub auth: Option<(String, String)>,
}

/// A raw response as the transport produced it.
#[derive(Debug, Clone, Default)]
pub struct WireResponse {
    /// Status code.
    pub status: u16,
    /// Header map; repeated headers collapse onto their first value.
    pub headers: HashMap<String, String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

/// The narrow interface the bridge performs requests through.
///
/// Implementations must not follow redirects and must classify failures
/// into the [`TransportError`] taxonomy; the bridge decides what each
/// class means for the call.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// The base URI this transport targets; named in connection-failure
    /// diagnostics and used to resolve relative targets.
    fn base_uri(&self) -> &Url;

    /// Performs one HTTP exchange.
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError>;
}

/// reqwest-backed [`Transport`] with redirect following disabled.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_uri: Url,
}

impl HttpTransport {
    /// Builds a transport against `base_uri` with its own client.
    pub fn new(base_uri: Url) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|error| TransportError::Other(Box::new(error)))?;
        Ok(HttpTransport { client, base_uri })
    }

    /// Wraps an externally configured client (timeouts, proxies, TLS).
    ///
    /// The client must have redirect following disabled.
    pub fn with_client(client: reqwest::Client, base_uri: Url) -> Self {
        HttpTransport { client, base_uri }
    }
}

impl Transport for HttpTransport {
    fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|error| TransportError::Other(Box::new(error)))?;
        let mut builder = self.client.request(method, request.url.clone());

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(value) = cookie_header(&request.cookies, &request.url) {
            builder = builder.header(reqwest::header::COOKIE, value);
        }
        if let Some((username, password)) = &request.auth {
            builder = builder.basic_auth(username, Some(password));
        }
        builder = match request.body {
            RequestBody::None => builder,
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Multipart(parts) => builder.multipart(multipart_form(parts)),
            RequestBody::Raw(bytes) => builder.body(bytes),
        };

        debug!("{} {}", request.method, request.url);
        let response = builder.send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let headers = flatten_headers(response.headers());
        let body = response.bytes().await.map_err(classify)?.to_vec();
        Ok(WireResponse {
            status,
            headers,
            body,
        })
    }
}

/// Assembles the reqwest multipart form from the encoder's part list,
/// keeping part order.
fn multipart_form(parts: Vec<Part>) -> multipart::Form {
    let mut form = multipart::Form::new();
    for part in parts {
        let mut piece = multipart::Part::bytes(part.contents);
        if let Some(filename) = part.filename {
            piece = piece.file_name(filename);
        }
        form = form.part(part.name, piece);
    }
    form
}

/// Maps reqwest failures onto the transport taxonomy: connection and
/// timeout problems are connect-class; status problems keep their response
/// when one exists; the rest stays opaque.
fn classify(error: reqwest::Error) -> TransportError {
    if error.is_connect() || error.is_timeout() {
        return TransportError::Connect(Box::new(error));
    }
    if error.is_status() {
        // reqwest only raises these via error_for_status, after the body
        // has been dropped, so there is no response left to carry
        return TransportError::Request {
            response: None,
            source: Box::new(error),
        };
    }
    TransportError::Other(Box::new(error))
}

/// Collapses a reqwest header map onto canonical names, keeping the first
/// value of any repeated header.
fn flatten_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    let mut flat = HashMap::new();
    for (name, value) in headers {
        flat.entry(canonicalize(name.as_str()))
            .or_insert_with(|| value.to_str().unwrap_or_default().to_string());
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

    #[test]
    fn test_flatten_headers_keeps_first_occurrence() {
        let mut headers = HeaderMap::new();
        headers.append(
            HeaderName::from_static("x-tag"),
            HeaderValue::from_static("first"),
        );
        headers.append(
            HeaderName::from_static("x-tag"),
            HeaderValue::from_static("second"),
        );
        let flat = flatten_headers(&headers);
        assert_eq!(flat.get("X-Tag"), Some(&"first".to_string()));
    }

    #[test]
    fn test_flatten_headers_canonicalizes_names() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("text/html"),
        );
        headers.insert(
            HeaderName::from_static("set-cookie"),
            HeaderValue::from_static("a=b"),
        );
        let flat = flatten_headers(&headers);
        assert!(flat.contains_key("Content-Type"));
        assert!(flat.contains_key("Set-Cookie"));
    }

    #[test]
    fn test_transport_exposes_base_uri() {
        let base = Url::parse("http://svc.test/").unwrap();
        let transport = HttpTransport::new(base.clone()).unwrap();
        assert_eq!(transport.base_uri(), &base);
    }
}
