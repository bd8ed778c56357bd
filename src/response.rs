//! Wire response interpretation.
//!
//! Turns the transport's raw response into the abstract response the
//! harness navigates on: decodes the body, fixes up the Content-Type with
//! a sniffed charset when none is declared, and applies the meta-refresh
//! heuristic, rewriting qualifying refreshes into a plain 302 so the
//! harness's own redirect-following takes over.

use std::collections::HashMap;

use log::debug;
use url::Url;

use crate::config::{DEFAULT_CONTENT_TYPE, HEADER_CONTENT_TYPE, HEADER_LOCATION, HEADER_REFRESH};
use crate::error_handling::BridgeError;
use crate::history::History;
use crate::refresh::{find_meta_charset, find_refresh};
use crate::transport::WireResponse;
use crate::uri::absolute_uri;

/// The abstract response handed back to the harness.
#[derive(Debug, Clone)]
pub struct BrowserResponse {
    /// Decoded body text.
    pub body: String,
    /// Status code, after the refresh heuristic has possibly rewritten it.
    pub status: u16,
    /// Response headers, including any rewritten Content-Type or
    /// synthesized Location.
    pub headers: HashMap<String, String>,
}

/// Interprets `response` into the abstract model.
///
/// `base` is the transport's base URI and `history` the harness's
/// navigation record; both only matter for resolving refresh targets.
pub(crate) fn interpret_response(
    response: WireResponse,
    base: &Url,
    history: &History,
    refresh_max_interval: u32,
) -> Result<BrowserResponse, BridgeError> {
    let WireResponse {
        status,
        mut headers,
        body,
    } = response;
    let body = String::from_utf8_lossy(&body).into_owned();

    let content_type = headers
        .get(HEADER_CONTENT_TYPE)
        .filter(|value| !value.is_empty())
        .cloned()
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    if !content_type.contains("charset=") {
        let content_type = match find_meta_charset(&body) {
            Some(charset) => format!("{content_type};charset={charset}"),
            None => content_type,
        };
        headers.insert(HEADER_CONTENT_TYPE.to_string(), content_type);
    }

    let mut status = status;
    let refresh_header = headers.get(HEADER_REFRESH).map(String::as_str);
    if let Some(refresh) = find_refresh(&body, refresh_header) {
        let fires = refresh
            .interval
            .map_or(true, |seconds| seconds < refresh_max_interval);
        if fires {
            let target = absolute_uri(&refresh.url, base, history)?;
            let current = history.current().unwrap_or(base);
            if !same_ignoring_fragment(&target, current) {
                debug!("refresh to {target} rewritten as a 302");
                status = 302;
                headers.insert(HEADER_LOCATION.to_string(), target.to_string());
            }
        }
    }

    Ok(BrowserResponse {
        body,
        status,
        headers,
    })
}

/// URI equality with fragments ignored: a refresh that only moves within
/// the page is not a navigation.
fn same_ignoring_fragment(a: &Url, b: &Url) -> bool {
    let mut a = a.clone();
    let mut b = b.clone();
    a.set_fragment(None);
    b.set_fragment(None);
    a == b
}
