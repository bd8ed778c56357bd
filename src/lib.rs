//! browser_bridge: drives real HTTP traffic for a browser-emulation test
//! harness.
//!
//! The bridge converts an abstract browser request (method, URI, form
//! fields, file uploads, simulated server variables) into a wire-level
//! HTTP call, performs it over [`reqwest`], and converts the response back
//! into the abstract model, adding the browser-like behaviors a raw client
//! does not provide: cookie-jar translation and meta-refresh redirects.
//!
//! # Example
//!
//! ```no_run
//! use browser_bridge::{Bridge, BrowserRequest};
//! use url::Url;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let base = Url::parse("http://127.0.0.1:8000/")?;
//! let mut bridge = Bridge::http(base)?;
//! bridge.set_refresh_max_interval(5);
//!
//! let response = bridge.perform(&BrowserRequest::new("GET", "/login")).await?;
//! println!("{}: {} bytes", response.status, response.body.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! The bridge is async and requires a Tokio runtime; call it from
//! `#[tokio::main]` or within an existing runtime.

#![warn(missing_docs)]

mod body;
mod bridge;
pub mod config;
mod cookies;
mod error_handling;
mod headers;
mod history;
mod refresh;
mod request;
mod response;
mod transport;
mod uri;

// Re-export public API
pub use body::{Part, RequestBody};
pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use cookies::{Cookie, CookieJar};
pub use error_handling::{BridgeError, TransportError};
pub use history::History;
pub use request::{BrowserRequest, FileField, FileUpload, ParamValue};
pub use response::BrowserResponse;
pub use transport::{HttpTransport, Transport, WireRequest, WireResponse};
