//! Error taxonomy for bridged requests.
//!
//! Transport failures come in three flavors the bridge treats differently:
//! connect-class failures become a dedicated "connection failed" diagnostic
//! naming the server under test, request-class failures that still carry a
//! response are unwrapped and processed as a normal response, and anything
//! else is fatal for the call.

use std::path::PathBuf;

use thiserror::Error;

use crate::transport::WireResponse;

/// Failures raised by a [`Transport`](crate::transport::Transport)
/// implementation.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection-level failure: DNS, refused connection, timeout.
    #[error("connect failure: {0}")]
    Connect(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request-level failure, optionally still carrying the response the
    /// server managed to produce.
    #[error("request failure: {source}")]
    Request {
        /// The response embedded in the failure, if the server produced one.
        response: Option<WireResponse>,
        /// The underlying transport error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other transport failure; propagated unchanged.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Failures surfaced to the harness for a single bridged call.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The server under test is unreachable.
    #[error("Couldn't connect to {url}. Please check that web server is running")]
    ConnectionFailed {
        /// The transport's base URI, named so the failing test reads clearly.
        url: String,
    },

    /// An upload path could not be opened for reading; nothing was sent.
    #[error("couldn't open upload {path} for reading")]
    UploadFile {
        /// The path that failed to open.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The request target or a redirect target was not a valid URI.
    #[error("invalid URI {uri}")]
    InvalidUri {
        /// The offending URI text.
        uri: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// Unrecoverable transport failure: no response and not a connect
    /// failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failed_names_the_base_uri() {
        let error = BridgeError::ConnectionFailed {
            url: "http://svc.test/".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("http://svc.test/"));
        assert!(message.contains("web server is running"));
    }

    #[test]
    fn test_upload_error_names_the_path() {
        let error = BridgeError::UploadFile {
            path: PathBuf::from("/tmp/missing.txt"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(error.to_string().contains("/tmp/missing.txt"));
    }

    #[test]
    fn test_transport_error_passes_through_transparently() {
        let inner = TransportError::Other("boom".into());
        let error = BridgeError::from(inner);
        assert_eq!(error.to_string(), "boom");
    }
}
