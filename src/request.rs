//! The abstract browser-level request handed over by the harness.

use std::collections::HashMap;
use std::path::PathBuf;

/// A form parameter value: a flat string or a nested, insertion-ordered map.
///
/// Nested maps flatten to `parent[child]` keys when the body is encoded;
/// sibling order is the insertion order of the underlying vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// A flat string value.
    Text(String),
    /// A nested map of parameter names to values, in insertion order.
    Map(Vec<(String, ParamValue)>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// An uploaded file: a path opened fresh at encode time, plus the filename
/// the simulated browser claims to have picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Where the bytes live on disk.
    pub path: PathBuf,
    /// Declared filename, if any, carried into the multipart part.
    pub filename: Option<String>,
}

impl FileUpload {
    /// An upload with no declared filename.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileUpload {
            path: path.into(),
            filename: None,
        }
    }

    /// An upload carrying a declared filename.
    pub fn with_filename(path: impl Into<PathBuf>, filename: &str) -> Self {
        FileUpload {
            path: path.into(),
            filename: Some(filename.to_string()),
        }
    }
}

/// An upload slot: one file, or a nested, insertion-ordered map of slots
/// that flattens to `parent[child]` part names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileField {
    /// A single file.
    Upload(FileUpload),
    /// A nested map of upload slots, in insertion order.
    Map(Vec<(String, FileField)>),
}

/// An abstract browser request.
///
/// Server variables use transport-style pseudo-header keys (`HTTP_ACCEPT`,
/// `CONTENT_TYPE`); the bridge normalizes them into real headers. A raw
/// `content` body is mutually exclusive with `params`/`files`: the body
/// encoder checks files, then form parameters, then raw content, in that
/// order.
#[derive(Debug, Clone, Default)]
pub struct BrowserRequest {
    /// HTTP method.
    pub method: String,
    /// Target URI; resolved against the transport base when relative.
    pub uri: String,
    /// Simulated server variables.
    pub server: HashMap<String, String>,
    /// Form parameters, in insertion order.
    pub params: Vec<(String, ParamValue)>,
    /// Uploaded files, in insertion order.
    pub files: Vec<(String, FileField)>,
    /// Raw body, sent verbatim when no files or form parameters apply.
    pub content: Option<Vec<u8>>,
}

impl BrowserRequest {
    /// A request with the given method and target and nothing else set.
    pub fn new(method: &str, uri: &str) -> Self {
        BrowserRequest {
            method: method.to_string(),
            uri: uri.to_string(),
            ..Default::default()
        }
    }

    /// The declared `HTTP_CONTENT_TYPE` server variable, if any.
    pub(crate) fn declared_content_type(&self) -> Option<&str> {
        self.server.get("HTTP_CONTENT_TYPE").map(String::as_str)
    }
}
