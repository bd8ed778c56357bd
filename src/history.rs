//! The harness's navigation history.
//!
//! The bridge only ever reads the current entry, to resolve relative
//! refresh targets; pushing and stepping back is the harness's business.

use url::Url;

/// Record of the URIs the harness has navigated to, newest last.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Url>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been visited yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The URI currently navigated to, if any.
    pub fn current(&self) -> Option<&Url> {
        self.entries.last()
    }

    /// The URI visited before the current one, if any.
    pub fn previous(&self) -> Option<&Url> {
        self.entries.len().checked_sub(2).map(|i| &self.entries[i])
    }

    /// Records a navigation to `url`.
    pub fn push(&mut self, url: Url) {
        self.entries.push(url);
    }

    /// Steps back one entry, returning the URI that was left.
    pub fn back(&mut self) -> Option<Url> {
        self.entries.pop()
    }

    /// Forgets all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
