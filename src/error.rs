//! Error type for codec operations.

use thiserror::Error;

/// Error raised by any size, decode, encode, or transform operation.
///
/// A single kind carries a human-readable message together with a snapshot of
/// the codec context at the failure site (the path of the node being processed
/// and its absolute byte offset). `Display` renders the message alone; the
/// snapshot is available through [`Error::path`] and [`Error::offset`] for
/// diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Error {
    message: String,
    path: String,
    offset: usize,
}

impl Error {
    pub(crate) fn new(message: impl Into<String>, path: String, offset: usize) -> Self {
        Self {
            message: message.into(),
            path,
            offset,
        }
    }

    /// The formatted path of the node that failed, e.g. `.items[2].len`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The absolute byte offset (from the start of the top-level buffer) at
    /// which the failure occurred.
    pub fn offset(&self) -> usize {
        self.offset
    }
}
