//! Error types for the [`batch`](super) module.

use derive_more::{Display, Error};

/// A batch error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for batch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a run stopped before visiting every page.
///
/// Per-item failures never show up here; they are reported through the
/// [`ItemTracker`](crate::ItemTracker) and retried on the next run.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("page size must be greater than zero")]
    InvalidPageSize,
    #[display("concurrency must be greater than zero")]
    InvalidConcurrency,
    /// The item source could not be counted; nothing was touched.
    #[display("could not count items")]
    Count,
    /// Fetching a page failed; the remaining pages were not visited.
    #[display("could not fetch page {_0}")]
    Fetch(#[error(not(source))] usize),
    /// Listing or reading the underlying source failed.
    #[display("item source unavailable")]
    Source,
    /// A partial checkpoint could not be written.
    #[display("could not commit checkpoint for page {_0}")]
    Checkpoint(#[error(not(source))] usize),
    /// An item failed in a way that makes every later item pointless.
    #[display("fatal error while processing {_0}")]
    Fatal(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Source | Self::Checkpoint(_))
    }
}
