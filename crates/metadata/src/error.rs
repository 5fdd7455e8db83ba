//! Metadata Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A metadata error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable `exiftool` executable could be located.
    #[display("exiftool executable not found")]
    ExiftoolNotFound,
    /// The media file could not be read from or written back to storage.
    #[display("storage error for {}", _0.display())]
    Storage(#[error(not(source))] PathBuf),
    /// The executable exists but could not be started.
    #[display("could not start {}", _0.display())]
    Spawn(#[error(not(source))] PathBuf),
    /// The external process exited unsuccessfully.
    #[display("exiftool failed for {}: {message}", path.display())]
    Process { path: PathBuf, message: String },
    /// The external process produced output that could not be understood.
    #[display("unreadable exiftool output for {}", _0.display())]
    InvalidOutput(#[error(not(source))] PathBuf),
    /// The in-memory extractor was told to fail for this path.
    #[display("metadata unavailable for {}", _0.display())]
    Unavailable(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Process { .. })
    }

    /// Whether every later file would fail the same way.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ExiftoolNotFound | Self::Spawn(_))
    }
}
