//! Error types for the [`organize`](super) module.
//!
//! Per-file kinds display as a stage code followed by the file, so the
//! message recorded by the item tracker says where the file got stuck.

use crate::batch::Fatality;
use derive_more::{Display, Error};
use std::path::PathBuf;

/// An organize error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for organize operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The library could not be listed.
    #[display("could not list files to organize")]
    Listing,
    #[display("could not load checkpoint {_0}")]
    Checkpoint(#[error(not(source))] String),
    /// The run stopped before visiting every page.
    #[display("organize run aborted")]
    Run,

    #[display("FAILED_READING_EXIF: {}", _0.display())]
    ReadingExif(#[error(not(source))] PathBuf),
    #[display("FAILED_RENDERING_PATH: {}", _0.display())]
    RenderingPath(#[error(not(source))] PathBuf),
    #[display("FAILED_FINDING_UNIQUE_PATH: {}", _0.display())]
    FindingUniquePath(#[error(not(source))] PathBuf),
    #[display("FAILED_MOVING_FILE: {}", _0.display())]
    MovingFile(#[error(not(source))] PathBuf),
    #[display("FAILED_APPLY_EXIF: {}", _0.display())]
    ApplyExif(#[error(not(source))] PathBuf),
    /// The metadata tool cannot be run at all.
    #[display("EXTRACTOR_UNAVAILABLE")]
    ExtractorUnavailable,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Listing | Self::Checkpoint(_) | Self::Run | Self::MovingFile(_))
    }
}

impl Fatality for ErrorKind {
    fn is_fatal(&self) -> bool {
        matches!(self, Self::ExtractorUnavailable)
    }
}
