//! Error types for the [`tag`](super) module.

use crate::batch::Fatality;
use derive_more::{Display, Error};
use std::path::PathBuf;

/// A tagging error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for tagging operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not list files to tag")]
    Listing,
    #[display("could not load checkpoint {_0}")]
    Checkpoint(#[error(not(source))] String),
    #[display("tag run aborted")]
    Run,

    #[display("FAILED_READING_EXIF: {}", _0.display())]
    ReadingExif(#[error(not(source))] PathBuf),
    #[display("FAILED_WRITING_KEYWORDS: {}", _0.display())]
    WritingKeywords(#[error(not(source))] PathBuf),
    #[display("EXTRACTOR_UNAVAILABLE")]
    ExtractorUnavailable,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Listing | Self::Checkpoint(_) | Self::Run | Self::WritingKeywords(_))
    }
}

impl Fatality for ErrorKind {
    fn is_fatal(&self) -> bool {
        matches!(self, Self::ExtractorUnavailable)
    }
}
