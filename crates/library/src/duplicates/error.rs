//! Error types for the [`duplicates`](super) module.

use crate::batch::Fatality;
use derive_more::{Display, Error};
use std::path::PathBuf;

/// A duplicate merge error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for duplicate merge operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not read duplicate list {}", _0.display())]
    Import(#[error(not(source))] PathBuf),
    /// 1-based line of the offending row, the header being line 1.
    #[display("invalid duplicate list entry on line {_0}")]
    InvalidRow(#[error(not(source))] usize),
    #[display("duplicate group {_0} points outside the library")]
    InvalidGroup(#[error(not(source))] String),
    #[display("could not load checkpoint {_0}")]
    Checkpoint(#[error(not(source))] String),
    #[display("merge run aborted")]
    Run,

    #[display("FAILED_VERIFYING_DUPLICATE: {}", _0.display())]
    VerifyingDuplicate(#[error(not(source))] PathBuf),
    #[display("FAILED_DELETING_FILE: {}", _0.display())]
    DeletingFile(#[error(not(source))] PathBuf),
    #[display("FAILED_MOVING_FILE: {}", _0.display())]
    MovingFile(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Checkpoint(_) | Self::Run | Self::DeletingFile(_) | Self::MovingFile(_))
    }
}

impl Fatality for ErrorKind {
    /// A group that fails never affects the next one.
    fn is_fatal(&self) -> bool {
        false
    }
}
