//! Library Error Types
//!
//! Errors shared by the building blocks of this crate (templates and path
//! naming). Each use case and the batch runner have their own `error` module.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("issue with path generation from template")]
    Template,
    /// Probing the backend for a free destination failed.
    #[display("could not check whether {} is free", _0.display())]
    Storage(#[error(not(source))] PathBuf),
    /// Every candidate name up to the attempt limit is taken.
    #[display("no free name for {} after {attempts} attempts", path.display())]
    Exhausted { path: PathBuf, attempts: usize },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
