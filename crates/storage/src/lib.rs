//! Storage backends for a media library.
//!
//! Every path handed to a backend is relative to the backend's root and gets
//! validated by [`validate_path`] before it touches anything, so nothing a
//! user types (or an import file contains) can escape the library.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::FileInfo;
pub use crate::path::{split_extension, validate as validate_path};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
