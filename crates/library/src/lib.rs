//! Resumable batch operations over a media library.
//!
//! The [`batch`] engine pages through an item source, processes items with
//! bounded concurrency and appends a partial checkpoint after every page, so
//! interrupting a run never costs more than the page in flight. The use
//! cases built on it:
//!
//! - [`organize`] moves files into date-based folders;
//! - [`tag`] adds folder names as keywords;
//! - [`duplicates`] merges groups of identical files.

pub mod batch;
mod context;
pub mod duplicates;
pub mod error;
pub mod naming;
pub mod organize;
mod progress;
pub mod tag;
mod template;
mod tracker;

pub use crate::context::{Context, Settings};
pub use crate::progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
pub use crate::template::{DEFAULT_TEMPLATE, PathGenerator};
pub use crate::tracker::{ItemCallback, ItemState, ItemTracker, ItemUpdate, TrackerItem};
