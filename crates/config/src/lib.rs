//! Layered configuration for shoebox.
//!
//! Nothing in here is global: `main` resolves [`AppPaths`], loads the
//! [`Config`] and an optional [`Dictionary`] once, and hands them to
//! whatever needs them.

mod config;
mod dictionary;
pub mod error;
mod format;
mod paths;

pub use crate::config::{BatchConfig, CheckpointConfig, Config, LibraryConfig, MetadataConfig, NamingConfig};
pub use crate::dictionary::Dictionary;
pub use crate::paths::AppPaths;
