//! Small async building blocks shared by the shoebox crates.
//!
//! Right now that's just [`Waves`]: run an iterator of futures in fixed-size
//! groups, where each group must finish completely before the next one is
//! started. It's the simplest way to cap how many EXIF readers, file moves or
//! database writes are in flight at the same time.

mod waves;

pub use crate::waves::{Waves, waves};
