//! Metadata extraction and date resolution for media files.
//!
//! Properties are read and written through the [`MetadataExtractor`] and
//! [`MetadataWriter`] traits; in production both are served by [`Exiftool`].
//! On top of the raw properties, [`CompiledDate`] gathers every date
//! candidate a file offers (EXIF capture time, a date embedded in the file
//! name, or a dictionary entry for one of its folders) and resolves them by
//! priority.

mod calendar;
mod consts;
mod date;
mod dictionary;
pub mod error;
mod exif;
mod exiftool;
mod filename;
#[cfg(any(test, feature = "mock"))]
mod memory;
mod property;

pub use crate::consts::{DATE_TIME_ORIGINAL, KEYWORDS, LIST_SEPARATOR};
pub use crate::date::{CompiledDate, DateSource};
pub use crate::dictionary::DateDictionary;
pub use crate::exif::{format_exif_datetime, parse_exif_datetime};
pub use crate::exiftool::Exiftool;
pub use crate::filename::date_from_filename;
#[cfg(any(test, feature = "mock"))]
pub use crate::memory::MemoryMetadata;
pub use crate::property::{MetadataExtractor, MetadataWriter, PropertyMap, join_list, keywords, split_list};
