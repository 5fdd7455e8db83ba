//! Conflict-free destination names.
//!
//! - [`find_unique_path`] searches a backend for the first free `name_N.ext`,
//!   for moves into folders other tools may also be filling.
//! - [`OccurrenceIdentifier`] hands out `name-N.ext` numbers decided up front,
//!   for bulk renames where every collision is known before anything moves.
//! - [`merge_duplicate_paths`] combines the folders of a duplicate group into
//!   one merge destination.

mod merge;
mod occurrence;
mod unique;

pub use self::merge::merge_duplicate_paths;
pub use self::occurrence::OccurrenceIdentifier;
pub use self::unique::{DEFAULT_MAX_ATTEMPTS, find_unique_path};
use shoebox_storage::split_extension;
use std::path::{Path, PathBuf};

/// `dir/stem.ext` becomes `dir/stem<separator><n>.ext`.
fn numbered(path: &Path, separator: &str, n: usize) -> PathBuf {
    let (stem, extension) = split_extension(path);
    let mut name = stem.into_os_string();
    name.push(format!("{separator}{n}"));
    if let Some(extension) = extension {
        name.push(".");
        name.push(extension);
    }
    PathBuf::from(name)
}
