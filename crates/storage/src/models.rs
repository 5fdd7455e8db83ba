//! File metadata returned by storage backends when listing or stat-ing.

use std::path::PathBuf;
use time::UtcDateTime;

/// A file as seen by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: UtcDateTime,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: impl Into<UtcDateTime>) -> Self {
        Self { path: path.into(), size, modified: modified.into() }
    }

    /// Lowercased file extension, if there is one.
    pub fn extension(&self) -> Option<String> {
        self.path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        let file = FileInfo::new("DCIM/IMG_0001.JPG", 10, UtcDateTime::now());
        assert_eq!(file.extension().as_deref(), Some("jpg"));
        let file = FileInfo::new("DCIM/README", 10, UtcDateTime::now());
        assert_eq!(file.extension(), None);
    }
}
