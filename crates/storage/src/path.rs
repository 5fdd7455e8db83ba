//! Path validation and manipulation for library-relative paths.

use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a library-relative path and returns it normalized.
///
/// Paths never escape the storage root: `..` may only cancel out a component
/// that came before it. Leading `/` and `.` components are dropped, so
/// `/2019/07/a.jpg` and `./2019/07/a.jpg` both become `2019/07/a.jpg`. Null
/// bytes, Windows prefixes, and paths that normalize to nothing are rejected
/// with [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use shoebox_storage::validate_path;
/// assert!(validate_path("2019/07/IMG_0001.jpg").is_ok());
/// assert!(validate_path("Vacances/../Plage/a.jpg").is_ok());
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a/../../b").is_err());
/// assert!(validate_path("a\0b").is_err());
/// assert_eq!(
///     validate_path("/inbox/./2019//07/../08/a.jpg/").unwrap(),
///     Path::new("inbox/2019/08/a.jpg")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || exn::Exn::from(ErrorKind::InvalidPath(original.to_path_buf()));
    let mut kept: Vec<&OsStr> = Vec::new();
    for component in original.components() {
        match component {
            // Unix lets null bytes through components(), C syscalls then truncate at them.
            Component::Normal(name) if name.as_encoded_bytes().contains(&0) => return Err(invalid()),
            Component::Normal(name) => kept.push(name),
            Component::ParentDir => {
                kept.pop().ok_or_else(invalid)?;
            },
            Component::Prefix(_) => return Err(invalid()),
            Component::CurDir | Component::RootDir => {},
        }
    }
    if kept.is_empty() {
        return Err(invalid());
    }
    Ok(kept.into_iter().collect())
}

/// Splits a path into everything before the extension and the extension.
///
/// Only the last extension counts (`clip.tar.gz` → `clip.tar` + `gz`), and
/// dot-files such as `.nomedia` have no extension.
pub fn split_extension(path: impl AsRef<Path>) -> (PathBuf, Option<OsString>) {
    let path = path.as_ref();
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => (path.with_file_name(stem), Some(ext.to_os_string())),
        _ => (path.to_path_buf(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert_eq!(validate(Path::new("2019/07/IMG_0001.jpg")).unwrap(), Path::new("2019/07/IMG_0001.jpg"));
        assert_eq!(validate(Path::new("clip.mp4")).unwrap(), Path::new("clip.mp4"));
    }

    #[test]
    fn test_path_normalization() {
        assert_eq!(validate(Path::new("a//b//c")).unwrap(), Path::new("a/b/c"));
        assert_eq!(validate(Path::new("a/./b/./c")).unwrap(), Path::new("a/b/c"));
        assert_eq!(validate(Path::new("a/b/..")).unwrap(), Path::new("a"));
        assert_eq!(validate(Path::new("inbox/")).unwrap(), Path::new("inbox"));
    }

    #[test]
    fn test_absolute_paths_become_relative() {
        assert_eq!(validate(Path::new("/Vacances/Plage")).unwrap(), Path::new("Vacances/Plage"));
    }

    #[test]
    fn test_traversal_attempts() {
        assert!(validate(Path::new("../etc/passwd")).is_err());
        assert!(validate(Path::new("a/../../b")).is_err());
        assert!(validate(Path::new("..")).is_err());
    }

    #[test]
    fn test_empty_and_null() {
        assert!(validate(Path::new("")).is_err());
        assert!(validate(Path::new("./.")).is_err());
        assert!(validate(Path::new("//")).is_err());
        assert!(validate(Path::new("a\0b")).is_err());
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("d/file.txt"), (PathBuf::from("d/file"), Some(OsString::from("txt"))));
        assert_eq!(split_extension("clip.tar.gz"), (PathBuf::from("clip.tar"), Some(OsString::from("gz"))));
        assert_eq!(split_extension("d/README"), (PathBuf::from("d/README"), None));
        assert_eq!(split_extension(".nomedia"), (PathBuf::from(".nomedia"), None));
    }
}
