use super::numbered;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shoebox_storage::StorageBackend;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// First free path among `desired`, `stem_1.ext`, `stem_2.ext`, ...
///
/// Gives up with [`Exhausted`](ErrorKind::Exhausted) once `max_attempts`
/// numbered candidates are taken; a backend that reports every path as
/// existing (a permission problem, say) would otherwise loop forever.
///
/// Probing and the following move are not atomic: another writer can still
/// take the returned path in between.
pub async fn find_unique_path(
    backend: &(dyn StorageBackend + Send + Sync),
    desired: &Path,
    max_attempts: usize,
) -> Result<PathBuf> {
    if is_free(backend, desired).await? {
        return Ok(desired.to_path_buf());
    }
    for n in 1..=max_attempts {
        let candidate = numbered(desired, "_", n);
        if is_free(backend, &candidate).await? {
            tracing::debug!(desired = %desired.display(), chosen = %candidate.display(), "destination taken, renamed");
            return Ok(candidate);
        }
    }
    exn::bail!(ErrorKind::Exhausted { path: desired.to_path_buf(), attempts: max_attempts });
}

async fn is_free(backend: &(dyn StorageBackend + Send + Sync), path: &Path) -> Result<bool> {
    let exists = backend.exists(path).await.or_raise(|| ErrorKind::Storage(path.to_path_buf()))?;
    Ok(!exists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoebox_storage::backend::MockBackend;

    #[tokio::test]
    async fn test_free_path_is_returned_unchanged() {
        let backend = MockBackend::with_files([("d/other.txt", vec![0])]);
        let path = find_unique_path(&backend, Path::new("/d/file.txt"), 10).await.unwrap();
        assert_eq!(path, PathBuf::from("/d/file.txt"));
    }

    #[tokio::test]
    async fn test_numbering_skips_taken_candidates() {
        let backend = MockBackend::with_files([("d/file.txt", vec![0])]);
        let path = find_unique_path(&backend, Path::new("/d/file.txt"), 10).await.unwrap();
        assert_eq!(path, PathBuf::from("/d/file_1.txt"));

        let backend = MockBackend::with_files([("d/file.txt", vec![0]), ("d/file_1.txt", vec![0])]);
        let path = find_unique_path(&backend, Path::new("/d/file.txt"), 10).await.unwrap();
        assert_eq!(path, PathBuf::from("/d/file_2.txt"));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let backend = MockBackend::with_files([
            ("a.jpg", vec![0]),
            ("a_1.jpg", vec![0]),
            ("a_2.jpg", vec![0]),
        ]);
        let err = find_unique_path(&backend, Path::new("a.jpg"), 2).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Exhausted { path: PathBuf::from("a.jpg"), attempts: 2 });
        assert_eq!(find_unique_path(&backend, Path::new("a.jpg"), 3).await.unwrap(), PathBuf::from("a_3.jpg"));
    }

    #[tokio::test]
    async fn test_backend_errors_are_not_treated_as_taken() {
        let backend = MockBackend::with_files([("a.jpg", vec![0])]).deny("a_1.jpg");
        let err = find_unique_path(&backend, Path::new("a.jpg"), 5).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Storage(PathBuf::from("a_1.jpg")));
    }
}
