//! In-memory storage backend for tests.

use super::FileInfoStream;
use crate::StorageBackend;
use crate::error::{Error, ErrorKind, Result};
use crate::models::FileInfo;
use crate::path::validate as validate_path;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, stream};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use time::UtcDateTime;
use tokio::sync::RwLock;

#[derive(Clone)]
struct Stored {
    modified: UtcDateTime,
    data: Vec<u8>,
}

impl Stored {
    fn info(&self, path: &Path) -> FileInfo {
        FileInfo::new(path, self.data.len() as u64, self.modified)
    }
}

/// Files kept in a sorted map behind a [`RwLock`].
///
/// Behaves like [`LocalBackend`](super::LocalBackend) where callers can
/// tell: renames refuse to overwrite and listings are prefix-scoped. Paths
/// passed to [`deny`](Self::deny) fail every operation with
/// [`PermissionDenied`](ErrorKind::PermissionDenied).
///
/// ```
/// use shoebox_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([("inbox/IMG_0001.jpg", b"jpeg")]);
/// assert!(backend.exists(Path::new("inbox/IMG_0001.jpg")).await?);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    files: RwLock<BTreeMap<PathBuf, Stored>>,
    denied: HashSet<PathBuf>,
}

/// Test setup with a bad path is a broken test, so it panics.
fn checked(path: impl Into<PathBuf>, caller: &str) -> PathBuf {
    let path = path.into();
    match validate_path(&path) {
        Ok(valid) => valid,
        Err(_) => panic!("MockBackend::{caller}: invalid path {}", path.display()),
    }
}

impl MockBackend {
    /// Create a mock backend holding the given files.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let modified = UtcDateTime::now();
        let files = files
            .into_iter()
            .map(|(path, data)| (checked(path, "with_files"), Stored { modified, data: data.into() }))
            .collect();
        Self { name: "mock".to_string(), files: RwLock::new(files), denied: HashSet::new() }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Make every operation touching `path` fail with a permission error.
    pub fn deny(mut self, path: impl Into<PathBuf>) -> Self {
        self.denied.insert(checked(path, "deny"));
        self
    }

    /// Every stored path, sorted.
    pub async fn paths(&self) -> Vec<PathBuf> {
        self.files.read().await.keys().cloned().collect()
    }

    fn allowed(&self, path: &Path) -> Result<PathBuf> {
        let path = validate_path(path)?;
        if self.denied.contains(&path) {
            exn::bail!(ErrorKind::PermissionDenied(path));
        }
        Ok(path)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::with_files(std::iter::empty::<(PathBuf, Vec<u8>)>())
    }
}

fn missing(path: PathBuf) -> Error {
    Error::from(ErrorKind::NotFound(path))
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        stream::once(async move {
            let prefix = prefix.map(validate_path).transpose()?;
            let files = self.files.read().await;
            let matching: Vec<Result<FileInfo>> = files
                .iter()
                .filter(|(path, _)| prefix.as_ref().is_none_or(|pfx| path.starts_with(pfx)))
                .map(|(path, stored)| Ok(stored.info(path)))
                .collect();
            Ok::<_, Error>(stream::iter(matching))
        })
        .try_flatten()
        .boxed()
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = self.allowed(path)?;
        Ok(self.files.read().await.contains_key(&path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = self.allowed(path)?;
        let files = self.files.read().await;
        Ok(files.get(&path).ok_or_else(|| missing(path.clone()))?.data.clone())
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = self.allowed(path)?;
        let stored = Stored { modified: UtcDateTime::now(), data: data.to_vec() };
        self.files.write().await.insert(path, stored);
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let path = self.allowed(path)?;
        match self.files.write().await.remove(&path) {
            Some(_) => Ok(()),
            None => Err(missing(path)),
        }
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from = self.allowed(from)?;
        let to = self.allowed(to)?;
        let mut files = self.files.write().await;
        if !files.contains_key(&from) {
            return Err(missing(from));
        }
        if from == to {
            return Ok(());
        }
        if files.contains_key(&to) {
            exn::bail!(ErrorKind::AlreadyExists(to));
        }
        if let Some(stored) = files.remove(&from) {
            files.insert(to, stored);
        }
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let path = self.allowed(path)?;
        let files = self.files.read().await;
        let stored = files.get(&path).ok_or_else(|| missing(path.clone()))?;
        Ok(stored.info(&path))
    }
}
