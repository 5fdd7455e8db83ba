//! Local filesystem storage backend.
//!
//! Files live under a configured root directory and are accessed with
//! `tokio::fs`. Dot-files and dot-directories (`.thumbnails`, `.DS_Store`,
//! half-written `.partial` files) are never listed.

use crate::backend::FileInfoStream;
use crate::error::{Error, ErrorKind, Result};
use crate::{FileInfo, StorageBackend, path::validate as validate_path};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::ffi::OsString;
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs;

const PARTIAL_SUFFIX: &str = ".partial";

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use shoebox_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("photos", "/home/me/Pictures")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}

impl LocalBackend {
    /// Create a backend rooted at an absolute directory, creating it when
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if the path is
    /// relative or names something other than a directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() || (root.exists() && !root.is_dir()) {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        // Blocking, but only ever called once while starting up.
        std::fs::create_dir_all(&root).map_err(|err| io_error(err, &root))?;
        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Library-relative path to a location on disk.
    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        Ok(self.root.join(validate_path(path)?))
    }

    /// Location on disk back to a library-relative path.
    fn relativize(&self, absolute: &Path) -> Result<PathBuf> {
        let relative = absolute.strip_prefix(&self.root).or_raise(|| {
            ErrorKind::BackendError(format!("`{}` is outside `{}`", absolute.display(), self.root.display()))
        })?;
        validate_path(relative)
    }

    async fn ensure_parent(&self, absolute: &Path, reported: &Path) -> Result<()> {
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await.map_err(|err| io_error(err, reported))?;
        }
        Ok(())
    }

    /// Moves `from` onto `to` without ever replacing an existing file.
    ///
    /// A hard link fails atomically when `to` is taken. Filesystems without
    /// hard links (FAT-formatted cards, some network shares) fall back to a
    /// existence check followed by a plain rename.
    async fn move_no_clobber(from: &Path, to: &Path, reported: &Path) -> Result<()> {
        match fs::hard_link(from, to).await {
            Ok(()) => return fs::remove_file(from).await.map_err(|err| io_error(err, reported).into()),
            Err(err) if err.kind() == IoErrorKind::AlreadyExists => {
                exn::bail!(ErrorKind::AlreadyExists(reported.to_path_buf()))
            },
            Err(err) if err.kind() == IoErrorKind::NotFound => exn::bail!(io_error(err, reported)),
            Err(err) => tracing::debug!(error = %err, "Hard link unavailable, falling back to rename"),
        }
        if fs::try_exists(to).await.map_err(|err| io_error(err, reported))? {
            exn::bail!(ErrorKind::AlreadyExists(reported.to_path_buf()));
        }
        fs::rename(from, to).await.map_err(|err| io_error(err, reported))?;
        Ok(())
    }

    /// What the walk should do with one directory entry, if anything.
    async fn visit(&self, entry: fs::DirEntry, prefix: Option<&Path>) -> Result<Option<Visit>> {
        if is_hidden(&entry.file_name()) {
            return Ok(None);
        }
        let absolute = entry.path();
        let metadata = entry.metadata().await.map_err(|err| io_error(err, &absolute))?;
        let relative = self.relativize(&absolute)?;
        let in_scope = prefix.is_none_or(|pfx| relative.starts_with(pfx));
        if metadata.is_dir() {
            // A directory above the prefix may still lead into it.
            let leads_in = prefix.is_some_and(|pfx| pfx.starts_with(&relative));
            return Ok((in_scope || leads_in).then_some(Visit::Directory(absolute)));
        }
        if !in_scope || !metadata.is_file() {
            return Ok(None);
        }
        let modified = metadata.modified().map_err(ErrorKind::Io)?;
        Ok(Some(Visit::File(FileInfo::new(relative, metadata.len(), modified))))
    }
}

enum Visit {
    File(FileInfo),
    Directory(PathBuf),
}

fn is_hidden(name: &OsString) -> bool {
    name.as_encoded_bytes().first() == Some(&b'.')
}

fn io_error(err: IoError, path: &Path) -> ErrorKind {
    match err.kind() {
        IoErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
        IoErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
        IoErrorKind::AlreadyExists => ErrorKind::AlreadyExists(path.to_path_buf()),
        _ => ErrorKind::Io(err),
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        Box::pin(stream! {
            let prefix = match prefix.map(validate_path).transpose() {
                Ok(prefix) => prefix,
                Err(err) => {
                    yield Err(err);
                    return;
                },
            };
            let mut pending = vec![self.root.clone()];
            while let Some(directory) = pending.pop() {
                let mut entries = match fs::read_dir(&directory).await {
                    Ok(entries) => entries,
                    Err(err) if err.kind() == IoErrorKind::NotFound => continue,
                    Err(err) => {
                        yield Err(Error::from(io_error(err, &directory)));
                        continue;
                    },
                };
                loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break,
                        Err(err) => {
                            // The directory handle is unusable after a failed read.
                            yield Err(Error::from(io_error(err, &directory)));
                            break;
                        },
                    };
                    match self.visit(entry, prefix.as_deref()).await {
                        Ok(Some(Visit::File(file))) => yield Ok(file),
                        Ok(Some(Visit::Directory(child))) => pending.push(child),
                        Ok(None) => {},
                        Err(err) => yield Err(err),
                    }
                }
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let absolute = self.resolve(path)?;
        Ok(fs::try_exists(&absolute).await.map_err(|err| io_error(err, path))?)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let absolute = self.resolve(path)?;
        Ok(fs::read(&absolute).await.map_err(|err| io_error(err, path))?)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let absolute = self.resolve(path)?;
        self.ensure_parent(&absolute, path).await?;
        // Written beside the target first so a crash never leaves a truncated photo.
        let mut partial_name = OsString::from(".");
        partial_name.push(absolute.file_name().unwrap_or_default());
        partial_name.push(PARTIAL_SUFFIX);
        let partial = absolute.with_file_name(partial_name);
        fs::write(&partial, data).await.map_err(|err| io_error(err, path))?;
        if let Err(err) = fs::rename(&partial, &absolute).await {
            let _ = fs::remove_file(&partial).await;
            exn::bail!(io_error(err, path));
        }
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let absolute = self.resolve(path)?;
        Ok(fs::remove_file(&absolute).await.map_err(|err| io_error(err, path))?)
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        if !fs::try_exists(&source).await.map_err(|err| io_error(err, from))? {
            exn::bail!(ErrorKind::NotFound(from.to_path_buf()));
        }
        if source == target {
            return Ok(());
        }
        self.ensure_parent(&target, to).await?;
        tracing::trace!(from = %from.display(), to = %to.display(), "Moving file");
        Self::move_no_clobber(&source, &target, to).await
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let absolute = self.resolve(path)?;
        let metadata = fs::metadata(&absolute).await.map_err(|err| io_error(err, path))?;
        let modified = metadata.modified().map_err(ErrorKind::Io)?;
        Ok(FileInfo::new(validate_path(path)?, metadata.len(), modified))
    }
}
