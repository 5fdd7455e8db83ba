//! Metadata access through an external `exiftool` process.
//!
//! File contents are piped through the process (`-` as the input file) rather
//! than handing exiftool a filesystem path, so any [`StorageBackend`] works,
//! not only local disks.
//!
//! [`StorageBackend`]: shoebox_storage::StorageBackend

use crate::consts::LIST_SEPARATOR;
use crate::error::{ErrorKind, Result};
use crate::property::{MetadataExtractor, MetadataWriter, PropertyMap};
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use serde_json::Value;
use shoebox_storage::BackendHandle;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::instrument;

const EXECUTABLES: [&str; 2] = ["exiftool", "exiftool.exe"];
/// Echoed back by exiftool in every JSON object; not a property of the file.
const SOURCE_FILE: &str = "SourceFile";

/// Reads and writes metadata with exiftool, fetching file contents from a
/// storage backend.
#[derive(Clone)]
pub struct Exiftool {
    backend: BackendHandle,
    executable: PathBuf,
}

impl Exiftool {
    pub fn new(backend: BackendHandle, executable: impl Into<PathBuf>) -> Self {
        Self { backend, executable: executable.into() }
    }

    /// Locate exiftool, preferring an explicitly configured executable over
    /// whatever is found in `PATH`.
    pub fn discover(backend: BackendHandle, configured: Option<&Path>) -> Result<Self> {
        if let Some(configured) = configured {
            return match which::which(configured) {
                Ok(path) => Ok(Self::new(backend, path)),
                Err(_) => {
                    tracing::info!(configured = %configured.display(), "configured exiftool is not executable");
                    exn::bail!(ErrorKind::ExiftoolNotFound)
                },
            };
        }
        for exe in EXECUTABLES {
            if let Ok(path) = which::which(exe) {
                tracing::debug!(exiftool = %path.display(), "discovered exiftool");
                return Ok(Self::new(backend, path));
            }
        }
        tracing::info!("exiftool executable not found in PATH");
        exn::bail!(ErrorKind::ExiftoolNotFound);
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Run exiftool with `args`, feeding `input` on stdin; returns stdout.
    async fn run(&self, path: &Path, args: &[String], input: Vec<u8>) -> Result<Vec<u8>> {
        let process_error = |message: String| ErrorKind::Process { path: path.to_path_buf(), message };
        let mut child = Command::new(&self.executable)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .or_raise(|| ErrorKind::Spawn(self.executable.clone()))?;
        let mut stdin = child.stdin.take().ok_or_raise(|| process_error("stdin unavailable".to_string()))?;
        // Feed stdin while reading stdout, otherwise a large file fills the
        // pipe buffers on both sides and neither process makes progress.
        let feed = async move {
            let written = stdin.write_all(&input).await;
            drop(stdin);
            written
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.or_raise(|| process_error("process did not complete".to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            exn::bail!(process_error(format!("{} ({stderr})", output.status)));
        }
        // exiftool may legitimately stop reading early once it has what it
        // needs, so a broken pipe only matters when the process also failed.
        if let Err(err) = fed {
            tracing::trace!(path = %path.display(), error = %err, "exiftool closed stdin early");
        }
        Ok(output.stdout)
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.backend.read(path).await.or_raise(|| ErrorKind::Storage(path.to_path_buf()))
    }
}

#[async_trait]
impl MetadataExtractor for Exiftool {
    #[instrument(skip_all, fields(path = %path.display()))]
    async fn extract(&self, path: &Path) -> Result<PropertyMap> {
        let input = self.read_file(path).await?;
        let args = ["-json", "-sep", LIST_SEPARATOR, "-"].map(String::from);
        let stdout = self.run(path, &args, input).await?;
        parse_json_output(&stdout).or_raise(|| ErrorKind::InvalidOutput(path.to_path_buf()))
    }
}

#[async_trait]
impl MetadataWriter for Exiftool {
    #[instrument(skip_all, fields(path = %path.display(), properties = properties.len()))]
    async fn write(&self, path: &Path, properties: &PropertyMap) -> Result<()> {
        if properties.is_empty() {
            return Ok(());
        }
        let input = self.read_file(path).await?;
        let mut args: Vec<String> = vec!["-sep".into(), LIST_SEPARATOR.into()];
        args.extend(properties.iter().map(|(tag, value)| format!("-{tag}={value}")));
        // Read from stdin, write the modified file to stdout.
        args.extend(["-o", "-", "-"].map(String::from));
        let modified = self.run(path, &args, input).await?;
        if modified.is_empty() {
            exn::bail!(ErrorKind::InvalidOutput(path.to_path_buf()));
        }
        self.backend
            .write(path, &modified)
            .await
            .or_raise(|| ErrorKind::Storage(path.to_path_buf()))
    }
}

/// Parse the output of `exiftool -json` for a single input.
fn parse_json_output(stdout: &[u8]) -> std::result::Result<PropertyMap, serde_json::Error> {
    let objects: Vec<BTreeMap<String, Value>> = serde_json::from_slice(stdout)?;
    Ok(objects
        .into_iter()
        .next()
        .unwrap_or_default()
        .into_iter()
        .filter(|(tag, _)| tag != SOURCE_FILE)
        .map(|(tag, value)| (tag, value_to_string(value)))
        .collect())
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Array(items) => items.into_iter().map(value_to_string).collect::<Vec<_>>().join(LIST_SEPARATOR),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
