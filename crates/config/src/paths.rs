use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::OptionExt;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "checkpoints.sqlite";

/// Platform directories, resolved once at start-up and passed to whatever
/// needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new(config_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self { config_dir: config_dir.into(), data_dir: data_dir.into() }
    }

    /// Resolve the platform's standard directories for shoebox.
    pub fn discover() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "shoebox").ok_or_raise(|| ErrorKind::NoApplicationDirectories)?;
        Ok(Self::new(dirs.config_dir(), dirs.data_dir()))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The implicit configuration file; it is fine for it not to exist.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Where checkpoints live unless configured otherwise.
    pub fn default_database(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}
