use crate::error::{ErrorKind, Result};
use crate::format::merge_file;
use crate::paths::AppPaths;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

const ENV_PREFIX: &str = "SHOEBOX_";
const ENV_NESTING: &str = "__";

const DEFAULT_TEMPLATE: &str = "{{ year }}/{{ month }}/{{ filename }}";
const DEFAULT_EXTENSIONS: [&str; 17] = [
    "jpg", "jpeg", "png", "gif", "heic", "heif", "tif", "tiff", "webp", "dng", "cr2", "nef", "arw", "mp4", "mov",
    "m4v", "3gp",
];

/// Complete application configuration.
///
/// Built once in `main` by layering, lowest priority first: built-in
/// defaults, `config.toml` in the platform config directory, an explicitly
/// named file, and `SHOEBOX_` environment variables (`__` separates nested
/// keys, e.g. `SHOEBOX_BATCH__PAGE_SIZE=500`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub library: LibraryConfig,
    pub checkpoint: CheckpointConfig,
    pub batch: BatchConfig,
    pub naming: NamingConfig,
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Absolute path of the media library; may also be given on the command line.
    pub root: Option<PathBuf>,
    /// Destination path template used when organizing by date.
    pub template: String,
    /// File extensions (lowercase, without dot) treated as media.
    pub extensions: Vec<String>,
}
impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: None,
            template: DEFAULT_TEMPLATE.to_string(),
            extensions: DEFAULT_EXTENSIONS.map(String::from).to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Defaults to a database in the platform data directory.
    pub database: Option<PathBuf>,
    /// Accept checkpoint writes without persisting them.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub page_size: usize,
    pub max_concurrency: usize,
}
impl Default for BatchConfig {
    fn default() -> Self {
        Self { page_size: 200, max_concurrency: 8 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// How many `name_N.ext` candidates to try before giving up.
    pub max_attempts: usize,
}
impl Default for NamingConfig {
    fn default() -> Self {
        Self { max_attempts: 10_000 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Explicit exiftool executable; otherwise searched for in `PATH`.
    pub exiftool: Option<PathBuf>,
    /// Folder name to date dictionary file.
    pub dictionary: Option<PathBuf>,
    /// Write resolved dates back into files that had no EXIF capture date.
    pub apply_dates: bool,
}

impl Config {
    /// Load and validate the layered configuration.
    #[instrument(skip(paths), fields(config_dir = %paths.config_dir().display()))]
    pub fn load(paths: &AppPaths, explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(paths.config_file()));
        if let Some(explicit) = explicit {
            figment = merge_file(figment, explicit)?;
        }
        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_NESTING))
            .extract()
            .or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch.page_size == 0 {
            exn::bail!(ErrorKind::Invalid("batch.page_size must be greater than zero"));
        }
        if self.batch.max_concurrency == 0 {
            exn::bail!(ErrorKind::Invalid("batch.max_concurrency must be greater than zero"));
        }
        if self.naming.max_attempts == 0 {
            exn::bail!(ErrorKind::Invalid("naming.max_attempts must be greater than zero"));
        }
        if self.library.template.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("library.template must not be empty"));
        }
        if self.library.root.as_deref().is_some_and(Path::is_relative) {
            exn::bail!(ErrorKind::Invalid("library.root must be an absolute path"));
        }
        Ok(())
    }

    /// The checkpoint database, falling back to the platform data directory.
    pub fn database_path(&self, paths: &AppPaths) -> PathBuf {
        self.checkpoint.database.clone().unwrap_or_else(|| paths.default_database())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    fn jailed_paths(jail: &Jail) -> AppPaths {
        AppPaths::new(jail.directory().join("config"), jail.directory().join("data"))
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.batch.page_size, 200);
        assert_eq!(config.batch.max_concurrency, 8);
        assert_eq!(config.naming.max_attempts, 10_000);
        assert_eq!(config.library.template, "{{ year }}/{{ month }}/{{ filename }}");
        assert!(config.library.extensions.iter().any(|e| e == "jpg"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_layers_override_in_order() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/config.toml", "[batch]\npage_size = 50\nmax_concurrency = 2\n")?;
            jail.create_file("override.yaml", "batch:\n  page_size: 75\nmetadata:\n  apply_dates: true\n")?;
            jail.set_env("SHOEBOX_BATCH__MAX_CONCURRENCY", "3");

            let paths = jailed_paths(jail);
            let implicit_only = Config::load(&paths, None).unwrap();
            assert_eq!(implicit_only.batch.page_size, 50);

            let config = Config::load(&paths, Some(&jail.directory().join("override.yaml"))).unwrap();
            assert_eq!(config.batch.page_size, 75);
            assert_eq!(config.batch.max_concurrency, 3);
            assert!(config.metadata.apply_dates);
            assert_eq!(config.naming.max_attempts, 10_000);
            Ok(())
        });
    }

    #[test]
    fn test_missing_implicit_file_is_fine() {
        Jail::expect_with(|jail| {
            let config = Config::load(&jailed_paths(jail), None).unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_must_exist() {
        Jail::expect_with(|jail| {
            let missing = jail.directory().join("missing.toml");
            let err = Config::load(&jailed_paths(jail), Some(&missing)).unwrap_err();
            assert_eq!(*err, ErrorKind::NotFound(missing));
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_format() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.ini", "page_size = 1")?;
            let path = jail.directory().join("settings.ini");
            let err = Config::load(&jailed_paths(jail), Some(&path)).unwrap_err();
            assert_eq!(*err, ErrorKind::UnsupportedFormat(path));
            Ok(())
        });
    }

    #[rstest]
    #[case("SHOEBOX_BATCH__PAGE_SIZE")]
    #[case("SHOEBOX_BATCH__MAX_CONCURRENCY")]
    #[case("SHOEBOX_NAMING__MAX_ATTEMPTS")]
    fn test_zero_limits_are_rejected(#[case] variable: &str) {
        Jail::expect_with(|jail| {
            jail.set_env(variable, "0");
            let err = Config::load(&jailed_paths(jail), None).unwrap_err();
            assert!(matches!(*err, ErrorKind::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn test_relative_root_is_rejected() {
        let mut config = Config::default();
        config.library.root = Some(PathBuf::from("photos"));
        assert!(config.validate().is_err());
    }
}
