use crate::error::{ErrorKind, Result};
use figment::Figment;
use figment::providers::{Format, Json, Toml, Yaml};
use std::path::Path;

/// Merge a file into `figment`, picking the parser from the file extension.
///
/// Unlike the implicit configuration file, an explicitly named file must
/// exist.
pub(crate) fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    if !path.is_file() {
        exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
    }
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}
