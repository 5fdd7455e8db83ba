//! In-memory metadata for tests.

use crate::error::{ErrorKind, Result};
use crate::property::{MetadataExtractor, MetadataWriter, PropertyMap};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Extractor and writer over a map of path to properties.
///
/// Files never registered extract as an empty property map. Paths passed to
/// [`fail_on`](Self::fail_on) fail both reading and writing with
/// [`Unavailable`](ErrorKind::Unavailable).
#[derive(Debug, Default)]
pub struct MemoryMetadata {
    properties: RwLock<HashMap<PathBuf, PropertyMap>>,
    failing: HashSet<PathBuf>,
}

impl MemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties<K: Into<String>, V: Into<String>>(
        mut self,
        path: impl Into<PathBuf>,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        let properties = properties.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.properties.get_mut().insert(path.into(), properties);
        self
    }

    pub fn fail_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    /// Current properties of `path`, including anything written.
    pub async fn get(&self, path: impl AsRef<Path>) -> PropertyMap {
        self.properties.read().await.get(path.as_ref()).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl MetadataExtractor for MemoryMetadata {
    async fn extract(&self, path: &Path) -> Result<PropertyMap> {
        if self.failing.contains(path) {
            exn::bail!(ErrorKind::Unavailable(path.to_path_buf()));
        }
        Ok(self.get(path).await)
    }
}

#[async_trait]
impl MetadataWriter for MemoryMetadata {
    async fn write(&self, path: &Path, properties: &PropertyMap) -> Result<()> {
        if self.failing.contains(path) {
            exn::bail!(ErrorKind::Unavailable(path.to_path_buf()));
        }
        let mut all = self.properties.write().await;
        all.entry(path.to_path_buf())
            .or_default()
            .extend(properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_merges_properties() {
        let metadata = MemoryMetadata::new().with_properties("a.jpg", [("Make", "Canon"), ("Keywords", "old")]);
        let update = PropertyMap::from([("Keywords".to_string(), "new".to_string())]);
        metadata.write(Path::new("a.jpg"), &update).await.unwrap();
        let properties = metadata.extract(Path::new("a.jpg")).await.unwrap();
        assert_eq!(properties.get("Make").map(String::as_str), Some("Canon"));
        assert_eq!(properties.get("Keywords").map(String::as_str), Some("new"));
    }

    #[tokio::test]
    async fn test_failing_path() {
        let metadata = MemoryMetadata::new().fail_on("broken.jpg");
        let err = metadata.extract(Path::new("broken.jpg")).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Unavailable(PathBuf::from("broken.jpg")));
        assert!(metadata.extract(Path::new("unknown.jpg")).await.unwrap().is_empty());
    }
}
