use crate::consts::{KEYWORDS, LIST_SEPARATOR};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;

/// Metadata tag name to value, as reported by the extractor. Multi-valued
/// tags are joined with [`LIST_SEPARATOR`].
pub type PropertyMap = BTreeMap<String, String>;

/// Reads the metadata properties of a media file.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<PropertyMap>;
}

/// Writes metadata properties into a media file, leaving unmentioned
/// properties untouched.
#[async_trait]
pub trait MetadataWriter: Send + Sync {
    async fn write(&self, path: &Path, properties: &PropertyMap) -> Result<()>;
}

/// Split the `Keywords` property into its individual, trimmed keywords.
pub fn keywords(properties: &PropertyMap) -> Vec<String> {
    properties
        .get(KEYWORDS)
        .map(|value| split_list(value))
        .unwrap_or_default()
}

pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(LIST_SEPARATOR.trim())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

pub fn join_list<S: AsRef<str>>(values: &[S]) -> String {
    values.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(LIST_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_split_and_trimmed() {
        let properties = PropertyMap::from([(KEYWORDS.to_string(), "Rome, Summer ,,family".to_string())]);
        assert_eq!(keywords(&properties), ["Rome", "Summer", "family"]);
        assert!(keywords(&PropertyMap::new()).is_empty());
    }

    #[test]
    fn test_join_list() {
        assert_eq!(join_list(&["Rome", "Summer"]), "Rome, Summer");
        assert_eq!(join_list::<&str>(&[]), "");
    }
}
