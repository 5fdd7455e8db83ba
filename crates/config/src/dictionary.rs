use crate::error::{ErrorKind, Result};
use crate::format::merge_file;
use exn::ResultExt;
use figment::Figment;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Values may be written bare in TOML/YAML (`Holidays = 2018`), which parse
/// as numbers rather than strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Entry {
    Text(String),
    Number(i64),
}
impl From<Entry> for String {
    fn from(entry: Entry) -> Self {
        match entry {
            Entry::Text(text) => text,
            Entry::Number(number) => number.to_string(),
        }
    }
}

/// A flat `name → value` mapping loaded from a TOML, YAML or JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary(BTreeMap<String, String>);

impl Dictionary {
    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let entries: BTreeMap<String, Entry> = merge_file(Figment::new(), path)?
            .extract()
            .or_raise(|| ErrorKind::Load)?;
        let entries: BTreeMap<_, _> = entries.into_iter().map(|(k, v)| (k, String::from(v))).collect();
        tracing::debug!(entries = entries.len(), "dictionary loaded");
        Ok(Self(entries))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_toml_with_bare_years() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dates.toml");
        std::fs::write(&path, "Holidays = 2018\n\"Summer in Rome\" = \"2019-07\"\n").unwrap();
        let dictionary = Dictionary::load(&path).unwrap();
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.get("Holidays"), Some("2018"));
        assert_eq!(dictionary.get("Summer in Rome"), Some("2019-07"));
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dates.json");
        std::fs::write(&path, r#"{"Wedding": "2021-05-22"}"#).unwrap();
        assert_eq!(Dictionary::load(&path).unwrap().get("Wedding"), Some("2021-05-22"));
    }

    #[test]
    fn test_missing_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        let err = Dictionary::load(&path).unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound(path));
    }
}
