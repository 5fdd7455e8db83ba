use super::numbered;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Counter {
    remaining: usize,
    issued: usize,
}

/// Numbers names that several files will end up sharing during one run.
///
/// Built from a histogram of how many files will ultimately claim each name.
/// Names claimed only once never get a number, so a run that renames nothing
/// into a collision leaves every name bare. Numbers are decided before any
/// file moves, which makes them independent of what is already on disk and
/// of the order in which a resumed run gets to the files.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceIdentifier {
    counters: HashMap<String, Counter>,
}

impl OccurrenceIdentifier {
    /// Start from `name → expected count`.
    pub fn new<S: Into<String>>(histogram: impl IntoIterator<Item = (S, usize)>) -> Self {
        Self {
            counters: histogram
                .into_iter()
                .map(|(name, remaining)| (name.into(), Counter { remaining, issued: 0 }))
                .collect(),
        }
    }

    /// Count `names` and keep only those appearing more than once.
    pub fn from_names<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut histogram: HashMap<String, usize> = HashMap::new();
        for name in names {
            *histogram.entry(name.as_ref().to_string()).or_default() += 1;
        }
        Self::new(histogram.into_iter().filter(|(_, count)| *count > 1))
    }

    /// Next 1-based number for `name`, or `None` when the name needs no
    /// number (unknown, or every expected occurrence already numbered).
    pub fn generate_unique_identifier(&mut self, name: &str) -> Option<usize> {
        let counter = self.counters.get_mut(name)?;
        if counter.remaining == 0 {
            return None;
        }
        counter.remaining -= 1;
        counter.issued += 1;
        Some(counter.issued)
    }

    /// `dir/stem.ext` with occurrence `index` becomes `dir/stem-<index>.ext`.
    pub fn with_occurrence(path: &Path, index: usize) -> PathBuf {
        numbered(path, "-", index)
    }

    /// Number `path` if its name (as counted) needs it, otherwise keep it.
    pub fn assign(&mut self, name: &str, path: &Path) -> PathBuf {
        match self.generate_unique_identifier(name) {
            Some(index) => Self::with_occurrence(path, index),
            None => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_run_out() {
        let mut occurrences = OccurrenceIdentifier::new([("x", 2)]);
        assert_eq!(occurrences.generate_unique_identifier("x"), Some(1));
        assert_eq!(occurrences.generate_unique_identifier("x"), Some(2));
        assert_eq!(occurrences.generate_unique_identifier("x"), None);
        assert_eq!(occurrences.generate_unique_identifier("y"), None);
    }

    #[test]
    fn test_from_names_ignores_singletons() {
        let mut occurrences = OccurrenceIdentifier::from_names(["a/x.jpg", "b.jpg", "a/x.jpg", "a/x.jpg"]);
        assert_eq!(occurrences.generate_unique_identifier("b.jpg"), None);
        assert_eq!(occurrences.generate_unique_identifier("a/x.jpg"), Some(1));
        assert_eq!(occurrences.generate_unique_identifier("a/x.jpg"), Some(2));
        assert_eq!(occurrences.generate_unique_identifier("a/x.jpg"), Some(3));
        assert_eq!(occurrences.generate_unique_identifier("a/x.jpg"), None);
    }

    #[test]
    fn test_assign() {
        let mut occurrences = OccurrenceIdentifier::from_names(["Plage/x.jpg", "Plage/x.jpg"]);
        let path = Path::new("Plage/x.jpg");
        assert_eq!(occurrences.assign("Plage/x.jpg", path), PathBuf::from("Plage/x-1.jpg"));
        assert_eq!(occurrences.assign("Plage/x.jpg", path), PathBuf::from("Plage/x-2.jpg"));
        assert_eq!(occurrences.assign("Plage/y.jpg", Path::new("Plage/y.jpg")), PathBuf::from("Plage/y.jpg"));
    }
}
