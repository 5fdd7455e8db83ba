use crate::error::{Error, ErrorKind};
use derive_more::Display;
use std::collections::BTreeSet;
use std::str::FromStr;
use time::UtcDateTime;

/// How the items of a checkpointed job are identified.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Items are files discovered by walking a directory; keys are paths.
    #[display("BY_DIRECTORY")]
    ByDirectory,
    /// Items come from an external plan; keys are plan identifiers.
    #[display("BY_ID")]
    ById,
}
impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BY_DIRECTORY" => Ok(Self::ByDirectory),
            "BY_ID" => Ok(Self::ById),
            other => Err(ErrorKind::UnknownCategory(other.to_string()).into()),
        }
    }
}

/// One partial, immutable progress entry.
///
/// Its `processed` set only covers the keys finished by a single commit; the
/// full picture for a job is the union over every record with the same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointRecord {
    pub id: String,
    pub category: Category,
    pub source: String,
    pub last_update: UtcDateTime,
    pub processed: BTreeSet<String>,
}
impl CheckpointRecord {
    /// Create a record stamped with the current time.
    pub fn new<K: Into<String>>(
        id: impl Into<String>,
        category: Category,
        source: impl Into<String>,
        processed: impl IntoIterator<Item = K>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            source: source.into(),
            last_update: UtcDateTime::now(),
            processed: processed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_last_update(mut self, last_update: UtcDateTime) -> Self {
        self.last_update = last_update;
        self
    }
}

/// The logical checkpoint of one job: the union of all of its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedCheckpoint {
    pub id: String,
    pub category: Category,
    pub source: String,
    /// Latest `last_update` across all contributing records.
    pub last_update: UtcDateTime,
    pub processed: BTreeSet<String>,
}
impl AggregatedCheckpoint {
    /// A checkpoint for a job that has not committed anything yet.
    pub fn fresh(id: impl Into<String>, category: Category, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category,
            source: source.into(),
            last_update: UtcDateTime::now(),
            processed: BTreeSet::new(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.processed.contains(key)
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    /// Build the next partial record for this job, covering only `keys`.
    pub fn partial<K: Into<String>>(&self, keys: impl IntoIterator<Item = K>) -> CheckpointRecord {
        CheckpointRecord::new(self.id.clone(), self.category, self.source.clone(), keys)
    }
}
impl From<CheckpointRecord> for AggregatedCheckpoint {
    fn from(record: CheckpointRecord) -> Self {
        Self {
            id: record.id,
            category: record.category,
            source: record.source,
            last_update: record.last_update,
            processed: record.processed,
        }
    }
}

/// Conjunctive filter over checkpoint records; `None` matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointFilter {
    pub id: Option<String>,
    pub category: Option<Category>,
    pub source: Option<String>,
}
impl CheckpointFilter {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn matches(&self, record: &CheckpointRecord) -> bool {
        self.id.as_deref().is_none_or(|id| id == record.id)
            && self.category.is_none_or(|category| category == record.category)
            && self.source.as_deref().is_none_or(|source| source == record.source)
    }
}
