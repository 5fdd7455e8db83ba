use crate::calendar::date;
use crate::consts::DICTIONARY_VALUE;
use std::collections::BTreeMap;
use std::path::{Component, Path};
use time::{Date, PrimitiveDateTime, Time};

/// Maps well-known folder names to the date they stand for.
///
/// Values are `YYYY`, `YYYY-MM` or `YYYY-MM-DD`; missing parts default to the
/// first month or day. Entries whose value doesn't parse are ignored (and
/// logged) when looked up rather than failing the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateDictionary {
    entries: BTreeMap<String, String>,
}

impl DateDictionary {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the folders containing `path`, deepest first.
    pub fn lookup(&self, path: &Path) -> Option<PrimitiveDateTime> {
        let parent = path.parent()?;
        let mut folders: Vec<_> = parent
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();
        folders.reverse();
        folders.into_iter().find_map(|folder| {
            let value = self.entries.get(folder)?;
            let parsed = parse_value(value);
            if parsed.is_none() {
                tracing::warn!(folder, value = value.as_str(), "ignoring unparseable dictionary date");
            }
            parsed.map(|d| PrimitiveDateTime::new(d, Time::MIDNIGHT))
        })
    }
}

impl From<BTreeMap<String, String>> for DateDictionary {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self::new(entries)
    }
}

fn parse_value(value: &str) -> Option<Date> {
    let captures = DICTIONARY_VALUE.captures(value.trim())?;
    let part = |i: usize, default: u8| captures.get(i).map_or(Some(default), |m| m.as_str().parse().ok());
    date(captures[1].parse().ok()?, part(2, 1)?, part(3, 1)?)
}
