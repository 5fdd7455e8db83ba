//! Database row types and their conversions to domain models.

use crate::error::{ErrorKind, Result};
use crate::models::{Category, CheckpointRecord};
use exn::ResultExt;
use std::collections::BTreeSet;
use time::UtcDateTime;

const NANOS_PER_MILLI: i128 = 1_000_000;

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct RecordRow {
    pub checkpoint_id: String,
    pub category: String,
    pub source: String,
    pub last_update: i64,
    pub processed: String,
}

impl TryFrom<&CheckpointRecord> for RecordRow {
    type Error = crate::error::Error;

    fn try_from(record: &CheckpointRecord) -> Result<Self> {
        let millis = record.last_update.unix_timestamp_nanos() / NANOS_PER_MILLI;
        Ok(Self {
            checkpoint_id: record.id.clone(),
            category: record.category.to_string(),
            source: record.source.clone(),
            last_update: i64::try_from(millis).or_raise(|| ErrorKind::InvalidData("last_update"))?,
            // A BTreeSet serializes as a sorted array.
            processed: serde_json::to_string(&record.processed).or_raise(|| ErrorKind::InvalidData("processed"))?,
        })
    }
}

impl TryFrom<RecordRow> for CheckpointRecord {
    type Error = crate::error::Error;

    fn try_from(row: RecordRow) -> Result<Self> {
        let last_update = UtcDateTime::from_unix_timestamp_nanos(i128::from(row.last_update) * NANOS_PER_MILLI)
            .or_raise(|| ErrorKind::InvalidData("last_update"))?;
        let processed: BTreeSet<String> =
            serde_json::from_str(&row.processed).or_raise(|| ErrorKind::InvalidData("processed"))?;
        Ok(Self {
            id: row.checkpoint_id,
            category: row.category.parse::<Category>()?,
            source: row.source,
            last_update,
            processed,
        })
    }
}
