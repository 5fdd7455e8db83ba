//! In-memory checkpoint store for tests.

use crate::error::Result;
use crate::models::{CheckpointFilter, CheckpointRecord};
use crate::store::CheckpointStore;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Keeps every saved record in a vector, in write order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<CheckpointRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store, as if `records` had been saved in order.
    pub fn with_records(records: impl IntoIterator<Item = CheckpointRecord>) -> Self {
        Self { records: RwLock::new(records.into_iter().collect()) }
    }

    /// Snapshot of every record saved so far.
    pub async fn records(&self) -> Vec<CheckpointRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn save(&self, record: &CheckpointRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Vec<CheckpointRecord>> {
        Ok(self.records.read().await.iter().filter(|r| r.id == id).cloned().collect())
    }

    async fn find_by_filter(&self, filter: &CheckpointFilter) -> Result<Vec<CheckpointRecord>> {
        Ok(self.records.read().await.iter().filter(|r| filter.matches(r)).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[tokio::test]
    async fn test_memory_store_behaves_like_an_append_log() {
        let store = MemoryStore::new();
        store.save(&CheckpointRecord::new("job", Category::ById, "plan.csv", ["1"])).await.unwrap();
        store.save(&CheckpointRecord::new("job", Category::ById, "plan.csv", ["2"])).await.unwrap();
        store.save(&CheckpointRecord::new("other", Category::ById, "plan.csv", ["9"])).await.unwrap();

        assert_eq!(store.records().await.len(), 3);
        let loaded = store.load("job").await.unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains("1") && loaded.contains("2"));
        assert_eq!(store.list(&CheckpointFilter::default()).await.unwrap().len(), 2);
    }
}
