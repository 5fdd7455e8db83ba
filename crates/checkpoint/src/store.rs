use crate::aggregate::{aggregate, aggregate_with_filter};
use crate::error::Result;
use crate::models::{AggregatedCheckpoint, Category, CheckpointFilter, CheckpointRecord};
use async_trait::async_trait;

/// Append-only persistence for checkpoint records.
///
/// Implementors only need to store and retrieve raw records. Aggregation is
/// provided on top, so every store answers `load` and `list` the same way.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Append one record. Never overwrites earlier records.
    async fn save(&self, record: &CheckpointRecord) -> Result<()>;

    /// Every record ever written for `id`, in write order.
    async fn find_by_id(&self, id: &str) -> Result<Vec<CheckpointRecord>>;

    /// Every record matching `filter`, in write order.
    async fn find_by_filter(&self, filter: &CheckpointFilter) -> Result<Vec<CheckpointRecord>>;

    /// The aggregated checkpoint for `id`, if any record exists.
    async fn load(&self, id: &str) -> Result<Option<AggregatedCheckpoint>> {
        Ok(aggregate(self.find_by_id(id).await?))
    }

    /// The aggregated checkpoint for `id`, or a fresh empty one.
    async fn load_or_default(&self, id: &str, category: Category, source: &str) -> Result<AggregatedCheckpoint> {
        match self.load(id).await? {
            Some(checkpoint) => {
                if checkpoint.category != category || checkpoint.source != source {
                    tracing::warn!(
                        id,
                        stored_category = %checkpoint.category,
                        stored_source = %checkpoint.source,
                        %category,
                        source,
                        "resuming a checkpoint that was started against a different source",
                    );
                }
                Ok(checkpoint)
            },
            None => Ok(AggregatedCheckpoint::fresh(id, category, source)),
        }
    }

    /// Aggregated checkpoints matching `filter`, most recently updated first.
    async fn list(&self, filter: &CheckpointFilter) -> Result<Vec<AggregatedCheckpoint>> {
        Ok(aggregate_with_filter(self.find_by_filter(filter).await?, filter))
    }
}
