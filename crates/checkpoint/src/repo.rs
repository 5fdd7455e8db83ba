//! SQLite-backed checkpoint store.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{CheckpointFilter, CheckpointRecord};
use crate::row::RecordRow;
use crate::store::CheckpointStore;
use async_trait::async_trait;
use exn::ResultExt;
use sqlx::SqlitePool;

/// Appends checkpoint records to the `checkpoint_records` table.
///
/// In dry-run mode every write is accepted and discarded, so a rehearsal run
/// never leaves progress behind that a real run would then skip over.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    dry_run: bool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone(), dry_run: false }
    }
}
impl Repository {
    pub fn new(pool: SqlitePool, dry_run: bool) -> Self {
        Self { pool, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn into_records(rows: Vec<RecordRow>) -> Result<Vec<CheckpointRecord>> {
        rows.into_iter().map(CheckpointRecord::try_from).collect()
    }
}

#[async_trait]
impl CheckpointStore for Repository {
    async fn save(&self, record: &CheckpointRecord) -> Result<()> {
        if self.dry_run {
            tracing::debug!(id = %record.id, keys = record.processed.len(), "dry run: checkpoint not written");
            return Ok(());
        }
        let row = RecordRow::try_from(record)?;
        sqlx::query(include_str!("../queries/insert_record.sql"))
            .bind(row.checkpoint_id)
            .bind(row.category)
            .bind(row.source)
            .bind(row.last_update)
            .bind(row.processed)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Vec<CheckpointRecord>> {
        let rows: Vec<RecordRow> = sqlx::query_as(include_str!("../queries/find_by_id.sql"))
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Self::into_records(rows)
    }

    async fn find_by_filter(&self, filter: &CheckpointFilter) -> Result<Vec<CheckpointRecord>> {
        let rows: Vec<RecordRow> = sqlx::query_as(include_str!("../queries/find_by_filter.sql"))
            .bind(filter.id.as_deref())
            .bind(filter.category.map(|c| c.to_string()))
            .bind(filter.source.as_deref())
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Self::into_records(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use std::collections::BTreeSet;

    async fn repository() -> Repository {
        let db = Database::connect_in_memory().await.unwrap();
        Repository::from(&db)
    }

    #[tokio::test]
    async fn test_save_appends_and_load_aggregates() {
        let repo = repository().await;
        let checkpoint = repo.load_or_default("job", Category::ByDirectory, "local:photos").await.unwrap();
        assert!(checkpoint.is_empty());

        repo.save(&checkpoint.partial(["a.jpg", "b.jpg"])).await.unwrap();
        repo.save(&checkpoint.partial(["b.jpg", "c.jpg"])).await.unwrap();

        assert_eq!(repo.find_by_id("job").await.unwrap().len(), 2);
        let loaded = repo.load("job").await.unwrap().unwrap();
        let expected: BTreeSet<String> = ["a.jpg", "b.jpg", "c.jpg"].into_iter().map(String::from).collect();
        assert_eq!(loaded.processed, expected);
        assert_eq!(loaded.source, "local:photos");
    }

    #[tokio::test]
    async fn test_load_unknown_id_is_none() {
        let repo = repository().await;
        assert!(repo.load("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::new(db.pool().clone(), true);
        repo.save(&CheckpointRecord::new("job", Category::ById, "plan.csv", ["1"])).await.unwrap();
        assert!(Repository::from(&db).find_by_id("job").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_filter_treats_none_as_wildcard() {
        let repo = repository().await;
        repo.save(&CheckpointRecord::new("one", Category::ByDirectory, "local:a", ["x"])).await.unwrap();
        repo.save(&CheckpointRecord::new("two", Category::ById, "plan.csv", ["1"])).await.unwrap();
        repo.save(&CheckpointRecord::new("three", Category::ByDirectory, "local:b", ["y"])).await.unwrap();

        assert_eq!(repo.find_by_filter(&CheckpointFilter::default()).await.unwrap().len(), 3);
        let directories = repo
            .find_by_filter(&CheckpointFilter::default().category(Category::ByDirectory))
            .await
            .unwrap();
        assert_eq!(directories.len(), 2);
        let exact = repo
            .find_by_filter(&CheckpointFilter::default().category(Category::ByDirectory).source("local:b"))
            .await
            .unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].id, "three");

        let listed = repo.list(&CheckpointFilter::default().id("two")).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].category, Category::ById);
    }
}
