//! Keyword tagging from folder names.
//!
//! A file filed under `Holidays/Rome/2019` gets the keywords `Holidays` and
//! `Rome` (purely numeric folders such as years and months say nothing), plus
//! whatever extra keywords the caller asks for. Keywords already on the file
//! are kept and never duplicated.

pub mod error;

use self::error::{Error, ErrorKind, Result};
use crate::batch::{BatchRunner, BatchSettings, Concurrency, ListingSource, MediaFilter, Outcome, RunSummary};
use crate::context::Context;
use exn::ResultExt;
use shoebox_checkpoint::Category;
use shoebox_metadata::error::Error as MetadataError;
use shoebox_metadata::{KEYWORDS, PropertyMap, join_list, keywords};
use shoebox_storage::FileInfo;
use std::path::{Component, Path, PathBuf};
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct TagRequest {
    pub checkpoint_id: String,
    pub prefix: Option<PathBuf>,
    pub filter: MediaFilter,
    /// Added to every file on top of the folder keywords.
    pub keywords: Vec<String>,
}

#[instrument(skip_all, fields(checkpoint = %request.checkpoint_id))]
pub async fn tag(ctx: &Context, request: &TagRequest) -> Result<RunSummary> {
    let source = ListingSource::snapshot(ctx.backend.clone(), request.prefix.clone())
        .await
        .or_raise(|| ErrorKind::Listing)?;
    let checkpoint = ctx
        .store
        .load_or_default(&request.checkpoint_id, Category::ByDirectory, &source.source_name())
        .await
        .or_raise(|| ErrorKind::Checkpoint(request.checkpoint_id.clone()))?;
    let settings = BatchSettings::new(ctx.settings.page_size, Concurrency::Items(ctx.settings.max_concurrency));

    BatchRunner::new(ctx.store.as_ref(), &checkpoint, settings)
        .with_observers(ctx.observers.clone())
        .run(&source, &request.filter, |file| tag_file(ctx, file, &request.keywords))
        .await
        .or_raise(|| ErrorKind::Run)
}

#[instrument(skip_all, fields(path = %file.path.display()))]
pub async fn tag_file(ctx: &Context, file: FileInfo, extra: &[String]) -> Result<Outcome> {
    let path = file.path;
    let properties = ctx
        .extractor
        .extract(&path)
        .await
        .map_err(|err| metadata_failure(err, ErrorKind::ReadingExif(path.clone())))?;

    let existing = keywords(&properties);
    let mut merged = existing.clone();
    for keyword in folder_keywords(&path).into_iter().chain(extra.iter().cloned()) {
        if !merged.contains(&keyword) {
            merged.push(keyword);
        }
    }
    if merged == existing {
        return Ok(Outcome::Skipped);
    }

    tracing::debug!(added = merged.len() - existing.len(), "writing keywords");
    let update = PropertyMap::from([(KEYWORDS.to_string(), join_list(&merged))]);
    ctx.writer
        .write(&path, &update)
        .await
        .map_err(|err| metadata_failure(err, ErrorKind::WritingKeywords(path.clone())))?;
    Ok(Outcome::Processed)
}

/// Names of the folders containing `path`, outermost first, skipping purely
/// numeric ones.
pub fn folder_keywords(path: &Path) -> Vec<String> {
    let Some(parent) = path.parent() else {
        return Vec::new();
    };
    parent
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '_'))
        .map(String::from)
        .collect()
}

fn metadata_failure(err: MetadataError, stage: ErrorKind) -> Error {
    match err.is_unavailable() {
        true => err.raise(ErrorKind::ExtractorUnavailable),
        false => err.raise(stage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Settings;
    use rstest::rstest;
    use shoebox_checkpoint::{CheckpointStore, MemoryStore};
    use shoebox_metadata::MemoryMetadata;
    use shoebox_storage::backend::MockBackend;
    use std::sync::Arc;

    #[rstest]
    #[case("Holidays/Rome/2019/07/a.jpg", &["Holidays", "Rome"])]
    #[case("2019/2019-07-14/a.jpg", &[])]
    #[case("a.jpg", &[])]
    #[case("Family 2019/a.jpg", &["Family 2019"])]
    fn test_folder_keywords(#[case] path: &str, #[case] expected: &[&str]) {
        assert_eq!(folder_keywords(Path::new(path)), expected);
    }

    fn request(keywords: &[&str]) -> TagRequest {
        TagRequest {
            checkpoint_id: "tag".to_string(),
            prefix: None,
            filter: MediaFilter::default(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_keywords_are_merged_with_existing_ones() {
        let backend = Arc::new(MockBackend::with_files([
            ("Holidays/Rome/a.jpg", vec![0u8]),
            ("Holidays/Rome/b.jpg", vec![0u8]),
            ("2019/c.jpg", vec![0u8]),
        ]));
        let metadata = Arc::new(
            MemoryMetadata::new()
                .with_properties("Holidays/Rome/a.jpg", [(KEYWORDS, "Rome, Family")])
                .with_properties("Holidays/Rome/b.jpg", [(KEYWORDS, "Holidays, Rome")]),
        );
        let store = Arc::new(MemoryStore::new());
        let ctx = Context::new(backend, store.clone(), metadata.clone(), metadata.clone())
            .with_settings(Settings { page_size: 10, max_concurrency: 4, ..Settings::default() });

        let summary = tag(&ctx, &request(&[])).await.unwrap();
        assert_eq!((summary.processed, summary.skipped), (1, 2));
        let a = metadata.get("Holidays/Rome/a.jpg").await;
        assert_eq!(a.get(KEYWORDS).map(String::as_str), Some("Rome, Family, Holidays"));
        assert!(metadata.get("2019/c.jpg").await.is_empty());

        let summary = tag(&ctx, &TagRequest { checkpoint_id: "extra".to_string(), ..request(&["Scanned"]) })
            .await
            .unwrap();
        assert_eq!(summary.processed, 3);
        let c = metadata.get("2019/c.jpg").await;
        assert_eq!(c.get(KEYWORDS).map(String::as_str), Some("Scanned"));
        assert_eq!(store.load("extra").await.unwrap().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_reported_per_file() {
        let backend = Arc::new(MockBackend::with_files([("Rome/a.jpg", vec![0u8]), ("Rome/b.jpg", vec![0u8])]));
        let metadata = Arc::new(MemoryMetadata::new().fail_on("Rome/b.jpg"));
        let store = Arc::new(MemoryStore::new());
        let ctx = Context::new(backend, store.clone(), metadata.clone(), metadata);

        let summary = tag(&ctx, &request(&[])).await.unwrap();
        assert_eq!((summary.processed, summary.failed), (1, 1));
        let checkpoint = store.load("tag").await.unwrap().unwrap();
        assert!(checkpoint.contains("Rome/a.jpg"));
        assert!(!checkpoint.contains("Rome/b.jpg"));
    }
}
