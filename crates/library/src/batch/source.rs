use super::error::{ErrorKind, Result};
use super::{Count, Keyed, Page};
use async_trait::async_trait;
use exn::ResultExt;
use shoebox_storage::{BackendHandle, FileInfo};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Where a batch gets its items from.
///
/// Pages must be stable for the duration of a run: fetching page `n` twice
/// returns the same items, and together the pages cover every item exactly
/// once.
#[async_trait]
pub trait ItemSource: Send + Sync {
    type Item: Keyed + Send;
    type Filter: Send + Sync;

    async fn count(&self, filter: &Self::Filter, page_size: usize) -> Result<Count>;

    async fn fetch_page(&self, page: Page, filter: &Self::Filter) -> Result<Vec<Self::Item>>;
}

/// Restricts a listing to media files by extension (case-insensitive). An
/// empty filter lets everything through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFilter {
    extensions: BTreeSet<String>,
}

impl MediaFilter {
    pub fn new<S: AsRef<str>>(extensions: impl IntoIterator<Item = S>) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, file: &FileInfo) -> bool {
        self.extensions.is_empty() || file.extension().is_some_and(|e| self.extensions.contains(&e))
    }
}

/// Files under a prefix of a storage backend.
///
/// The listing is taken once, when the source is created, and sorted by
/// path. Files moved around by the run itself therefore neither shift page
/// boundaries nor get visited twice.
pub struct ListingSource {
    backend: BackendHandle,
    prefix: Option<PathBuf>,
    files: Vec<FileInfo>,
}

impl ListingSource {
    #[tracing::instrument(skip(backend), fields(backend = backend.name()))]
    pub async fn snapshot(backend: BackendHandle, prefix: Option<PathBuf>) -> Result<Self> {
        let mut files = backend.list(prefix.as_deref()).await.or_raise(|| ErrorKind::Source)?;
        files.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(files = files.len(), "listing snapshot taken");
        Ok(Self { backend, prefix, files })
    }

    /// Checkpoint source string identifying this listing: `<backend>:<prefix>`.
    pub fn source_name(&self) -> String {
        let prefix = self.prefix.as_deref().map(Path::to_string_lossy).unwrap_or_default();
        format!("{}:{prefix}", self.backend.name())
    }

    fn filtered<'a>(&'a self, filter: &'a MediaFilter) -> impl Iterator<Item = &'a FileInfo> + 'a {
        self.files.iter().filter(|f| filter.matches(f))
    }
}

#[async_trait]
impl ItemSource for ListingSource {
    type Item = FileInfo;
    type Filter = MediaFilter;

    async fn count(&self, filter: &MediaFilter, page_size: usize) -> Result<Count> {
        Ok(Count::new(self.filtered(filter).count(), page_size))
    }

    async fn fetch_page(&self, page: Page, filter: &MediaFilter) -> Result<Vec<FileInfo>> {
        Ok(self.filtered(filter).skip(page.offset()).take(page.size).cloned().collect())
    }
}

/// Items computed up front and held in memory, such as a merge plan.
pub struct PlanSource<T> {
    items: Vec<T>,
}

impl<T> PlanSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl<T: Keyed + Clone + Send + Sync> ItemSource for PlanSource<T> {
    type Item = T;
    type Filter = ();

    async fn count(&self, _filter: &(), page_size: usize) -> Result<Count> {
        Ok(Count::new(self.items.len(), page_size))
    }

    async fn fetch_page(&self, page: Page, _filter: &()) -> Result<Vec<T>> {
        Ok(page.slice(&self.items).to_vec())
    }
}
