use super::error::{ErrorKind, Result};
use super::{BatchSettings, Concurrency, Fatality, ItemSource, Keyed, Outcome, Page, RunSummary};
use crate::progress::{ProgressCallback, ProgressTracker};
use crate::tracker::{ItemCallback, ItemTracker, TrackerItem};
use exn::{Exn, ResultExt};
use futures::StreamExt;
use shoebox_asyncutils::waves;
use shoebox_checkpoint::{AggregatedCheckpoint, CheckpointStore};
use std::error::Error as StdError;
use std::pin::pin;
use tracing::instrument;

/// Callbacks notified while a run progresses.
#[derive(Clone, Default)]
pub struct Observers {
    pub progress: Option<ProgressCallback>,
    pub items: Option<ItemCallback>,
}

/// Drives one resumable run over an [`ItemSource`].
pub struct BatchRunner<'a> {
    store: &'a dyn CheckpointStore,
    checkpoint: &'a AggregatedCheckpoint,
    settings: BatchSettings,
    observers: Observers,
}

impl<'a> BatchRunner<'a> {
    pub fn new(store: &'a dyn CheckpointStore, checkpoint: &'a AggregatedCheckpoint, settings: BatchSettings) -> Self {
        Self { store, checkpoint, settings, observers: Observers::default() }
    }

    pub fn with_observers(mut self, observers: Observers) -> Self {
        self.observers = observers;
        self
    }

    /// Process every item of `source` not already in the checkpoint.
    ///
    /// Per-item errors are tracked and leave the item uncommitted. A fetch
    /// error, a failed checkpoint write or an item error classified as
    /// [fatal](Fatality) aborts the remaining pages; everything committed
    /// before that stays committed.
    #[instrument(skip_all, fields(checkpoint = %self.checkpoint.id, page_size = self.settings.page_size))]
    pub async fn run<S, F, Fut, K>(&self, source: &S, filter: &S::Filter, process: F) -> Result<RunSummary>
    where
        S: ItemSource + ?Sized,
        F: Fn(S::Item) -> Fut,
        Fut: Future<Output = std::result::Result<Outcome, Exn<K>>>,
        K: Fatality + StdError + Send + Sync + 'static,
    {
        self.settings.validate()?;
        let count = source.count(filter, self.settings.page_size).await.or_raise(|| ErrorKind::Count)?;
        tracing::info!(
            total_items = count.total_items,
            total_pages = count.total_pages,
            already_done = self.checkpoint.len(),
            "starting batch run",
        );

        let run = PageRun {
            runner: self,
            source,
            filter,
            process: &process,
            progress: ProgressTracker::new(count.total_items, self.observers.progress.clone()),
            items: ItemTracker::new(count.total_items, self.observers.items.clone()),
        };
        let pages = (1..=count.total_pages).map(|number| Page::new(number, self.settings.page_size));
        let mut summary = RunSummary::new(count);

        match self.settings.concurrency {
            Concurrency::Sequential | Concurrency::Items(_) => {
                for page in pages {
                    summary.absorb(run.page(page).await?);
                }
            },
            Concurrency::Pages(n) => {
                let mut waves = pin!(waves(pages.map(|page| run.page(page)), n));
                while let Some(results) = waves.next().await {
                    // Let the whole wave finish (and commit) before failing.
                    let mut failure = None;
                    for result in results {
                        match result {
                            Ok(page) => summary.absorb(page),
                            Err(err) => failure = failure.or(Some(err)),
                        }
                    }
                    if let Some(err) = failure {
                        return Err(err);
                    }
                }
            },
        }

        tracing::info!(%summary, "batch run complete");
        Ok(summary)
    }
}

/// Everything one page needs, shared by every page of a run.
struct PageRun<'r, 'a, S: ?Sized + ItemSource, F> {
    runner: &'r BatchRunner<'a>,
    source: &'r S,
    filter: &'r S::Filter,
    process: &'r F,
    progress: ProgressTracker,
    items: ItemTracker,
}

impl<S, F, Fut, K> PageRun<'_, '_, S, F>
where
    S: ItemSource + ?Sized,
    F: Fn(S::Item) -> Fut,
    Fut: Future<Output = std::result::Result<Outcome, Exn<K>>>,
    K: Fatality + StdError + Send + Sync + 'static,
{
    async fn page(&self, page: Page) -> Result<RunSummary> {
        let fetched = self.source.fetch_page(page, self.filter).await.or_raise(|| ErrorKind::Fetch(page.number))?;
        let fetched_len = fetched.len();
        let pending: Vec<_> = fetched.into_iter().filter(|item| !self.runner.checkpoint.contains(&item.key())).collect();
        let mut summary = RunSummary { already_done: fetched_len - pending.len(), ..RunSummary::default() };
        tracing::debug!(%page, fetched = fetched_len, pending = pending.len(), "processing page");

        let mut handled = Vec::with_capacity(pending.len());
        let mut fatal = None;
        match self.runner.settings.concurrency {
            Concurrency::Items(n) => {
                let mut waves = pin!(waves(pending.into_iter().map(|item| self.item(item)), n));
                while let Some(results) = waves.next().await {
                    for (key, result) in results {
                        Self::record(key, result, &mut summary, &mut handled, &mut fatal);
                    }
                    if fatal.is_some() {
                        break;
                    }
                }
            },
            Concurrency::Sequential | Concurrency::Pages(_) => {
                for item in pending {
                    let (key, result) = self.item(item).await;
                    Self::record(key, result, &mut summary, &mut handled, &mut fatal);
                    if fatal.is_some() {
                        break;
                    }
                }
            },
        }

        self.commit(page, handled).await?;
        self.progress.increment(summary.attempted());
        if let Some((key, err)) = fatal {
            return Err(err).or_raise(|| ErrorKind::Fatal(key));
        }
        Ok(summary)
    }

    /// Process one item and report its outcome straight away.
    async fn item(&self, item: S::Item) -> (String, std::result::Result<Outcome, Exn<K>>) {
        let key = item.key();
        let result = (self.process)(item).await;
        let tracked = match &result {
            Ok(Outcome::Processed | Outcome::Relocated(_)) => TrackerItem::processed(&key),
            Ok(Outcome::Skipped) => TrackerItem::unprocessed(&key),
            Err(err) => {
                tracing::warn!(%key, error = ?err, fatal = err.is_fatal(), "item failed");
                TrackerItem::error(&key, (**err).to_string())
            },
        };
        self.items.track(tracked);
        (key, result)
    }

    fn record(
        key: String,
        result: std::result::Result<Outcome, Exn<K>>,
        summary: &mut RunSummary,
        handled: &mut Vec<String>,
        fatal: &mut Option<(String, Exn<K>)>,
    ) {
        match result {
            Ok(Outcome::Processed) => {
                summary.processed += 1;
                handled.push(key);
            },
            Ok(Outcome::Relocated(new_key)) => {
                summary.processed += 1;
                handled.push(key);
                handled.push(new_key);
            },
            Ok(Outcome::Skipped) => {
                summary.skipped += 1;
                handled.push(key);
            },
            Err(err) => {
                summary.failed += 1;
                if err.is_fatal() && fatal.is_none() {
                    *fatal = Some((key, err));
                }
            },
        }
    }

    /// Append one partial record for the keys handled in `page`.
    async fn commit(&self, page: Page, handled: Vec<String>) -> Result<()> {
        if handled.is_empty() {
            return Ok(());
        }
        let record = self.runner.checkpoint.partial(handled);
        self.runner.store.save(&record).await.or_raise(|| ErrorKind::Checkpoint(page.number))?;
        tracing::debug!(%page, keys = record.processed.len(), "checkpoint committed");
        Ok(())
    }
}
