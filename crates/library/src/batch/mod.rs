//! Resumable, checkpointed traversal of large item sets.
//!
//! A run counts its [`ItemSource`], splits it into pages and visits them in
//! ascending order (or in bounded waves of pages). Items whose key already
//! appears in the run's [`AggregatedCheckpoint`] are skipped without being
//! touched. After each page one partial [`CheckpointRecord`] holding exactly
//! the keys handled in that page is appended to the store, so an interrupted
//! run loses at most the page in flight and re-running with the same
//! checkpoint id picks up where it stopped.
//!
//! [`AggregatedCheckpoint`]: shoebox_checkpoint::AggregatedCheckpoint
//! [`CheckpointRecord`]: shoebox_checkpoint::CheckpointRecord

pub mod error;
mod runner;
mod source;

pub use self::runner::{BatchRunner, Observers};
pub use self::source::{ItemSource, ListingSource, MediaFilter, PlanSource};
use self::error::{ErrorKind, Result};
use derive_more::Display;
use shoebox_storage::FileInfo;

/// Successful outcome of one item. Every variant is committed to the
/// checkpoint; only errors leave an item to be retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The item was changed.
    Processed,
    /// The item was changed and is now known by another key (a file moved to
    /// a new path). Both keys are committed, so a later listing that finds
    /// the item at its new place treats it as done.
    Relocated(String),
    /// Nothing needed doing (already in place, no date found, ...).
    Skipped,
}

/// Classifies item errors: per-item errors are reported and the run carries
/// on, fatal errors stop the run once the current page is committed.
pub trait Fatality {
    fn is_fatal(&self) -> bool;
}

/// Items carry a stable key that identifies them across runs.
pub trait Keyed {
    fn key(&self) -> String;
}

impl Keyed for FileInfo {
    fn key(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// How pages and items are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    /// Pages in order, items one at a time.
    Sequential,
    /// Pages in order, items of a page in waves of at most `n`.
    Items(usize),
    /// Waves of at most `n` pages at once, items within a page one at a time.
    Pages(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    pub page_size: usize,
    pub concurrency: Concurrency,
}

impl BatchSettings {
    pub fn new(page_size: usize, concurrency: Concurrency) -> Self {
        Self { page_size, concurrency }
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            exn::bail!(ErrorKind::InvalidPageSize);
        }
        if let Concurrency::Items(0) | Concurrency::Pages(0) = self.concurrency {
            exn::bail!(ErrorKind::InvalidConcurrency);
        }
        Ok(())
    }
}

/// Size of an item source once split into pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Count {
    pub total_items: usize,
    pub total_pages: usize,
}

impl Count {
    /// `page_size` must be non-zero, which [`BatchSettings::validate`] ensures.
    pub fn new(total_items: usize, page_size: usize) -> Self {
        Self { total_items, total_pages: total_items.div_ceil(page_size.max(1)) }
    }
}

/// A 1-based page number and the page size it was cut with.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[display("page {number}")]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    pub fn new(number: usize, size: usize) -> Self {
        Self { number, size }
    }

    /// Index of the page's first item.
    pub fn offset(&self) -> usize {
        self.number.saturating_sub(1).saturating_mul(self.size)
    }

    /// Slice this page out of a fully materialized item list.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = start.saturating_add(self.size).min(items.len());
        &items[start..end]
    }
}

/// Totals for one run.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
#[display(
    "{processed} processed, {skipped} skipped, {failed} failed, {already_done} already done ({total_items} items in {total_pages} pages)"
)]
pub struct RunSummary {
    pub total_items: usize,
    pub total_pages: usize,
    /// Items skipped because an earlier run already committed them.
    pub already_done: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub(crate) fn new(count: Count) -> Self {
        Self { total_items: count.total_items, total_pages: count.total_pages, ..Self::default() }
    }

    /// Items actually worked on during this run, whatever the outcome.
    pub fn attempted(&self) -> usize {
        self.processed + self.skipped + self.failed
    }

    pub(crate) fn absorb(&mut self, page: RunSummary) {
        self.already_done += page.already_done;
        self.processed += page.processed;
        self.skipped += page.skipped;
        self.failed += page.failed;
    }
}
