//! Date-based reorganization of a library.
//!
//! Every media file under a prefix is given a capture date by
//! [`CompiledDate`](shoebox_metadata::CompiledDate) and moved to the path the
//! configured [`PathGenerator`](crate::PathGenerator) renders for that date.
//! Progress is checkpointed per page under [`Category::ByDirectory`], keyed by
//! the file's path at the time the listing was taken and, for moved files,
//! by the path it was moved to as well.

pub mod error;
mod file;

pub use self::file::organize_file;
use self::error::{ErrorKind, Result};
use crate::batch::{BatchRunner, BatchSettings, Concurrency, ListingSource, MediaFilter, RunSummary};
use crate::context::Context;
use exn::ResultExt;
use shoebox_checkpoint::Category;
use std::path::PathBuf;
use tracing::instrument;

/// What to organize and under which checkpoint.
#[derive(Debug, Clone)]
pub struct OrganizeRequest {
    pub checkpoint_id: String,
    /// Only files below this folder; the whole library when `None`.
    pub prefix: Option<PathBuf>,
    pub filter: MediaFilter,
}

#[instrument(skip_all, fields(checkpoint = %request.checkpoint_id))]
pub async fn organize(ctx: &Context, request: &OrganizeRequest) -> Result<RunSummary> {
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
        .run(&source, &request.filter, |file| organize_file(ctx, file))
        .await
        .or_raise(|| ErrorKind::Run)
}
