//! Merging groups of duplicate files.
//!
//! An external deduplication tool produces a list of groups of identical
//! files ([`read_groups`]). Each group is reduced to its first file, which
//! moves into a folder combining every copy's folder (see
//! [`merge_duplicate_paths`](crate::naming::merge_duplicate_paths)); the
//! other copies are deleted once their content is confirmed identical.
//!
//! The whole [`plan`] is computed before the run starts and progress is
//! checkpointed per group id under [`Category::ById`].

pub mod error;
mod import;
mod plan;
mod run;

pub use self::import::{DuplicateFile, DuplicateGroup, read_groups, read_groups_from_path};
pub use self::plan::{MergeItem, plan};
pub use self::run::merge_group;
use self::error::{ErrorKind, Result};
use crate::batch::{BatchRunner, BatchSettings, Concurrency, PlanSource, RunSummary};
use crate::context::Context;
use exn::ResultExt;
use shoebox_checkpoint::Category;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub checkpoint_id: String,
    /// Names the duplicate list the groups came from, usually its file name.
    pub source: String,
    pub groups: Vec<DuplicateGroup>,
}

#[instrument(skip_all, fields(checkpoint = %request.checkpoint_id, groups = request.groups.len()))]
pub async fn merge(ctx: &Context, request: &MergeRequest) -> Result<RunSummary> {
    let items = PlanSource::new(plan(&request.groups)?);
    let checkpoint = ctx
        .store
        .load_or_default(&request.checkpoint_id, Category::ById, &request.source)
        .await
        .or_raise(|| ErrorKind::Checkpoint(request.checkpoint_id.clone()))?;
    let settings = BatchSettings::new(ctx.settings.page_size, Concurrency::Sequential);

    BatchRunner::new(ctx.store.as_ref(), &checkpoint, settings)
        .with_observers(ctx.observers.clone())
        .run(&items, &(), |item| merge_group(ctx, item))
        .await
        .or_raise(|| ErrorKind::Run)
}
