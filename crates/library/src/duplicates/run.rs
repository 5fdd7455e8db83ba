use super::error::{ErrorKind, Result};
use super::plan::MergeItem;
use crate::batch::Outcome;
use crate::context::Context;
use crate::naming::find_unique_path;
use exn::ResultExt;
use std::path::Path;
use tracing::instrument;

/// Merge one planned group: verify the copies, delete them, then move the
/// kept file to its planned destination.
///
/// Copies already gone (a previous run got interrupted after deleting them)
/// are not an error. A group whose kept file is missing but whose
/// destination exists was merged before the checkpoint could record it.
#[instrument(skip_all, fields(group = %item.group_id))]
pub async fn merge_group(ctx: &Context, item: MergeItem) -> Result<Outcome> {
    let backend = ctx.backend.as_ref();
    let keep_exists = backend.exists(&item.keep).await.or_raise(|| ErrorKind::VerifyingDuplicate(item.keep.clone()))?;
    if !keep_exists {
        let merged = backend
            .exists(&item.destination)
            .await
            .or_raise(|| ErrorKind::MovingFile(item.keep.clone()))?;
        if merged {
            tracing::debug!("already merged");
            return Ok(Outcome::Skipped);
        }
        exn::bail!(ErrorKind::VerifyingDuplicate(item.keep));
    }

    let expected = hash(ctx, &item.keep).await?;
    let mut present = Vec::with_capacity(item.copies.len());
    for copy in &item.copies {
        if !backend.exists(copy).await.or_raise(|| ErrorKind::VerifyingDuplicate(copy.clone()))? {
            continue;
        }
        if hash(ctx, copy).await? != expected {
            tracing::warn!(keep = %item.keep.display(), copy = %copy.display(), "copy differs from the kept file");
            exn::bail!(ErrorKind::VerifyingDuplicate(copy.clone()));
        }
        present.push(copy);
    }

    for copy in &present {
        backend.delete(copy).await.or_raise(|| ErrorKind::DeletingFile(copy.to_path_buf()))?;
    }

    if item.destination == item.keep {
        return Ok(match present.is_empty() {
            true => Outcome::Skipped,
            false => Outcome::Processed,
        });
    }
    let _placement = ctx.placement().await;
    let destination = find_unique_path(backend, &item.destination, ctx.settings.max_attempts)
        .await
        .or_raise(|| ErrorKind::MovingFile(item.keep.clone()))?;
    backend.rename(&item.keep, &destination).await.or_raise(|| ErrorKind::MovingFile(item.keep.clone()))?;
    tracing::debug!(deleted = present.len(), destination = %destination.display(), "group merged");
    Ok(Outcome::Processed)
}

async fn hash(ctx: &Context, path: &Path) -> Result<blake3::Hash> {
    let data = ctx.backend.read(path).await.or_raise(|| ErrorKind::VerifyingDuplicate(path.to_path_buf()))?;
    Ok(blake3::hash(&data))
}
