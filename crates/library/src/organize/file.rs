use super::error::{Error, ErrorKind, Result};
use crate::batch::Outcome;
use crate::context::Context;
use crate::naming::find_unique_path;
use exn::ResultExt;
use shoebox_metadata::error::Error as MetadataError;
use shoebox_metadata::{CompiledDate, DATE_TIME_ORIGINAL, PropertyMap, format_exif_datetime};
use shoebox_storage::FileInfo;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Move one file into the folder its capture date calls for.
///
/// Files without any date are left alone and reported as
/// [`Outcome::Skipped`], as are files already where the template puts them
/// unless a missing capture date had to be written. A moved file is reported
/// as [`Outcome::Relocated`] under its new path.
///
/// The date is written before the move, so a failed write leaves the file
/// where it was listed and the next run retries it from scratch.
#[instrument(skip_all, fields(path = %file.path.display()))]
pub async fn organize_file(ctx: &Context, file: FileInfo) -> Result<Outcome> {
    let source = file.path;
    let properties = ctx
        .extractor
        .extract(&source)
        .await
        .map_err(|err| metadata_failure(err, ErrorKind::ReadingExif(source.clone())))?;

    let compiled = CompiledDate::compile(&source, &properties, &ctx.dictionary);
    let Some((date, origin)) = compiled.resolve_with_source() else {
        tracing::debug!("no capture date, leaving in place");
        return Ok(Outcome::Skipped);
    };
    let desired = ctx.template.generate(date, &source).or_raise(|| ErrorKind::RenderingPath(source.clone()))?;

    let apply = ctx.settings.apply_dates && !compiled.has_exif();
    if apply {
        let properties = PropertyMap::from([(DATE_TIME_ORIGINAL.to_string(), format_exif_datetime(date))]);
        ctx.writer
            .write(&source, &properties)
            .await
            .map_err(|err| metadata_failure(err, ErrorKind::ApplyExif(source.clone())))?;
        tracing::debug!(%origin, "capture date written");
    }

    if desired == source {
        tracing::debug!("already in place");
        return Ok(if apply { Outcome::Processed } else { Outcome::Skipped });
    }
    let destination = claim(ctx, &source, desired).await?;
    tracing::debug!(destination = %destination.display(), %origin, "moved");
    Ok(Outcome::Relocated(destination.to_string_lossy().into_owned()))
}

/// Pick a free name next to `desired` and move `source` there.
async fn claim(ctx: &Context, source: &Path, desired: PathBuf) -> Result<PathBuf> {
    let _placement = ctx.placement().await;
    let destination = find_unique_path(ctx.backend.as_ref(), &desired, ctx.settings.max_attempts)
        .await
        .or_raise(|| ErrorKind::FindingUniquePath(desired.clone()))?;
    ctx.backend.rename(source, &destination).await.or_raise(|| ErrorKind::MovingFile(source.to_path_buf()))?;
    Ok(destination)
}

fn metadata_failure(err: MetadataError, stage: ErrorKind) -> Error {
    match err.is_unavailable() {
        true => err.raise(ErrorKind::ExtractorUnavailable),
        false => err.raise(stage),
    }
}
