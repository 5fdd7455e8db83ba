use crate::cli::Command;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shoebox_checkpoint::{AggregatedCheckpoint, Category, CheckpointFilter, CheckpointStore};
use shoebox_config::Config;
use shoebox_library::Context;
use shoebox_library::batch::{MediaFilter, RunSummary};
use shoebox_library::duplicates::{self, MergeRequest};
use shoebox_library::organize::{self, OrganizeRequest};
use shoebox_library::tag::{self, TagRequest};
use std::path::Path;
use time::format_description::well_known::Rfc3339;

impl Command {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Organize(_) => "organize",
            Self::Tag { .. } => "tag",
            Self::Merge { .. } => "merge",
            Self::Checkpoints { .. } => "checkpoints",
        }
    }
}

pub async fn run(ctx: &Context, config: &Config, command: Command) -> Result<()> {
    let label = command.label();
    let summary = match command {
        Command::Organize(scope) => {
            let request = OrganizeRequest {
                checkpoint_id: scope.checkpoint_id(label),
                prefix: scope.prefix,
                filter: MediaFilter::new(&config.library.extensions),
            };
            organize::organize(ctx, &request).await.or_raise(|| ErrorKind::Command(label))?
        },
        Command::Tag { scope, keywords } => {
            let request = TagRequest {
                checkpoint_id: scope.checkpoint_id(label),
                prefix: scope.prefix,
                filter: MediaFilter::new(&config.library.extensions),
                keywords,
            };
            tag::tag(ctx, &request).await.or_raise(|| ErrorKind::Command(label))?
        },
        Command::Merge { list, checkpoint } => {
            let source = list_name(&list);
            let request = MergeRequest {
                checkpoint_id: checkpoint.unwrap_or_else(|| format!("{label}:{source}")),
                groups: duplicates::read_groups_from_path(&list).or_raise(|| ErrorKind::Command(label))?,
                source,
            };
            duplicates::merge(ctx, &request).await.or_raise(|| ErrorKind::Command(label))?
        },
        Command::Checkpoints { id, category, source } => {
            return checkpoints(ctx.store.as_ref(), id, category, source).await;
        },
    };
    print_summary(label, &summary);
    Ok(())
}

pub async fn checkpoints(
    store: &dyn CheckpointStore,
    id: Option<String>,
    category: Option<String>,
    source: Option<String>,
) -> Result<()> {
    let mut filter = CheckpointFilter::default();
    if let Some(id) = id {
        filter = filter.id(id);
    }
    if let Some(category) = category {
        filter = filter.category(category.parse::<Category>().or_raise(|| ErrorKind::Command("checkpoints"))?);
    }
    if let Some(source) = source {
        filter = filter.source(source);
    }
    let checkpoints = store.list(&filter).await.or_raise(|| ErrorKind::Command("checkpoints"))?;
    if checkpoints.is_empty() {
        println!("no checkpoints recorded");
    }
    for checkpoint in &checkpoints {
        println!("{}", describe(checkpoint));
    }
    Ok(())
}

fn describe(checkpoint: &AggregatedCheckpoint) -> String {
    let updated = checkpoint.last_update.format(&Rfc3339).unwrap_or_default();
    format!(
        "{}\t{}\t{}\t{} done\tlast update {updated}",
        checkpoint.id,
        checkpoint.category,
        checkpoint.source,
        checkpoint.len()
    )
}

fn print_summary(label: &str, summary: &RunSummary) {
    println!("{label}: {summary}");
}

/// The duplicate list's file name, which also names its checkpoint source.
fn list_name(list: &Path) -> String {
    list.file_name().unwrap_or(list.as_os_str()).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoebox_checkpoint::{Category, CheckpointRecord, MemoryStore};
    use std::path::PathBuf;

    #[test]
    fn test_list_name() {
        assert_eq!(list_name(&PathBuf::from("/tmp/exports/duplicates.csv")), "duplicates.csv");
        assert_eq!(list_name(Path::new("dupes.csv")), "dupes.csv");
    }

    #[test]
    fn test_describe() {
        let checkpoint = AggregatedCheckpoint::from(CheckpointRecord::new("organize", Category::ByDirectory, "local:", ["a", "b"]));
        let line = describe(&checkpoint);
        assert!(line.starts_with("organize\tBY_DIRECTORY\tlocal:\t2 done\tlast update "));
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let store = MemoryStore::new();
        let err = checkpoints(&store, None, Some("BY_COLOUR".into()), None).await.unwrap_err();
        assert!(matches!(*err, ErrorKind::Command("checkpoints")));
    }
}
