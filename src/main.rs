//! Command line entry point for shoebox.

mod cli;
mod commands;
mod error;
mod logging;
mod progress;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use crate::progress::Reporter;
use clap::Parser;
use exn::{OptionExt, ResultExt};
use shoebox_checkpoint::{CheckpointStore, Database, Repository};
use shoebox_config::{AppPaths, Config, Dictionary};
use shoebox_library::{Context, PathGenerator, Settings};
use shoebox_metadata::{DateDictionary, Exiftool};
use shoebox_storage::BackendHandle;
use shoebox_storage::backend::LocalBackend;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let paths = AppPaths::discover().or_raise(|| ErrorKind::Config)?;
    let mut config = Config::load(&paths, cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Some(root) = cli.root {
        config.library.root = Some(root);
        config.validate().or_raise(|| ErrorKind::Config)?;
    }

    let database_path = config.database_path(&paths);
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent).or_raise(|| ErrorKind::Database(database_path.clone()))?;
    }
    let database = Database::connect(&database_path).await.or_raise(|| ErrorKind::Database(database_path.clone()))?;
    let store: Arc<dyn CheckpointStore> = Arc::new(Repository::new(database.pool().clone(), config.checkpoint.dry_run));
    if config.checkpoint.dry_run {
        tracing::warn!("dry run: progress will not be recorded");
    }

    let result = match cli.command {
        Command::Checkpoints { id, category, source } => {
            commands::checkpoints(store.as_ref(), id, category, source).await
        },
        command => {
            let reporter = Reporter::new(command.label());
            let result = async {
                let ctx = context(&config, store)?.with_observers(reporter.observers());
                commands::run(&ctx, &config, command).await
            }
            .await;
            reporter.finish();
            result
        },
    };
    database.close().await;
    result
}

/// Wire the configured library, metadata tool and checkpoint store together.
fn context(config: &Config, store: Arc<dyn CheckpointStore>) -> Result<Context> {
    let root = config.library.root.as_deref().ok_or_raise(|| ErrorKind::NoLibraryRoot)?;
    let backend: BackendHandle =
        Arc::new(LocalBackend::new("local", root).or_raise(|| ErrorKind::Library(root.to_path_buf()))?);
    let exiftool =
        Arc::new(Exiftool::discover(backend.clone(), config.metadata.exiftool.as_deref()).or_raise(|| ErrorKind::Exiftool)?);
    tracing::debug!(exiftool = %exiftool.executable().display(), "metadata tool found");

    let dictionary = match &config.metadata.dictionary {
        Some(path) => {
            let dictionary = Dictionary::load(path).or_raise(|| ErrorKind::Dictionary(path.clone()))?;
            DateDictionary::new(dictionary.into_inner())
        },
        None => DateDictionary::default(),
    };
    let template = config.library.template.parse::<PathGenerator>().or_raise(|| ErrorKind::Template)?;
    let settings = Settings {
        page_size: config.batch.page_size,
        max_concurrency: config.batch.max_concurrency,
        max_attempts: config.naming.max_attempts,
        apply_dates: config.metadata.apply_dates,
    };

    Ok(Context::new(backend, store, exiftool.clone(), exiftool)
        .with_dictionary(dictionary)
        .with_template(template)
        .with_settings(settings))
}
