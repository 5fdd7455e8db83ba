use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "shoebox", version, about = "Resumable organizer for large photo and video collections")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON) layered over the defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Library root, overriding `library.root`.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
    /// More output; repeat for more. `SHOEBOX_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Move media files into folders named after their capture date
    Organize(ScopeArgs),
    /// Add the names of containing folders as keywords
    Tag {
        #[command(flatten)]
        scope: ScopeArgs,
        /// Extra keyword added to every file; repeatable.
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,
    },
    /// Merge groups of duplicate files listed in a CSV file
    Merge {
        /// CSV file with `group_id,filename,folder` columns.
        list: PathBuf,
        /// Checkpoint to resume; defaults to one derived from the list's name.
        #[arg(long)]
        checkpoint: Option<String>,
    },
    /// Show recorded checkpoints, most recently updated first
    Checkpoints {
        #[arg(long)]
        id: Option<String>,
        #[arg(long, value_parser = ["BY_DIRECTORY", "BY_ID"])]
        category: Option<String>,
        #[arg(long)]
        source: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct ScopeArgs {
    /// Only files below this folder of the library.
    pub prefix: Option<PathBuf>,
    /// Checkpoint to resume; defaults to one derived from the command and prefix.
    #[arg(long)]
    pub checkpoint: Option<String>,
}

impl ScopeArgs {
    pub fn checkpoint_id(&self, command: &str) -> String {
        match (&self.checkpoint, &self.prefix) {
            (Some(id), _) => id.clone(),
            (None, Some(prefix)) => format!("{command}:{}", prefix.display()),
            (None, None) => command.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_checkpoint_ids() {
        let cli = Cli::parse_from(["shoebox", "organize", "inbox"]);
        let Command::Organize(scope) = cli.command else { panic!("expected organize") };
        assert_eq!(scope.checkpoint_id("organize"), "organize:inbox");

        let cli = Cli::parse_from(["shoebox", "tag", "-k", "Scanned", "--checkpoint", "mine"]);
        let Command::Tag { scope, keywords } = cli.command else { panic!("expected tag") };
        assert_eq!(scope.checkpoint_id("tag"), "mine");
        assert_eq!(keywords, ["Scanned"]);
    }
}
