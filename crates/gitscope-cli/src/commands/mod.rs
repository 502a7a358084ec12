//! Command definitions and dispatch.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use gitscope_git::RefKind;

pub mod blob;
pub mod completions;
pub mod contains;
pub mod distance;
pub mod log;
pub mod mutate;
pub mod reachable;
pub mod refs;
pub mod remotes;
pub mod show;
pub mod stashes;
pub mod status;
pub mod tags;
pub mod tree;
pub mod upstream;
pub mod utils;

/// Inspect refs, history, distance and reachability of a git repository.
#[derive(Debug, Parser)]
#[command(name = "gitscope", version, about)]
pub struct Cli {
    /// Repository to inspect.
    #[arg(short = 'C', long = "repo", global = true, default_value = ".")]
    pub repo: PathBuf,

    /// Print machine-readable JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress informational output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List refs and the commits they point at.
    Refs {
        /// Only show refs of this kind.
        #[arg(long, value_enum)]
        kind: Option<KindFilter>,
    },

    /// Show the first-parent history of a ref or revision.
    Log {
        /// Where to start (defaults to HEAD).
        revision: Option<String>,

        /// Maximum number of commits to show.
        #[arg(short = 'n', long, default_value_t = 20)]
        max_count: usize,
    },

    /// Show a single commit.
    Show {
        /// Ref name, commit id or revision expression.
        revision: String,
    },

    /// List a tree, optionally descending into a subdirectory.
    Tree {
        /// Commit whose root tree to list.
        revision: String,

        /// Slash-separated path inside the tree.
        path: Option<String>,
    },

    /// Print the contents of a blob.
    Blob {
        /// Blob id or revision expression such as `HEAD:README.md`.
        object: String,
    },

    /// List tags with their messages.
    Tags,

    /// List stash entries.
    Stashes,

    /// List configured remotes.
    Remotes,

    /// Show the upstream of a branch and how far apart they are.
    Upstream {
        /// Local branch (defaults to the current branch).
        branch: Option<String>,
    },

    /// Count commits between two refs.
    Distance {
        /// Ref to measure from.
        source: String,
        /// Ref to measure against.
        target: String,
    },

    /// Check whether a commit is contained in a ref.
    Reachable {
        /// Commit to look for.
        commit: String,
        /// Ref whose history is searched.
        reference: String,
    },

    /// List every ref containing a commit.
    Contains {
        /// Commit to look for.
        commit: String,
    },

    /// Show staged, unstaged and untracked paths.
    Status {
        /// Restrict to this directory, relative to the repository root.
        #[arg(long, default_value = ".")]
        dir: String,
    },

    /// Fetch all remotes, pruning deleted branches.
    Fetch,

    /// Discard local changes and untracked files.
    Clean {
        /// Required, the changes cannot be recovered.
        #[arg(long)]
        force: bool,
    },

    /// Delete a fully merged local branch.
    DeleteBranch {
        /// Branch to delete.
        name: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Ref kinds accepted by `refs --kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindFilter {
    Branch,
    Tracking,
    Tag,
    Stash,
}

impl From<KindFilter> for RefKind {
    fn from(filter: KindFilter) -> Self {
        match filter {
            KindFilter::Branch => Self::Branch,
            KindFilter::Tracking => Self::TrackingBranch,
            KindFilter::Tag => Self::Tag,
            KindFilter::Stash => Self::Stash,
        }
    }
}

/// Run the selected command.
pub async fn run(cli: Cli) -> Result<()> {
    let Cli {
        repo: path,
        json,
        command,
        ..
    } = cli;

    match command {
        Commands::Completions { shell } => completions::run(shell),
        Commands::Refs { kind } => refs::run(&path, json, kind.map(RefKind::from)).await,
        Commands::Log {
            revision,
            max_count,
        } => log::run(&path, json, revision.as_deref(), max_count).await,
        Commands::Show { revision } => show::run(&path, json, &revision).await,
        Commands::Tree { revision, path: sub } => {
            tree::run(&path, json, &revision, sub.as_deref()).await
        }
        Commands::Blob { object } => blob::run(&path, json, &object).await,
        Commands::Tags => tags::run(&path, json).await,
        Commands::Stashes => stashes::run(&path, json).await,
        Commands::Remotes => remotes::run(&path, json).await,
        Commands::Upstream { branch } => upstream::run(&path, json, branch.as_deref()).await,
        Commands::Distance { source, target } => {
            distance::run(&path, json, &source, &target).await
        }
        Commands::Reachable { commit, reference } => {
            reachable::run(&path, json, &commit, &reference).await
        }
        Commands::Contains { commit } => contains::run(&path, json, &commit).await,
        Commands::Status { dir } => status::run(&path, json, &dir).await,
        Commands::Fetch => mutate::fetch(&path).await,
        Commands::Clean { force } => mutate::clean(&path, force).await,
        Commands::DeleteBranch { name } => mutate::delete_branch(&path, &name).await,
    }
}
