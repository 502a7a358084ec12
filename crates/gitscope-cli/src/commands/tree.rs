//! `gitscope tree` command - list the tree of a commit.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};
use gitscope_core::{OnMissing, Tree};
use gitscope_git::TreeEntryKind;

use super::utils::{open_repo, print_json, resolve_commit};
use crate::output;

/// Run the tree command.
pub async fn run(path: &Path, json: bool, revision: &str, sub: Option<&str>) -> Result<()> {
    let (repo, _) = open_repo(path).await?;
    let commit = resolve_commit(&repo, revision).await?;

    let mut tree: Arc<Tree> = repo.tree_of(&commit).await?;
    for component in sub.unwrap_or_default().split('/').filter(|c| !c.is_empty()) {
        let Some(entry) = tree.entry(component) else {
            bail!("'{component}' not found in {revision}");
        };
        if entry.kind != TreeEntryKind::Subtree {
            bail!("'{component}' is not a directory");
        }
        let id = entry.id.clone();
        let Some(next) = repo.lookup_tree(&id, OnMissing::Null).await? else {
            bail!("Tree {id} is missing from the repository");
        };
        tree = next;
    }

    if json {
        return print_json(&tree.entries);
    }

    for entry in &tree.entries {
        let kind = match entry.kind {
            TreeEntryKind::Blob => "blob",
            TreeEntryKind::Subtree => "tree",
        };
        output::detail(&format!("{:06o} {kind} {}\t{}", entry.mode, entry.id, entry.name));
    }

    Ok(())
}
