//! Pass-through commands that change the repository: `fetch`, `clean` and
//! `delete-branch`.

use std::path::Path;

use anyhow::{Result, bail};
use gitscope_git::{Ref, RefKind};

use super::utils::{open_repo, resolve_ref};
use crate::output;

/// Fetch every remote.
pub async fn fetch(path: &Path) -> Result<()> {
    let (repo, _) = open_repo(path).await?;
    repo.fetch().await?;
    output::success("Fetched all remotes");
    Ok(())
}

/// Reset tracked files and remove untracked ones.
pub async fn clean(path: &Path, force: bool) -> Result<()> {
    if !force {
        bail!("Refusing to discard changes without --force");
    }
    let (repo, _) = open_repo(path).await?;
    repo.clean_working_tree().await?;
    output::success("Working tree cleaned");
    Ok(())
}

/// Delete a merged local branch.
pub async fn delete_branch(path: &Path, name: &str) -> Result<()> {
    let (repo, config) = open_repo(path).await?;

    let Some(entry) = resolve_ref(&repo, &config, name).await? else {
        return Ok(());
    };
    if entry.reference.kind() != RefKind::Branch {
        bail!("'{name}' is not a local branch");
    }
    if repo.head_ref().await?.as_ref() == Some(&entry.reference) {
        bail!("Cannot delete the checked-out branch '{name}'");
    }

    let branch: &Ref = &entry.reference;
    repo.delete_branch(branch).await?;
    output::success(&format!("Deleted branch {}", branch.display_name()));
    Ok(())
}
