//! `gitscope reachable` command - is a commit contained in a ref?

use std::path::Path;

use anyhow::Result;

use super::utils::{open_repo, print_json, resolve_commit, resolve_ref};
use crate::output;

/// Run the reachable command. Prints `true` or `false`.
pub async fn run(path: &Path, json: bool, commit: &str, reference: &str) -> Result<()> {
    let (repo, config) = open_repo(path).await?;

    let commit = resolve_commit(&repo, commit).await?;
    let Some(head) = resolve_ref(&repo, &config, reference).await? else {
        return Ok(());
    };

    let reachable = repo
        .is_commit_reachable_from(&commit.id, &head.commit_id)
        .await?;

    if json {
        return print_json(&reachable);
    }
    output::essential(&reachable.to_string());
    Ok(())
}
