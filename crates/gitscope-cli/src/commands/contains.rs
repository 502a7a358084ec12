//! `gitscope contains` command - every ref whose history has a commit.

use std::path::Path;

use anyhow::Result;

use super::utils::{open_repo, print_json, resolve_commit};
use crate::output;

/// Run the contains command.
pub async fn run(path: &Path, json: bool, commit: &str) -> Result<()> {
    let (repo, _) = open_repo(path).await?;

    let commit = resolve_commit(&repo, commit).await?;
    let refs = repo.reachable_by(&commit.id).await?;

    if json {
        let names: Vec<&str> = refs.iter().map(|e| e.reference.ref_name()).collect();
        return print_json(&names);
    }

    if refs.is_empty() {
        output::info(&format!("No ref contains {}", commit.id.short()));
        return Ok(());
    }
    for entry in &refs {
        output::detail(&output::ref_label(&entry.reference, false));
    }

    Ok(())
}
