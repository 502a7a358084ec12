//! `gitscope stashes` command - list stash entries.

use std::path::Path;

use anyhow::Result;
use chrono::Local;
use gitscope_core::Stash;

use super::utils::{open_repo, print_json};
use crate::output;

/// Run the stashes command.
pub async fn run(path: &Path, json: bool) -> Result<()> {
    let (repo, _) = open_repo(path).await?;
    let stashes = repo.all_stashes().await?;

    if json {
        let entries: Vec<&Stash> = stashes.iter().map(|s| &**s).collect();
        return print_json(&entries);
    }

    if stashes.is_empty() {
        output::info("No stash entries");
        return Ok(());
    }

    for stash in &stashes {
        let when = stash
            .timestamp
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        output::detail(&format!(
            "{:<12} {} {}  {}",
            stash.reference.name(),
            output::short_id(&stash.commit_id),
            when,
            stash.message
        ));
    }

    Ok(())
}
