//! `gitscope distance` command - count commits between two refs.

use std::path::Path;

use anyhow::Result;

use super::utils::{open_repo, print_json, resolve_ref};
use crate::output;

/// Run the distance command.
pub async fn run(path: &Path, json: bool, source: &str, target: &str) -> Result<()> {
    let (repo, config) = open_repo(path).await?;

    let Some(source) = resolve_ref(&repo, &config, source).await? else {
        return Ok(());
    };
    let Some(target) = resolve_ref(&repo, &config, target).await? else {
        return Ok(());
    };

    let distance = repo
        .compute_distance(&source.reference, &target.reference)
        .await?;

    if json {
        return print_json(&distance);
    }

    match distance {
        Some(d) => {
            output::detail(&format!("merge base: {}", output::short_id(&d.merge_base)));
            output::detail(&format!("ahead:      {}", d.ahead));
            output::detail(&format!("behind:     {}", d.behind));
        }
        None => output::warn(&format!(
            "{} and {} have no common history",
            source.reference.display_name(),
            target.reference.display_name()
        )),
    }

    Ok(())
}
