//! `gitscope refs` command - list refs and the commits they point at.

use std::path::Path;

use anyhow::Result;
use gitscope_core::RefEntry;
use gitscope_git::RefKind;

use super::utils::{open_repo, print_json};
use crate::output;

/// Run the refs command.
pub async fn run(path: &Path, json: bool, kind: Option<RefKind>) -> Result<()> {
    let (repo, _) = open_repo(path).await?;

    let refs: Vec<_> = repo
        .all_refs()
        .await?
        .into_iter()
        .filter(|entry| kind.is_none_or(|k| entry.reference.kind() == k))
        .collect();

    if json {
        let entries: Vec<&RefEntry> = refs.iter().map(|e| &**e).collect();
        return print_json(&entries);
    }

    if refs.is_empty() {
        output::info("No refs");
        return Ok(());
    }

    let head = repo.head_ref().await?;
    for entry in &refs {
        let is_head = head.as_ref() == Some(&entry.reference);
        let tag_marker = if entry.is_annotated_tag() { " (annotated)" } else { "" };
        output::detail(&format!(
            "{} {}{}",
            output::short_id(&entry.commit_id),
            output::ref_label(&entry.reference, is_head),
            tag_marker
        ));
    }

    Ok(())
}
