//! `gitscope tags` command - list tags with their messages.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use gitscope_git::RefKind;
use serde::Serialize;

use super::utils::{open_repo, print_json};
use crate::output;

#[derive(Debug, Serialize)]
struct TagInfo {
    name: String,
    commit: String,
    annotated: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tagger: Option<String>,
}

/// Run the tags command.
pub async fn run(path: &Path, json: bool) -> Result<()> {
    let (repo, _) = open_repo(path).await?;

    let mut tags = Vec::new();
    for entry in repo.all_refs().await? {
        if entry.reference.kind() != RefKind::Tag {
            continue;
        }
        let details = repo.tag_details(&entry).await?;
        tags.push(TagInfo {
            name: entry.reference.name().to_string(),
            commit: entry.commit_id.to_string(),
            annotated: details.annotated,
            message: details.message,
            tagger: details.tagger.map(|p| format!("{} <{}>", p.name, p.email)),
        });
    }

    if json {
        return print_json(&tags);
    }

    if tags.is_empty() {
        output::info("No tags");
        return Ok(());
    }

    for tag in &tags {
        let first_line = tag.message.lines().next().unwrap_or_default();
        let kind = if tag.annotated {
            "annotated".normal()
        } else {
            "lightweight".dimmed()
        };
        output::detail(&format!(
            "{:<20} {} {:<12} {}",
            tag.name.yellow().bold(),
            tag.commit.get(..7).unwrap_or(&tag.commit),
            kind,
            first_line
        ));
    }

    Ok(())
}
