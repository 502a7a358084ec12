//! `gitscope show` command - display a single commit.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use super::utils::{open_repo, print_json, resolve_commit};
use crate::output;

/// Run the show command.
pub async fn run(path: &Path, json: bool, revision: &str) -> Result<()> {
    let (repo, _) = open_repo(path).await?;
    let commit = resolve_commit(&repo, revision).await?;

    if json {
        return print_json(&*commit);
    }

    output::detail(&format!("{} {}", "commit".yellow(), commit.id.to_string().yellow()));
    if commit.is_merge() {
        let parents: Vec<&str> = commit.parent_ids.iter().map(|p| p.short()).collect();
        output::detail(&format!("Merge:  {}", parents.join(" ")));
    }
    output::detail(&format!("Author: {} <{}>", commit.author.name, commit.author.email));
    output::detail(&format!("Date:   {}", commit.author.timestamp.to_rfc2822()));
    if !commit.ref_notes.is_empty() {
        output::detail(&format!("Refs:   {}", commit.ref_notes.join(", ")));
    }
    output::detail("");
    for line in commit.message.lines() {
        output::detail(&format!("    {line}"));
    }

    Ok(())
}
