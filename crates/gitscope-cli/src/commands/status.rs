//! `gitscope status` command - staged, unstaged and untracked paths.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use gitscope_git::{DiffKind, WorkingDirectoryItem};
use serde::Serialize;

use super::utils::{open_repo, print_json};
use crate::output;

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    staged: &'a [WorkingDirectoryItem],
    unstaged: &'a [WorkingDirectoryItem],
    untracked: &'a [WorkingDirectoryItem],
}

/// Run the status command.
pub async fn run(path: &Path, json: bool, dir: &str) -> Result<()> {
    let (repo, _) = open_repo(path).await?;

    let staged = repo.working_directory(DiffKind::Staged, dir).await?;
    let unstaged = repo.working_directory(DiffKind::Unstaged, dir).await?;
    let untracked = repo.working_directory(DiffKind::Untracked, dir).await?;

    if json {
        return print_json(&JsonOutput {
            staged: &staged,
            unstaged: &unstaged,
            untracked: &untracked,
        });
    }

    if staged.is_empty() && unstaged.is_empty() && untracked.is_empty() {
        output::success("Working tree clean");
        return Ok(());
    }

    print_section("Staged", &staged);
    print_section("Unstaged", &unstaged);
    print_section("Untracked", &untracked);
    Ok(())
}

fn print_section(title: &str, items: &[WorkingDirectoryItem]) {
    if items.is_empty() {
        return;
    }
    output::detail(&title.bold().to_string());
    for item in items {
        output::detail(&format!(
            "  {} {}",
            output::status_letter(item.status_letter()),
            item.path
        ));
    }
}
