//! `gitscope log` command - first-parent history from a revision.

use std::path::Path;

use anyhow::Result;
use gitscope_core::Commit;
use serde::Serialize;

use super::utils::{open_repo, print_json, resolve_commit};
use crate::output;

/// A commit as printed by `log`.
#[derive(Debug, Serialize)]
pub struct LogEntry {
    pub id: String,
    pub subject: String,
    pub author: String,
    pub date: String,
    pub ref_notes: Vec<String>,
}

impl From<&Commit> for LogEntry {
    fn from(commit: &Commit) -> Self {
        Self {
            id: commit.id.to_string(),
            subject: commit.subject.clone(),
            author: commit.author.name.clone(),
            date: commit.author.timestamp.format("%Y-%m-%d").to_string(),
            ref_notes: commit.ref_notes.clone(),
        }
    }
}

/// Run the log command.
pub async fn run(path: &Path, json: bool, revision: Option<&str>, max_count: usize) -> Result<()> {
    let (repo, _) = open_repo(path).await?;

    let tip = resolve_commit(&repo, revision.unwrap_or("HEAD")).await?;
    let ancestors = repo.ancestors(&tip).await?;

    let entries: Vec<LogEntry> = std::iter::once(&tip)
        .chain(ancestors.iter())
        .take(max_count)
        .map(|commit| LogEntry::from(&**commit))
        .collect();

    if json {
        return print_json(&entries);
    }

    for entry in &entries {
        let notes = if entry.ref_notes.is_empty() {
            String::new()
        } else {
            format!(" ({})", entry.ref_notes.join(", "))
        };
        let id = entry.id.get(..7).unwrap_or(&entry.id);
        output::detail(&format!(
            "{:<8} {}  {:<40}{}  {}",
            id, entry.date, entry.subject, notes, entry.author
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::expect_used)]
    fn test_log_entry_serializes() {
        let entry = LogEntry {
            id: "abc1234".to_string(),
            subject: "Fix parser".to_string(),
            author: "Alice".to_string(),
            date: "2024-01-01".to_string(),
            ref_notes: vec!["origin/main".to_string()],
        };
        let json = serde_json::to_string(&entry).expect("serialization should succeed");
        assert!(json.contains("Fix parser"));
        assert!(json.contains("origin/main"));
    }
}
