//! Working-tree status from `git diff --name-status` and `git ls-files --others`.

use serde::Serialize;

use crate::error::{Error, Result};

/// Which side of the index a diff is taken against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffKind {
    /// Index against `HEAD` (`--cached`).
    Staged,
    /// Working tree against the index.
    Unstaged,
    /// Files git does not track and does not ignore.
    Untracked,
}

/// A changed path and its status flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkingDirectoryItem {
    pub path: String,
    pub added: bool,
    pub copied: bool,
    pub deleted: bool,
    pub modified: bool,
    pub type_changed: bool,
    pub unmerged: bool,
    pub unknown: bool,
    pub broken: bool,
    pub untracked: bool,
}

impl WorkingDirectoryItem {
    fn from_status(status: &str, path: &str) -> Self {
        Self {
            path: path.to_string(),
            added: status.contains('A'),
            copied: status.contains('C'),
            deleted: status.contains('D'),
            modified: status.contains('M'),
            type_changed: status.contains('T'),
            unmerged: status.contains('U'),
            unknown: status.contains('X'),
            broken: status.contains('B'),
            untracked: false,
        }
    }

    /// Single-letter summary in `git status --short` spirit.
    #[must_use]
    pub const fn status_letter(&self) -> char {
        if self.untracked {
            '?'
        } else if self.unmerged {
            'U'
        } else if self.added {
            'A'
        } else if self.deleted {
            'D'
        } else if self.copied {
            'C'
        } else if self.type_changed {
            'T'
        } else if self.modified {
            'M'
        } else if self.broken {
            'B'
        } else {
            'X'
        }
    }
}

/// Parse `git diff --name-status --no-renames` output.
///
/// # Errors
/// Returns a parse error for lines that are not `<STATUS>\t<path>`.
pub fn parse_diff_status(input: &str) -> Result<Vec<WorkingDirectoryItem>> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (status, path) = line
                .split_once(char::is_whitespace)
                .ok_or_else(|| Error::parse("diff status", line))?;
            let path = path.trim();
            if path.is_empty() || !status.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
                return Err(Error::parse("diff status", line));
            }
            Ok(WorkingDirectoryItem::from_status(status, path))
        })
        .collect()
}

/// Parse `git ls-files --others --exclude-standard` output.
#[must_use]
pub fn parse_untracked(input: &str) -> Vec<WorkingDirectoryItem> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|path| WorkingDirectoryItem {
            path: path.to_string(),
            untracked: true,
            ..WorkingDirectoryItem::default()
        })
        .collect()
}
