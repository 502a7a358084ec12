//! Tree listings from `git ls-tree -z <tree>`.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::ObjectId;

/// What a tree entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeEntryKind {
    Blob,
    Subtree,
}

/// One named entry of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub name: String,
    /// Unix file mode, e.g. `0o100644`.
    pub mode: u32,
    pub kind: TreeEntryKind,
    pub id: ObjectId,
}

/// Parse NUL-terminated `<mode> <type> <id>\t<name>` entries.
///
/// Submodule entries (type `commit`) are skipped; they reference objects in
/// another repository.
///
/// # Errors
/// Returns a parse error for entries that do not match the grammar.
pub fn parse_tree_entries(input: &str) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();

    for raw in input.split('\0') {
        let raw = raw.trim_start_matches('\n');
        if raw.is_empty() {
            continue;
        }

        let (meta, name) = raw
            .split_once('\t')
            .ok_or_else(|| Error::parse("tree entry", raw))?;
        let mut fields = meta.split(' ');
        let (Some(mode), Some(kind), Some(id), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(Error::parse("tree entry", raw));
        };

        let kind = match kind {
            "blob" => TreeEntryKind::Blob,
            "tree" => TreeEntryKind::Subtree,
            "commit" => continue,
            _ => return Err(Error::parse("tree entry type", raw)),
        };
        let mode = u32::from_str_radix(mode, 8).map_err(|_| Error::parse("tree entry mode", raw))?;
        let id = ObjectId::new(id).map_err(|_| Error::parse("tree entry id", raw))?;

        if name.is_empty() {
            return Err(Error::parse("tree entry", raw));
        }

        entries.push(TreeEntry {
            name: name.to_string(),
            mode,
            kind,
            id,
        });
    }

    Ok(entries)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries() {
        let input = "100644 blob aaaa\tREADME.md\0040000 tree bbbb\tsrc\0100755 blob cccc\trun me.sh\0";
        let entries = parse_tree_entries(input).unwrap();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].name, "README.md");
        assert_eq!(entries[0].mode, 0o100_644);
        assert_eq!(entries[0].kind, TreeEntryKind::Blob);

        assert_eq!(entries[1].name, "src");
        assert_eq!(entries[1].kind, TreeEntryKind::Subtree);
        assert_eq!(entries[1].mode, 0o40_000);

        assert_eq!(entries[2].name, "run me.sh");
        assert_eq!(entries[2].mode, 0o100_755);
    }

    #[test]
    fn test_submodules_skipped() {
        let input = "160000 commit dddd\tvendor/lib\0100644 blob aaaa\ta\0";
        let entries = parse_tree_entries(input).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a");
    }

    #[test]
    fn test_name_with_newline() {
        let entries = parse_tree_entries("100644 blob aaaa\tline\nbreak\0").unwrap();
        assert_eq!(entries[0].name, "line\nbreak");
    }

    #[test]
    fn test_malformed_entry() {
        assert!(parse_tree_entries("100644 blob aaaa README").is_err());
        assert!(parse_tree_entries("100644 symlink aaaa\tx\0").is_err());
        assert!(parse_tree_entries("999 blob aaaa\tx\0").is_err());
    }

    #[test]
    fn test_empty_tree() {
        assert!(parse_tree_entries("").unwrap().is_empty());
    }
}
