//! Field/record-delimited output of `git log`, `git stash list` and
//! `git for-each-ref`.
//!
//! Each record is a run of `code:value` components, every component followed
//! by [`SEPARATOR`], and the record closed by one more [`SEPARATOR`]. The
//! separator is chosen so it never shows up in commit messages, which lets
//! subjects and bodies span several lines.

use crate::error::{Error, Result};
use crate::refs::to_stash_ref;
use crate::types::{ObjectId, Principal, Ref};

/// Field separator placed after every component.
pub const SEPARATOR: &str = "¶¶¶";

/// A component separator followed by the record-closing separator.
const RECORD_END: &str = "¶¶¶¶¶¶";

/// Commit fields requested from `git log`, in output order.
pub const LOG_FIELDS: [&str; 12] = [
    "H", "T", "P", "an", "ae", "at", "cn", "ce", "ct", "s", "B", "D",
];

/// Stash fields requested from `git stash list`.
pub const STASH_FIELDS: [&str; 4] = ["H", "gD", "gs", "ct"];

/// Build a `--format=` value emitting `fields` as pretty-format placeholders.
#[must_use]
pub fn pretty_format(fields: &[&str]) -> String {
    let mut format: String = fields
        .iter()
        .map(|field| format!("{field}:%{field}{SEPARATOR}"))
        .collect();
    format.push_str(SEPARATOR);
    format
}

/// Split output into records, skipping blank ones.
pub(crate) fn records(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(RECORD_END)
        .map(str::trim)
        .filter(|record| !record.is_empty())
}

/// Split one record into `(code, value)` components.
pub(crate) fn components(record: &str) -> impl Iterator<Item = Result<(&str, &str)>> {
    record
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|component| !component.is_empty())
        .map(move |component| {
            component
                .split_once(':')
                .ok_or_else(|| Error::parse("log component", component))
        })
}

/// One commit as reported by `git log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub id: ObjectId,
    pub tree_id: ObjectId,
    pub parent_ids: Vec<ObjectId>,
    pub author: Principal,
    pub committer: Principal,
    pub subject: String,
    pub message: String,
    pub ref_notes: Vec<String>,
}

#[derive(Default)]
struct PartialPrincipal {
    name: Option<String>,
    email: Option<String>,
    timestamp: Option<i64>,
}

impl PartialPrincipal {
    fn build(self, what: &'static str, record: &str) -> Result<Principal> {
        match (self.name, self.email, self.timestamp) {
            (Some(name), Some(email), Some(seconds)) => Principal::from_unix(name, email, seconds),
            _ => Err(Error::parse(what, record)),
        }
    }
}

/// Parse `git log --format=<pretty_format(LOG_FIELDS)>` output.
///
/// # Errors
/// Returns a parse error for unknown field codes, malformed values, or
/// records missing one of [`LOG_FIELDS`].
pub fn parse_log(input: &str) -> Result<Vec<LogRecord>> {
    records(input).map(parse_log_record).collect()
}

fn parse_log_record(record: &str) -> Result<LogRecord> {
    let mut id = None;
    let mut tree_id = None;
    let mut parent_ids = None;
    let mut author = PartialPrincipal::default();
    let mut committer = PartialPrincipal::default();
    let mut subject = None;
    let mut message = None;
    let mut ref_notes = None;

    for component in components(record) {
        let (code, value) = component?;
        match code {
            "H" => id = Some(parse_id(value, record)?),
            "T" => tree_id = Some(parse_id(value, record)?),
            "P" => {
                parent_ids = Some(
                    value
                        .split_whitespace()
                        .map(|parent| parse_id(parent, record))
                        .collect::<Result<Vec<_>>>()?,
                );
            }
            "an" => author.name = Some(value.to_string()),
            "ae" => author.email = Some(value.to_string()),
            "at" => author.timestamp = Some(parse_seconds(value, record)?),
            "cn" => committer.name = Some(value.to_string()),
            "ce" => committer.email = Some(value.to_string()),
            "ct" => committer.timestamp = Some(parse_seconds(value, record)?),
            "s" => subject = Some(value.to_string()),
            "B" => message = Some(value.to_string()),
            "D" => ref_notes = Some(parse_decorations(value)),
            _ => return Err(Error::parse("log field", format!("{code}:{value}"))),
        }
    }

    let (Some(id), Some(tree_id)) = (id, tree_id) else {
        return Err(Error::parse("log record", record));
    };

    Ok(LogRecord {
        id,
        tree_id,
        parent_ids: parent_ids.unwrap_or_default(),
        author: author.build("log author", record)?,
        committer: committer.build("log committer", record)?,
        subject: subject.unwrap_or_default(),
        message: message.unwrap_or_default(),
        ref_notes: ref_notes.unwrap_or_default(),
    })
}

/// `HEAD -> main, origin/main, tag: v1` into individual notes.
fn parse_decorations(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .map(|note| note.strip_prefix("HEAD -> ").unwrap_or(note))
        .filter(|note| !note.is_empty())
        .map(String::from)
        .collect()
}

pub(crate) fn parse_id(value: &str, record: &str) -> Result<ObjectId> {
    ObjectId::new(value).map_err(|_| Error::parse("object id", record))
}

pub(crate) fn parse_seconds(value: &str, record: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::parse("timestamp", record))
}

/// One entry of `git stash list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashRecord {
    pub reference: Ref,
    pub commit_id: ObjectId,
    pub message: String,
    pub timestamp: i64,
}

/// Parse `git stash list --format=<pretty_format(STASH_FIELDS)>` output.
///
/// # Errors
/// Returns a parse error for unknown codes or missing id/selector fields.
pub fn parse_stash_list(input: &str) -> Result<Vec<StashRecord>> {
    records(input)
        .map(|record| {
            let mut commit_id = None;
            let mut reference = None;
            let mut message = String::new();
            let mut timestamp = 0;

            for component in components(record) {
                let (code, value) = component?;
                match code {
                    "H" => commit_id = Some(parse_id(value, record)?),
                    "gD" => reference = Some(to_stash_ref(value)?),
                    "gs" => message = value.to_string(),
                    "ct" => timestamp = parse_seconds(value, record)?,
                    _ => return Err(Error::parse("stash field", format!("{code}:{value}"))),
                }
            }

            match (reference, commit_id) {
                (Some(reference), Some(commit_id)) => Ok(StashRecord {
                    reference,
                    commit_id,
                    message,
                    timestamp,
                }),
                _ => Err(Error::parse("stash record", record)),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, &str)]) -> String {
        let mut out: String = fields
            .iter()
            .map(|(code, value)| format!("{code}:{value}{SEPARATOR}"))
            .collect();
        out.push_str(SEPARATOR);
        out.push('\n');
        out
    }

    fn commit(id: &str, parents: &str, body: &str) -> String {
        record(&[
            ("H", id),
            ("T", "7777"),
            ("P", parents),
            ("an", "Alice"),
            ("ae", "alice@example.com"),
            ("at", "1700000000"),
            ("cn", "Bob"),
            ("ce", "bob@example.com"),
            ("ct", "1700000100"),
            ("s", "Subject line"),
            ("B", body),
            ("D", "HEAD -> main, origin/main, tag: v1"),
        ])
    }

    #[test]
    fn test_pretty_format() {
        assert_eq!(pretty_format(&["H", "P"]), "H:%H¶¶¶P:%P¶¶¶¶¶¶");
    }

    #[test]
    fn test_parse_single_commit() {
        let input = commit("aaaa", "bbbb cccc", "Subject line\n\nLonger body\nover lines\n");
        let records = parse_log(&input).unwrap();
        assert_eq!(records.len(), 1);

        let c = &records[0];
        assert_eq!(c.id.as_str(), "aaaa");
        assert_eq!(c.tree_id.as_str(), "7777");
        assert_eq!(
            c.parent_ids.iter().map(ObjectId::as_str).collect::<Vec<_>>(),
            vec!["bbbb", "cccc"]
        );
        assert_eq!(c.author.name, "Alice");
        assert_eq!(c.author.timestamp.timestamp(), 1_700_000_000);
        assert_eq!(c.committer.email, "bob@example.com");
        assert_eq!(c.message, "Subject line\n\nLonger body\nover lines");
        assert_eq!(c.ref_notes, vec!["main", "origin/main", "tag: v1"]);
    }

    #[test]
    fn test_root_commit_has_no_parents() {
        let records = parse_log(&commit("aaaa", "", "root")).unwrap();
        assert!(records[0].parent_ids.is_empty());
    }

    #[test]
    fn test_multiple_records() {
        let input = format!("{}{}", commit("aaaa", "bbbb", "x"), commit("bbbb", "", "y"));
        let records = parse_log(&input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id.as_str(), "bbbb");
    }

    #[test]
    fn test_unknown_field_is_fatal() {
        let input = record(&[("H", "aaaa"), ("zz", "nope")]);
        let err = parse_log(&input).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_missing_tree_is_fatal() {
        let input = record(&[("H", "aaaa")]);
        assert!(parse_log(&input).is_err());
    }

    #[test]
    fn test_empty_log() {
        assert!(parse_log("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_stash_list() {
        let input = format!(
            "{}{}",
            record(&[("H", "aaaa"), ("gD", "refs/stash@{0}"), ("gs", "WIP on main: x"), ("ct", "5")]),
            record(&[("H", "bbbb"), ("gD", "stash@{1}"), ("gs", "On dev: y"), ("ct", "6")]),
        );
        let stashes = parse_stash_list(&input).unwrap();
        assert_eq!(stashes.len(), 2);
        assert_eq!(stashes[0].reference, Ref::stash(0));
        assert_eq!(stashes[0].message, "WIP on main: x");
        assert_eq!(stashes[1].reference, Ref::stash(1));
        assert_eq!(stashes[1].timestamp, 6);
    }

    #[test]
    fn test_stash_without_selector_is_fatal() {
        let input = record(&[("H", "aaaa")]);
        assert!(parse_stash_list(&input).is_err());
    }
}
