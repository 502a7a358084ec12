//! Annotated tag listing via `git for-each-ref refs/tags`.

use crate::error::{Error, Result};
use crate::log::{SEPARATOR, components, parse_id, parse_seconds, records};
use crate::types::{ObjectId, Principal};

/// `for-each-ref` atoms requested for each tag, keyed by component code.
const TAG_FIELDS: [(&str, &str); 8] = [
    ("id", "objectname"),
    ("type", "objecttype"),
    ("target", "*objectname"),
    ("targettype", "*objecttype"),
    ("tn", "taggername"),
    ("te", "taggeremail"),
    ("td", "taggerdate:unix"),
    ("m", "contents"),
];

/// Build the `--format=` value matching [`parse_annotated_tags`].
#[must_use]
pub fn tag_list_format() -> String {
    let mut format: String = TAG_FIELDS
        .iter()
        .map(|(code, atom)| format!("{code}:%({atom}){SEPARATOR}"))
        .collect();
    format.push_str(SEPARATOR);
    format
}

/// An annotated tag object that points at a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedTagRecord {
    pub id: ObjectId,
    pub target: ObjectId,
    pub message: String,
    /// Very old tags may carry no tagger line.
    pub tagger: Option<Principal>,
}

/// Parse a tag listing produced with [`tag_list_format`].
///
/// Lightweight tags and annotated tags whose target is not a commit are
/// skipped.
///
/// # Errors
/// Returns a parse error for unknown codes or malformed ids/timestamps.
pub fn parse_annotated_tags(input: &str) -> Result<Vec<AnnotatedTagRecord>> {
    let mut tags = Vec::new();

    for record in records(input) {
        let mut id = None;
        let mut object_type = "";
        let mut target = None;
        let mut target_type = "";
        let mut tagger_name = None;
        let mut tagger_email = None;
        let mut tagger_date = None;
        let mut message = String::new();

        for component in components(record) {
            let (code, value) = component?;
            match code {
                "id" => id = Some(parse_id(value, record)?),
                "type" => object_type = value,
                "target" if value.is_empty() => {}
                "target" => target = Some(parse_id(value, record)?),
                "targettype" => target_type = value,
                "tn" => tagger_name = Some(value.to_string()),
                "te" => {
                    let email = value.trim_start_matches('<').trim_end_matches('>');
                    tagger_email = Some(email.to_string());
                }
                "td" if value.is_empty() => {}
                "td" => tagger_date = Some(parse_seconds(value, record)?),
                "m" => message = value.to_string(),
                _ => return Err(Error::parse("tag field", format!("{code}:{value}"))),
            }
        }

        if object_type != "tag" || target_type != "commit" {
            continue;
        }

        let (Some(id), Some(target)) = (id, target) else {
            return Err(Error::parse("tag record", record));
        };

        let tagger = match (tagger_name, tagger_email, tagger_date) {
            (Some(name), Some(email), Some(seconds)) => {
                Some(Principal::from_unix(name, email, seconds)?)
            }
            _ => None,
        };

        tags.push(AnnotatedTagRecord {
            id,
            target,
            message,
            tagger,
        });
    }

    Ok(tags)
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

    #[test]
    fn test_format_uses_atoms() {
        let format = tag_list_format();
        assert!(format.starts_with("id:%(objectname)¶¶¶"));
        assert!(format.contains("td:%(taggerdate:unix)"));
        assert!(format.ends_with("¶¶¶¶¶¶"));
    }

    #[test]
    fn test_annotated_tag() {
        let input = record(&[
            ("id", "1111"),
            ("type", "tag"),
            ("target", "2222"),
            ("targettype", "commit"),
            ("tn", "Release Bot"),
            ("te", "<bot@example.com>"),
            ("td", "1700000000"),
            ("m", "Release 1.0\n\nNotes here\n"),
        ]);
        let tags = parse_annotated_tags(&input).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].id.as_str(), "1111");
        assert_eq!(tags[0].target.as_str(), "2222");
        assert_eq!(tags[0].message, "Release 1.0\n\nNotes here");
        let tagger = tags[0].tagger.as_ref().unwrap();
        assert_eq!(tagger.email, "bot@example.com");
    }

    #[test]
    fn test_lightweight_and_non_commit_tags_skipped() {
        let input = format!(
            "{}{}",
            record(&[
                ("id", "1111"),
                ("type", "commit"),
                ("target", ""),
                ("targettype", ""),
                ("td", ""),
                ("m", "subject"),
            ]),
            record(&[
                ("id", "3333"),
                ("type", "tag"),
                ("target", "4444"),
                ("targettype", "tree"),
            ]),
        );
        assert!(parse_annotated_tags(&input).unwrap().is_empty());
    }

    #[test]
    fn test_tag_without_tagger() {
        let input = record(&[
            ("id", "1111"),
            ("type", "tag"),
            ("target", "2222"),
            ("targettype", "commit"),
            ("m", "old tag"),
        ]);
        let tags = parse_annotated_tags(&input).unwrap();
        assert!(tags[0].tagger.is_none());
    }

    #[test]
    fn test_unknown_code_is_fatal() {
        let input = record(&[("id", "1111"), ("bogus", "x")]);
        assert!(parse_annotated_tags(&input).is_err());
    }
}
