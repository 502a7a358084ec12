//! Ref name classification and the ref-list parser.
//!
//! The ref list is produced by
//! `git for-each-ref --format='%(objectname) %(objecttype) %(refname) %(*objecttype)'`,
//! one ref per line. The trailing peeled type is only present for annotated tags.

use crate::error::{Error, Result};
use crate::types::{ObjectId, Ref};

/// `for-each-ref` format string matching [`parse_ref_list`].
pub const REF_LIST_FORMAT: &str = "%(objectname) %(objecttype) %(refname) %(*objecttype)";

/// Ref namespaces included in a listing.
pub const REF_LIST_PATTERNS: [&str; 4] = ["refs/heads", "refs/remotes", "refs/tags", "refs/stash"];

/// What a listed ref points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTarget {
    /// Directly at a commit (branches, tracking branches, lightweight tags).
    Commit(ObjectId),
    /// At an annotated tag object which in turn points at a commit.
    AnnotatedTag(ObjectId),
}

/// One classified line of a ref listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefListing {
    pub reference: Ref,
    pub target: RefTarget,
}

/// Parse a ref listing into classified refs.
///
/// `refs/stash` is dropped (stashes are listed separately), as are tags that
/// do not resolve to a commit in one step.
///
/// # Errors
/// Returns a parse error for malformed lines or refs outside the known namespaces.
pub fn parse_ref_list(input: &str) -> Result<Vec<RefListing>> {
    let mut listings = Vec::new();

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(target), Some(object_type), Some(ref_name)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(Error::parse("ref list line", line));
        };
        let peeled_type = fields.next();
        if fields.next().is_some() {
            return Err(Error::parse("ref list line", line));
        }

        let target = ObjectId::new(target).map_err(|_| Error::parse("ref list line", line))?;

        if ref_name == "refs/stash" {
            continue;
        }

        if let Some(name) = ref_name.strip_prefix("refs/heads/") {
            listings.push(RefListing {
                reference: Ref::Branch {
                    ref_name: ref_name.to_string(),
                    name: non_empty(name, line)?.to_string(),
                },
                target: RefTarget::Commit(target),
            });
        } else if let Some(rest) = ref_name.strip_prefix("refs/remotes/") {
            let (remote, name) = split_remote(rest).ok_or_else(|| Error::parse("ref list line", line))?;
            listings.push(RefListing {
                reference: Ref::TrackingBranch {
                    ref_name: ref_name.to_string(),
                    remote: remote.to_string(),
                    name: name.to_string(),
                },
                target: RefTarget::Commit(target),
            });
        } else if let Some(name) = ref_name.strip_prefix("refs/tags/") {
            let reference = Ref::Tag {
                ref_name: ref_name.to_string(),
                name: non_empty(name, line)?.to_string(),
            };
            match (object_type, peeled_type) {
                ("commit", _) => listings.push(RefListing {
                    reference,
                    target: RefTarget::Commit(target),
                }),
                ("tag", Some("commit")) => listings.push(RefListing {
                    reference,
                    target: RefTarget::AnnotatedTag(target),
                }),
                // Tags of trees, blobs or other tags never reach a commit.
                ("tag" | "tree" | "blob", _) => {
                    tracing::trace!(ref_name, object_type, "skipping non-commit tag");
                }
                _ => return Err(Error::parse("ref list line", line)),
            }
        } else {
            return Err(Error::parse("ref list line", line));
        }
    }

    Ok(listings)
}

fn non_empty<'a>(name: &'a str, line: &str) -> Result<&'a str> {
    if name.is_empty() {
        Err(Error::parse("ref list line", line))
    } else {
        Ok(name)
    }
}

/// Split `origin/feature/x` into `("origin", "feature/x")`.
fn split_remote(input: &str) -> Option<(&str, &str)> {
    let (remote, name) = input.split_once('/')?;
    if remote.is_empty() || name.is_empty() {
        None
    } else {
        Some((remote, name))
    }
}

/// Parse a fully-qualified ref name into a [`Ref`].
///
/// # Errors
/// Returns a parse error if the name is not in a known namespace.
pub fn parse_explicit_ref(input: &str) -> Result<Ref> {
    if input.starts_with("refs/heads/") {
        to_branch_ref(input)
    } else if input.starts_with("refs/remotes/") {
        to_tracking_ref(input)
    } else if let Some(name) = input.strip_prefix("refs/tags/").filter(|n| !n.is_empty()) {
        Ok(Ref::Tag {
            ref_name: input.to_string(),
            name: name.to_string(),
        })
    } else if input.starts_with("refs/stash@{") {
        to_stash_ref(input)
    } else {
        Err(Error::parse("explicit ref", input))
    }
}

/// Interpret `input` as a local branch: `refs/heads/dev` or plain `dev`.
///
/// # Errors
/// Returns a parse error for refs in other namespaces.
pub fn to_branch_ref(input: &str) -> Result<Ref> {
    if input.is_empty() {
        return Err(Error::validation("branch name", input));
    }
    if let Some(name) = input.strip_prefix("refs/heads/") {
        if name.is_empty() {
            return Err(Error::parse("branch ref", input));
        }
        return Ok(Ref::Branch {
            ref_name: input.to_string(),
            name: name.to_string(),
        });
    }
    if input.starts_with("refs/") {
        return Err(Error::parse("branch ref", input));
    }
    Ok(Ref::branch(input))
}

/// Interpret `input` as a tracking branch: `refs/remotes/origin/dev` or `origin/dev`.
///
/// # Errors
/// Returns a parse error if no remote component can be found.
pub fn to_tracking_ref(input: &str) -> Result<Ref> {
    let rest = match input.strip_prefix("refs/remotes/") {
        Some(rest) => rest,
        None if input.starts_with("refs/") => return Err(Error::parse("tracking ref", input)),
        None => input,
    };
    let (remote, name) = split_remote(rest).ok_or_else(|| Error::parse("tracking ref", input))?;
    Ok(Ref::tracking(remote, name))
}

/// Interpret `input` as a stash entry: `refs/stash@{0}` or `stash@{0}`.
///
/// # Errors
/// Returns a parse error if the stash index is malformed.
pub fn to_stash_ref(input: &str) -> Result<Ref> {
    let short = match input.strip_prefix("refs/") {
        Some(short) => short,
        None => input,
    };
    let index = short
        .strip_prefix("stash@{")
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<usize>().ok())
        .ok_or_else(|| Error::parse("stash ref", input))?;
    Ok(Ref::stash(index))
}
