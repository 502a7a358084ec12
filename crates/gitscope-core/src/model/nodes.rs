//! Immutable nodes of the repository graph.
//!
//! The model hands these out inside `Arc`s; looking up the same identity
//! twice yields the same allocation.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use gitscope_git::{
    AnnotatedTagRecord, BatchObject, LogRecord, ObjectId, Principal, Ref, RemoteConfig,
    StashRecord, TreeEntry, TreeEntryKind,
};
use serde::Serialize;

/// A commit as listed by `git log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub id: ObjectId,
    pub tree_id: ObjectId,
    pub parent_ids: Vec<ObjectId>,
    pub author: Principal,
    pub committer: Principal,
    pub subject: String,
    pub message: String,
    /// Ref decorations, e.g. `origin/main` or `tag: v1`.
    pub ref_notes: Vec<String>,
}

impl Commit {
    #[must_use]
    pub fn first_parent_id(&self) -> Option<&ObjectId> {
        self.parent_ids.first()
    }

    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() > 1
    }
}

impl From<LogRecord> for Commit {
    fn from(record: LogRecord) -> Self {
        Self {
            id: record.id,
            tree_id: record.tree_id,
            parent_ids: record.parent_ids,
            author: record.author,
            committer: record.committer,
            subject: record.subject,
            message: record.message,
            ref_notes: record.ref_notes,
        }
    }
}

/// File contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blob {
    pub id: ObjectId,
    pub size: usize,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Blob {
    /// Contents decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Heuristic used by git itself: a NUL in the first 8000 bytes.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.data.iter().take(8000).any(|&b| b == 0)
    }
}

impl From<BatchObject> for Blob {
    fn from(object: BatchObject) -> Self {
        Self {
            id: object.id,
            size: object.size,
            data: object.data,
        }
    }
}

/// A directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tree {
    pub id: ObjectId,
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn blobs(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter().filter(|e| e.kind == TreeEntryKind::Blob)
    }

    pub fn subtrees(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter().filter(|e| e.kind == TreeEntryKind::Subtree)
    }
}

/// An annotated tag object pointing at a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedTag {
    pub id: ObjectId,
    pub target: ObjectId,
    pub message: String,
    pub tagger: Option<Principal>,
}

impl From<AnnotatedTagRecord> for AnnotatedTag {
    fn from(record: AnnotatedTagRecord) -> Self {
        Self {
            id: record.id,
            target: record.target,
            message: record.message,
            tagger: record.tagger,
        }
    }
}

/// A stash reflog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stash {
    pub reference: Ref,
    pub commit_id: ObjectId,
    pub message: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<StashRecord> for Stash {
    fn from(record: StashRecord) -> Self {
        Self {
            timestamp: DateTime::from_timestamp(record.timestamp, 0),
            reference: record.reference,
            commit_id: record.commit_id,
            message: record.message,
        }
    }
}

/// A ref and the commit it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefEntry {
    pub reference: Ref,
    /// Commit the ref points at, after peeling annotated tags.
    pub commit_id: ObjectId,
    /// The tag object, for annotated tags.
    pub annotated_tag: Option<ObjectId>,
}

impl RefEntry {
    #[must_use]
    pub const fn is_annotated_tag(&self) -> bool {
        self.annotated_tag.is_some()
    }
}

/// Message and author of a tag, annotated or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagDetails {
    pub message: String,
    pub tagger: Option<Principal>,
    pub annotated: bool,
}

/// A configured remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    pub fetch_url: Option<String>,
    pub push_urls: Vec<String>,
    pub refspecs: Vec<String>,
}

impl From<&RemoteConfig> for Remote {
    fn from(config: &RemoteConfig) -> Self {
        Self {
            name: config.name.clone(),
            fetch_url: config.fetch_url().map(String::from),
            push_urls: config.effective_push_urls().to_vec(),
            refspecs: config.refspecs.iter().map(ToString::to_string).collect(),
        }
    }
}
