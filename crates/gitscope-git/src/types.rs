//! Value types shared by the gateway and the parsers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Longest id git produces (SHA-256 object format).
const MAX_OBJECT_ID_LEN: usize = 64;

/// A content-addressed git object id.
///
/// Ids are lowercase hex. The same id always denotes the same content,
/// which is what makes every cache in gitscope safe to keep forever.
///
/// ```
/// use gitscope_git::ObjectId;
///
/// let id = ObjectId::new("DEADBEEF").unwrap();
/// assert_eq!(id.as_str(), "deadbeef");
/// assert!(ObjectId::new("").is_err());
/// assert!(ObjectId::new("not-hex").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Create a validated object id.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the value is empty, too long, or not hex.
    pub fn new(value: impl AsRef<str>) -> Result<Self> {
        let value = value.as_ref().trim();
        if value.is_empty()
            || value.len() > MAX_OBJECT_ID_LEN
            || !value.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(Error::validation("object id", value));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a complete SHA-1 or SHA-256 id rather than an abbreviation.
    #[must_use]
    pub fn is_full(&self) -> bool {
        matches!(self.0.len(), 40 | 64)
    }

    /// Abbreviated form for display.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

/// A named pointer into the object graph.
///
/// Identity is the fully-qualified `ref_name`; `name` is the short form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ref {
    /// A local branch (`refs/heads/<name>`).
    Branch { ref_name: String, name: String },

    /// A remote-tracking branch (`refs/remotes/<remote>/<name>`).
    TrackingBranch {
        ref_name: String,
        remote: String,
        name: String,
    },

    /// A tag, lightweight or annotated (`refs/tags/<name>`).
    Tag { ref_name: String, name: String },

    /// A stash reflog entry (`refs/stash@{n}`).
    Stash { ref_name: String, name: String },
}

/// Discriminant of [`Ref`], handy for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Branch,
    TrackingBranch,
    Tag,
    Stash,
}

impl Ref {
    /// Build a local branch ref from its short name.
    #[must_use]
    pub fn branch(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::Branch {
            ref_name: format!("refs/heads/{name}"),
            name,
        }
    }

    /// Build a tracking branch ref from remote and branch names.
    #[must_use]
    pub fn tracking(remote: impl Into<String>, name: impl Into<String>) -> Self {
        let (remote, name) = (remote.into(), name.into());
        Self::TrackingBranch {
            ref_name: format!("refs/remotes/{remote}/{name}"),
            remote,
            name,
        }
    }

    /// Build a tag ref from its short name.
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::Tag {
            ref_name: format!("refs/tags/{name}"),
            name,
        }
    }

    /// Build the ref for the `index`th stash entry.
    #[must_use]
    pub fn stash(index: usize) -> Self {
        let name = format!("stash@{{{index}}}");
        Self::Stash {
            ref_name: format!("refs/{name}"),
            name,
        }
    }

    /// Fully-qualified name, the identity key.
    #[must_use]
    pub fn ref_name(&self) -> &str {
        match self {
            Self::Branch { ref_name, .. }
            | Self::TrackingBranch { ref_name, .. }
            | Self::Tag { ref_name, .. }
            | Self::Stash { ref_name, .. } => ref_name,
        }
    }

    /// Short name without the `refs/...` prefix (and without the remote).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Branch { name, .. }
            | Self::TrackingBranch { name, .. }
            | Self::Tag { name, .. }
            | Self::Stash { name, .. } => name,
        }
    }

    /// Name as a user would type it, e.g. `origin/main` for tracking branches.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::TrackingBranch { remote, name, .. } => format!("{remote}/{name}"),
            other => other.name().to_string(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> RefKind {
        match self {
            Self::Branch { .. } => RefKind::Branch,
            Self::TrackingBranch { .. } => RefKind::TrackingBranch,
            Self::Tag { .. } => RefKind::Tag,
            Self::Stash { .. } => RefKind::Stash,
        }
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ref_name())
    }
}

/// Author, committer or tagger of an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub name: String,
    pub email: String,
    pub timestamp: DateTime<Utc>,
}

impl Principal {
    /// Build a principal from git's unix-seconds timestamp.
    ///
    /// # Errors
    /// Returns a parse error if the timestamp is out of range.
    pub fn from_unix(name: String, email: String, seconds: i64) -> Result<Self> {
        let timestamp = DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| Error::parse("timestamp", seconds.to_string()))?;
        Ok(Self {
            name,
            email,
            timestamp,
        })
    }
}

/// Type of a git object as reported by plumbing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            "tag" => Ok(Self::Tag),
            other => Err(Error::parse("object type", other)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_normalizes_case() {
        let id = ObjectId::new("ABCDEF0123").unwrap();
        assert_eq!(id.as_str(), "abcdef0123");
        assert_eq!(id.short(), "abcdef0");
    }

    #[test]
    fn test_object_id_rejects_garbage() {
        assert!(ObjectId::new("").is_err());
        assert!(ObjectId::new("   ").is_err());
        assert!(ObjectId::new("xyz").is_err());
        assert!(ObjectId::new("a".repeat(65)).is_err());
    }

    #[test]
    fn test_ref_constructors() {
        let branch = Ref::branch("feature/a");
        assert_eq!(branch.ref_name(), "refs/heads/feature/a");
        assert_eq!(branch.name(), "feature/a");

        let tracking = Ref::tracking("origin", "main");
        assert_eq!(tracking.ref_name(), "refs/remotes/origin/main");
        assert_eq!(tracking.display_name(), "origin/main");

        let stash = Ref::stash(2);
        assert_eq!(stash.ref_name(), "refs/stash@{2}");
        assert_eq!(stash.name(), "stash@{2}");
        assert_eq!(stash.kind(), RefKind::Stash);
    }

    #[test]
    fn test_principal_from_unix() {
        let p = Principal::from_unix("A".into(), "a@x".into(), 1_700_000_000).unwrap();
        assert_eq!(p.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_object_type_roundtrip() {
        for ty in [ObjectType::Blob, ObjectType::Tree, ObjectType::Commit, ObjectType::Tag] {
            assert_eq!(ty.as_str().parse::<ObjectType>().unwrap(), ty);
        }
        assert!("submodule".parse::<ObjectType>().is_err());
    }
}
