//! Result cache shared by every open repository.
//!
//! Keys are pairs of commit ids. Commits are immutable, so an answer
//! computed for a pair stays valid forever and can be shared between
//! handles, including handles for different clones of the same history.

use std::fmt;

use gitscope_git::ObjectId;

use crate::cache::KeyedCache;
use crate::distance::RefDistance;

/// An ordered pair of commit ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitPair {
    pub first: ObjectId,
    pub second: ObjectId,
}

impl CommitPair {
    #[must_use]
    pub fn new(first: &ObjectId, second: &ObjectId) -> Self {
        Self {
            first: first.clone(),
            second: second.clone(),
        }
    }
}

impl fmt::Display for CommitPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.first.short(), self.second.short())
    }
}

/// Process-wide distance and reachability answers.
///
/// Create one at startup and pass it to every
/// [`RepositoryModel`](crate::RepositoryModel) as an `Arc`.
#[derive(Debug, Default)]
pub struct PersistentCache {
    /// `(source, target)` to their distance.
    distances: KeyedCache<CommitPair, Option<RefDistance>>,
    /// `(commit, head)` to whether `commit` is an ancestor of `head`.
    reachability: KeyedCache<CommitPair, bool>,
}

impl PersistentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn distances(&self) -> &KeyedCache<CommitPair, Option<RefDistance>> {
        &self.distances
    }

    #[must_use]
    pub const fn reachability(&self) -> &KeyedCache<CommitPair, bool> {
        &self.reachability
    }
}
