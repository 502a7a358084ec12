//! Lazily materialized, memoized model of a git repository.
//!
//! [`RepositoryModel`] reads refs, commits, tags, stashes, trees and blobs
//! through a [`gitscope_git::GitGateway`] on first use and serves every later
//! lookup from memory. Distance and reachability answers are shared across
//! handles through a [`PersistentCache`].

pub mod cache;
pub mod config;
pub mod distance;
pub mod error;
pub mod model;
pub mod persistent;
pub mod reachability;

#[cfg(test)]
mod test_support;

pub use cache::{KeyedCache, SingleSlotCache};
pub use config::Config;
pub use distance::{CommitGraph, RefDistance};
pub use error::{Error, Result};
pub use model::{
    AnnotatedTag, Blob, Commit, OnMissing, RefEntry, Remote, RepositoryModel, Stash, TagDetails,
    Tree,
};
pub use persistent::{CommitPair, PersistentCache};
