//! Trait abstraction over the git subprocess.
//!
//! `GitGateway` is the only way the core talks to git, which keeps the
//! repository model testable against canned output.

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::cat_file::BatchObject;
use crate::config::GitConfigFile;
use crate::log::{LogRecord, StashRecord};
use crate::refs::RefListing;
use crate::status::{DiffKind, WorkingDirectoryItem};
use crate::tags::AnnotatedTagRecord;
use crate::tree::TreeEntry;
use crate::types::{ObjectId, Ref};
use crate::Result;

/// Which commits a log listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitSelector {
    /// Every commit reachable from any ref.
    All,
    /// Exactly these commits, without walking history. Yields nothing if
    /// any of them is unknown.
    Ids(Vec<ObjectId>),
}

/// Read and pass-through operations against one repository.
///
/// Implementations are bound to a single repository path. All operations
/// are async; the core awaits them and caches their outcome.
#[allow(clippy::missing_errors_doc)]
pub trait GitGateway: Send + Sync {
    /// Repository working directory this gateway is bound to.
    fn path(&self) -> &Path;

    // === Bulk listings ===

    /// Every branch, tracking branch and tag ref.
    fn list_refs(&self) -> impl Future<Output = Result<Vec<RefListing>>> + Send;

    fn list_commits(
        &self,
        selector: &CommitSelector,
    ) -> impl Future<Output = Result<Vec<LogRecord>>> + Send;

    /// Annotated tag objects that point at commits.
    fn list_annotated_tags(&self) -> impl Future<Output = Result<Vec<AnnotatedTagRecord>>> + Send;

    fn list_stashes(&self) -> impl Future<Output = Result<Vec<StashRecord>>> + Send;

    // === Per-object reads ===

    /// Entries of a tree, or `None` if the tree does not exist.
    fn list_tree_entries(
        &self,
        tree_id: &ObjectId,
    ) -> impl Future<Output = Result<Option<Vec<TreeEntry>>>> + Send;

    /// Raw object contents, or `None` if the object does not exist.
    fn lookup_object(
        &self,
        id: &ObjectId,
    ) -> impl Future<Output = Result<Option<BatchObject>>> + Send;

    /// Resolve a revision expression (`HEAD~2`, a short id, a ref) to a full id.
    fn resolve_revision(
        &self,
        revision: &str,
    ) -> impl Future<Output = Result<Option<ObjectId>>> + Send;

    // === Repository state ===

    /// Location of `name` inside the git directory, as `git rev-parse
    /// --git-path` reports it. Follows linked worktrees and `GIT_DIR`.
    fn git_path(&self, name: &str) -> impl Future<Output = Result<PathBuf>> + Send;

    fn read_config(&self) -> impl Future<Output = Result<GitConfigFile>> + Send;

    /// When `FETCH_HEAD` was last written, or `None` if the repository was
    /// never fetched.
    fn last_fetch_date(&self) -> impl Future<Output = Result<Option<DateTime<Utc>>>> + Send;

    /// The branch `HEAD` points at, or `None` when detached.
    fn read_head(&self) -> impl Future<Output = Result<Option<Ref>>> + Send;

    /// Changed paths under `dir` (relative to the repository root).
    fn read_working_tree_diff(
        &self,
        kind: DiffKind,
        dir: &str,
    ) -> impl Future<Output = Result<Vec<WorkingDirectoryItem>>> + Send;

    // === Pass-through mutations ===

    /// Fetch and prune every remote.
    fn fetch_all(&self) -> impl Future<Output = Result<()>> + Send;

    /// Discard tracked changes and remove untracked files.
    fn clean_working_tree(&self) -> impl Future<Output = Result<()>> + Send;

    /// Delete a fully merged local branch.
    fn delete_branch(&self, name: &str) -> impl Future<Output = Result<()>> + Send;
}
