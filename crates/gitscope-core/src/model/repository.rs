//! The per-repository object graph.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use gitscope_git::{
    CommitSelector, DiffKind, GitCli, GitConfigFile, GitGateway, ObjectId, ObjectType, Ref,
    RefTarget, WorkingDirectoryItem,
};

use crate::cache::{KeyedCache, SingleSlotCache};
use crate::config::Config;
use crate::distance::{self, CommitGraph, RefDistance};
use crate::error::{Error, Result};
use crate::model::OnMissing;
use crate::model::nodes::{
    AnnotatedTag, Blob, Commit, RefEntry, Remote, Stash, TagDetails, Tree,
};
use crate::persistent::{CommitPair, PersistentCache};
use crate::reachability;

/// Every listed commit, in `git log` order and by id.
#[derive(Debug, Default)]
struct CommitIndex {
    ordered: Vec<Arc<Commit>>,
    by_id: HashMap<ObjectId, Arc<Commit>>,
}

impl CommitIndex {
    fn new(ordered: Vec<Arc<Commit>>) -> Self {
        let by_id = ordered
            .iter()
            .map(|commit| (commit.id.clone(), Arc::clone(commit)))
            .collect();
        Self { ordered, by_id }
    }
}

impl CommitGraph for CommitIndex {
    fn parent_ids(&self, id: &ObjectId) -> Option<&[ObjectId]> {
        self.by_id.get(id).map(|commit| commit.parent_ids.as_slice())
    }
}

/// Every ref sorted by fully-qualified name.
#[derive(Debug, Default)]
struct RefIndex {
    ordered: Vec<Arc<RefEntry>>,
    by_name: HashMap<String, Arc<RefEntry>>,
}

impl RefIndex {
    fn new(mut entries: Vec<RefEntry>) -> Self {
        entries.sort_by(|a, b| a.reference.ref_name().cmp(b.reference.ref_name()));
        let ordered: Vec<_> = entries.into_iter().map(Arc::new).collect();
        let by_name = ordered
            .iter()
            .map(|entry| (entry.reference.ref_name().to_string(), Arc::clone(entry)))
            .collect();
        Self { ordered, by_name }
    }
}

/// Ordered pair of refs, keyed by their fully-qualified names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RefPair {
    source: String,
    target: String,
}

/// Lazily materialized metadata of one opened repository.
///
/// Bulk listings (refs, the full commit history, annotated tags, stashes,
/// the config file) run at most once per handle and are then frozen: a
/// handle never observes later changes to the repository. Open a new handle
/// for fresh data.
pub struct RepositoryModel<G> {
    git: G,
    persistent: Arc<PersistentCache>,
    refs: SingleSlotCache<Arc<RefIndex>>,
    commits: SingleSlotCache<Arc<CommitIndex>>,
    annotated_tags: SingleSlotCache<Arc<HashMap<ObjectId, Arc<AnnotatedTag>>>>,
    stashes: SingleSlotCache<Arc<Vec<Arc<Stash>>>>,
    config: SingleSlotCache<Arc<GitConfigFile>>,
    head: SingleSlotCache<Option<Ref>>,
    last_fetch: SingleSlotCache<Option<DateTime<Utc>>>,
    unlisted_commits: KeyedCache<ObjectId, Option<Arc<Commit>>>,
    blobs: KeyedCache<ObjectId, Option<Arc<Blob>>>,
    trees: KeyedCache<ObjectId, Option<Arc<Tree>>>,
    distances: KeyedCache<RefPair, Option<RefDistance>>,
    working_tree: KeyedCache<(DiffKind, String), Arc<Vec<WorkingDirectoryItem>>>,
}

impl<G> fmt::Debug for RepositoryModel<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryModel").finish_non_exhaustive()
    }
}

impl RepositoryModel<GitCli> {
    /// Open the repository at `path`, talking to git as `config` says.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if `path` is not a git work tree.
    pub async fn open(
        path: impl AsRef<Path>,
        config: &Config,
        persistent: Arc<PersistentCache>,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(Error::validation("repository path", path.display().to_string()));
        }

        let git = GitCli::with_binary(&config.git.binary, path);
        if !git.is_repository().await {
            return Err(Error::validation("repository path", path.display().to_string()));
        }

        tracing::debug!(path = %path.display(), "opened repository");
        Ok(Self::new(git, persistent))
    }
}

fn apply_policy<T>(
    found: Option<T>,
    on_missing: OnMissing,
    kind: &'static str,
    id: &dyn fmt::Display,
) -> Result<Option<T>> {
    match (found, on_missing) {
        (Some(value), _) => Ok(Some(value)),
        (None, OnMissing::Error) => Err(Error::not_found(kind, id)),
        (None, OnMissing::Null) => Ok(None),
        (None, OnMissing::Warn) => {
            tracing::warn!(kind, %id, "lookup found nothing");
            Ok(None)
        }
    }
}

impl<G: GitGateway> RepositoryModel<G> {
    /// Build a model over an existing gateway.
    #[must_use]
    pub fn new(git: G, persistent: Arc<PersistentCache>) -> Self {
        Self {
            git,
            persistent,
            refs: SingleSlotCache::new(),
            commits: SingleSlotCache::new(),
            annotated_tags: SingleSlotCache::new(),
            stashes: SingleSlotCache::new(),
            config: SingleSlotCache::new(),
            head: SingleSlotCache::new(),
            last_fetch: SingleSlotCache::new(),
            unlisted_commits: KeyedCache::new(),
            blobs: KeyedCache::new(),
            trees: KeyedCache::new(),
            distances: KeyedCache::new(),
            working_tree: KeyedCache::new(),
        }
    }

    /// The gateway this model reads through.
    pub const fn git(&self) -> &G {
        &self.git
    }

    /// Repository working directory.
    pub fn path(&self) -> &Path {
        self.git.path()
    }

    // === Bulk loaders ===

    async fn commit_index(&self) -> Result<Arc<CommitIndex>> {
        self.commits.fetch(|| self.load_commits()).await
    }

    async fn load_commits(&self) -> Result<Arc<CommitIndex>> {
        tracing::trace!("loading full commit history");
        let records = self.git.list_commits(&CommitSelector::All).await?;
        let ordered = records.into_iter().map(|r| Arc::new(Commit::from(r))).collect();
        Ok(Arc::new(CommitIndex::new(ordered)))
    }

    async fn annotated_tag_map(&self) -> Result<Arc<HashMap<ObjectId, Arc<AnnotatedTag>>>> {
        self.annotated_tags.fetch(|| self.load_annotated_tags()).await
    }

    async fn load_annotated_tags(&self) -> Result<Arc<HashMap<ObjectId, Arc<AnnotatedTag>>>> {
        tracing::trace!("loading annotated tags");
        let records = self.git.list_annotated_tags().await?;
        Ok(Arc::new(
            records
                .into_iter()
                .map(|r| (r.id.clone(), Arc::new(AnnotatedTag::from(r))))
                .collect(),
        ))
    }

    async fn stash_list(&self) -> Result<Arc<Vec<Arc<Stash>>>> {
        self.stashes.fetch(|| self.load_stashes()).await
    }

    async fn load_stashes(&self) -> Result<Arc<Vec<Arc<Stash>>>> {
        tracing::trace!("loading stashes");
        let records = self.git.list_stashes().await?;
        Ok(Arc::new(records.into_iter().map(|r| Arc::new(Stash::from(r))).collect()))
    }

    async fn ref_index(&self) -> Result<Arc<RefIndex>> {
        self.refs.fetch(|| self.load_refs()).await
    }

    async fn load_refs(&self) -> Result<Arc<RefIndex>> {
        tracing::trace!("loading refs");
        let listings = self.git.list_refs().await?;
        let tags = self.annotated_tag_map().await?;
        let stashes = self.stash_list().await?;

        let mut entries = Vec::with_capacity(listings.len() + stashes.len());
        for listing in listings {
            match listing.target {
                RefTarget::Commit(commit_id) => entries.push(RefEntry {
                    reference: listing.reference,
                    commit_id,
                    annotated_tag: None,
                }),
                RefTarget::AnnotatedTag(tag_id) => match tags.get(&tag_id) {
                    Some(tag) => entries.push(RefEntry {
                        reference: listing.reference,
                        commit_id: tag.target.clone(),
                        annotated_tag: Some(tag_id),
                    }),
                    None => {
                        tracing::trace!(tag = %listing.reference, "tag does not peel to a commit");
                    }
                },
            }
        }
        entries.extend(stashes.iter().map(|stash| RefEntry {
            reference: stash.reference.clone(),
            commit_id: stash.commit_id.clone(),
            annotated_tag: None,
        }));

        Ok(Arc::new(RefIndex::new(entries)))
    }

    async fn git_config(&self) -> Result<Arc<GitConfigFile>> {
        self.config.fetch(|| self.load_config()).await
    }

    async fn load_config(&self) -> Result<Arc<GitConfigFile>> {
        tracing::trace!("reading git config");
        Ok(Arc::new(self.git.read_config().await?))
    }

    // === Refs ===

    /// Every branch, tracking branch, tag and stash, sorted by name.
    ///
    /// # Errors
    /// Returns error if a listing fails or cannot be parsed.
    pub async fn all_refs(&self) -> Result<Vec<Arc<RefEntry>>> {
        Ok(self.ref_index().await?.ordered.clone())
    }

    /// Look up a ref by fully-qualified name (`refs/heads/main`).
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] under [`OnMissing::Error`], or a listing failure.
    pub async fn lookup_ref(&self, ref_name: &str, on_missing: OnMissing) -> Result<Option<Arc<RefEntry>>> {
        if ref_name.is_empty() {
            return Err(Error::validation("ref name", ref_name));
        }
        let index = self.ref_index().await?;
        apply_policy(index.by_name.get(ref_name).cloned(), on_missing, "ref", &ref_name)
    }

    /// Look up a ref the way a user would type it: a full name, a branch,
    /// a tag, `remote/branch` or `stash@{n}`, tried in that order.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] under [`OnMissing::Error`], or a listing failure.
    pub async fn find_ref(&self, name: &str, on_missing: OnMissing) -> Result<Option<Arc<RefEntry>>> {
        if name.is_empty() {
            return Err(Error::validation("ref name", name));
        }
        let index = self.ref_index().await?;
        let found = [
            name.to_string(),
            format!("refs/heads/{name}"),
            format!("refs/tags/{name}"),
            format!("refs/remotes/{name}"),
            format!("refs/{name}"),
        ]
        .iter()
        .find_map(|candidate| index.by_name.get(candidate).cloned());
        apply_policy(found, on_missing, "ref", &name)
    }

    /// The commit a ref resolves to, peeling annotated tags.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the ref does not exist.
    pub async fn ref_commit_id(&self, reference: &Ref) -> Result<ObjectId> {
        let entry = self.lookup_ref(reference.ref_name(), OnMissing::Error).await?;
        entry
            .map(|entry| entry.commit_id.clone())
            .ok_or_else(|| Error::not_found("ref", reference))
    }

    /// The branch `HEAD` points at, `None` when detached.
    ///
    /// # Errors
    /// Returns error if git cannot read `HEAD`.
    pub async fn head_ref(&self) -> Result<Option<Ref>> {
        self.head.fetch(|| self.load_head()).await
    }

    async fn load_head(&self) -> Result<Option<Ref>> {
        Ok(self.git.read_head().await?)
    }

    /// The ref entry for `HEAD`, `None` when detached or unborn.
    ///
    /// # Errors
    /// Returns error if git cannot read `HEAD` or list refs.
    pub async fn head(&self) -> Result<Option<Arc<RefEntry>>> {
        match self.head_ref().await? {
            Some(head) => self.lookup_ref(head.ref_name(), OnMissing::Null).await,
            None => Ok(None),
        }
    }

    /// Message and author of a tag. Lightweight tags borrow both from the
    /// commit they point at.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for non-tag refs, or [`Error::NotFound`]
    /// if the tagged objects are not in the repository.
    pub async fn tag_details(&self, entry: &RefEntry) -> Result<TagDetails> {
        if !matches!(entry.reference, Ref::Tag { .. }) {
            return Err(Error::validation("tag ref", entry.reference.ref_name()));
        }
        if let Some(tag_id) = &entry.annotated_tag {
            let tag = self.lookup_annotated_tag(tag_id, OnMissing::Error).await?;
            if let Some(tag) = tag {
                return Ok(TagDetails {
                    message: tag.message.clone(),
                    tagger: tag.tagger.clone(),
                    annotated: true,
                });
            }
        }
        let commit = self.lookup_commit(&entry.commit_id, OnMissing::Error).await?;
        let commit = commit.ok_or_else(|| Error::not_found("commit", &entry.commit_id))?;
        Ok(TagDetails {
            message: commit.subject.clone(),
            tagger: Some(commit.author.clone()),
            annotated: false,
        })
    }

    // === Commits ===

    /// Every commit reachable from any ref, newest first.
    ///
    /// # Errors
    /// Returns error if the history cannot be listed or parsed.
    pub async fn all_commits(&self) -> Result<Vec<Arc<Commit>>> {
        Ok(self.commit_index().await?.ordered.clone())
    }

    /// Look up a commit by full id.
    ///
    /// Commits that no ref reaches, such as ones left behind by a reset, are
    /// listed on their own the first time they are asked for.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] under [`OnMissing::Error`], or a listing failure.
    pub async fn lookup_commit(&self, id: &ObjectId, on_missing: OnMissing) -> Result<Option<Arc<Commit>>> {
        let index = self.commit_index().await?;
        let found = match index.by_id.get(id) {
            Some(commit) => Some(Arc::clone(commit)),
            None => {
                self.unlisted_commits
                    .fetch(id, || self.load_unlisted_commit(id))
                    .await?
            }
        };
        apply_policy(found, on_missing, "commit", id)
    }

    async fn load_unlisted_commit(&self, id: &ObjectId) -> Result<Option<Arc<Commit>>> {
        tracing::trace!(%id, "commit outside the ref history, listing it directly");
        let records = self
            .git
            .list_commits(&CommitSelector::Ids(vec![id.clone()]))
            .await?;
        Ok(records
            .into_iter()
            .find(|r| r.id == *id)
            .map(|r| Arc::new(Commit::from(r))))
    }

    /// Parents present in the history, first parent first.
    ///
    /// # Errors
    /// Returns error if the history cannot be listed.
    pub async fn parents(&self, commit: &Commit) -> Result<Vec<Arc<Commit>>> {
        let index = self.commit_index().await?;
        Ok(commit
            .parent_ids
            .iter()
            .filter_map(|id| index.by_id.get(id).cloned())
            .collect())
    }

    /// # Errors
    /// Returns error if the history cannot be listed.
    pub async fn first_parent(&self, commit: &Commit) -> Result<Option<Arc<Commit>>> {
        let index = self.commit_index().await?;
        Ok(commit
            .first_parent_id()
            .and_then(|id| index.by_id.get(id).cloned()))
    }

    /// The first-parent chain below `commit`, nearest first.
    ///
    /// # Errors
    /// Returns error if the history cannot be listed.
    pub async fn ancestors(&self, commit: &Commit) -> Result<Vec<Arc<Commit>>> {
        let index = self.commit_index().await?;
        let mut chain: Vec<Arc<Commit>> = Vec::new();
        let mut next = commit.first_parent_id();
        while let Some(id) = next {
            let Some(parent) = index.by_id.get(id) else {
                break;
            };
            if parent.id == commit.id || chain.iter().any(|c| c.id == parent.id) {
                break;
            }
            chain.push(Arc::clone(parent));
            next = parent.first_parent_id();
        }
        Ok(chain)
    }

    /// Every ancestor of `commit` through any parent, in history order.
    ///
    /// # Errors
    /// Returns error if the history cannot be listed.
    pub async fn all_ancestors(&self, commit: &Commit) -> Result<Vec<Arc<Commit>>> {
        let index = self.commit_index().await?;
        let closure = reachability::ancestor_closure(&*index, &commit.id);
        Ok(index
            .ordered
            .iter()
            .filter(|c| c.id != commit.id && closure.contains(&c.id))
            .cloned()
            .collect())
    }

    /// The root tree of `commit`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the tree is missing.
    pub async fn tree_of(&self, commit: &Commit) -> Result<Arc<Tree>> {
        self.lookup_tree(&commit.tree_id, OnMissing::Error)
            .await?
            .ok_or_else(|| Error::not_found("tree", &commit.tree_id))
    }

    /// Resolve a revision expression such as `HEAD~1` or a short id.
    ///
    /// # Errors
    /// Returns error if git rejects the expression.
    pub async fn resolve_revision(&self, revision: &str) -> Result<Option<ObjectId>> {
        Ok(self.git.resolve_revision(revision).await?)
    }

    // === Objects ===

    /// # Errors
    /// Returns [`Error::NotFound`] under [`OnMissing::Error`],
    /// [`Error::UnexpectedObjectType`] if `id` is not a blob, or a git failure.
    pub async fn lookup_blob(&self, id: &ObjectId, on_missing: OnMissing) -> Result<Option<Arc<Blob>>> {
        let blob = self.blobs.fetch(id, || self.load_blob(id)).await?;
        apply_policy(blob, on_missing, "blob", id)
    }

    async fn load_blob(&self, id: &ObjectId) -> Result<Option<Arc<Blob>>> {
        tracing::trace!(%id, "loading blob");
        let Some(object) = self.git.lookup_object(id).await? else {
            return Ok(None);
        };
        if object.object_type != ObjectType::Blob {
            return Err(Error::UnexpectedObjectType {
                id: id.to_string(),
                expected: "blob",
                actual: object.object_type.to_string(),
            });
        }
        Ok(Some(Arc::new(Blob::from(object))))
    }

    /// # Errors
    /// Returns [`Error::NotFound`] under [`OnMissing::Error`], or a git failure.
    pub async fn lookup_tree(&self, id: &ObjectId, on_missing: OnMissing) -> Result<Option<Arc<Tree>>> {
        let tree = self.trees.fetch(id, || self.load_tree(id)).await?;
        apply_policy(tree, on_missing, "tree", id)
    }

    async fn load_tree(&self, id: &ObjectId) -> Result<Option<Arc<Tree>>> {
        tracing::trace!(%id, "loading tree");
        Ok(self.git.list_tree_entries(id).await?.map(|entries| {
            Arc::new(Tree {
                id: id.clone(),
                entries,
            })
        }))
    }

    /// Annotated tags, ordered by tag object id.
    ///
    /// # Errors
    /// Returns error if tags cannot be listed or parsed.
    pub async fn all_annotated_tags(&self) -> Result<Vec<Arc<AnnotatedTag>>> {
        let map = self.annotated_tag_map().await?;
        let mut tags: Vec<_> = map.values().cloned().collect();
        tags.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tags)
    }

    /// # Errors
    /// Returns [`Error::NotFound`] under [`OnMissing::Error`], or a listing failure.
    pub async fn lookup_annotated_tag(&self, id: &ObjectId, on_missing: OnMissing) -> Result<Option<Arc<AnnotatedTag>>> {
        let map = self.annotated_tag_map().await?;
        apply_policy(map.get(id).cloned(), on_missing, "annotated tag", id)
    }

    // === Stashes ===

    /// Stash entries, newest first.
    ///
    /// # Errors
    /// Returns error if stashes cannot be listed or parsed.
    pub async fn all_stashes(&self) -> Result<Vec<Arc<Stash>>> {
        Ok(self.stash_list().await?.to_vec())
    }

    /// Look up a stash by `stash@{n}` or `refs/stash@{n}`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] under [`OnMissing::Error`], or a listing failure.
    pub async fn lookup_stash(&self, name: &str, on_missing: OnMissing) -> Result<Option<Arc<Stash>>> {
        let stashes = self.stash_list().await?;
        let found = stashes
            .iter()
            .find(|s| s.reference.name() == name || s.reference.ref_name() == name)
            .cloned();
        apply_policy(found, on_missing, "stash", &name)
    }

    // === Remotes ===

    /// Remotes in config file order.
    ///
    /// # Errors
    /// Returns error if the config file cannot be read or parsed.
    pub async fn all_remotes(&self) -> Result<Vec<Remote>> {
        let config = self.git_config().await?;
        Ok(config.remotes().iter().map(Remote::from).collect())
    }

    /// # Errors
    /// Returns [`Error::NotFound`] under [`OnMissing::Error`], or a config failure.
    pub async fn lookup_remote(&self, name: &str, on_missing: OnMissing) -> Result<Option<Remote>> {
        let config = self.git_config().await?;
        apply_policy(config.remote(name).map(Remote::from), on_missing, "remote", &name)
    }

    /// The tracking branch `branch` follows, if configured and fetched.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for non-branch refs and
    /// [`Error::RemoteNotFound`] if the branch names an unknown remote.
    pub async fn upstream(&self, branch: &Ref) -> Result<Option<Arc<RefEntry>>> {
        let config = self.git_config().await?;
        match config.resolve_upstream(branch)? {
            Some(tracking) => self.lookup_ref(tracking.ref_name(), OnMissing::Null).await,
            None => Ok(None),
        }
    }

    // === Distance & reachability ===

    /// How far `source` is ahead of and behind `target`.
    ///
    /// Computed once per ref pair per handle, and once per commit pair per
    /// process.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if either ref does not exist.
    pub async fn compute_distance(&self, source: &Ref, target: &Ref) -> Result<Option<RefDistance>> {
        let key = RefPair {
            source: source.ref_name().to_string(),
            target: target.ref_name().to_string(),
        };
        self.distances
            .fetch(&key, || self.load_distance(source, target))
            .await
    }

    async fn load_distance(&self, source: &Ref, target: &Ref) -> Result<Option<RefDistance>> {
        let source_id = self.ref_commit_id(source).await?;
        let target_id = self.ref_commit_id(target).await?;
        let index = self.commit_index().await?;

        let pair = CommitPair::new(&source_id, &target_id);
        self.persistent
            .distances()
            .fetch(&pair, || async {
                tracing::trace!(%pair, "computing distance");
                Ok(distance::compute_distance(&*index, &source_id, &target_id))
            })
            .await
    }

    /// Whether `commit` is `ref_head` or one of its ancestors.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if `ref_head` is not in the history.
    pub async fn is_commit_reachable_from(&self, commit: &ObjectId, ref_head: &ObjectId) -> Result<bool> {
        let index = self.commit_index().await?;
        if !index.by_id.contains_key(ref_head) {
            return Err(Error::not_found("commit", ref_head));
        }

        let pair = CommitPair::new(commit, ref_head);
        self.persistent
            .reachability()
            .fetch(&pair, || async {
                tracing::trace!(%pair, "computing reachability");
                Ok(reachability::is_ancestor(&*index, commit, ref_head))
            })
            .await
    }

    /// Every ref whose head contains `commit`.
    ///
    /// # Errors
    /// Returns error if refs or history cannot be listed.
    pub async fn reachable_by(&self, commit: &ObjectId) -> Result<Vec<Arc<RefEntry>>> {
        let refs = self.all_refs().await?;
        let mut containing = Vec::new();
        for entry in refs {
            match self.is_commit_reachable_from(commit, &entry.commit_id).await {
                Ok(true) => containing.push(entry),
                Ok(false) => {}
                // Heads outside the listed history cannot contain anything we know.
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(containing)
    }

    // === Working directory ===

    /// Changed or untracked paths under `dir`, relative to the repository root.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for an empty `dir`, or a git failure.
    pub async fn working_directory(&self, kind: DiffKind, dir: &str) -> Result<Arc<Vec<WorkingDirectoryItem>>> {
        let key = (kind, dir.to_string());
        self.working_tree
            .fetch(&key, || self.load_working_tree(kind, dir))
            .await
    }

    async fn load_working_tree(&self, kind: DiffKind, dir: &str) -> Result<Arc<Vec<WorkingDirectoryItem>>> {
        tracing::trace!(?kind, dir, "reading working tree");
        Ok(Arc::new(self.git.read_working_tree_diff(kind, dir).await?))
    }

    /// When any remote was last fetched into this repository, or `None` if
    /// it never was.
    ///
    /// # Errors
    /// Returns error if git cannot locate the git directory.
    pub async fn last_fetch_date(&self) -> Result<Option<DateTime<Utc>>> {
        self.last_fetch.fetch(|| self.load_last_fetch_date()).await
    }

    async fn load_last_fetch_date(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.git.last_fetch_date().await?)
    }

    // === Pass-through mutations ===

    /// Fetch every remote. This handle keeps its snapshot.
    ///
    /// # Errors
    /// Returns error if `git fetch` fails.
    pub async fn fetch(&self) -> Result<()> {
        Ok(self.git.fetch_all().await?)
    }

    /// Discard local changes and untracked files.
    ///
    /// # Errors
    /// Returns error if git fails.
    pub async fn clean_working_tree(&self) -> Result<()> {
        Ok(self.git.clean_working_tree().await?)
    }

    /// Delete a local branch.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for non-branch refs, or a git failure.
    pub async fn delete_branch(&self, branch: &Ref) -> Result<()> {
        let Ref::Branch { name, .. } = branch else {
            return Err(Error::validation("local branch", branch.ref_name()));
        };
        Ok(self.git.delete_branch(name).await?)
    }
}
