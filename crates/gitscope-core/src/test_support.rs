//! In-memory [`GitGateway`] for unit tests.
//!
//! Canned listings are configured with builder methods; every gateway
//! operation bumps a counter so tests can assert how often git would have
//! been invoked.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use gitscope_git::{
    AnnotatedTagRecord, BatchObject, CommitSelector, DiffKind, Error as GitError, GitConfigFile,
    GitGateway, LogRecord, ObjectId, ObjectType, Principal, Ref, RefListing, RefTarget,
    Result as GitResult, StashRecord, TreeEntry, WorkingDirectoryItem,
};

/// Per-operation invocation counts.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub list_refs: AtomicUsize,
    pub list_commits: AtomicUsize,
    pub list_annotated_tags: AtomicUsize,
    pub list_stashes: AtomicUsize,
    pub list_tree_entries: AtomicUsize,
    pub lookup_object: AtomicUsize,
    pub read_config: AtomicUsize,
    pub read_head: AtomicUsize,
    pub last_fetch_date: AtomicUsize,
    pub read_working_tree_diff: AtomicUsize,
    pub mutations: AtomicUsize,
}

pub fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

pub fn oid(s: &str) -> ObjectId {
    ObjectId::new(s).unwrap_or_else(|e| panic!("bad test id {s}: {e}"))
}

/// Mock implementation of `GitGateway` for testing.
pub struct MockGateway {
    path: PathBuf,
    refs: Vec<RefListing>,
    commits: Vec<LogRecord>,
    unlisted: Vec<LogRecord>,
    annotated_tags: Vec<AnnotatedTagRecord>,
    stashes: Vec<StashRecord>,
    trees: HashMap<ObjectId, Vec<TreeEntry>>,
    objects: HashMap<ObjectId, BatchObject>,
    config: String,
    head: Option<Ref>,
    fetched_at: Option<DateTime<Utc>>,
    working_tree: HashMap<DiffKind, Vec<WorkingDirectoryItem>>,
    delay: Option<Duration>,
    pub deleted_branches: Mutex<Vec<String>>,
    pub calls: CallCounts,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from("/mock/repo"),
            refs: Vec::new(),
            commits: Vec::new(),
            unlisted: Vec::new(),
            annotated_tags: Vec::new(),
            stashes: Vec::new(),
            trees: HashMap::new(),
            objects: HashMap::new(),
            config: String::new(),
            head: None,
            fetched_at: None,
            working_tree: HashMap::new(),
            delay: None,
            deleted_branches: Mutex::new(Vec::new()),
            calls: CallCounts::default(),
        }
    }

    /// Add a commit authored at `1_700_000_000 + position`.
    pub fn with_commit(mut self, id: &str, parents: &[&str], subject: &str) -> Self {
        let seconds = 1_700_000_000 + i64::try_from(self.commits.len()).unwrap_or_default();
        let author = Principal::from_unix("Alice".into(), "alice@example.com".into(), seconds)
            .unwrap_or_else(|e| panic!("{e}"));
        self.commits.push(LogRecord {
            id: oid(id),
            tree_id: oid("7ee0"),
            parent_ids: parents.iter().map(|p| oid(p)).collect(),
            committer: author.clone(),
            author,
            subject: subject.to_string(),
            message: format!("{subject}\n\nBody of {id}"),
            ref_notes: Vec::new(),
        });
        self
    }

    /// Add a commit that no ref reaches, so only an id listing finds it.
    pub fn with_unlisted_commit(mut self, id: &str, parents: &[&str], subject: &str) -> Self {
        self = self.with_commit(id, parents, subject);
        if let Some(record) = self.commits.pop() {
            self.unlisted.push(record);
        }
        self
    }

    pub fn with_commit_tree(mut self, commit: &str, tree: &str) -> Self {
        let commit = oid(commit);
        if let Some(record) = self.commits.iter_mut().find(|c| c.id == commit) {
            record.tree_id = oid(tree);
        }
        self
    }

    pub fn with_branch(mut self, name: &str, target: &str) -> Self {
        self.refs.push(RefListing {
            reference: Ref::branch(name),
            target: RefTarget::Commit(oid(target)),
        });
        self
    }

    pub fn with_tracking(mut self, remote: &str, name: &str, target: &str) -> Self {
        self.refs.push(RefListing {
            reference: Ref::tracking(remote, name),
            target: RefTarget::Commit(oid(target)),
        });
        self
    }

    pub fn with_lightweight_tag(mut self, name: &str, target: &str) -> Self {
        self.refs.push(RefListing {
            reference: Ref::tag(name),
            target: RefTarget::Commit(oid(target)),
        });
        self
    }

    pub fn with_annotated_tag(mut self, name: &str, tag_id: &str, target: &str, message: &str) -> Self {
        self.refs.push(RefListing {
            reference: Ref::tag(name),
            target: RefTarget::AnnotatedTag(oid(tag_id)),
        });
        self.annotated_tags.push(AnnotatedTagRecord {
            id: oid(tag_id),
            target: oid(target),
            message: message.to_string(),
            tagger: Principal::from_unix("Releaser".into(), "rel@example.com".into(), 1_700_100_000).ok(),
        });
        self
    }

    pub fn with_stash(mut self, index: usize, commit: &str, message: &str) -> Self {
        self.stashes.push(StashRecord {
            reference: Ref::stash(index),
            commit_id: oid(commit),
            message: message.to_string(),
            timestamp: 1_700_200_000,
        });
        self
    }

    pub fn with_tree(mut self, id: &str, entries: Vec<TreeEntry>) -> Self {
        self.trees.insert(oid(id), entries);
        self
    }

    pub fn with_object(mut self, id: &str, object_type: ObjectType, data: &[u8]) -> Self {
        self.objects.insert(
            oid(id),
            BatchObject {
                id: oid(id),
                object_type,
                size: data.len(),
                data: data.to_vec(),
            },
        );
        self
    }

    pub fn with_config(mut self, config: &str) -> Self {
        self.config = config.to_string();
        self
    }

    pub fn with_head(mut self, head: Ref) -> Self {
        self.head = Some(head);
        self
    }

    pub fn with_fetch_date(mut self, seconds: i64) -> Self {
        self.fetched_at = DateTime::from_timestamp(seconds, 0);
        self
    }

    pub fn with_working_tree(mut self, kind: DiffKind, items: Vec<WorkingDirectoryItem>) -> Self {
        self.working_tree.insert(kind, items);
        self
    }

    /// Make every bulk listing take this long, widening race windows.
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl GitGateway for MockGateway {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn list_refs(&self) -> GitResult<Vec<RefListing>> {
        bump(&self.calls.list_refs);
        self.pause().await;
        Ok(self.refs.clone())
    }

    async fn list_commits(&self, selector: &CommitSelector) -> GitResult<Vec<LogRecord>> {
        bump(&self.calls.list_commits);
        self.pause().await;
        Ok(match selector {
            CommitSelector::All => self.commits.clone(),
            CommitSelector::Ids(ids) => {
                let known: Vec<_> = self
                    .commits
                    .iter()
                    .chain(&self.unlisted)
                    .filter(|c| ids.contains(&c.id))
                    .cloned()
                    .collect();
                if known.len() == ids.len() { known } else { Vec::new() }
            }
        })
    }

    async fn list_annotated_tags(&self) -> GitResult<Vec<AnnotatedTagRecord>> {
        bump(&self.calls.list_annotated_tags);
        Ok(self.annotated_tags.clone())
    }

    async fn list_stashes(&self) -> GitResult<Vec<StashRecord>> {
        bump(&self.calls.list_stashes);
        Ok(self.stashes.clone())
    }

    async fn list_tree_entries(&self, tree_id: &ObjectId) -> GitResult<Option<Vec<TreeEntry>>> {
        bump(&self.calls.list_tree_entries);
        self.pause().await;
        Ok(self.trees.get(tree_id).cloned())
    }

    async fn lookup_object(&self, id: &ObjectId) -> GitResult<Option<BatchObject>> {
        bump(&self.calls.lookup_object);
        self.pause().await;
        Ok(self.objects.get(id).cloned())
    }

    async fn resolve_revision(&self, revision: &str) -> GitResult<Option<ObjectId>> {
        Ok(self
            .commits
            .iter()
            .find(|c| c.id.as_str().starts_with(revision))
            .map(|c| c.id.clone()))
    }

    async fn git_path(&self, name: &str) -> GitResult<PathBuf> {
        Ok(self.path.join(".git").join(name))
    }

    async fn read_config(&self) -> GitResult<GitConfigFile> {
        bump(&self.calls.read_config);
        GitConfigFile::parse(&self.config)
    }

    async fn read_head(&self) -> GitResult<Option<Ref>> {
        bump(&self.calls.read_head);
        Ok(self.head.clone())
    }

    async fn last_fetch_date(&self) -> GitResult<Option<DateTime<Utc>>> {
        bump(&self.calls.last_fetch_date);
        Ok(self.fetched_at)
    }

    async fn read_working_tree_diff(&self, kind: DiffKind, dir: &str) -> GitResult<Vec<WorkingDirectoryItem>> {
        bump(&self.calls.read_working_tree_diff);
        if dir.is_empty() {
            return Err(GitError::Validation {
                what: "directory",
                value: String::new(),
            });
        }
        Ok(self.working_tree.get(&kind).cloned().unwrap_or_default())
    }

    async fn fetch_all(&self) -> GitResult<()> {
        bump(&self.calls.mutations);
        Ok(())
    }

    async fn clean_working_tree(&self) -> GitResult<()> {
        bump(&self.calls.mutations);
        Ok(())
    }

    async fn delete_branch(&self, name: &str) -> GitResult<()> {
        bump(&self.calls.mutations);
        self.deleted_branches
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(name.to_string());
        Ok(())
    }
}
