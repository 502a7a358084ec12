//! End-to-end tests of the repository model over the real git binary.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use gitscope_core::{Config, Error, OnMissing, PersistentCache, RepositoryModel};
use gitscope_git::{DiffKind, GitCli, ObjectId, Ref, RefKind};
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

fn commit_file(dir: &Path, file: &str, contents: &str, msg: &str) {
    fs::write(dir.join(file), contents).unwrap();
    git(dir, &["add", "."]);
    git(dir, &["commit", "--quiet", "-m", msg]);
}

/// main:    one <- two <- merge(three)
/// topic:   one <- three
fn setup_repo() -> TempDir {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    git(dir, &["init", "--quiet"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "user.name", "Test User"]);
    git(dir, &["config", "commit.gpgsign", "false"]);

    commit_file(dir, "a.txt", "one\n", "one");
    git(dir, &["branch", "-M", "main"]);
    git(dir, &["checkout", "--quiet", "-b", "topic"]);
    commit_file(dir, "b.txt", "three\n", "three");
    git(dir, &["checkout", "--quiet", "main"]);
    commit_file(dir, "a.txt", "one\ntwo\n", "two");
    git(dir, &["merge", "--quiet", "--no-edit", "--no-ff", "topic"]);

    temp
}

async fn open(dir: &Path) -> RepositoryModel<GitCli> {
    RepositoryModel::open(dir, &Config::default(), Arc::new(PersistentCache::new()))
        .await
        .unwrap()
}

fn oid(dir: &Path, revision: &str) -> ObjectId {
    ObjectId::new(git(dir, &["rev-parse", revision])).unwrap()
}

#[tokio::test]
async fn test_open_rejects_non_repository() {
    let temp = TempDir::new().unwrap();
    let err = RepositoryModel::open(temp.path(), &Config::default(), Arc::new(PersistentCache::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));

    let missing = temp.path().join("missing");
    assert!(
        RepositoryModel::open(&missing, &Config::default(), Arc::new(PersistentCache::new()))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_history_and_refs() {
    let temp = setup_repo();
    let dir = temp.path();
    let repo = open(dir).await;

    assert_eq!(repo.all_commits().await.unwrap().len(), 4);

    let main = repo.find_ref("main", OnMissing::Error).await.unwrap().unwrap();
    assert_eq!(main.commit_id, oid(dir, "main"));
    assert_eq!(repo.head_ref().await.unwrap(), Some(Ref::branch("main")));

    let merge = repo.lookup_commit(&main.commit_id, OnMissing::Error).await.unwrap().unwrap();
    assert!(merge.is_merge());
    let parents = repo.parents(&merge).await.unwrap();
    assert_eq!(parents[0].subject, "two");
    assert_eq!(parents[1].subject, "three");

    let chain: Vec<_> = repo
        .ancestors(&merge)
        .await
        .unwrap()
        .iter()
        .map(|c| c.subject.clone())
        .collect();
    assert_eq!(chain, ["two", "one"]);
    assert_eq!(repo.all_ancestors(&merge).await.unwrap().len(), 3);

    let kinds: Vec<RefKind> = repo
        .all_refs()
        .await
        .unwrap()
        .iter()
        .map(|e| e.reference.kind())
        .collect();
    assert_eq!(kinds, [RefKind::Branch, RefKind::Branch]);
}

#[tokio::test]
async fn test_distance_uses_first_parent() {
    let temp = setup_repo();
    let dir = temp.path();
    let repo = open(dir).await;

    let d = repo
        .compute_distance(&Ref::branch("topic"), &Ref::branch("main"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(d.merge_base, oid(dir, "main~2"));
    assert_eq!((d.ahead, d.behind), (1, 2));

    assert!(
        repo.is_commit_reachable_from(&oid(dir, "topic"), &oid(dir, "main"))
            .await
            .unwrap()
    );
    assert!(
        !repo
            .is_commit_reachable_from(&oid(dir, "main"), &oid(dir, "topic"))
            .await
            .unwrap()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_blob_lookups() {
    let temp = setup_repo();
    let dir = temp.path();
    let repo = Arc::new(open(dir).await);

    let ids = [
        (oid(dir, "main:a.txt"), "one\ntwo\n"),
        (oid(dir, "main:b.txt"), "three\n"),
        (oid(dir, "main~1:a.txt"), "one\ntwo\n"),
        (oid(dir, "topic~1:a.txt"), "one\n"),
    ];

    let handles: Vec<_> = (0..24)
        .map(|i| {
            let repo = Arc::clone(&repo);
            let (id, expected) = ids[i % ids.len()].clone();
            tokio::spawn(async move {
                let blob = repo.lookup_blob(&id, OnMissing::Error).await.unwrap().unwrap();
                assert_eq!(blob.text(), expected);
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let missing = ObjectId::new("0".repeat(40)).unwrap();
    assert!(repo.lookup_blob(&missing, OnMissing::Null).await.unwrap().is_none());

    let tree_id = oid(dir, "main^{tree}");
    let err = repo.lookup_blob(&tree_id, OnMissing::Error).await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedObjectType { .. }));
}

#[tokio::test]
async fn test_tree_listing() {
    let temp = setup_repo();
    let dir = temp.path();
    let repo = open(dir).await;

    let head = repo.lookup_commit(&oid(dir, "main"), OnMissing::Error).await.unwrap().unwrap();
    let tree = repo.tree_of(&head).await.unwrap();
    let names: Vec<_> = tree.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["a.txt", "b.txt"]);

    let again = repo.tree_of(&head).await.unwrap();
    assert!(Arc::ptr_eq(&tree, &again));
}

#[tokio::test]
async fn test_tags_and_stashes() {
    let temp = setup_repo();
    let dir = temp.path();
    git(dir, &["tag", "-a", "v1", "-m", "First release", "main~1"]);
    git(dir, &["tag", "light", "topic"]);
    fs::write(dir.join("a.txt"), "dirty\n").unwrap();
    git(dir, &["stash", "push", "--quiet", "-m", "parked"]);

    let repo = open(dir).await;

    let v1 = repo.find_ref("v1", OnMissing::Error).await.unwrap().unwrap();
    assert_eq!(v1.commit_id, oid(dir, "main~1"));
    assert_eq!(v1.annotated_tag, Some(oid(dir, "v1")));
    let details = repo.tag_details(&v1).await.unwrap();
    assert!(details.annotated);
    assert_eq!(details.message.trim(), "First release");

    let light = repo.find_ref("light", OnMissing::Error).await.unwrap().unwrap();
    let details = repo.tag_details(&light).await.unwrap();
    assert!(!details.annotated);
    assert_eq!(details.message, "three");

    let stash = repo.lookup_stash("stash@{0}", OnMissing::Error).await.unwrap().unwrap();
    assert!(stash.message.contains("parked"));
    assert_eq!(stash.commit_id, oid(dir, "stash@{0}"));
    assert!(repo.find_ref("stash@{0}", OnMissing::Error).await.unwrap().is_some());
}

#[tokio::test]
async fn test_working_directory_and_mutations() {
    let temp = setup_repo();
    let dir = temp.path();
    fs::write(dir.join("a.txt"), "edited\n").unwrap();
    fs::write(dir.join("c.txt"), "new\n").unwrap();

    let repo = open(dir).await;
    let unstaged = repo.working_directory(DiffKind::Unstaged, ".").await.unwrap();
    assert_eq!(unstaged.len(), 1);
    assert!(unstaged[0].modified);
    let untracked = repo.working_directory(DiffKind::Untracked, ".").await.unwrap();
    assert_eq!(untracked[0].path, "c.txt");

    repo.clean_working_tree().await.unwrap();
    assert!(!dir.join("c.txt").exists());

    // A fresh handle sees the clean tree; the old one keeps its snapshot.
    let fresh = open(dir).await;
    assert!(fresh.working_directory(DiffKind::Untracked, ".").await.unwrap().is_empty());
    assert_eq!(repo.working_directory(DiffKind::Untracked, ".").await.unwrap().len(), 1);

    repo.delete_branch(&Ref::branch("topic")).await.unwrap();
    assert_eq!(git(dir, &["branch", "--list", "topic"]), "");
}

#[tokio::test]
async fn test_reset_away_commit_is_still_found() {
    let temp = setup_repo();
    let dir = temp.path();
    commit_file(dir, "a.txt", "lost\n", "lost work");
    let lost = oid(dir, "HEAD");
    git(dir, &["reset", "--quiet", "--hard", "HEAD~1"]);

    let repo = open(dir).await;
    assert!(repo.all_commits().await.unwrap().iter().all(|c| c.id != lost));

    let commit = repo.lookup_commit(&lost, OnMissing::Error).await.unwrap().unwrap();
    assert_eq!(commit.subject, "lost work");
    assert_eq!(commit.first_parent_id(), Some(&oid(dir, "main")));

    let unknown = ObjectId::new("1".repeat(40)).unwrap();
    assert!(repo.lookup_commit(&unknown, OnMissing::Null).await.unwrap().is_none());
}

#[tokio::test]
async fn test_last_fetch_date() {
    let temp = setup_repo();
    let dir = temp.path();
    let repo = open(dir).await;
    assert!(repo.last_fetch_date().await.unwrap().is_none());

    let remote = TempDir::new().unwrap();
    git(remote.path(), &["init", "--bare", "--quiet"]);
    git(dir, &["remote", "add", "origin", remote.path().to_str().unwrap()]);
    git(dir, &["push", "--quiet", "origin", "main"]);
    repo.fetch().await.unwrap();

    // The first handle keeps its snapshot.
    assert!(repo.last_fetch_date().await.unwrap().is_none());

    let fetched = open(dir).await.last_fetch_date().await.unwrap().unwrap();
    let age = chrono::Utc::now() - fetched;
    assert!(age.num_minutes().abs() < 5, "fetched {age} ago");
}

#[tokio::test]
async fn test_config_lives_in_linked_worktree_git_dir() {
    let temp = setup_repo();
    let dir = temp.path();
    let outside = TempDir::new().unwrap();
    let worktree = outside.path().join("wt");
    git(dir, &["worktree", "add", "--quiet", worktree.to_str().unwrap(), "topic"]);
    assert!(worktree.join(".git").is_file());

    let gateway = GitCli::new(&worktree);
    let location = Config::path_for(&gateway).await.unwrap();
    assert!(location.ends_with("gitscope/config.toml"));
    assert!(!location.starts_with(worktree.join(".git")));

    fs::create_dir_all(location.parent().unwrap()).unwrap();
    fs::write(&location, "[lookup]\non_missing = \"null\"\n").unwrap();
    let config = Config::load_for(&gateway).await.unwrap();
    assert_eq!(config.lookup.on_missing, OnMissing::Null);

    let repo = RepositoryModel::open(&worktree, &config, Arc::new(PersistentCache::new()))
        .await
        .unwrap();
    assert_eq!(repo.head_ref().await.unwrap(), Some(Ref::branch("topic")));
}
