use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use gitscope_core::{Commit, Config, OnMissing, PersistentCache, RefEntry, RepositoryModel};
use gitscope_git::GitCli;
use serde::Serialize;

/// Helper to open the repository model and its gitscope config.
///
/// The config file is located with the default `git`, since the config
/// itself may name another binary.
pub async fn open_repo(path: &Path) -> Result<(RepositoryModel<GitCli>, Config)> {
    let locator = GitCli::new(path);
    if !path.is_dir() || !locator.is_repository().await {
        bail!("Not inside a git repository: {}", path.display());
    }
    let config = Config::load_for(&locator)
        .await
        .context("Failed to load gitscope config")?;
    tracing::debug!(binary = %config.git.binary.display(), on_missing = ?config.lookup.on_missing, "loaded config");
    let repo = RepositoryModel::open(path, &config, Arc::new(PersistentCache::new()))
        .await
        .context("Not inside a git repository")?;
    Ok((repo, config))
}

/// Resolve a user-typed ref name, honoring the configured lookup policy.
///
/// Under the `null` and `warn` policies a missing ref yields `None` and the
/// command prints nothing.
pub async fn resolve_ref(
    repo: &RepositoryModel<GitCli>,
    config: &Config,
    name: &str,
) -> Result<Option<Arc<RefEntry>>> {
    Ok(repo.find_ref(name, config.lookup.on_missing).await?)
}

/// Resolve a ref name, `HEAD`, commit id or revision expression to a commit.
pub async fn resolve_commit(repo: &RepositoryModel<GitCli>, revision: &str) -> Result<Arc<Commit>> {
    let id = if let Some(entry) = repo.find_ref(revision, OnMissing::Null).await? {
        entry.commit_id.clone()
    } else {
        repo.resolve_revision(revision)
            .await?
            .ok_or_else(|| anyhow!("Unknown revision '{revision}'"))?
    };

    repo.lookup_commit(&id, OnMissing::Null)
        .await?
        .ok_or_else(|| anyhow!("'{revision}' does not name a commit"))
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json_output = serde_json::to_string_pretty(value)?;
    println!("{json_output}");
    Ok(())
}
