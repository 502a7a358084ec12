//! `gitscope upstream` command - a branch's upstream and the distance to it.

use std::path::Path;

use anyhow::{Result, bail};
use gitscope_core::RefDistance;
use gitscope_git::{Ref, RefKind};
use serde::Serialize;

use super::utils::{open_repo, print_json, resolve_ref};
use crate::output;

#[derive(Debug, Serialize)]
struct UpstreamInfo {
    branch: String,
    upstream: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance: Option<RefDistance>,
}

/// Run the upstream command.
pub async fn run(path: &Path, json: bool, branch: Option<&str>) -> Result<()> {
    let (repo, config) = open_repo(path).await?;

    let branch: Ref = match branch {
        Some(name) => {
            let Some(entry) = resolve_ref(&repo, &config, name).await? else {
                return Ok(());
            };
            entry.reference.clone()
        }
        None => match repo.head_ref().await? {
            Some(head) => head,
            None => bail!("HEAD is detached; name a branch"),
        },
    };
    if branch.kind() != RefKind::Branch {
        bail!("'{}' is not a local branch", branch.display_name());
    }

    let upstream = repo.upstream(&branch).await?;
    let distance = match &upstream {
        Some(entry) => repo.compute_distance(&branch, &entry.reference).await?,
        None => None,
    };

    if json {
        return print_json(&UpstreamInfo {
            branch: branch.display_name(),
            upstream: upstream.as_ref().map(|e| e.reference.display_name()),
            distance,
        });
    }

    match (&upstream, &distance) {
        (None, _) => output::info(&format!("{} has no upstream", branch.display_name())),
        (Some(entry), Some(d)) => output::detail(&format!(
            "{} → {} ({})",
            branch.display_name(),
            entry.reference.display_name(),
            output::divergence(d.ahead, d.behind)
        )),
        (Some(entry), None) => output::detail(&format!(
            "{} → {} (no common history)",
            branch.display_name(),
            entry.reference.display_name()
        )),
    }

    Ok(())
}
