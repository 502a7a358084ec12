//! `gitscope remotes` command - list configured remotes.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use gitscope_core::Remote;
use serde::Serialize;

use super::utils::{open_repo, print_json};
use crate::output;

#[derive(Debug, Serialize)]
struct RemotesInfo<'a> {
    remotes: &'a [Remote],
    last_fetch: Option<DateTime<Utc>>,
}

/// Run the remotes command.
pub async fn run(path: &Path, json: bool) -> Result<()> {
    let (repo, _) = open_repo(path).await?;
    let remotes = repo.all_remotes().await?;
    let last_fetch = repo.last_fetch_date().await?;

    if json {
        return print_json(&RemotesInfo {
            remotes: &remotes,
            last_fetch,
        });
    }

    if remotes.is_empty() {
        output::info("No remotes configured");
        return Ok(());
    }

    for remote in &remotes {
        let fetch = remote.fetch_url.as_deref().unwrap_or("-");
        output::detail(&format!("{}\t{fetch} (fetch)", remote.name.bold()));
        for push in &remote.push_urls {
            output::detail(&format!("{}\t{push} (push)", remote.name.bold()));
        }
    }

    match last_fetch {
        Some(when) => output::info(&format!(
            "Last fetched {}",
            when.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        )),
        None => output::info("Never fetched"),
    }

    Ok(())
}
