//! `gitscope blob` command - print the contents of a blob.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Result, anyhow};
use gitscope_core::OnMissing;
use serde::Serialize;

use super::utils::{open_repo, print_json};

#[derive(Debug, Serialize)]
struct BlobOutput<'a> {
    id: String,
    size: usize,
    binary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<std::borrow::Cow<'a, str>>,
}

/// Run the blob command.
pub async fn run(path: &Path, json: bool, object: &str) -> Result<()> {
    let (repo, _) = open_repo(path).await?;

    let id = repo
        .resolve_revision(object)
        .await?
        .ok_or_else(|| anyhow!("Unknown object '{object}'"))?;
    let blob = repo
        .lookup_blob(&id, OnMissing::Null)
        .await?
        .ok_or_else(|| anyhow!("Blob {id} not found"))?;

    if json {
        let binary = blob.is_binary();
        return print_json(&BlobOutput {
            id: blob.id.to_string(),
            size: blob.size,
            binary,
            text: (!binary).then(|| blob.text()),
        });
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(&blob.data)?;
    stdout.flush()?;
    Ok(())
}
