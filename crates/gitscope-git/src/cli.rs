//! [`GitGateway`] backed by the `git` executable.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use chrono::{DateTime, Utc};
use tokio::process::Command;

use crate::batch::CatFileProcess;
use crate::cat_file::BatchObject;
use crate::config::GitConfigFile;
use crate::error::{Error, Result};
use crate::gateway::{CommitSelector, GitGateway};
use crate::log::{LOG_FIELDS, LogRecord, STASH_FIELDS, StashRecord, parse_log, parse_stash_list, pretty_format};
use crate::refs::{REF_LIST_FORMAT, REF_LIST_PATTERNS, RefListing, parse_explicit_ref, parse_ref_list};
use crate::status::{DiffKind, WorkingDirectoryItem, parse_diff_status, parse_untracked};
use crate::tags::{AnnotatedTagRecord, parse_annotated_tags, tag_list_format};
use crate::tree::{TreeEntry, parse_tree_entries};
use crate::types::{ObjectId, Ref};

/// Exit status git uses for "fatal" errors such as unknown objects.
const FATAL_EXIT_CODE: i32 = 128;

/// Runs git subcommands against one repository.
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: PathBuf,
    path: PathBuf,
    cat_file: CatFileProcess,
}

impl GitCli {
    /// Gateway for the repository at `path`, using `git` from `PATH`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_binary("git", path)
    }

    /// Gateway for the repository at `path`, using a specific git executable.
    #[must_use]
    pub fn with_binary(binary: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
        let binary = binary.into();
        let path = path.into();
        Self {
            cat_file: CatFileProcess::new(binary.clone(), path.clone()),
            binary,
            path,
        }
    }

    /// Whether `path` is inside a git work tree.
    pub async fn is_repository(&self) -> bool {
        self.run(&["rev-parse", "--is-inside-work-tree"])
            .await
            .is_ok_and(|out| out.trim() == "true")
    }

    async fn output(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!(repo = %self.path.display(), ?args, "git");
        let output = Command::new(&self.binary)
            .arg("-C")
            .arg(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;
        Ok(output)
    }

    /// Run git and return stdout, failing on a non-zero exit.
    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args).await?;
        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: args.join(" "),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Like [`Self::run`], but maps the listed exit codes to `None`.
    async fn run_allowing(&self, args: &[&str], absent: &[i32]) -> Result<Option<String>> {
        match self.run(args).await {
            Ok(out) => Ok(Some(out)),
            Err(Error::CommandFailed { code: Some(code), .. }) if absent.contains(&code) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn require_full_id(id: &ObjectId) -> Result<()> {
    if id.is_full() {
        Ok(())
    } else {
        Err(Error::validation("full object id", id.as_str()))
    }
}

impl GitGateway for GitCli {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn list_refs(&self) -> Result<Vec<RefListing>> {
        let format = format!("--format={REF_LIST_FORMAT}");
        let mut args = vec!["for-each-ref", format.as_str()];
        args.extend(REF_LIST_PATTERNS);
        parse_ref_list(&self.run(&args).await?)
    }

    async fn list_commits(&self, selector: &CommitSelector) -> Result<Vec<LogRecord>> {
        let format = format!("--format={}", pretty_format(&LOG_FIELDS));
        let mut args = vec!["log", format.as_str()];
        match selector {
            CommitSelector::All => args.push("--all"),
            CommitSelector::Ids(ids) if ids.is_empty() => return Ok(Vec::new()),
            CommitSelector::Ids(ids) => {
                args.push("--no-walk=unsorted");
                args.extend(ids.iter().map(ObjectId::as_str));
                // git rejects the whole invocation on an unknown id.
                return match self.run_allowing(&args, &[FATAL_EXIT_CODE]).await? {
                    Some(out) => parse_log(&out),
                    None => Ok(Vec::new()),
                };
            }
        }
        parse_log(&self.run(&args).await?)
    }

    async fn list_annotated_tags(&self) -> Result<Vec<AnnotatedTagRecord>> {
        let format = format!("--format={}", tag_list_format());
        parse_annotated_tags(&self.run(&["for-each-ref", &format, "refs/tags"]).await?)
    }

    async fn list_stashes(&self) -> Result<Vec<StashRecord>> {
        let format = format!("--format={}", pretty_format(&STASH_FIELDS));
        parse_stash_list(&self.run(&["stash", "list", &format]).await?)
    }

    async fn list_tree_entries(&self, tree_id: &ObjectId) -> Result<Option<Vec<TreeEntry>>> {
        require_full_id(tree_id)?;
        self.run_allowing(&["ls-tree", "-z", tree_id.as_str()], &[FATAL_EXIT_CODE])
            .await?
            .map(|out| parse_tree_entries(&out))
            .transpose()
    }

    async fn lookup_object(&self, id: &ObjectId) -> Result<Option<BatchObject>> {
        // cat-file answers with the full id, which must match the awaiter key.
        require_full_id(id)?;
        self.cat_file.lookup(id).await
    }

    async fn resolve_revision(&self, revision: &str) -> Result<Option<ObjectId>> {
        if revision.is_empty() || revision.starts_with('-') {
            return Err(Error::validation("revision", revision));
        }
        let spec = format!("{revision}^{{object}}");
        let out = self
            .run_allowing(&["rev-parse", "--verify", "--quiet", &spec], &[1, FATAL_EXIT_CODE])
            .await?;
        out.map(|out| ObjectId::new(out.trim()).map_err(|_| Error::parse("rev-parse output", out)))
            .transpose()
    }

    async fn git_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.starts_with('-') {
            return Err(Error::validation("git path", name));
        }
        let location = self.run(&["rev-parse", "--git-path", name]).await?;
        Ok(self.path.join(location.trim_end_matches(['\r', '\n'])))
    }

    async fn read_config(&self) -> Result<GitConfigFile> {
        let location = self.git_path("config").await?;
        match tokio::fs::read_to_string(&location).await {
            Ok(contents) => GitConfigFile::parse(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(GitConfigFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn last_fetch_date(&self) -> Result<Option<DateTime<Utc>>> {
        let location = self.git_path("FETCH_HEAD").await?;
        match tokio::fs::metadata(&location).await {
            Ok(metadata) => Ok(Some(DateTime::<Utc>::from(metadata.modified()?))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_head(&self) -> Result<Option<Ref>> {
        // Exit code 1 means HEAD is detached.
        self.run_allowing(&["symbolic-ref", "-q", "HEAD"], &[1])
            .await?
            .map(|out| parse_explicit_ref(out.trim()))
            .transpose()
    }

    async fn read_working_tree_diff(&self, kind: DiffKind, dir: &str) -> Result<Vec<WorkingDirectoryItem>> {
        if dir.is_empty() {
            return Err(Error::validation("directory", dir));
        }
        if kind == DiffKind::Untracked {
            let out = self
                .run(&["-c", "core.quotePath=false", "ls-files", "--others", "--exclude-standard", "--", dir])
                .await?;
            return Ok(parse_untracked(&out));
        }

        let mut args = vec![
            "-c",
            "core.autocrlf=false",
            "-c",
            "core.quotePath=false",
            "diff",
            "--name-status",
            "--no-renames",
        ];
        if kind == DiffKind::Staged {
            args.push("--cached");
        }
        args.extend(["--", dir]);
        parse_diff_status(&self.run(&args).await?)
    }

    async fn fetch_all(&self) -> Result<()> {
        self.run(&["fetch", "--all", "--prune", "--quiet"]).await?;
        Ok(())
    }

    async fn clean_working_tree(&self) -> Result<()> {
        self.run(&["reset", "--hard", "--quiet"]).await?;
        self.run(&["clean", "-f", "-d", "--quiet"]).await?;
        Ok(())
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        if name.is_empty() || name.starts_with('-') || name.starts_with("refs/") {
            return Err(Error::validation("branch name", name));
        }
        self.run(&["branch", "-d", "--", name]).await?;
        Ok(())
    }
}
