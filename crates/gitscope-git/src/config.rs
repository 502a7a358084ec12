//! Reader for the repository's `.git/config` file.
//!
//! Only `[remote "..."]` and `[branch "..."]` sections are interpreted;
//! everything else is skipped.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::refs::to_branch_ref;
use crate::refspec::Refspec;
use crate::types::Ref;

/// A `[remote "name"]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteConfig {
    pub name: String,
    pub fetch_urls: Vec<String>,
    pub push_urls: Vec<String>,
    #[serde(serialize_with = "serialize_refspecs")]
    pub refspecs: Vec<Refspec>,
}

fn serialize_refspecs<S: serde::Serializer>(
    refspecs: &[Refspec],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(refspecs.iter().map(Refspec::as_str))
}

impl RemoteConfig {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fetch_urls: Vec::new(),
            push_urls: Vec::new(),
            refspecs: Vec::new(),
        }
    }

    /// The first configured `url`.
    #[must_use]
    pub fn fetch_url(&self) -> Option<&str> {
        self.fetch_urls.first().map(String::as_str)
    }

    /// Explicit `pushurl`s, falling back to the fetch URLs.
    #[must_use]
    pub fn effective_push_urls(&self) -> &[String] {
        if self.push_urls.is_empty() {
            &self.fetch_urls
        } else {
            &self.push_urls
        }
    }
}

/// A `[branch "name"]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchConfig {
    pub remote: Option<String>,
    /// Branch name on the remote, e.g. `refs/heads/main`.
    pub merge: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Section<'a> {
    Remote(&'a str),
    Branch(&'a str),
    Ignored,
}

/// Parsed remotes and branch upstream settings.
#[derive(Debug, Clone, Default)]
pub struct GitConfigFile {
    remotes: Vec<RemoteConfig>,
    branches: HashMap<String, BranchConfig>,
}

impl GitConfigFile {
    /// Parse config file contents.
    ///
    /// # Errors
    /// Returns a parse error for a `key = value` line outside any section or
    /// a line that is neither a section header, comment nor value.
    pub fn parse(input: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut section = None;

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') {
                let header = line
                    .strip_suffix(']')
                    .map(|h| h[1..].trim())
                    .ok_or_else(|| Error::parse("config section", line))?;
                let parsed = if let Some(name) = subsection(header, "remote") {
                    config.remote_mut(name);
                    Section::Remote(name)
                } else if let Some(name) = subsection(header, "branch") {
                    config.branches.entry(name.to_string()).or_default();
                    Section::Branch(name)
                } else {
                    Section::Ignored
                };
                section = Some(parsed);
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| Error::parse("config line", line))?;
            let value = unquote(value);

            match section {
                None => return Err(Error::parse("config line outside section", line)),
                Some(Section::Ignored) => {}
                Some(Section::Remote(name)) => {
                    let remote = config.remote_mut(name);
                    match key {
                        "url" => remote.fetch_urls.push(value.to_string()),
                        "pushurl" => remote.push_urls.push(value.to_string()),
                        "fetch" => remote.refspecs.push(Refspec::parse(value)?),
                        _ => {}
                    }
                }
                Some(Section::Branch(name)) => {
                    let branch = config.branches.entry(name.to_string()).or_default();
                    match key {
                        "remote" => branch.remote = Some(value.to_string()),
                        "merge" => branch.merge = Some(value.to_string()),
                        _ => {}
                    }
                }
            }
        }

        Ok(config)
    }

    fn remote_mut(&mut self, name: &str) -> &mut RemoteConfig {
        let index = match self.remotes.iter().position(|r| r.name == name) {
            Some(index) => index,
            None => {
                self.remotes.push(RemoteConfig::new(name));
                self.remotes.len() - 1
            }
        };
        &mut self.remotes[index]
    }

    /// Remotes in file order.
    #[must_use]
    pub fn remotes(&self) -> &[RemoteConfig] {
        &self.remotes
    }

    #[must_use]
    pub fn remote(&self, name: &str) -> Option<&RemoteConfig> {
        self.remotes.iter().find(|r| r.name == name)
    }

    #[must_use]
    pub fn branch(&self, name: &str) -> Option<&BranchConfig> {
        self.branches.get(name)
    }

    /// The tracking ref a local branch follows, if configured.
    ///
    /// The branch's `merge` name is mapped through its remote's fetch
    /// refspecs; the first refspec that matches wins.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if `branch` is not a local branch and
    /// [`Error::UnknownRemote`] if the branch names a remote with no section.
    pub fn resolve_upstream(&self, branch: &Ref) -> Result<Option<Ref>> {
        let Ref::Branch { name, .. } = branch else {
            return Err(Error::validation("local branch", branch.ref_name()));
        };

        let Some(BranchConfig {
            remote: Some(remote_name),
            merge: Some(merge),
        }) = self.branches.get(name)
        else {
            return Ok(None);
        };

        let remote = self
            .remote(remote_name)
            .ok_or_else(|| Error::UnknownRemote(remote_name.clone()))?;
        let upstream = to_branch_ref(merge)?;

        Ok(remote
            .refspecs
            .iter()
            .find_map(|refspec| refspec.to_local(&upstream)))
    }
}

/// `remote "origin"` with kind `remote` into `origin`.
fn subsection<'a>(header: &'a str, kind: &str) -> Option<&'a str> {
    let rest = header.strip_prefix(kind)?;
    let rest = rest.strip_prefix(char::is_whitespace)?.trim();
    rest.strip_prefix('"')?.strip_suffix('"')
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[core]
	repositoryformatversion = 0
	bare = false
# a comment
; another comment
[remote "origin"]
	url = git@example.com:team/project.git
	fetch = +refs/heads/*:refs/remotes/origin/*
[remote "fork"]
	url = https://example.com/me/project.git
	pushurl = git@example.com:me/project.git
	fetch = +refs/heads/*:refs/remotes/fork/*
[branch "main"]
	remote = origin
	merge = refs/heads/main
[branch "topic"]
	remote = fork
	merge = refs/heads/feature/topic
[branch "local-only"]
[branch "broken"]
	remote = gone
	merge = refs/heads/broken
"#;

    #[test]
    fn test_parse_remotes() {
        let config = GitConfigFile::parse(SAMPLE).unwrap();
        let names: Vec<_> = config.remotes().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["origin", "fork"]);

        let origin = config.remote("origin").unwrap();
        assert_eq!(origin.fetch_url(), Some("git@example.com:team/project.git"));
        assert_eq!(origin.effective_push_urls(), origin.fetch_urls.as_slice());
        assert_eq!(origin.refspecs.len(), 1);

        let fork = config.remote("fork").unwrap();
        assert_eq!(fork.effective_push_urls(), ["git@example.com:me/project.git".to_string()]);
    }

    #[test]
    fn test_resolve_upstream() {
        let config = GitConfigFile::parse(SAMPLE).unwrap();
        assert_eq!(
            config.resolve_upstream(&Ref::branch("main")).unwrap(),
            Some(Ref::tracking("origin", "main"))
        );
        assert_eq!(
            config.resolve_upstream(&Ref::branch("topic")).unwrap(),
            Some(Ref::tracking("fork", "feature/topic"))
        );
        assert_eq!(config.resolve_upstream(&Ref::branch("local-only")).unwrap(), None);
        assert_eq!(config.resolve_upstream(&Ref::branch("unconfigured")).unwrap(), None);
    }

    #[test]
    fn test_resolve_upstream_unknown_remote() {
        let config = GitConfigFile::parse(SAMPLE).unwrap();
        let err = config.resolve_upstream(&Ref::branch("broken")).unwrap_err();
        assert!(matches!(err, Error::UnknownRemote(name) if name == "gone"));
    }

    #[test]
    fn test_resolve_upstream_requires_branch() {
        let config = GitConfigFile::parse(SAMPLE).unwrap();
        assert!(config.resolve_upstream(&Ref::tag("v1")).is_err());
    }

    #[test]
    fn test_value_outside_section_is_fatal() {
        assert!(GitConfigFile::parse("url = nowhere\n").is_err());
    }

    #[test]
    fn test_garbage_line_is_fatal() {
        assert!(GitConfigFile::parse("[core]\nthis is not a value\n").is_err());
    }

    #[test]
    fn test_unknown_sections_ignored() {
        let config = GitConfigFile::parse("[user]\n\tname = Someone\n[alias \"x\"]\n\tco = checkout\n").unwrap();
        assert!(config.remotes().is_empty());
    }
}
