//! Configuration management for gitscope.

use std::fs;
use std::path::{Path, PathBuf};

use gitscope_git::GitGateway;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::OnMissing;

/// gitscope configuration loaded from `gitscope/config.toml` in the git directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// How git is invoked.
    #[serde(default)]
    pub git: GitConfig,

    /// Lookup defaults.
    #[serde(default)]
    pub lookup: LookupConfig,
}

impl Config {
    /// Config file location relative to the git directory.
    pub const GIT_PATH: &'static str = "gitscope/config.toml";

    /// Location of the config file for the repository `git` is bound to.
    ///
    /// # Errors
    /// Returns error if git cannot resolve the git directory.
    pub async fn path_for<G: GitGateway>(git: &G) -> Result<PathBuf> {
        Ok(git.git_path(Self::GIT_PATH).await?)
    }

    /// Load config from a TOML file.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config for the repository `git` is bound to, or defaults.
    ///
    /// # Errors
    /// Returns error if git fails, or an existing file can't be read or parsed.
    pub async fn load_for<G: GitGateway>(git: &G) -> Result<Self> {
        let path = Self::path_for(git).await?;
        tracing::trace!(path = %path.display(), "loading gitscope config");
        Self::load(path)
    }

    /// Save config to a TOML file, creating its directory.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Settings for the git subprocess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Executable to spawn.
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
        }
    }
}

fn default_binary() -> PathBuf {
    PathBuf::from("git")
}

/// Defaults applied when callers don't pick a lookup policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default)]
    pub on_missing: OnMissing,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::MockGateway;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.git.binary, PathBuf::from("git"));
        assert_eq!(config.lookup.on_missing, OnMissing::Error);
    }

    #[test]
    fn test_config_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let config = Config {
            git: GitConfig {
                binary: PathBuf::from("/usr/local/bin/git"),
            },
            lookup: LookupConfig {
                on_missing: OnMissing::Warn,
            },
        };

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded.git.binary, PathBuf::from("/usr/local/bin/git"));
        assert_eq!(loaded.lookup.on_missing, OnMissing::Warn);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[lookup]\non_missing = \"null\"\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.lookup.on_missing, OnMissing::Null);
        assert_eq!(loaded.git.binary, PathBuf::from("git"));
    }

    #[test]
    fn test_invalid_policy_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[lookup]\non_missing = \"sometimes\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_missing_config_returns_default() {
        let config = Config::load("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config.lookup.on_missing, OnMissing::Error);
    }

    #[tokio::test]
    async fn test_path_for_asks_git() {
        let git = MockGateway::new();
        assert_eq!(
            Config::path_for(&git).await.unwrap(),
            PathBuf::from("/mock/repo/.git/gitscope/config.toml")
        );

        // Nothing exists under the mock path, so defaults apply.
        let config = Config::load_for(&git).await.unwrap();
        assert_eq!(config.lookup.on_missing, OnMissing::Error);
    }
}
