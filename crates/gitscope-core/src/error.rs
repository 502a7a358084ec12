//! Error types for gitscope-core.

use std::sync::Arc;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the repository model.
///
/// `Clone` so that a failed cache slot can hand the same failure to every
/// caller that waits on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Caller supplied an empty or malformed argument.
    #[error("invalid {what}: '{value}'")]
    Validation {
        /// What was being validated.
        what: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A lookup found nothing under [`crate::OnMissing::Error`].
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of entity looked up (`commit`, `ref`, ...).
        kind: &'static str,
        /// The identity that was looked up.
        id: String,
    },

    /// The object exists but has a different type.
    #[error("object {id} is a {actual}, expected a {expected}")]
    UnexpectedObjectType {
        id: String,
        expected: &'static str,
        actual: String,
    },

    /// The configuration names a remote that does not exist.
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// Git failed or produced output we could not understand.
    #[error(transparent)]
    Git(Arc<gitscope_git::Error>),

    /// The gitscope config file could not be read or written.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn validation(what: &'static str, value: impl Into<String>) -> Self {
        Self::Validation {
            what,
            value: value.into(),
        }
    }

    pub(crate) fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether this error is a parse or protocol failure rather than
    /// absent data or a bad argument.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Git(e) if e.is_internal())
    }

    /// Whether this error only reports absence.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<gitscope_git::Error> for Error {
    fn from(err: gitscope_git::Error) -> Self {
        match err {
            gitscope_git::Error::Validation { what, value } => Self::Validation { what, value },
            gitscope_git::Error::UnknownRemote(name) => Self::RemoteNotFound(name),
            other => Self::Git(Arc::new(other)),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Git(Arc::new(gitscope_git::Error::Io(err)))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_errors_classified() {
        let parse: Error = gitscope_git::Error::Protocol("bad header".into()).into();
        assert!(parse.is_internal());
        assert!(!parse.is_not_found());

        let validation: Error = gitscope_git::Error::Validation {
            what: "branch name",
            value: String::new(),
        }
        .into();
        assert!(matches!(validation, Error::Validation { .. }));
        assert!(!validation.is_internal());

        let missing = Error::not_found("commit", "abc");
        assert!(missing.is_not_found());
        assert!(!missing.is_internal());
    }

    #[test]
    fn test_unknown_remote_maps_to_remote_not_found() {
        let err: Error = gitscope_git::Error::UnknownRemote("gone".into()).into();
        assert!(matches!(err, Error::RemoteNotFound(name) if name == "gone"));
    }
}
