//! Error types for gitscope-git.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to git or parsing its output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller supplied an empty or malformed argument.
    #[error("invalid {what}: '{value}'")]
    Validation {
        /// What was being validated.
        what: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Git output did not match the expected grammar.
    #[error("unparseable {what}: '{input}'")]
    Parse {
        /// Which grammar was being parsed.
        what: &'static str,
        /// The offending input fragment.
        input: String,
    },

    /// The object-batch stream violated its framing.
    #[error("cat-file protocol error: {0}")]
    Protocol(String),

    /// A git subprocess exited unsuccessfully.
    #[error("`git {command}` failed ({code:?}): {stderr}")]
    CommandFailed {
        /// The argument vector, space-joined.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// A branch names a remote that has no `[remote]` section.
    #[error("unknown remote: {0}")]
    UnknownRemote(String),

    /// The batch process went away while lookups were pending.
    #[error("cat-file batch process closed unexpectedly")]
    BatchClosed,

    /// IO error spawning or talking to git.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parse(what: &'static str, input: impl Into<String>) -> Self {
        Self::Parse {
            what,
            input: input.into(),
        }
    }

    pub(crate) fn validation(what: &'static str, value: impl Into<String>) -> Self {
        Self::Validation {
            what,
            value: value.into(),
        }
    }

    /// Whether this error means git produced output we could not understand.
    ///
    /// Such failures indicate format drift or corruption, as opposed to a
    /// failed command or a bad argument.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Protocol(_))
    }
}
