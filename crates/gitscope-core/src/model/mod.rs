//! The repository object model.

pub mod nodes;
mod repository;

use serde::{Deserialize, Serialize};

pub use nodes::{AnnotatedTag, Blob, Commit, RefEntry, Remote, Stash, TagDetails, Tree};
pub use repository::RepositoryModel;

/// What a lookup does when the identity it was given does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnMissing {
    /// Fail with [`crate::Error::NotFound`].
    #[default]
    Error,
    /// Return `None`.
    Null,
    /// Log a warning and return `None`.
    Warn,
}
