//! Fetch refspecs, e.g. `+refs/heads/*:refs/remotes/origin/*`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::refs::{to_branch_ref, to_tracking_ref};
use crate::types::Ref;

/// A parsed `[+]<src>:<dst>` mapping between a remote's branches and the
/// local tracking namespace.
///
/// ```
/// use gitscope_git::{Ref, Refspec};
///
/// let spec: Refspec = "+refs/heads/*:refs/remotes/origin/*".parse().unwrap();
/// assert_eq!(spec.to_local(&Ref::branch("dev")), Some(Ref::tracking("origin", "dev")));
/// assert_eq!(spec.to_remote(&Ref::tracking("origin", "dev")), Some(Ref::branch("dev")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refspec {
    value: String,
    force: bool,
    source: String,
    destination: String,
}

impl Refspec {
    /// Parse a refspec.
    ///
    /// # Errors
    /// Returns a parse error if there is no `:` or a side carries more than
    /// one `*`.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let (force, body) = match trimmed.strip_prefix('+') {
            Some(body) => (true, body),
            None => (false, trimmed),
        };
        let (source, destination) = body
            .split_once(':')
            .ok_or_else(|| Error::parse("refspec", value))?;

        if source.matches('*').count() > 1 || destination.matches('*').count() > 1 {
            return Err(Error::parse("refspec", value));
        }

        Ok(Self {
            value: trimmed.to_string(),
            force,
            source: source.to_string(),
            destination: destination.to_string(),
        })
    }

    /// The refspec as written in the config file.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether non-fast-forward updates are allowed (`+` prefix).
    #[must_use]
    pub const fn is_force(&self) -> bool {
        self.force
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Map a branch on the remote to its local tracking ref.
    #[must_use]
    pub fn to_local(&self, branch: &Ref) -> Option<Ref> {
        let mapped = convert(branch.ref_name(), &self.source, &self.destination)?;
        to_tracking_ref(&mapped).ok()
    }

    /// Map a local tracking ref back to the branch on the remote.
    #[must_use]
    pub fn to_remote(&self, tracking: &Ref) -> Option<Ref> {
        let mapped = convert(tracking.ref_name(), &self.destination, &self.source)?;
        to_branch_ref(&mapped).ok()
    }
}

impl FromStr for Refspec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Refspec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Match `name` against `from`, substituting the `*` capture into `to`.
fn convert(name: &str, from: &str, to: &str) -> Option<String> {
    let Some((prefix, suffix)) = from.split_once('*') else {
        return (name == from).then(|| to.to_string());
    };

    let capture = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
    if capture.is_empty() {
        return None;
    }
    Some(to.replacen('*', capture, 1))
}
