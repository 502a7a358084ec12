//! # gitscope-git
//!
//! Subprocess gateway to the `git` executable and parsers for the plumbing
//! output it produces. Nothing here reads pack files or loose objects
//! directly; every read goes through a git subcommand.

mod batch;
pub mod cat_file;
mod cli;
pub mod config;
mod error;
mod gateway;
pub mod log;
pub mod refs;
pub mod refspec;
pub mod status;
pub mod tags;
pub mod tree;
mod types;

pub use batch::CatFileProcess;
pub use cat_file::{BatchEvent, BatchObject, BatchParser};
pub use cli::GitCli;
pub use config::{BranchConfig, GitConfigFile, RemoteConfig};
pub use error::{Error, Result};
pub use gateway::{CommitSelector, GitGateway};
pub use log::{LogRecord, StashRecord};
pub use refs::{RefListing, RefTarget};
pub use refspec::Refspec;
pub use status::{DiffKind, WorkingDirectoryItem};
pub use tags::AnnotatedTagRecord;
pub use tree::{TreeEntry, TreeEntryKind};
pub use types::{ObjectId, ObjectType, Principal, Ref, RefKind};
