//! Error type shared by every store operation.

use std::io;

use thiserror::Error;


/// Everything that can go wrong while driving a `FakeFs`.
///
/// None of these are fatal: the tree is left unchanged by a failing
/// operation unless the variant says otherwise.
#[derive(Debug, Error)]
pub enum FsError {
    /// A path or name did not resolve to a namespace/entity.
    #[error("not found: {0}")]
    NotFound(String),

    /// The name is already taken by an entity or a child namespace.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The path or name is syntactically unusable.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A link target resolved to a namespace rather than an entity.
    #[error("not an entity: {0}")]
    NotAnEntity(String),

    /// The root namespace cannot be deleted; use `clear()` instead.
    #[error("the root namespace cannot be deleted")]
    RootNamespace,

    /// Reading or writing a save stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A rejected line during a strict load.
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// Settings file could not be read or parsed.
    #[error("settings error: {0}")]
    Settings(String),
}

impl FsError {
    pub(crate) fn invalid(path: &str, reason: impl Into<String>) -> Self {
        FsError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
