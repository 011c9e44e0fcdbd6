//! Filesystem Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. The three kinds below are the only
//! error vocabulary that crosses the adapter boundary; whatever the remote
//! provider reported is kept as a child frame of the error tree.

use derive_more::{Display, Error};

/// A filesystem error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for filesystem operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The entry does not exist (or is no longer active).
    #[display("not found: {path} (repository {repository})")]
    NotFound { repository: String, path: String },
    /// A read-class operation failed for any reason other than absence.
    #[display("not readable: {path} (repository {repository})")]
    NotReadable { repository: String, path: String },
    /// A write-class operation (create, update, delete, mkdir, rmdir) was refused or failed.
    #[display("modification not allowed: {path} (repository {repository})")]
    NotWritable { repository: String, path: String },
}

impl ErrorKind {
    pub fn not_found(repository: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotFound { repository: repository.into(), path: path.into() }
    }

    pub fn not_readable(repository: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotReadable { repository: repository.into(), path: path.into() }
    }

    pub fn not_writable(repository: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotWritable { repository: repository.into(), path: path.into() }
    }

    /// Virtual path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path, .. } | Self::NotReadable { path, .. } | Self::NotWritable { path, .. } => path,
        }
    }

    pub fn repository(&self) -> &str {
        match self {
            Self::NotFound { repository, .. }
            | Self::NotReadable { repository, .. }
            | Self::NotWritable { repository, .. } => repository,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if retrying might succeed.
    ///
    /// Transient network failures surface as [`NotReadable`](Self::NotReadable)
    /// or [`NotWritable`](Self::NotWritable); retry policy belongs to the caller.
    pub fn is_retryable(&self) -> bool {
        !self.is_not_found()
    }
}
