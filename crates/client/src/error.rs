//! Client Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. The transport status code is kept as
//! the top frame so the adapter can classify failures without digging
//! through the tree.

use derive_more::{Display, Error};

/// A client error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote answered with a non-success HTTP status.
    #[display("remote responded with HTTP {_0}")]
    Status(#[error(not(source))] u16),
    /// The request never produced a response (DNS, TLS, connection, timeout).
    #[display("transport error")]
    Transport,
    /// The response body could not be decoded.
    #[display("malformed response")]
    Decode,
    /// No access token could be obtained.
    #[display("authentication failed")]
    Authentication,
    /// The request was rejected locally before being sent.
    #[display("invalid request: {_0}")]
    InvalidRequest(#[error(not(source))] String),
}

impl ErrorKind {
    /// HTTP status code reported by the remote, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(STATUS_NOT_FOUND)
    }

    /// The remote already holds an item with the same name.
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(STATUS_CONFLICT)
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}
