//! Generic entry shapes and operation options.

use derive_more::Display;
use serde_json::{Map, Value};

/// Kind of filesystem entry.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
}

/// A single element of a directory listing.
///
/// Timestamps are epoch milliseconds and are only present when the remote
/// reported a parseable date; they are never defaulted to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Virtual path of the entry (parent path + `/` + name).
    pub path: String,
    pub entry_type: EntryType,
    /// Size in bytes, files only.
    pub size: Option<u64>,
    pub created: Option<i64>,
    pub modified: Option<i64>,
    /// Opaque change tag.
    pub etag: Option<String>,
}
impl Item {
    pub fn name(&self) -> String {
        crate::get_name(&self.path)
    }
}

/// Entry metadata returned by [`FileSystem::head`](crate::FileSystem::head).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub entry_type: EntryType,
    /// Always `None` for directories.
    pub size: Option<u64>,
    pub created: Option<i64>,
    pub modified: Option<i64>,
    pub etag: Option<String>,
    /// Backend-specific identifier of the entry.
    pub id: Option<String>,
    pub name: String,
}

/// Properties to apply to an entry with [`FileSystem::patch`](crate::FileSystem::patch).
///
/// `created` and `modified` are epoch milliseconds; backends translate them
/// to their own field names. Everything in `extra` is passed through as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    pub created: Option<i64>,
    pub modified: Option<i64>,
    pub extra: Map<String, Value>,
}
impl Props {
    pub fn with_created(mut self, millis: i64) -> Self {
        self.created = Some(millis);
        self
    }

    pub fn with_modified(mut self, millis: i64) -> Self {
        self.modified = Some(millis);
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A byte range for partial reads: `length` bytes starting at `start`, or
/// everything from `start` onwards when `length` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub length: Option<u64>,
}
impl ByteRange {
    pub fn new(start: u64, length: Option<u64>) -> Self {
        Self { start, length }
    }

    /// Inclusive offset of the last byte, if the range is bounded and non-empty.
    pub fn end_inclusive(&self) -> Option<u64> {
        match self.length {
            Some(0) | None => None,
            Some(length) => Some(self.start.saturating_add(length - 1)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.length == Some(0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub range: Option<ByteRange>,
}
impl ReadOptions {
    pub fn range(start: u64, length: Option<u64>) -> Self {
        Self { range: Some(ByteRange::new(start, length)) }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Append to the existing content instead of replacing it.
    pub append: bool,
}
impl WriteOptions {
    pub fn append() -> Self {
        Self { append: true }
    }
}

/// HTTP method a generated URL is meant for.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
pub enum UrlType {
    #[default]
    #[display("GET")]
    Get,
    #[display("POST")]
    Post,
    #[display("PUT")]
    Put,
    #[display("DELETE")]
    Delete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlOptions {
    pub url_type: UrlType,
}

/// What a backend natively supports. Callers emulate whatever is `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub range_read: bool,
    pub append: bool,
    pub range_write: bool,
}
