//! Virtual filesystem contract.
//!
//! Adapters (such as the Box adapter in `boxfs-adapter`) plug into this crate:
//! it provides the [`FileSystem`] trait, the generic entry shapes returned by
//! it, the domain error vocabulary, path utilities and the [`Data`]
//! conversion helper. It contains no storage logic of its own.

pub mod data;
pub mod error;
mod fs;
mod models;
mod path;

pub use crate::data::{ByteStream, Data};
pub use crate::fs::FileSystem;
pub use crate::models::{
    ByteRange, Capabilities, EntryType, Item, Props, ReadOptions, Stats, UrlOptions, UrlType, WriteOptions,
};
pub use crate::path::{get_name, get_parent, join_paths, normalize, segments};
use std::sync::Arc;

pub type FileSystemHandle = Arc<dyn FileSystem + Send + Sync>;
