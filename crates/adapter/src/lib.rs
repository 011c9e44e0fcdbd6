//! Box cloud storage exposed as a virtual filesystem.
//!
//! [`BoxFileSystem`] maps virtual paths onto a single folder (the
//! repository) of a Box account and implements [`boxfs_vfs::FileSystem`].
//! Box addresses items by id, so every operation first walks the path from
//! the account root ([`EntryResolver`]). Nothing is cached between
//! operations, and nothing is retried.
//!
//! Failures are reported with the three filesystem error kinds only (see
//! [`translate()`]); the underlying Box error stays in the error tree.

mod directory;
mod file;
mod filesystem;
mod resolve;
mod translate;

pub use crate::directory::BoxDirectory;
pub use crate::file::BoxFile;
pub use crate::filesystem::BoxFileSystem;
pub use crate::resolve::EntryResolver;
pub use crate::translate::{Failure, translate};
pub use boxfs_config::{Config, MkdirConflict};
