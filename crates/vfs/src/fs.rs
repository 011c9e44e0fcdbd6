//! The filesystem trait adapters implement.

use crate::data::Data;
use crate::error::{ErrorKind, Result};
use crate::models::{Capabilities, Item, Props, ReadOptions, Stats, UrlOptions, WriteOptions};
use async_trait::async_trait;
use exn::ResultExt;

/// Unified interface for virtual filesystem adapters.
///
/// Every path is a virtual path rooted at `/` inside the adapter's
/// repository. Operations fail with one of the three
/// [`ErrorKind`] variants and nothing else.
///
/// # Examples
///
/// ```no_run
/// use boxfs_vfs::{Data, FileSystem, ReadOptions, WriteOptions, error::Result};
///
/// async fn copy(fs: &dyn FileSystem, from: &str, to: &str) -> Result<()> {
///     let data = fs.read(from, &ReadOptions::default()).await?;
///     fs.write(to, data, &WriteOptions::default()).await
/// }
/// ```
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Name of the repository this filesystem is isolated to.
    fn repository(&self) -> &str;

    /// What the backend supports natively.
    fn capabilities(&self) -> Capabilities;

    /// List the active children of a directory.
    async fn list(&self, path: &str) -> Result<Vec<Item>>;

    /// Create a directory. The parent must already exist.
    async fn mkdir(&self, path: &str) -> Result<()>;

    /// Remove an empty directory. Non-empty directories are refused.
    async fn rmdir(&self, path: &str) -> Result<()>;

    /// Read file content.
    async fn read(&self, path: &str, options: &ReadOptions) -> Result<Data>;

    /// Read file content into memory.
    async fn read_bytes(&self, path: &str, options: &ReadOptions) -> Result<Vec<u8>> {
        let data = self.read(path, options).await?;
        data.into_bytes().await.or_raise(|| ErrorKind::not_readable(self.repository(), path))
    }

    /// Create or replace (or, with [`WriteOptions::append`], extend) a file.
    async fn write(&self, path: &str, data: Data, options: &WriteOptions) -> Result<()>;

    /// Delete a file.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Entry metadata without content.
    async fn head(&self, path: &str) -> Result<Stats>;

    /// Check if an entry exists.
    async fn exists(&self, path: &str) -> Result<bool> {
        match self.head(path).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Update entry metadata.
    async fn patch(&self, path: &str, props: Props) -> Result<()>;

    /// Generate a URL that gives direct access to the entry.
    async fn to_url(&self, path: &str, options: &UrlOptions) -> Result<String>;
}
