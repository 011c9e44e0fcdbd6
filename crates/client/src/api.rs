//! The remote calls the adapter relies on.

use crate::error::Result;
use crate::models::EntryInfo;
use async_trait::async_trait;
use boxfs_vfs::{ByteRange, ByteStream};
use futures::{Stream, TryStreamExt};
use serde_json::{Map, Value};
use std::pin::Pin;

pub type EntryStream<'a> = Pin<Box<dyn Stream<Item = Result<EntryInfo>> + Send + 'a>>;

/// Box API operations, addressed by remote id.
///
/// Every method is a single independent round trip (pagination aside). No
/// method caches anything, and nothing is retried: a failed call reports the
/// remote status through [`ErrorKind::Status`](crate::error::ErrorKind::Status)
/// and leaves retry policy to the caller.
#[async_trait]
pub trait BoxApi: Send + Sync {
    /// Stream the children of a folder, fetching pages as they are consumed.
    ///
    /// Dropping the stream early skips the remaining pages.
    fn list_items_stream<'a>(&'a self, folder_id: &'a str) -> EntryStream<'a>;

    /// List all children of a folder.
    ///
    /// Default implementation collects [`list_items_stream()`](Self::list_items_stream).
    async fn list_items(&self, folder_id: &str) -> Result<Vec<EntryInfo>> {
        self.list_items_stream(folder_id).try_collect().await
    }

    /// Open a read stream over a file's latest version, optionally limited
    /// to a byte range.
    async fn read_stream(&self, file_id: &str, range: Option<ByteRange>) -> Result<ByteStream>;

    /// Upload a new file into a folder. Fails with HTTP 409 if the name is taken.
    async fn upload_file(&self, parent_id: &str, name: &str, content: Vec<u8>) -> Result<EntryInfo>;

    /// Upload new content for an existing file, keeping earlier versions.
    async fn upload_new_version(&self, file_id: &str, content: Vec<u8>) -> Result<EntryInfo>;

    /// Update file metadata fields.
    async fn update_file(&self, file_id: &str, fields: Map<String, Value>) -> Result<EntryInfo>;

    /// Update folder metadata fields.
    async fn update_folder(&self, folder_id: &str, fields: Map<String, Value>) -> Result<EntryInfo>;

    /// Create a folder. Fails with HTTP 409 if the name is taken.
    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<EntryInfo>;

    async fn delete_file(&self, file_id: &str) -> Result<()>;

    /// Delete a folder. Without `recursive` the remote refuses non-empty folders.
    async fn delete_folder(&self, folder_id: &str, recursive: bool) -> Result<()>;

    /// Direct download URL for a file's latest version.
    async fn download_url(&self, file_id: &str) -> Result<String>;
}
