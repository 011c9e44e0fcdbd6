//! In-memory Box API for testing.

use crate::api::{BoxApi, EntryStream};
use crate::error::{ErrorKind, Result, STATUS_CONFLICT, STATUS_NOT_FOUND};
use crate::models::{EntryInfo, ItemStatus, ItemType, ParentRef, ROOT_FOLDER_ID};
use async_stream::stream;
use async_trait::async_trait;
use boxfs_vfs::{ByteRange, ByteStream};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::RwLock;

/// What Box answers when a non-recursive delete hits a non-empty folder.
const STATUS_FOLDER_NOT_EMPTY: u16 = 400;
const STATUS_RANGE_NOT_SATISFIABLE: u16 = 416;
/// Deliberately tiny so read streams arrive in several chunks.
const CHUNK_SIZE: usize = 4;

/// Number of remote calls made, per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calls {
    pub list_items: usize,
    pub read_stream: usize,
    pub upload_file: usize,
    pub upload_new_version: usize,
    pub update_file: usize,
    pub update_folder: usize,
    pub create_folder: usize,
    pub delete_file: usize,
    pub delete_folder: usize,
    pub download_url: usize,
}

struct MockItem {
    info: EntryInfo,
    parent: String,
    /// Files only; the last element is the current version.
    versions: Vec<Vec<u8>>,
}

#[derive(Default)]
struct MockState {
    last_id: u64,
    items: BTreeMap<u64, MockItem>,
    /// Calls still allowed to succeed, then the status to fail with.
    fail_next: Option<(usize, u16)>,
    calls: Calls,
}

fn now() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}

fn not_found<T>() -> Result<T> {
    exn::bail!(ErrorKind::Status(STATUS_NOT_FOUND))
}

impl MockState {
    /// Consume an injected failure, if one is pending.
    fn begin(&mut self) -> Result<()> {
        match self.fail_next.take() {
            Some((0, status)) => exn::bail!(ErrorKind::Status(status)),
            Some((skip, status)) => {
                self.fail_next = Some((skip - 1, status));
                Ok(())
            },
            None => Ok(()),
        }
    }

    fn key(id: &str) -> Option<u64> {
        id.parse().ok()
    }

    fn get(&self, id: &str) -> Option<&MockItem> {
        Self::key(id).and_then(|key| self.items.get(&key))
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut MockItem> {
        Self::key(id).and_then(|key| self.items.get_mut(&key))
    }

    /// An active item of the given type, or a 404.
    fn active_mut(&mut self, id: &str, item_type: ItemType) -> Result<&mut MockItem> {
        match self.get_mut(id) {
            Some(item) if item.info.is_active() && item.info.item_type == item_type => Ok(item),
            _ => not_found(),
        }
    }

    fn folder_exists(&self, id: &str) -> bool {
        id == ROOT_FOLDER_ID || self.get(id).is_some_and(|item| item.info.is_folder() && item.info.is_active())
    }

    fn children<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a MockItem> + 'a {
        self.items.values().filter(move |item| item.parent == parent)
    }

    /// Children of a folder in creation order, whatever their status.
    fn list(&self, folder_id: &str) -> Result<Vec<EntryInfo>> {
        if !self.folder_exists(folder_id) {
            return not_found();
        }
        Ok(self.children(folder_id).map(|item| item.info.clone()).collect())
    }

    fn name_taken(&self, parent: &str, name: &str) -> bool {
        self.children(parent).any(|item| item.info.is_active() && item.info.name == name)
    }

    fn insert(&mut self, item_type: ItemType, parent: &str, name: &str, content: Option<Vec<u8>>) -> Result<EntryInfo> {
        if !self.folder_exists(parent) {
            return not_found();
        }
        if self.name_taken(parent, name) {
            exn::bail!(ErrorKind::Status(STATUS_CONFLICT));
        }
        self.last_id += 1;
        let timestamp = now();
        let parent_name = self.get(parent).map(|item| item.info.name.clone()).unwrap_or_default();
        let info = EntryInfo {
            item_type,
            id: self.last_id.to_string(),
            name: name.to_string(),
            etag: Some("0".to_string()),
            size: Some(content.as_ref().map_or(0, |c| c.len() as u64)),
            created_at: timestamp.clone(),
            modified_at: timestamp,
            trashed_at: None,
            purged_at: None,
            description: None,
            item_status: ItemStatus::Active,
            parent: Some(ParentRef {
                item_type: ItemType::Folder,
                id: parent.to_string(),
                name: Some(parent_name),
                etag: None,
            }),
        };
        let versions = content.into_iter().collect();
        self.items.insert(self.last_id, MockItem { info: info.clone(), parent: parent.to_string(), versions });
        Ok(info)
    }

    fn update(&mut self, id: &str, item_type: ItemType, fields: Map<String, Value>) -> Result<EntryInfo> {
        let item = self.active_mut(id, item_type)?;
        for (key, value) in fields {
            let value = value.as_str().map(str::to_string);
            match key.as_str() {
                "name" => item.info.name = value.unwrap_or_default(),
                "description" => item.info.description = value,
                "created_at" => item.info.created_at = value,
                "modified_at" => item.info.modified_at = value,
                _ => {},
            }
        }
        Ok(item.info.clone())
    }
}

/// In-memory Box API for testing.
///
/// Items live in a map behind a [`RwLock`], so every [`BoxApi`] method works
/// on `&self`. Ids are handed out sequentially and the root folder is
/// [`ROOT_FOLDER_ID`]. Every call is counted (see [`calls()`](Self::calls)),
/// and a single failure can be injected with [`fail_next()`](Self::fail_next)
/// or [`fail_after()`](Self::fail_after).
///
/// Unlike the real service, listings include trashed and deleted items, so
/// callers' status filtering can be exercised.
///
/// # Examples
///
/// ```
/// use boxfs_client::{BoxApi, MockBox};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> boxfs_client::error::Result<()> {
/// let mock = MockBox::new();
/// let folder = mock.insert_folder("0", "docs").await;
/// mock.insert_file(&folder, "a.txt", "hello").await;
///
/// let children = mock.list_items(&folder).await?;
/// assert_eq!(children[0].name, "a.txt");
/// assert_eq!(mock.calls().await.list_items, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MockBox {
    state: RwLock<MockState>,
}

impl MockBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a folder directly, without counting a call.
    ///
    /// Panics if the parent is missing or the name is taken. If test setup
    /// is wrong, then the test should not pass.
    pub async fn insert_folder(&self, parent_id: &str, name: &str) -> String {
        let mut state = self.state.write().await;
        match state.insert(ItemType::Folder, parent_id, name, None) {
            Ok(info) => info.id,
            Err(_) => panic!("MockBox::insert_folder: cannot create {name} in {parent_id}"),
        }
    }

    /// Create a file directly, without counting a call.
    ///
    /// Panics if the parent is missing or the name is taken.
    pub async fn insert_file(&self, parent_id: &str, name: &str, content: impl Into<Vec<u8>>) -> String {
        let mut state = self.state.write().await;
        match state.insert(ItemType::File, parent_id, name, Some(content.into())) {
            Ok(info) => info.id,
            Err(_) => panic!("MockBox::insert_file: cannot create {name} in {parent_id}"),
        }
    }

    /// Move an item to another status (e.g. trash it) while keeping it listed.
    ///
    /// Panics if the item does not exist.
    pub async fn set_status(&self, id: &str, status: ItemStatus) {
        let mut state = self.state.write().await;
        let Some(item) = state.get_mut(id) else {
            panic!("MockBox::set_status: no item {id}");
        };
        item.info.item_status = status;
    }

    /// Overwrite the raw timestamps of an item (to test unparseable dates).
    ///
    /// Panics if the item does not exist.
    pub async fn set_timestamps(&self, id: &str, created_at: Option<&str>, modified_at: Option<&str>) {
        let mut state = self.state.write().await;
        let Some(item) = state.get_mut(id) else {
            panic!("MockBox::set_timestamps: no item {id}");
        };
        item.info.created_at = created_at.map(str::to_string);
        item.info.modified_at = modified_at.map(str::to_string);
    }

    /// Make the next API call fail with the given HTTP status.
    pub async fn fail_next(&self, status: u16) {
        self.fail_after(0, status).await;
    }

    /// Let `skip` API calls succeed, then fail the next one with the given
    /// HTTP status.
    pub async fn fail_after(&self, skip: usize, status: u16) {
        self.state.write().await.fail_next = Some((skip, status));
    }

    /// Current state of an item, whatever its status.
    pub async fn get(&self, id: &str) -> Option<EntryInfo> {
        self.state.read().await.get(id).map(|item| item.info.clone())
    }

    /// First active child of a folder with the given name.
    pub async fn find(&self, parent_id: &str, name: &str) -> Option<EntryInfo> {
        let state = self.state.read().await;
        state
            .children(parent_id)
            .find(|item| item.info.is_active() && item.info.name == name)
            .map(|item| item.info.clone())
    }

    /// Latest content of a file.
    pub async fn content(&self, id: &str) -> Option<Vec<u8>> {
        self.state.read().await.get(id).and_then(|item| item.versions.last().cloned())
    }

    /// Number of stored versions of a file (zero for folders and unknown ids).
    pub async fn version_count(&self, id: &str) -> usize {
        self.state.read().await.get(id).map_or(0, |item| item.versions.len())
    }

    pub async fn calls(&self) -> Calls {
        self.state.read().await.calls
    }

    pub async fn reset_calls(&self) {
        self.state.write().await.calls = Calls::default();
    }
}

#[async_trait]
impl BoxApi for MockBox {
    fn list_items_stream<'a>(&'a self, folder_id: &'a str) -> EntryStream<'a> {
        Box::pin(stream! {
            // Snapshot under the lock, then drop it before yielding to avoid
            // holding the lock across yield points.
            let listed = {
                let mut state = self.state.write().await;
                state.calls.list_items += 1;
                state.begin().and_then(|_| state.list(folder_id))
            };
            match listed {
                Ok(entries) => for entry in entries { yield Ok(entry); },
                Err(e) => yield Err(e),
            }
        })
    }

    async fn read_stream(&self, file_id: &str, range: Option<ByteRange>) -> Result<ByteStream> {
        let mut state = self.state.write().await;
        state.calls.read_stream += 1;
        state.begin()?;
        let item = state.active_mut(file_id, ItemType::File)?;
        let content = item.versions.last().cloned().unwrap_or_default();
        let content = match range {
            None => content,
            Some(range) if range.is_empty() => Vec::new(),
            Some(range) => {
                let len = content.len() as u64;
                if range.start > len || (range.start == len && len > 0) {
                    exn::bail!(ErrorKind::Status(STATUS_RANGE_NOT_SATISFIABLE));
                }
                let end = range.end_inclusive().map_or(len, |end| end.saturating_add(1).min(len));
                content[range.start as usize..end as usize].to_vec()
            },
        };
        let chunks: Vec<std::io::Result<Vec<u8>>> = content.chunks(CHUNK_SIZE).map(|c| Ok(c.to_vec())).collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    async fn upload_file(&self, parent_id: &str, name: &str, content: Vec<u8>) -> Result<EntryInfo> {
        let mut state = self.state.write().await;
        state.calls.upload_file += 1;
        state.begin()?;
        state.insert(ItemType::File, parent_id, name, Some(content))
    }

    async fn upload_new_version(&self, file_id: &str, content: Vec<u8>) -> Result<EntryInfo> {
        let mut state = self.state.write().await;
        state.calls.upload_new_version += 1;
        state.begin()?;
        let item = state.active_mut(file_id, ItemType::File)?;
        item.info.size = Some(content.len() as u64);
        item.versions.push(content);
        item.info.etag = Some((item.versions.len() - 1).to_string());
        item.info.modified_at = now();
        Ok(item.info.clone())
    }

    async fn update_file(&self, file_id: &str, fields: Map<String, Value>) -> Result<EntryInfo> {
        let mut state = self.state.write().await;
        state.calls.update_file += 1;
        state.begin()?;
        state.update(file_id, ItemType::File, fields)
    }

    async fn update_folder(&self, folder_id: &str, fields: Map<String, Value>) -> Result<EntryInfo> {
        let mut state = self.state.write().await;
        state.calls.update_folder += 1;
        state.begin()?;
        state.update(folder_id, ItemType::Folder, fields)
    }

    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<EntryInfo> {
        let mut state = self.state.write().await;
        state.calls.create_folder += 1;
        state.begin()?;
        state.insert(ItemType::Folder, parent_id, name, None)
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.delete_file += 1;
        state.begin()?;
        state.active_mut(file_id, ItemType::File)?;
        if let Some(key) = MockState::key(file_id) {
            state.items.remove(&key);
        }
        Ok(())
    }

    async fn delete_folder(&self, folder_id: &str, recursive: bool) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.delete_folder += 1;
        state.begin()?;
        state.active_mut(folder_id, ItemType::Folder)?;
        if !recursive && state.children(folder_id).any(|item| item.info.is_active()) {
            exn::bail!(ErrorKind::Status(STATUS_FOLDER_NOT_EMPTY));
        }
        let mut pending = vec![folder_id.to_string()];
        while let Some(id) = pending.pop() {
            pending.extend(state.children(&id).map(|item| item.info.id.clone()));
            if let Some(key) = MockState::key(&id) {
                state.items.remove(&key);
            }
        }
        Ok(())
    }

    async fn download_url(&self, file_id: &str) -> Result<String> {
        let mut state = self.state.write().await;
        state.calls.download_url += 1;
        state.begin()?;
        let item = state.active_mut(file_id, ItemType::File)?;
        Ok(format!("https://dl.boxcloud.mock/{}/v{}", item.info.id, item.versions.len()))
    }
}
