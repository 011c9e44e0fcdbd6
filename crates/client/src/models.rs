//! Box API wire models.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Identifier Box uses for the "All Files" root folder.
pub const ROOT_FOLDER_ID: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    File,
    Folder,
    /// Bookmarks can live in folders, but are neither files nor folders.
    WebLink,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Active,
    Trashed,
    Deleted,
}

/// Mini representation of a parent folder. A back-reference only; the child
/// does not own it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub etag: Option<String>,
}

/// A remote file or folder as returned by the API.
///
/// Produced fresh by every call and never cached: an id fetched earlier may
/// already be stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInfo {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub etag: Option<String>,
    /// Files only (folders report the size of their whole subtree).
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub modified_at: Option<String>,
    #[serde(default)]
    pub trashed_at: Option<String>,
    #[serde(default)]
    pub purged_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub item_status: ItemStatus,
    #[serde(default)]
    pub parent: Option<ParentRef>,
}

impl EntryInfo {
    /// Synthetic record for the account root folder.
    pub fn root() -> Self {
        Self {
            item_type: ItemType::Folder,
            id: ROOT_FOLDER_ID.to_string(),
            name: String::new(),
            etag: None,
            size: None,
            created_at: None,
            modified_at: None,
            trashed_at: None,
            purged_at: None,
            description: None,
            item_status: ItemStatus::Active,
            parent: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.item_type == ItemType::File
    }

    pub fn is_folder(&self) -> bool {
        self.item_type == ItemType::Folder
    }

    pub fn is_active(&self) -> bool {
        self.item_status == ItemStatus::Active
    }

    /// Creation time in epoch milliseconds, if present and valid.
    pub fn created_millis(&self) -> Option<i64> {
        parse_timestamp(self.created_at.as_deref())
    }

    /// Modification time in epoch milliseconds, if present and valid.
    pub fn modified_millis(&self) -> Option<i64> {
        parse_timestamp(self.modified_at.as_deref())
    }
}

/// A page of folder items.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ItemCollection {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub entries: Vec<EntryInfo>,
}

/// Parse an RFC 3339 timestamp into epoch milliseconds.
///
/// Invalid or missing dates yield `None`, never zero.
///
/// ```
/// use boxfs_client::parse_timestamp;
/// assert_eq!(parse_timestamp(Some("1970-01-01T00:00:01Z")), Some(1_000));
/// assert_eq!(parse_timestamp(Some("2012-12-12T10:53:43-08:00")), Some(1_355_338_423_000));
/// assert_eq!(parse_timestamp(Some("yesterday")), None);
/// assert_eq!(parse_timestamp(None), None);
/// ```
pub fn parse_timestamp(value: Option<&str>) -> Option<i64> {
    let parsed = OffsetDateTime::parse(value?, &Rfc3339).ok()?;
    i64::try_from(parsed.unix_timestamp_nanos() / 1_000_000).ok()
}

/// Format epoch milliseconds as an RFC 3339 timestamp (UTC).
///
/// ```
/// use boxfs_client::format_timestamp;
/// assert_eq!(format_timestamp(1_000).as_deref(), Some("1970-01-01T00:00:01Z"));
/// ```
pub fn format_timestamp(millis: i64) -> Option<String> {
    let nanos = i128::from(millis) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?.format(&Rfc3339).ok()
}
