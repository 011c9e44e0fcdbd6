//! Path to remote entry resolution.
//!
//! Box addresses everything by id, so every path is resolved by walking from
//! the account root, one folder listing per segment. Nothing is cached: each
//! resolution sees the remote state as it is at that moment.

use boxfs_client::error::Result;
use boxfs_client::{BoxApi, EntryInfo};
use boxfs_vfs::segments;
use futures::TryStreamExt;

/// Result of looking up an entry that may legitimately be absent.
#[derive(Debug)]
pub(crate) enum Lookup {
    Found(EntryInfo),
    Missing,
    Failed(boxfs_client::error::Error),
}
impl From<Result<Option<EntryInfo>>> for Lookup {
    fn from(result: Result<Option<EntryInfo>>) -> Self {
        match result {
            Ok(Some(info)) => Self::Found(info),
            Ok(None) => Self::Missing,
            // A folder on the way vanished between two listings.
            Err(err) if err.is_not_found() => Self::Missing,
            Err(err) => Self::Failed(err),
        }
    }
}

/// Path of a child entry inside `parent`.
pub(crate) fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" { format!("/{name}") } else { format!("{parent}/{name}") }
}

/// Resolves root-prefixed paths to remote entries.
pub struct EntryResolver<'a> {
    api: &'a dyn BoxApi,
}

impl<'a> EntryResolver<'a> {
    pub fn new(api: &'a dyn BoxApi) -> Self {
        Self { api }
    }

    /// Resolve a full path (repository root included).
    ///
    /// `/` is the account root and costs no remote call. Every other path
    /// costs one listing per segment. Returns `None` when a segment does not
    /// exist, or when a parent turns out to be a file. Entries are returned
    /// whatever their status; callers decide whether a trashed entry counts.
    pub async fn resolve(&self, full_path: &str) -> Result<Option<EntryInfo>> {
        let mut current = EntryInfo::root();
        for name in segments(full_path) {
            if !current.is_folder() {
                return Ok(None);
            }
            let found = self.find_child(&current.id, |child| child.name == name).await?;
            let Some(child) = found else {
                return Ok(None);
            };
            current = child;
        }
        Ok(Some(current))
    }

    /// Make sure a chain of folders exists below `start`, creating what is
    /// missing. Returns the last folder of the chain.
    ///
    /// Losing a creation race (HTTP 409) is fine as long as the winner
    /// created a folder.
    pub async fn ensure_folders(&self, start: EntryInfo, names: &[&str]) -> Result<EntryInfo> {
        let mut parent = start;
        for name in names {
            let existing = self.find_folder(&parent.id, name).await?;
            let folder = match existing {
                Some(folder) => folder,
                None => match self.api.create_folder(&parent.id, name).await {
                    Ok(folder) => {
                        tracing::debug!(parent = %parent.id, name = %name, id = %folder.id, "Created folder");
                        folder
                    },
                    Err(err) if err.is_conflict() => self.find_folder(&parent.id, name).await?.ok_or(err)?,
                    Err(err) => return Err(err),
                },
            };
            parent = folder;
        }
        Ok(parent)
    }

    async fn find_folder(&self, folder_id: &str, name: &str) -> Result<Option<EntryInfo>> {
        self.find_child(folder_id, |child| child.is_folder() && child.is_active() && child.name == name).await
    }

    /// First child matching the predicate. Stops paging at the first match.
    async fn find_child(&self, folder_id: &str, matches: impl Fn(&EntryInfo) -> bool) -> Result<Option<EntryInfo>> {
        let mut children = self.api.list_items_stream(folder_id);
        while let Some(child) = children.try_next().await? {
            if matches(&child) {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }
}
