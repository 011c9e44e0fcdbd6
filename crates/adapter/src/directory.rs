use crate::filesystem::BoxFileSystem;
use crate::resolve::{EntryResolver, child_path};
use crate::translate::TranslateExt;
use boxfs_client::{BoxApi, EntryInfo, ItemType};
use boxfs_config::MkdirConflict;
use boxfs_vfs::error::{ErrorKind, Result};
use boxfs_vfs::{EntryType, Item, get_name, get_parent, normalize, segments};
use tracing::instrument;

/// A folder inside a [`BoxFileSystem`].
#[derive(Debug)]
pub struct BoxDirectory<'a> {
    fs: &'a BoxFileSystem,
    path: String,
}

impl<'a> BoxDirectory<'a> {
    pub(crate) fn new(fs: &'a BoxFileSystem, path: &str) -> Self {
        Self { fs, path: normalize(path) }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn is_root(&self) -> bool {
        self.path == "/"
    }

    /// Active children. Trashed and deleted entries are left out, and so are
    /// web links, which are neither files nor folders.
    #[instrument(skip_all, fields(repository = %self.fs.repository(), path = %self.path))]
    pub async fn list(&self) -> Result<Vec<Item>> {
        let (repository, path) = (self.fs.repository(), self.path.as_str());
        let info = self.fs.require(&self.fs.full_path(path), path, false).await?;
        if !info.is_folder() {
            exn::bail!(ErrorKind::not_readable(repository, path));
        }
        let api = self.fs.client().await.for_read(repository, path)?;
        let entries = api.list_items(&info.id).await.for_read(repository, path)?;
        Ok(entries.into_iter().filter(EntryInfo::is_active).filter_map(|entry| to_item(path, entry)).collect())
    }

    /// Create this folder. The parent must exist.
    ///
    /// An existing entry with the same name is handled according to the
    /// filesystem's [`MkdirConflict`] policy.
    #[instrument(skip_all, fields(repository = %self.fs.repository(), path = %self.path))]
    pub async fn mkdir(&self) -> Result<()> {
        let (repository, path) = (self.fs.repository(), self.path.as_str());
        let policy = self.fs.mkdir_conflict();
        if self.is_root() {
            // The repository root always exists once the client is up.
            self.fs.client().await.for_write(repository, path)?;
            return match policy {
                MkdirConflict::Ignore => Ok(()),
                MkdirConflict::Fail => exn::bail!(ErrorKind::not_writable(repository, path)),
            };
        }
        let full_path = self.fs.full_path(path);
        let parent = self.fs.require(&get_parent(&full_path), path, true).await?;
        if !parent.is_folder() {
            exn::bail!(ErrorKind::not_writable(repository, path));
        }
        let api = self.fs.client().await.for_write(repository, path)?;
        match api.create_folder(&parent.id, &get_name(&full_path)).await {
            Ok(folder) => tracing::debug!(id = %folder.id, "Created folder"),
            Err(err) if err.is_conflict() && policy == MkdirConflict::Ignore => {
                // The name may be taken by a file.
                match self.fs.lookup(&full_path).await.for_write(repository, path)? {
                    Some(existing) if existing.is_folder() && existing.is_active() => {
                        tracing::debug!(id = %existing.id, "Folder already exists, ignoring");
                    },
                    _ => return Err(err).for_write(repository, path),
                }
            },
            Err(err) => return Err(err).for_write(repository, path),
        }
        Ok(())
    }

    /// Create this folder and every missing ancestor. Existing folders on the
    /// way are fine, whatever the [`MkdirConflict`] policy.
    #[instrument(skip_all, fields(repository = %self.fs.repository(), path = %self.path))]
    pub async fn mkdir_all(&self) -> Result<()> {
        let (repository, path) = (self.fs.repository(), self.path.as_str());
        let api = self.fs.client().await.for_write(repository, path)?;
        let full_path = self.fs.full_path(path);
        let names = segments(&full_path);
        let folder = EntryResolver::new(api.as_ref())
            .ensure_folders(EntryInfo::root(), &names)
            .await
            .for_write(repository, path)?;
        tracing::debug!(id = %folder.id, "Folder chain ready");
        Ok(())
    }

    /// Remove this folder, which must be empty. The repository root cannot
    /// be removed.
    #[instrument(skip_all, fields(repository = %self.fs.repository(), path = %self.path))]
    pub async fn rmdir(&self) -> Result<()> {
        let (repository, path) = (self.fs.repository(), self.path.as_str());
        if self.is_root() {
            exn::bail!(ErrorKind::not_writable(repository, path));
        }
        let info = self.fs.require(&self.fs.full_path(path), path, true).await?;
        if !info.is_folder() {
            exn::bail!(ErrorKind::not_writable(repository, path));
        }
        let api = self.fs.client().await.for_write(repository, path)?;
        api.delete_folder(&info.id, false).await.for_write(repository, path)
    }
}

/// Listing entry for a child of the folder at `parent`.
fn to_item(parent: &str, entry: EntryInfo) -> Option<Item> {
    let entry_type = match entry.item_type {
        ItemType::File => EntryType::File,
        ItemType::Folder => EntryType::Directory,
        ItemType::WebLink => return None,
    };
    Some(Item {
        path: child_path(parent, &entry.name),
        entry_type,
        size: if entry_type == EntryType::File { entry.size } else { None },
        created: entry.created_millis(),
        modified: entry.modified_millis(),
        etag: entry.etag,
    })
}
