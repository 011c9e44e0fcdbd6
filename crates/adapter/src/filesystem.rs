use crate::directory::BoxDirectory;
use crate::file::BoxFile;
use crate::resolve::{EntryResolver, Lookup};
use crate::translate::TranslateExt;
use async_trait::async_trait;
use boxfs_client::error::{ErrorKind as ClientErrorKind, Result as ClientResult};
use boxfs_client::{ApiHandle, Auth, BoxApi, BoxHttpClient, EntryInfo, Endpoints, ItemType, format_timestamp};
use boxfs_config::{Config, MkdirConflict};
use boxfs_vfs::error::{ErrorKind, Result};
use boxfs_vfs::{
    Capabilities, Data, EntryType, FileSystem, Item, Props, ReadOptions, Stats, UrlOptions, UrlType, WriteOptions,
    join_paths, normalize, segments,
};
use exn::OptionExt;
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::instrument;

/// Where the API client comes from once it is first needed.
enum ClientSource {
    Http { auth: Auth, endpoints: Endpoints },
    Provided(ApiHandle),
}

/// A Box folder exposed as a virtual filesystem.
///
/// Every virtual path is rooted at the repository folder: `/` is
/// `/<repository>` below the account root. The repository folder chain is
/// created on first use.
///
/// # Examples
///
/// ```no_run
/// use boxfs_adapter::BoxFileSystem;
/// use boxfs_vfs::{FileSystem, ReadOptions, WriteOptions};
///
/// # async fn example(config: boxfs_config::Config) -> boxfs_vfs::error::Result<()> {
/// let fs = BoxFileSystem::new(&config)?;
/// fs.write("/notes/today.txt", "remember the milk".into(), &WriteOptions::default()).await?;
/// let content = fs.read_bytes("/notes/today.txt", &ReadOptions::default()).await?;
/// assert_eq!(content, b"remember the milk");
/// # Ok(())
/// # }
/// ```
pub struct BoxFileSystem {
    repository: String,
    source: ClientSource,
    /// Set once, after the repository root has been provisioned.
    client: OnceCell<ApiHandle>,
    mkdir_conflict: MkdirConflict,
}

impl BoxFileSystem {
    /// Talk to Box over HTTP, authenticating as configured.
    ///
    /// Nothing is sent until the first operation. An invalid configuration
    /// is [`NotWritable`](ErrorKind::NotWritable) at the repository root.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate().map_err(|err| err.raise(ErrorKind::not_writable(&config.repository, "/")))?;
        let auth = match &config.auth.app_auth {
            Some(app_auth) => Auth::Enterprise {
                client_id: config.auth.client_id.clone().unwrap_or_default(),
                client_secret: config.auth.client_secret.clone().unwrap_or_default(),
                enterprise_id: app_auth.enterprise_id.clone(),
            },
            None => Auth::DeveloperToken(config.auth.developer_token.clone().unwrap_or_default()),
        };
        let mut endpoints = Endpoints::default();
        if let Some(api_url) = &config.api.api_url {
            endpoints.api_url = api_url.clone();
        }
        if let Some(upload_url) = &config.api.upload_url {
            endpoints.upload_url = upload_url.clone();
        }
        if let Some(token_url) = &config.api.token_url {
            endpoints.token_url = token_url.clone();
        }
        if let Some(timeout_secs) = config.api.timeout_secs {
            endpoints.timeout = Duration::from_secs(timeout_secs);
        }
        if let Some(page_size) = config.api.page_size {
            endpoints.page_size = page_size;
        }
        Ok(Self::build(&config.repository, ClientSource::Http { auth, endpoints })?.with_mkdir_conflict(config.mkdir_conflict))
    }

    /// Use an already built API client (another transport, or a test double).
    ///
    /// The repository must name a folder below the account root.
    pub fn with_client(repository: &str, api: ApiHandle) -> Result<Self> {
        Self::build(repository, ClientSource::Provided(api))
    }

    fn build(repository: &str, source: ClientSource) -> Result<Self> {
        let normalized = segments(repository).join("/");
        if normalized.is_empty() {
            exn::bail!(ErrorKind::not_writable(repository, "/"));
        }
        Ok(Self { repository: normalized, source, client: OnceCell::new(), mkdir_conflict: MkdirConflict::default() })
    }

    pub fn with_mkdir_conflict(mut self, policy: MkdirConflict) -> Self {
        self.mkdir_conflict = policy;
        self
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn mkdir_conflict(&self) -> MkdirConflict {
        self.mkdir_conflict
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities { range_read: true, append: false, range_write: false }
    }

    /// Account-level path of a virtual path.
    ///
    /// ```
    /// # use boxfs_adapter::BoxFileSystem;
    /// # use boxfs_client::MockBox;
    /// # use std::sync::Arc;
    /// let fs = BoxFileSystem::with_client("backups", Arc::new(MockBox::new())).unwrap();
    /// assert_eq!(fs.full_path("/"), "/backups");
    /// assert_eq!(fs.full_path("a/../b.txt"), "/backups/b.txt");
    /// ```
    pub fn full_path(&self, path: &str) -> String {
        if path.is_empty() || path == "/" {
            return format!("/{}", self.repository);
        }
        join_paths(&self.repository, path)
    }

    /// Virtual path of an account-level path; the inverse of [`full_path()`](Self::full_path).
    ///
    /// Paths outside the repository are returned normalized but otherwise untouched.
    pub fn strip_root(&self, full_path: &str) -> String {
        let normalized = normalize(full_path);
        let root = format!("/{}", self.repository);
        match normalized.strip_prefix(&root) {
            Some("") => "/".to_string(),
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            _ => normalized,
        }
    }

    pub fn file(&self, path: &str) -> BoxFile<'_> {
        BoxFile::new(self, path)
    }

    pub fn directory(&self, path: &str) -> BoxDirectory<'_> {
        BoxDirectory::new(self, path)
    }

    /// The shared API client, built and provisioned on first use.
    ///
    /// A failed initialization is not remembered: the next call tries again.
    pub(crate) async fn client(&self) -> ClientResult<&ApiHandle> {
        self.client.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> ClientResult<ApiHandle> {
        let api: ApiHandle = match &self.source {
            ClientSource::Http { auth, endpoints } => Arc::new(BoxHttpClient::connect(auth, endpoints.clone()).await?),
            ClientSource::Provided(api) => api.clone(),
        };
        self.ensure_root(api.as_ref()).await?;
        Ok(api)
    }

    /// One-time creation of the repository folder chain. Concurrent first
    /// use may race on creation; "already exists" is not an error.
    #[instrument(skip_all, fields(repository = %self.repository))]
    async fn ensure_root(&self, api: &dyn BoxApi) -> ClientResult<()> {
        let names = segments(&self.repository);
        let root = EntryResolver::new(api).ensure_folders(EntryInfo::root(), &names).await?;
        tracing::info!(id = %root.id, "Repository root ready");
        Ok(())
    }

    /// Resolve an account-level path without translating failures.
    pub(crate) async fn lookup(&self, full_path: &str) -> ClientResult<Option<EntryInfo>> {
        let api = self.client().await?;
        EntryResolver::new(api.as_ref()).resolve(full_path).await
    }

    /// Resolve an account-level path on behalf of the virtual `path`; absence
    /// is [`NotFound`](ErrorKind::NotFound).
    pub(crate) async fn require(&self, full_path: &str, path: &str, write: bool) -> Result<EntryInfo> {
        match Lookup::from(self.lookup(full_path).await) {
            Lookup::Found(info) => Ok(info),
            Lookup::Missing => exn::bail!(ErrorKind::not_found(&self.repository, path)),
            Lookup::Failed(err) if write => Err(err).for_write(&self.repository, path),
            Lookup::Failed(err) => Err(err).for_read(&self.repository, path),
        }
    }

    /// Remote entry behind a virtual path, if any.
    pub async fn resolve(&self, path: &str) -> Result<Option<EntryInfo>> {
        self.lookup(&self.full_path(path)).await.for_read(&self.repository, path)
    }

    /// Remote entry behind a virtual path, which must exist.
    pub async fn resolve_required(&self, path: &str) -> Result<EntryInfo> {
        self.require(&self.full_path(path), path, false).await
    }

    /// Entry metadata. Trashed and deleted entries count as missing.
    #[instrument(skip(self), fields(repository = %self.repository))]
    pub async fn stat(&self, path: &str) -> Result<Stats> {
        let info = self.resolve_required(path).await?;
        if !info.is_active() {
            exn::bail!(ErrorKind::not_found(&self.repository, path));
        }
        let entry_type = if info.is_file() { EntryType::File } else { EntryType::Directory };
        Ok(Stats {
            entry_type,
            size: if info.is_file() { info.size } else { None },
            created: info.created_millis(),
            modified: info.modified_millis(),
            etag: info.etag,
            id: Some(info.id),
            name: info.name,
        })
    }

    /// Update entry metadata. `created`/`modified` become Box's
    /// `created_at`/`modified_at`; other properties are sent as-is, except
    /// `fields`, which Box would read as a field selector.
    #[instrument(skip(self, props), fields(repository = %self.repository))]
    pub async fn update(&self, path: &str, props: Props) -> Result<()> {
        let info = self.require(&self.full_path(path), path, true).await?;
        let mut fields = props.extra;
        fields.remove("fields");
        for (key, millis) in [("created_at", props.created), ("modified_at", props.modified)] {
            if let Some(millis) = millis {
                let timestamp =
                    format_timestamp(millis).ok_or_raise(|| ErrorKind::not_writable(&self.repository, path))?;
                fields.insert(key.to_string(), Value::String(timestamp));
            }
        }
        let api = self.client().await.for_write(&self.repository, path)?;
        let updated = match info.item_type {
            ItemType::File => api.update_file(&info.id, fields).await,
            ItemType::Folder => api.update_folder(&info.id, fields).await,
            ItemType::WebLink => exn::bail!(ErrorKind::not_writable(&self.repository, path)),
        };
        let updated = updated.for_write(&self.repository, path)?;
        tracing::debug!(id = %updated.id, "Updated metadata");
        Ok(())
    }

    /// Direct download URL of a file. Only GET URLs exist.
    #[instrument(skip(self), fields(repository = %self.repository))]
    pub async fn url(&self, path: &str, options: &UrlOptions) -> Result<String> {
        if options.url_type != UrlType::Get {
            let unsupported = ClientErrorKind::InvalidRequest(format!("{} URLs are not supported", options.url_type));
            return Err(exn::Exn::from(unsupported)).for_read(&self.repository, path);
        }
        let info = self.resolve_required(path).await?;
        if !info.is_file() {
            exn::bail!(ErrorKind::not_readable(&self.repository, path));
        }
        let api = self.client().await.for_read(&self.repository, path)?;
        api.download_url(&info.id).await.for_read(&self.repository, path)
    }
}

impl Debug for BoxFileSystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxFileSystem")
            .field("repository", &self.repository)
            .field("connected", &self.client.initialized())
            .field("mkdir_conflict", &self.mkdir_conflict)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FileSystem for BoxFileSystem {
    fn repository(&self) -> &str {
        &self.repository
    }

    fn capabilities(&self) -> Capabilities {
        BoxFileSystem::capabilities(self)
    }

    async fn list(&self, path: &str) -> Result<Vec<Item>> {
        self.directory(path).list().await
    }

    async fn mkdir(&self, path: &str) -> Result<()> {
        self.directory(path).mkdir().await
    }

    async fn rmdir(&self, path: &str) -> Result<()> {
        self.directory(path).rmdir().await
    }

    async fn read(&self, path: &str, options: &ReadOptions) -> Result<Data> {
        self.file(path).read(options).await
    }

    async fn write(&self, path: &str, data: Data, options: &WriteOptions) -> Result<()> {
        self.file(path).write(data, options).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.file(path).delete().await
    }

    async fn head(&self, path: &str) -> Result<Stats> {
        self.stat(path).await
    }

    async fn patch(&self, path: &str, props: Props) -> Result<()> {
        self.update(path, props).await
    }

    async fn to_url(&self, path: &str, options: &UrlOptions) -> Result<String> {
        self.url(path, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{repo, setup};
    use boxfs_client::{Calls, ItemStatus, MockBox, ROOT_FOLDER_ID};
    use boxfs_vfs::FileSystemHandle;
    use rstest::rstest;

    #[rstest]
    #[case("/", "/repo")]
    #[case("", "/repo")]
    #[case("/a", "/repo/a")]
    #[case("a/b/", "/repo/a/b")]
    #[case("/a/./b/../c.txt", "/repo/a/c.txt")]
    #[case("/../../outside", "/repo/outside")]
    fn test_full_path(#[case] path: &str, #[case] expected: &str) {
        let fs = BoxFileSystem::with_client("repo", Arc::new(MockBox::new())).unwrap();
        assert_eq!(fs.full_path(path), expected);
    }

    #[rstest]
    #[case("/")]
    #[case("/a")]
    #[case("/a/b/c.txt")]
    #[case("/repo")]
    #[case("x/../y")]
    fn test_strip_root_inverts_full_path(#[case] path: &str) {
        let fs = BoxFileSystem::with_client("repo", Arc::new(MockBox::new())).unwrap();
        let full = fs.full_path(path);
        assert_eq!(fs.full_path(&fs.strip_root(&full)), full);
    }

    #[test]
    fn test_strip_root_outside_repository() {
        let fs = BoxFileSystem::with_client("repo", Arc::new(MockBox::new())).unwrap();
        assert_eq!(fs.strip_root("/repository/x"), "/repository/x");
        assert_eq!(fs.strip_root("/repo"), "/");
    }

    #[test]
    fn test_nested_repository_is_normalized() {
        let fs = BoxFileSystem::with_client("/team//photos/", Arc::new(MockBox::new())).unwrap();
        assert_eq!(fs.repository(), "team/photos");
        assert_eq!(fs.full_path("/2024"), "/team/photos/2024");
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("//")]
    #[case("a/..")]
    #[case("./.")]
    fn test_repository_must_name_a_folder(#[case] repository: &str) {
        let err = BoxFileSystem::with_client(repository, Arc::new(MockBox::new())).unwrap_err();
        assert_eq!(*err, ErrorKind::not_writable(repository, "/"));
    }

    #[tokio::test]
    async fn test_empty_repository_touches_nothing() {
        let mock = Arc::new(MockBox::new());
        assert!(BoxFileSystem::with_client("", mock.clone()).is_err());
        assert_eq!(mock.calls().await, Calls::default());
        assert!(mock.list_items(ROOT_FOLDER_ID).await.unwrap().is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = BoxFileSystem::new(&Config::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::not_writable("", "/"));
        let mut config = Config::default();
        config.repository = "docs".to_string();
        // No developer token and no app auth.
        let err = BoxFileSystem::new(&config).unwrap_err();
        assert_eq!(*err, ErrorKind::not_writable("docs", "/"));
    }

    #[test]
    fn test_new_from_config() {
        let mut config = Config::default();
        config.repository = "docs".to_string();
        config.auth.developer_token = Some("token".to_string());
        config.mkdir_conflict = MkdirConflict::Fail;
        let fs = BoxFileSystem::new(&config).unwrap();
        assert_eq!(fs.repository(), "docs");
        assert_eq!(fs.mkdir_conflict(), MkdirConflict::Fail);
        assert!(matches!(&fs.source, ClientSource::Http { auth, .. } if auth.is_basic()));
    }

    #[test]
    fn test_capabilities() {
        let fs = BoxFileSystem::with_client("repo", Arc::new(MockBox::new())).unwrap();
        let capabilities = FileSystem::capabilities(&fs);
        assert!(capabilities.range_read);
        assert!(!capabilities.append);
        assert!(!capabilities.range_write);
    }

    #[tokio::test]
    async fn test_root_provisioned_once() {
        let (mock, fs) = setup().await;
        assert_eq!(mock.calls().await.create_folder, 1);
        assert!(mock.find(ROOT_FOLDER_ID, "repo").await.unwrap().is_folder());
        fs.list("/").await.unwrap();
        fs.mkdir("/a").await.unwrap();
        // Only the explicit mkdir; provisioning did not run again.
        assert_eq!(mock.calls().await.create_folder, 2);
    }

    #[tokio::test]
    async fn test_existing_root_is_reused() {
        let mock = Arc::new(MockBox::new());
        let existing = mock.insert_folder(ROOT_FOLDER_ID, "repo").await;
        let fs = BoxFileSystem::with_client("repo", mock.clone()).unwrap();
        assert_eq!(fs.resolve_required("/").await.unwrap().id, existing);
        assert_eq!(mock.calls().await.create_folder, 0);
    }

    #[tokio::test]
    async fn test_nested_root_chain() {
        let mock = Arc::new(MockBox::new());
        let fs = BoxFileSystem::with_client("team/photos", mock.clone()).unwrap();
        fs.write("/pic.jpg", b"jpeg".to_vec().into(), &WriteOptions::default()).await.unwrap();
        let team = mock.find(ROOT_FOLDER_ID, "team").await.unwrap();
        let photos = mock.find(&team.id, "photos").await.unwrap();
        assert!(mock.find(&photos.id, "pic.jpg").await.is_some());
    }

    #[tokio::test]
    async fn test_failed_initialization_is_retried() {
        let mock = Arc::new(MockBox::new());
        let fs = BoxFileSystem::with_client("repo", mock.clone()).unwrap();
        mock.fail_next(503).await;
        let err = fs.list("/").await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_readable("repo", "/"));
        assert!(fs.list("/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve() {
        let (mock, fs) = setup().await;
        mock.insert_file(&repo(&mock).await, "a.txt", "x").await;
        assert!(fs.resolve("/a.txt").await.unwrap().unwrap().is_file());
        assert!(fs.resolve("/b.txt").await.unwrap().is_none());
        let err = fs.resolve_required("/b.txt").await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_found("repo", "/b.txt"));
    }

    #[tokio::test]
    async fn test_head_file_and_folder() {
        let (mock, fs) = setup().await;
        let root = repo(&mock).await;
        let folder = mock.insert_folder(&root, "dir").await;
        mock.insert_file(&folder, "f.txt", "12345").await;
        mock.set_timestamps(&folder, Some("2024-01-02T03:04:05Z"), Some("garbage")).await;

        let stats = fs.head("/dir/f.txt").await.unwrap();
        assert_eq!(stats.entry_type, EntryType::File);
        assert_eq!(stats.size, Some(5));
        assert_eq!(stats.name, "f.txt");
        assert!(stats.id.is_some());

        let stats = fs.head("/dir").await.unwrap();
        assert_eq!(stats.entry_type, EntryType::Directory);
        assert_eq!(stats.size, None);
        assert_eq!(stats.created, Some(1_704_164_645_000));
        assert_eq!(stats.modified, None);
        assert_eq!(stats.id.as_deref(), Some(folder.as_str()));
    }

    #[rstest]
    #[case(ItemStatus::Trashed)]
    #[case(ItemStatus::Deleted)]
    #[tokio::test]
    async fn test_head_inactive_is_not_found(#[case] status: ItemStatus) {
        let (mock, fs) = setup().await;
        let id = mock.insert_file(&repo(&mock).await, "gone.txt", "x").await;
        mock.set_status(&id, status).await;
        let err = fs.head("/gone.txt").await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_found("repo", "/gone.txt"));
        assert!(!fs.exists("/gone.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_head_remote_failure_is_not_readable() {
        let (mock, fs) = setup().await;
        mock.fail_next(500).await;
        let err = fs.head("/x").await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_readable("repo", "/x"));
        assert!(fs.exists("/x").await.is_ok());
    }

    #[tokio::test]
    async fn test_patch_translates_fields() {
        let (mock, fs) = setup().await;
        let id = mock.insert_file(&repo(&mock).await, "f.txt", "x").await;
        let props = Props::default()
            .with_created(1_000)
            .with_modified(1_704_164_645_000)
            .with("description", "hello")
            .with("fields", "name");
        fs.patch("/f.txt", props).await.unwrap();
        let info = mock.get(&id).await.unwrap();
        assert_eq!(info.created_at.as_deref(), Some("1970-01-01T00:00:01Z"));
        assert_eq!(info.modified_at.as_deref(), Some("2024-01-02T03:04:05Z"));
        assert_eq!(info.description.as_deref(), Some("hello"));
        let calls = mock.calls().await;
        assert_eq!((calls.update_file, calls.update_folder), (1, 0));
    }

    #[tokio::test]
    async fn test_patch_folder_uses_folder_endpoint() {
        let (mock, fs) = setup().await;
        let id = mock.insert_folder(&repo(&mock).await, "dir").await;
        fs.patch("/dir", Props::default().with_modified(0)).await.unwrap();
        assert_eq!(mock.get(&id).await.unwrap().modified_at.as_deref(), Some("1970-01-01T00:00:00Z"));
        let calls = mock.calls().await;
        assert_eq!((calls.update_file, calls.update_folder), (0, 1));
    }

    #[tokio::test]
    async fn test_patch_missing() {
        let (_mock, fs) = setup().await;
        let err = fs.patch("/nope", Props::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_found("repo", "/nope"));
    }

    #[tokio::test]
    async fn test_patch_failure_is_not_writable() {
        let (mock, fs) = setup().await;
        mock.insert_file(&repo(&mock).await, "f.txt", "x").await;
        mock.fail_next(403).await;
        let err = fs.patch("/f.txt", Props::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_writable("repo", "/f.txt"));
    }

    #[tokio::test]
    async fn test_to_url() {
        let (mock, fs) = setup().await;
        let id = mock.insert_file(&repo(&mock).await, "f.txt", "x").await;
        let url = fs.to_url("/f.txt", &UrlOptions::default()).await.unwrap();
        assert_eq!(url, mock.download_url(&id).await.unwrap());
    }

    #[rstest]
    #[case(UrlType::Post)]
    #[case(UrlType::Put)]
    #[case(UrlType::Delete)]
    #[tokio::test]
    async fn test_to_url_rejects_other_types(#[case] url_type: UrlType) {
        let (mock, fs) = setup().await;
        mock.insert_file(&repo(&mock).await, "f.txt", "x").await;
        mock.reset_calls().await;
        let err = fs.to_url("/f.txt", &UrlOptions { url_type }).await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_readable("repo", "/f.txt"));
        assert_eq!(mock.calls().await, Calls::default());
    }

    #[tokio::test]
    async fn test_to_url_of_folder() {
        let (mock, fs) = setup().await;
        mock.insert_folder(&repo(&mock).await, "dir").await;
        let err = fs.to_url("/dir", &UrlOptions::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_readable("repo", "/dir"));
    }

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let (_mock, fs) = setup().await;
        let handle: FileSystemHandle = Arc::new(fs);
        handle.write("/t.txt", "trait".into(), &WriteOptions::default()).await.unwrap();
        assert_eq!(handle.read_bytes("/t.txt", &ReadOptions::default()).await.unwrap(), b"trait");
        assert_eq!(handle.repository(), "repo");
    }

    /// mkdir /a, mkdir /a/b, write, list, overwrite, read.
    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let (mock, fs) = setup().await;
        fs.mkdir("/a").await.unwrap();
        fs.mkdir("/a/b").await.unwrap();
        fs.write("/a/b/c.txt", "hello".into(), &WriteOptions::default()).await.unwrap();

        let items = fs.list("/a/b").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, "/a/b/c.txt");
        assert_eq!(items[0].name(), "c.txt");
        assert_eq!(items[0].entry_type, EntryType::File);
        assert_eq!(items[0].size, Some(5));

        fs.write("/a/b/c.txt", "world".into(), &WriteOptions::default()).await.unwrap();
        assert_eq!(fs.read_bytes("/a/b/c.txt", &ReadOptions::default()).await.unwrap(), b"world");

        let id = fs.resolve_required("/a/b/c.txt").await.unwrap().id;
        assert_eq!(mock.version_count(&id).await, 2);
        let listed = mock.list_items(&fs.resolve_required("/a/b").await.unwrap().id).await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
