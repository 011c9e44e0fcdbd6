use crate::filesystem::BoxFileSystem;
use crate::resolve::Lookup;
use crate::translate::{TranslateExt, translate};
use boxfs_client::BoxApi;
use boxfs_vfs::error::{ErrorKind, Result};
use boxfs_vfs::{Data, ReadOptions, WriteOptions, get_name, get_parent, normalize};
use tracing::instrument;

/// A file inside a [`BoxFileSystem`].
#[derive(Debug)]
pub struct BoxFile<'a> {
    fs: &'a BoxFileSystem,
    path: String,
}

impl<'a> BoxFile<'a> {
    pub(crate) fn new(fs: &'a BoxFileSystem, path: &str) -> Self {
        Self { fs, path: normalize(path) }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Content of the latest version, optionally limited to a byte range.
    ///
    /// Empty files and empty ranges are answered without opening a stream.
    #[instrument(skip_all, fields(repository = %self.fs.repository(), path = %self.path))]
    pub async fn read(&self, options: &ReadOptions) -> Result<Data> {
        let (repository, path) = (self.fs.repository(), self.path.as_str());
        let info = self.fs.require(&self.fs.full_path(path), path, false).await?;
        if !info.is_file() {
            exn::bail!(ErrorKind::not_readable(repository, path));
        }
        if info.size == Some(0) || options.range.is_some_and(|range| range.is_empty()) {
            tracing::debug!(id = %info.id, "Nothing to read, skipping download");
            return Ok(Data::empty());
        }
        let api = self.fs.client().await.for_read(repository, path)?;
        let stream = api.read_stream(&info.id, options.range).await.for_read(repository, path)?;
        Ok(Data::Stream(stream))
    }

    /// Create the file, or upload a new version of it.
    ///
    /// The payload is buffered before anything is sent. With
    /// [`WriteOptions::append`] the current content is downloaded and
    /// prepended.
    #[instrument(skip_all, fields(repository = %self.fs.repository(), path = %self.path, append = options.append))]
    pub async fn write(&self, data: Data, options: &WriteOptions) -> Result<()> {
        let (repository, path) = (self.fs.repository(), self.path.as_str());
        let buffer = data.into_bytes().await.for_write(repository, path)?;
        let api = self.fs.client().await.for_write(repository, path)?;
        let full_path = self.fs.full_path(path);

        match Lookup::from(self.fs.lookup(&full_path).await) {
            Lookup::Found(info) if !info.is_file() => exn::bail!(ErrorKind::not_writable(repository, path)),
            Lookup::Found(info) => {
                let content = if options.append && info.size != Some(0) {
                    let current = api.read_stream(&info.id, None).await.for_write(repository, path)?;
                    Data::merge([Data::Stream(current), Data::Bytes(buffer)]).await.for_write(repository, path)?
                } else {
                    buffer
                };
                let uploaded = api.upload_new_version(&info.id, content).await.for_write(repository, path)?;
                tracing::debug!(id = %uploaded.id, size = ?uploaded.size, "Uploaded new version");
            },
            Lookup::Missing => {
                let parent = self.fs.require(&get_parent(&full_path), path, true).await?;
                if !parent.is_folder() {
                    exn::bail!(ErrorKind::not_writable(repository, path));
                }
                let name = get_name(&full_path);
                let uploaded = api.upload_file(&parent.id, &name, buffer).await.for_write(repository, path)?;
                tracing::debug!(id = %uploaded.id, parent = %parent.id, "Uploaded new file");
            },
            Lookup::Failed(err) => return Err(translate(repository, path, err, true)),
        }
        Ok(())
    }

    #[instrument(skip_all, fields(repository = %self.fs.repository(), path = %self.path))]
    pub async fn delete(&self) -> Result<()> {
        let (repository, path) = (self.fs.repository(), self.path.as_str());
        let info = self.fs.require(&self.fs.full_path(path), path, true).await?;
        if !info.is_file() {
            exn::bail!(ErrorKind::not_writable(repository, path));
        }
        let api = self.fs.client().await.for_write(repository, path)?;
        api.delete_file(&info.id).await.for_write(repository, path)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{repo, setup};
    use boxfs_vfs::error::ErrorKind;
    use boxfs_vfs::{Data, FileSystem, ReadOptions, WriteOptions};
    use rstest::rstest;

    #[tokio::test]
    async fn test_write_creates_file_under_parent() {
        let (mock, fs) = setup().await;
        let dir = mock.insert_folder(&repo(&mock).await, "dir").await;
        fs.write("/dir/new.bin", vec![0u8, 1, 2, 255].into(), &WriteOptions::default()).await.unwrap();
        let created = mock.find(&dir, "new.bin").await.unwrap();
        assert_eq!(mock.content(&created.id).await.unwrap(), vec![0u8, 1, 2, 255]);
        assert_eq!(mock.version_count(&created.id).await, 1);
    }

    #[tokio::test]
    async fn test_write_stream_payload() {
        let (mock, fs) = setup().await;
        let chunks = futures::stream::iter([Ok(b"str".to_vec()), Ok(b"eam".to_vec())]);
        fs.write("/s.txt", Data::from_stream(chunks), &WriteOptions::default()).await.unwrap();
        let id = mock.find(&repo(&mock).await, "s.txt").await.unwrap().id;
        assert_eq!(mock.content(&id).await.unwrap(), b"stream");
    }

    #[tokio::test]
    async fn test_overwrite_adds_one_version() {
        let (mock, fs) = setup().await;
        let id = mock.insert_file(&repo(&mock).await, "f.txt", "one").await;
        mock.reset_calls().await;
        fs.write("/f.txt", "two".into(), &WriteOptions::default()).await.unwrap();
        assert_eq!(mock.version_count(&id).await, 2);
        let calls = mock.calls().await;
        assert_eq!((calls.upload_new_version, calls.upload_file, calls.read_stream), (1, 0, 0));
        assert_eq!(fs.read_bytes("/f.txt", &ReadOptions::default()).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_append() {
        let (mock, fs) = setup().await;
        let id = mock.insert_file(&repo(&mock).await, "log.txt", "line 1\n").await;
        fs.write("/log.txt", "line 2\n".into(), &WriteOptions::append()).await.unwrap();
        assert_eq!(mock.content(&id).await.unwrap(), b"line 1\nline 2\n");
        assert_eq!(mock.version_count(&id).await, 2);
    }

    #[tokio::test]
    async fn test_append_to_empty_file_skips_download() {
        let (mock, fs) = setup().await;
        let id = mock.insert_file(&repo(&mock).await, "empty.txt", "").await;
        mock.reset_calls().await;
        fs.write("/empty.txt", "first".into(), &WriteOptions::append()).await.unwrap();
        assert_eq!(mock.content(&id).await.unwrap(), b"first");
        assert_eq!(mock.calls().await.read_stream, 0);
    }

    #[tokio::test]
    async fn test_append_to_missing_file_creates_it() {
        let (mock, fs) = setup().await;
        fs.write("/fresh.txt", "data".into(), &WriteOptions::append()).await.unwrap();
        let id = mock.find(&repo(&mock).await, "fresh.txt").await.unwrap().id;
        assert_eq!(mock.content(&id).await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_write_missing_parent() {
        let (mock, fs) = setup().await;
        let err = fs.write("/no/such/dir.txt", "x".into(), &WriteOptions::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_found("repo", "/no/such/dir.txt"));
        assert_eq!(mock.calls().await.upload_file, 0);
    }

    #[tokio::test]
    async fn test_write_over_folder_is_refused() {
        let (mock, fs) = setup().await;
        mock.insert_folder(&repo(&mock).await, "dir").await;
        let err = fs.write("/dir", "x".into(), &WriteOptions::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_writable("repo", "/dir"));
        let calls = mock.calls().await;
        assert_eq!((calls.upload_file, calls.upload_new_version), (0, 0));
    }

    #[tokio::test]
    async fn test_write_below_file_is_refused() {
        let (mock, fs) = setup().await;
        mock.insert_file(&repo(&mock).await, "plain", "x").await;
        let err = fs.write("/plain/child.txt", "x".into(), &WriteOptions::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_writable("repo", "/plain/child.txt"));
        assert_eq!(mock.calls().await.upload_file, 0);
    }

    #[tokio::test]
    async fn test_create_losing_race_is_not_writable() {
        let (mock, fs) = setup().await;
        mock.reset_calls().await;
        // Two listings find the file missing, one finds its parent; the upload then conflicts.
        mock.fail_after(3, 409).await;
        let err = fs.write("/lost.txt", "x".into(), &WriteOptions::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_writable("repo", "/lost.txt"));
        let calls = mock.calls().await;
        assert_eq!(calls.list_items, 3);
        assert_eq!((calls.upload_file, calls.upload_new_version), (1, 0));
        assert!(mock.find(&repo(&mock).await, "lost.txt").await.is_none());
    }

    #[tokio::test]
    async fn test_existence_check_failure_is_fatal() {
        let (mock, fs) = setup().await;
        mock.fail_next(500).await;
        let err = fs.write("/f.txt", "x".into(), &WriteOptions::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_writable("repo", "/f.txt"));
        // No fallback to creating the file.
        assert_eq!(mock.calls().await.upload_file, 0);
    }

    #[tokio::test]
    async fn test_read_latest() {
        let (mock, fs) = setup().await;
        mock.insert_file(&repo(&mock).await, "f.txt", "content").await;
        let data = fs.read("/f.txt", &ReadOptions::default()).await.unwrap();
        assert!(matches!(data, Data::Stream(_)));
        assert_eq!(data.into_bytes().await.unwrap(), b"content");
    }

    #[rstest]
    #[case(0, Some(4), b"0123".as_slice())]
    #[case(6, None, b"6789".as_slice())]
    #[case(3, Some(2), b"34".as_slice())]
    #[tokio::test]
    async fn test_read_range(#[case] start: u64, #[case] length: Option<u64>, #[case] expected: &[u8]) {
        let (mock, fs) = setup().await;
        mock.insert_file(&repo(&mock).await, "digits", "0123456789").await;
        let content = fs.read_bytes("/digits", &ReadOptions::range(start, length)).await.unwrap();
        assert_eq!(content, expected);
    }

    #[tokio::test]
    async fn test_read_empty_file_opens_no_stream() {
        let (mock, fs) = setup().await;
        mock.insert_file(&repo(&mock).await, "empty", "").await;
        let content = fs.read_bytes("/empty", &ReadOptions::default()).await.unwrap();
        assert!(content.is_empty());
        assert_eq!(mock.calls().await.read_stream, 0);
    }

    #[tokio::test]
    async fn test_read_empty_range_opens_no_stream() {
        let (mock, fs) = setup().await;
        mock.insert_file(&repo(&mock).await, "f", "abc").await;
        let content = fs.read_bytes("/f", &ReadOptions::range(1, Some(0))).await.unwrap();
        assert!(content.is_empty());
        assert_eq!(mock.calls().await.read_stream, 0);
    }

    #[tokio::test]
    async fn test_read_errors() {
        let (mock, fs) = setup().await;
        mock.insert_folder(&repo(&mock).await, "dir").await;
        let err = fs.read("/missing", &ReadOptions::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_found("repo", "/missing"));
        let err = fs.read("/dir", &ReadOptions::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_readable("repo", "/dir"));
    }

    #[tokio::test]
    async fn test_delete() {
        let (mock, fs) = setup().await;
        let id = mock.insert_file(&repo(&mock).await, "f.txt", "x").await;
        fs.delete("/f.txt").await.unwrap();
        assert!(mock.get(&id).await.is_none());
        let err = fs.delete("/f.txt").await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_found("repo", "/f.txt"));
    }

    #[tokio::test]
    async fn test_delete_folder_is_refused() {
        let (mock, fs) = setup().await;
        mock.insert_folder(&repo(&mock).await, "dir").await;
        let err = fs.delete("/dir").await.unwrap_err();
        assert_eq!(*err, ErrorKind::not_writable("repo", "/dir"));
        assert_eq!(mock.calls().await.delete_folder, 0);
    }

    #[test]
    fn test_path_is_normalized() {
        let mock = std::sync::Arc::new(boxfs_client::MockBox::new());
        let fs = crate::BoxFileSystem::with_client("repo", mock).unwrap();
        assert_eq!(fs.file("a//b/./c.txt").path(), "/a/b/c.txt");
    }
}
