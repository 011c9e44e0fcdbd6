//! Mapping of remote and local failures onto the filesystem error kinds.
//!
//! Only three kinds leave the adapter: not found, not readable and not
//! writable. The underlying failure is never discarded; it stays in the error
//! tree as a child of the domain error.

use boxfs_client::error::Error as ClientError;
use boxfs_vfs::error::{Error, ErrorKind, Result};
use derive_more::From;
use std::io::Error as IoError;

/// Anything an adapter operation can fail with before translation.
#[derive(Debug, From)]
pub enum Failure {
    /// Already a filesystem error; passed through untouched.
    Domain(Error),
    /// The remote call failed.
    Remote(ClientError),
    /// Local data conversion failed.
    Io(IoError),
}

/// Translate a failure into a filesystem error for `path`.
///
/// Domain errors pass through. A remote 404 becomes
/// [`NotFound`](ErrorKind::NotFound); anything else becomes
/// [`NotWritable`](ErrorKind::NotWritable) when `write` is set, and
/// [`NotReadable`](ErrorKind::NotReadable) otherwise.
///
/// ```
/// use boxfs_adapter::translate;
/// use boxfs_client::error::ErrorKind as ClientErrorKind;
/// use boxfs_vfs::error::ErrorKind;
///
/// let remote = exn::Exn::from(ClientErrorKind::Status(404));
/// let err = translate("repo", "/missing.txt", remote, true);
/// assert_eq!(*err, ErrorKind::not_found("repo", "/missing.txt"));
/// ```
#[track_caller]
pub fn translate(repository: &str, path: &str, failure: impl Into<Failure>, write: bool) -> Error {
    match failure.into() {
        Failure::Domain(err) => err,
        Failure::Remote(err) => {
            let kind = classify(repository, path, err.is_not_found(), write);
            err.raise(kind)
        },
        Failure::Io(err) => exn::Exn::from(err).raise(classify(repository, path, false, write)),
    }
}

fn classify(repository: &str, path: &str, not_found: bool, write: bool) -> ErrorKind {
    match (not_found, write) {
        (true, _) => ErrorKind::not_found(repository, path),
        (false, true) => ErrorKind::not_writable(repository, path),
        (false, false) => ErrorKind::not_readable(repository, path),
    }
}

/// Translation shorthand for results, in the style of `exn::ResultExt`.
pub(crate) trait TranslateExt<T> {
    /// Translate a failure of a read-class operation.
    fn for_read(self, repository: &str, path: &str) -> Result<T>;
    /// Translate a failure of a write-class operation.
    fn for_write(self, repository: &str, path: &str) -> Result<T>;
}

impl<T, F: Into<Failure>> TranslateExt<T> for std::result::Result<T, F> {
    #[track_caller]
    fn for_read(self, repository: &str, path: &str) -> Result<T> {
        self.map_err(|failure| translate(repository, path, failure, false))
    }

    #[track_caller]
    fn for_write(self, repository: &str, path: &str) -> Result<T> {
        self.map_err(|failure| translate(repository, path, failure, true))
    }
}
