//! Uniform data representation passed in and out of file operations.

use futures::{Stream, TryStreamExt};
use std::fmt::{Debug, Formatter};
use std::io;
use std::pin::Pin;

/// Boxed stream of byte chunks, `'static` so it can outlive the call that
/// opened it.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Vec<u8>>> + Send + 'static>>;

/// File content, either already in memory or still arriving.
pub enum Data {
    Bytes(Vec<u8>),
    Stream(ByteStream),
}

impl Data {
    pub fn empty() -> Self {
        Self::Bytes(Vec::new())
    }

    pub fn from_stream(stream: impl Stream<Item = io::Result<Vec<u8>>> + Send + 'static) -> Self {
        Self::Stream(Box::pin(stream))
    }

    /// Size in bytes, if known without consuming a stream.
    pub fn len_hint(&self) -> Option<usize> {
        match self {
            Self::Bytes(bytes) => Some(bytes.len()),
            Self::Stream(_) => None,
        }
    }

    /// Materialize the content into a single buffer.
    ///
    /// ```
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> std::io::Result<()> {
    /// use boxfs_vfs::Data;
    /// let chunks = futures::stream::iter([Ok(b"he".to_vec()), Ok(b"llo".to_vec())]);
    /// assert_eq!(Data::from_stream(chunks).into_bytes().await?, b"hello");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Stream(stream) => stream.try_concat().await,
        }
    }

    /// Concatenate several pieces of content, in order, into one buffer.
    pub async fn merge(parts: impl IntoIterator<Item = Data>) -> io::Result<Vec<u8>> {
        let mut merged = Vec::new();
        for part in parts {
            merged.extend(part.into_bytes().await?);
        }
        Ok(merged)
    }
}

impl Debug for Data {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Vec<u8>> for Data {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}
impl From<&[u8]> for Data {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}
impl From<String> for Data {
    fn from(text: String) -> Self {
        Self::Bytes(text.into_bytes())
    }
}
impl From<&str> for Data {
    fn from(text: &str) -> Self {
        Self::Bytes(text.as_bytes().to_vec())
    }
}
