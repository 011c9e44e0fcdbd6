//! Box API client.
//!
//! The [`BoxApi`] trait is the seam between the filesystem adapter and the
//! remote provider: one method per remote call the adapter needs. The
//! production implementation is [`BoxHttpClient`]; with the `mock` feature
//! enabled an in-memory `MockBox` is available for tests.

mod api;
pub mod auth;
pub mod error;
mod http;
#[cfg(feature = "mock")]
mod mock;
mod models;

pub use crate::api::{BoxApi, EntryStream};
pub use crate::auth::Auth;
pub use crate::http::{BoxHttpClient, Endpoints};
#[cfg(feature = "mock")]
pub use crate::mock::{Calls, MockBox};
pub use crate::models::{EntryInfo, ItemStatus, ItemType, ParentRef, ROOT_FOLDER_ID, format_timestamp, parse_timestamp};
use std::sync::Arc;

pub type ApiHandle = Arc<dyn BoxApi + Send + Sync>;
