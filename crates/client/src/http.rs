//! HTTP implementation of [`BoxApi`] against the Box REST API (v2.0).
//!
//! # Credentials
//!
//! An access token is obtained once, in [`BoxHttpClient::connect`], using the
//! configured [`Auth`] mode, and attached as a bearer token to every request.

use crate::api::{BoxApi, EntryStream};
use crate::auth::Auth;
use crate::error::{ErrorKind, Result};
use crate::models::{EntryInfo, ItemCollection};
use async_stream::stream;
use async_trait::async_trait;
use boxfs_vfs::{ByteRange, ByteStream};
use exn::{OptionExt, ResultExt};
use futures::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, header, redirect};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::fmt::{Debug, Formatter};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.box.com/2.0";
pub const DEFAULT_UPLOAD_URL: &str = "https://upload.box.com/api/2.0";
pub const DEFAULT_TOKEN_URL: &str = "https://api.box.com/oauth2/token";
/// Largest page the folder items endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Fields requested for every item, so listings carry everything the
/// adapter maps (the "mini" representation lacks sizes and dates).
const ITEM_FIELDS: &str =
    "type,id,etag,name,size,created_at,modified_at,trashed_at,purged_at,description,item_status,parent";

/// Where to reach the API, and how patiently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_url: String,
    pub upload_url: String,
    pub token_url: String,
    /// Per-request timeout, applied by the transport.
    pub timeout: Duration,
    /// Folder items fetched per list request.
    pub page_size: u32,
}
impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Authenticated Box API client.
///
/// # Examples
///
/// ```no_run
/// use boxfs_client::{Auth, BoxApi, BoxHttpClient, Endpoints};
///
/// # async fn example() -> boxfs_client::error::Result<()> {
/// let auth = Auth::DeveloperToken("developer-token".to_string());
/// let client = BoxHttpClient::connect(&auth, Endpoints::default()).await?;
/// for entry in client.list_items("0").await? {
///     println!("{} ({:?})", entry.name, entry.item_type);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BoxHttpClient {
    http: reqwest::Client,
    /// Same settings as `http`, but redirects are handed back to us so the
    /// download URL can be read from the `Location` header.
    no_redirect: reqwest::Client,
    endpoints: Endpoints,
    token: String,
}

impl BoxHttpClient {
    /// Build the transport and authenticate.
    pub async fn connect(auth: &Auth, endpoints: Endpoints) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(endpoints.timeout).build().or_raise(|| ErrorKind::Transport)?;
        let no_redirect = reqwest::Client::builder()
            .timeout(endpoints.timeout)
            .redirect(redirect::Policy::none())
            .build()
            .or_raise(|| ErrorKind::Transport)?;
        let token = auth.access_token(&endpoints.token_url).await?;
        tracing::debug!(basic = auth.is_basic(), api = %endpoints.api_url, "Box client authenticated");
        Ok(Self { http, no_redirect, endpoints, token })
    }

    fn api(&self, path: &str) -> String {
        format!("{}/{}", self.endpoints.api_url.trim_end_matches('/'), path)
    }

    fn upload(&self, path: &str) -> String {
        format!("{}/{}", self.endpoints.upload_url.trim_end_matches('/'), path)
    }

    /// Send an authenticated request, turning non-success statuses into
    /// [`ErrorKind::Status`].
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.bearer_auth(&self.token).send().await.or_raise(|| ErrorKind::Transport)?;
        check_status(response).await
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.send(request).await?.json().await.or_raise(|| ErrorKind::Decode)
    }

    /// Uploads answer with a collection holding the single uploaded file.
    async fn uploaded(&self, request: RequestBuilder) -> Result<EntryInfo> {
        let collection: ItemCollection = self.json(request).await?;
        collection.entries.into_iter().next().ok_or_raise(|| ErrorKind::Decode)
    }

    async fn page(&self, folder_id: &str, offset: u64) -> Result<ItemCollection> {
        let request = self.http.get(self.api(&format!("folders/{folder_id}/items"))).query(&[
            ("fields", ITEM_FIELDS.to_string()),
            ("limit", self.endpoints.page_size.to_string()),
            ("offset", offset.to_string()),
        ]);
        self.json(request).await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    // The body usually explains the status (e.g. "item_name_in_use"); log it, don't keep it.
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), url = %url, body = %body, "Box API request failed");
    exn::bail!(ErrorKind::Status(status.as_u16()))
}

/// `Range` header value for a byte range.
pub(crate) fn range_header(range: ByteRange) -> String {
    match range.end_inclusive() {
        Some(end) => format!("bytes={}-{}", range.start, end),
        None => format!("bytes={}-", range.start),
    }
}

// Never print the token.
impl Debug for BoxHttpClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxHttpClient").field("endpoints", &self.endpoints).finish_non_exhaustive()
    }
}

/// Offset of the page following `fetched` entries read at `offset`, if there
/// is one.
fn next_offset(offset: u64, fetched: u64, total_count: Option<u64>) -> Option<u64> {
    let next = offset + fetched;
    // Without a total count, a single page is all there is.
    let total = total_count.unwrap_or(next);
    (fetched > 0 && next < total).then_some(next)
}

fn file_part(content: Vec<u8>, name: &str) -> Part {
    Part::bytes(content).file_name(name.to_string())
}

#[async_trait]
impl BoxApi for BoxHttpClient {
    fn list_items_stream<'a>(&'a self, folder_id: &'a str) -> EntryStream<'a> {
        Box::pin(stream! {
            let mut offset: u64 = 0;
            loop {
                let page = match self.page(folder_id, offset).await {
                    Ok(page) => page,
                    Err(e) => { yield Err(e); break; },
                };
                let next = next_offset(offset, page.entries.len() as u64, page.total_count);
                for entry in page.entries {
                    yield Ok(entry);
                }
                match next {
                    Some(next) => offset = next,
                    None => break,
                }
            }
        })
    }

    async fn read_stream(&self, file_id: &str, range: Option<ByteRange>) -> Result<ByteStream> {
        let mut request = self.http.get(self.api(&format!("files/{file_id}/content")));
        if let Some(range) = range {
            request = request.header(header::RANGE, range_header(range));
        }
        let response = self.send(request).await?;
        let stream = response.bytes_stream().map_ok(|chunk| chunk.to_vec()).map_err(std::io::Error::other);
        Ok(Box::pin(stream))
    }

    async fn upload_file(&self, parent_id: &str, name: &str, content: Vec<u8>) -> Result<EntryInfo> {
        let attributes = json!({ "name": name, "parent": { "id": parent_id } });
        let form = Form::new().text("attributes", attributes.to_string()).part("file", file_part(content, name));
        self.uploaded(self.http.post(self.upload("files/content")).multipart(form)).await
    }

    async fn upload_new_version(&self, file_id: &str, content: Vec<u8>) -> Result<EntryInfo> {
        let form = Form::new().text("attributes", "{}").part("file", file_part(content, "content"));
        self.uploaded(self.http.post(self.upload(&format!("files/{file_id}/content"))).multipart(form)).await
    }

    async fn update_file(&self, file_id: &str, fields: Map<String, Value>) -> Result<EntryInfo> {
        let request = self.http.put(self.api(&format!("files/{file_id}"))).query(&[("fields", ITEM_FIELDS)]);
        self.json(request.json(&fields)).await
    }

    async fn update_folder(&self, folder_id: &str, fields: Map<String, Value>) -> Result<EntryInfo> {
        let request = self.http.put(self.api(&format!("folders/{folder_id}"))).query(&[("fields", ITEM_FIELDS)]);
        self.json(request.json(&fields)).await
    }

    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<EntryInfo> {
        let body = json!({ "name": name, "parent": { "id": parent_id } });
        let request = self.http.post(self.api("folders")).query(&[("fields", ITEM_FIELDS)]);
        self.json(request.json(&body)).await
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.send(self.http.delete(self.api(&format!("files/{file_id}")))).await?;
        Ok(())
    }

    async fn delete_folder(&self, folder_id: &str, recursive: bool) -> Result<()> {
        let request = self
            .http
            .delete(self.api(&format!("folders/{folder_id}")))
            .query(&[("recursive", if recursive { "true" } else { "false" })]);
        self.send(request).await?;
        Ok(())
    }

    async fn download_url(&self, file_id: &str) -> Result<String> {
        let request = self.no_redirect.get(self.api(&format!("files/{file_id}/content"))).bearer_auth(&self.token);
        let response = request.send().await.or_raise(|| ErrorKind::Transport)?;
        if response.status().is_redirection() {
            let location = response.headers().get(header::LOCATION).ok_or_raise(|| ErrorKind::Decode)?;
            return Ok(location.to_str().or_raise(|| ErrorKind::Decode)?.to_string());
        }
        // 202 means the file is not ready for download yet; report it like any other status.
        let response = check_status(response).await?;
        exn::bail!(ErrorKind::Status(response.status().as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn client(endpoints: Endpoints) -> BoxHttpClient {
        BoxHttpClient {
            http: reqwest::Client::new(),
            no_redirect: reqwest::Client::new(),
            endpoints,
            token: "token".to_string(),
        }
    }

    #[rstest]
    #[case(ByteRange::new(0, Some(5)), "bytes=0-4")]
    #[case(ByteRange::new(100, Some(1)), "bytes=100-100")]
    #[case(ByteRange::new(7, None), "bytes=7-")]
    fn test_range_header(#[case] range: ByteRange, #[case] expected: &str) {
        assert_eq!(range_header(range), expected);
    }

    #[test]
    fn test_url_construction() {
        let client = client(Endpoints::default());
        assert_eq!(client.api("folders/0/items"), "https://api.box.com/2.0/folders/0/items");
        assert_eq!(client.upload("files/content"), "https://upload.box.com/api/2.0/files/content");
    }

    #[test]
    fn test_url_construction_trims_trailing_slash() {
        let endpoints = Endpoints {
            api_url: "http://localhost:8080/2.0/".to_string(),
            upload_url: "http://localhost:8080/upload/".to_string(),
            ..Endpoints::default()
        };
        let client = client(endpoints);
        assert_eq!(client.api("files/1"), "http://localhost:8080/2.0/files/1");
        assert_eq!(client.upload("files/1/content"), "http://localhost:8080/upload/files/1/content");
    }

    #[test]
    fn test_default_endpoints() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.page_size, MAX_PAGE_SIZE);
        assert_eq!(endpoints.timeout, DEFAULT_TIMEOUT);
    }

    #[rstest]
    #[case::more_remaining(0, 1000, Some(2500), Some(1000))]
    #[case::middle_page(1000, 1000, Some(2500), Some(2000))]
    #[case::last_page(2000, 500, Some(2500), None)]
    #[case::exact_fit(0, 1000, Some(1000), None)]
    #[case::no_total_count(0, 1000, None, None)]
    #[case::empty_page(1000, 0, Some(2500), None)]
    #[case::empty_folder(0, 0, Some(0), None)]
    fn test_next_offset(
        #[case] offset: u64,
        #[case] fetched: u64,
        #[case] total_count: Option<u64>,
        #[case] expected: Option<u64>,
    ) {
        assert_eq!(next_offset(offset, fetched, total_count), expected);
    }

    #[test]
    fn test_item_collection_decoding() {
        let json = r#"{
            "total_count": 2,
            "entries": [
                {"type": "folder", "id": "1", "name": "a", "etag": "0"},
                {"type": "file", "id": "2", "name": "b.txt", "etag": "3", "size": 10}
            ],
            "offset": 0,
            "limit": 1000
        }"#;
        let page: ItemCollection = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_count, Some(2));
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[1].size, Some(10));
    }
}
