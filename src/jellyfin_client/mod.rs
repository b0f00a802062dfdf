use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

mod models;

pub use models::{
    Attachment, AttachmentsResponse, ItemsQuery, ItemsResponse, Person, RemoteItem, SystemInfo,
    User,
};

/// Header carrying the API key on every request.
pub const TOKEN_HEADER: &str = "X-Emby-Token";

/// Calls the source makes against the media server.
#[async_trait]
pub trait MediaServerApi: Send + Sync {
    fn base_url(&self) -> &str;

    async fn system_info(&self) -> Result<SystemInfo, ApiError>;

    async fn users(&self) -> Result<Vec<User>, ApiError>;

    async fn user_items(
        &self,
        user_id: &str,
        query: &ItemsQuery,
    ) -> Result<ItemsResponse, ApiError>;

    async fn user_views(&self, user_id: &str) -> Result<ItemsResponse, ApiError>;

    async fn item(&self, item_id: &str) -> Result<RemoteItem, ApiError>;

    async fn attachments(&self, item_id: &str) -> Result<Vec<Attachment>, ApiError>;

    /// `Ok(false)` when the server has no image at `index`.
    async fn page_image_exists(&self, item_id: &str, index: u32) -> Result<bool, ApiError>;
}

/// Builds API handles for a server URL and key.
pub trait ClientFactory: Send + Sync {
    fn connect(&self, server_url: &str, api_key: &str) -> Arc<dyn MediaServerApi>;
}

/// Hands out `JellyfinClient`s sharing one connection pool.
#[derive(Clone, Debug)]
pub struct HttpClientFactory {
    client: reqwest::Client,
}

impl HttpClientFactory {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }
}

impl ClientFactory for HttpClientFactory {
    fn connect(&self, server_url: &str, api_key: &str) -> Arc<dyn MediaServerApi> {
        Arc::new(
            JellyfinClient::with_http_client(server_url, self.client.clone()).with_api_key(api_key),
        )
    }
}

#[derive(Clone, Debug)]
pub struct JellyfinClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl JellyfinClient {
    /// Create a new client with the given base URL (e.g. "http://localhost:8096").
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_http_client(base_url, client))
    }

    pub fn with_http_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url_str = base_url.into();
        tracing::debug!(base_url = %base_url_str, "creating JellyfinClient");
        JellyfinClient {
            base_url: base_url_str.trim_end_matches('/').to_string(),
            api_key: None,
            client,
        }
    }

    /// Return a client sending the provided API key in `X-Emby-Token`
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = (!key.is_empty()).then_some(key);
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorized(self.client.get(self.url(path)))
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header(TOKEN_HEADER, key),
            None => req,
        }
    }

    async fn read_json<T: DeserializeOwned>(req: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "request failed");
            return Err(ApiError::status(status.as_u16(), body));
        }
        match serde_json::from_str::<T>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                let snippet: String = body.chars().take(2000).collect();
                tracing::error!(error = %e, body_snippet = %snippet, "failed to parse response");
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl MediaServerApi for JellyfinClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /System/Info
    #[tracing::instrument(level = "debug", skip(self))]
    async fn system_info(&self) -> Result<SystemInfo, ApiError> {
        tracing::debug!(base_url = %self.base_url, "GET system info");
        Self::read_json(self.get("/System/Info")).await
    }

    /// GET /Users
    #[tracing::instrument(level = "debug", skip(self))]
    async fn users(&self) -> Result<Vec<User>, ApiError> {
        tracing::debug!("GET users");
        Self::read_json(self.get("/Users")).await
    }

    /// GET /Users/{userId}/Items
    #[tracing::instrument(level = "debug", skip(self))]
    async fn user_items(
        &self,
        user_id: &str,
        query: &ItemsQuery,
    ) -> Result<ItemsResponse, ApiError> {
        let path = format!("/Users/{}/Items", user_id);
        tracing::debug!(%path, "GET user items");
        Self::read_json(self.get(&path).query(query)).await
    }

    /// GET /Users/{userId}/Views
    #[tracing::instrument(level = "debug", skip(self))]
    async fn user_views(&self, user_id: &str) -> Result<ItemsResponse, ApiError> {
        let path = format!("/Users/{}/Views", user_id);
        tracing::debug!(%path, "GET user views");
        Self::read_json(self.get(&path)).await
    }

    /// GET /Items/{id}
    #[tracing::instrument(level = "debug", skip(self))]
    async fn item(&self, item_id: &str) -> Result<RemoteItem, ApiError> {
        Self::read_json(self.get(&format!("/Items/{}", item_id))).await
    }

    /// GET /Items/{id}/Attachments
    #[tracing::instrument(level = "debug", skip(self))]
    async fn attachments(&self, item_id: &str) -> Result<Vec<Attachment>, ApiError> {
        let parsed: AttachmentsResponse =
            Self::read_json(self.get(&format!("/Items/{}/Attachments", item_id))).await?;
        Ok(parsed.into_vec())
    }

    /// HEAD /Items/{id}/Images/Page/{n}
    #[tracing::instrument(level = "debug", skip(self))]
    async fn page_image_exists(&self, item_id: &str, index: u32) -> Result<bool, ApiError> {
        let url = page_image_url(&self.base_url, item_id, index);
        let resp = self.authorized(self.client.head(&url)).send().await?;
        let status = resp.status();
        tracing::debug!(%url, status = status.as_u16(), "HEAD page image");
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::status(status.as_u16(), String::new()));
        }
        Ok(status.is_success())
    }
}

// URLs handed to the host. They do not trigger a request.

pub fn item_ref(item_id: &str) -> String {
    format!("/Items/{}", item_id)
}

/// Item id carried by a reference built with [`item_ref`]; bare ids pass through.
pub fn item_id_from_ref(reference: &str) -> &str {
    let trimmed = reference.trim_end_matches('/');
    let without_query = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
    without_query
        .rsplit('/')
        .next()
        .unwrap_or(without_query)
}

/// `/Items/{id}/Download` with the key in `api_key`, both percent-encoded.
pub fn download_url(base_url: &str, item_id: &str, api_key: &str) -> String {
    let mut url = match reqwest::Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(error = %e, %base_url, "server url does not parse");
            return format!("{}/Items/{}/Download", base_url, item_id);
        }
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(["Items", item_id, "Download"]);
    }
    url.query_pairs_mut().append_pair("api_key", api_key);
    url.into()
}

pub fn primary_image_url(base_url: &str, item_id: &str) -> String {
    format!("{}/Items/{}/Images/Primary", base_url, item_id)
}

pub fn attachment_url(base_url: &str, item_id: &str, index: i64) -> String {
    format!("{}/Items/{}/Attachments/{}", base_url, item_id, index)
}

pub fn page_image_url(base_url: &str, item_id: &str, index: u32) -> String {
    format!("{}/Items/{}/Images/Page/{}", base_url, item_id, index)
}

/// Internal serde helpers
pub mod de {
    use serde::{Deserialize, Deserializer};

    /// Accept a string or null; null becomes the empty string.
    pub fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_strips_trailing_slash() {
        let c = JellyfinClient::new("http://localhost:8096/").unwrap();
        assert_eq!(c.base_url(), "http://localhost:8096");
        assert_eq!(c.url("Users"), "http://localhost:8096/Users");
        assert_eq!(c.url("/System/Info"), "http://localhost:8096/System/Info");
    }

    #[test]
    fn empty_api_key_sends_no_header() {
        let c = JellyfinClient::new("http://localhost:8096")
            .unwrap()
            .with_api_key("");
        assert!(c.api_key.is_none());
    }

    #[test]
    fn build_urls() {
        let base = "https://media.example.org/jf";
        assert_eq!(
            download_url(base, "abc", "k3y"),
            "https://media.example.org/jf/Items/abc/Download?api_key=k3y"
        );
        assert_eq!(
            primary_image_url(base, "abc"),
            "https://media.example.org/jf/Items/abc/Images/Primary"
        );
        assert_eq!(
            attachment_url(base, "abc", 4),
            "https://media.example.org/jf/Items/abc/Attachments/4"
        );
        assert_eq!(
            page_image_url(base, "abc", 0),
            "https://media.example.org/jf/Items/abc/Images/Page/0"
        );
    }

    #[test]
    fn download_url_encodes_id_and_key() {
        assert_eq!(
            download_url("http://media.lan:8096", "a b", "k&y=1"),
            "http://media.lan:8096/Items/a%20b/Download?api_key=k%26y%3D1"
        );
        assert_eq!(
            download_url("http://media.lan/", "x/y", "k"),
            "http://media.lan/Items/x%2Fy/Download?api_key=k"
        );
    }

    #[test]
    fn refs_round_trip_to_ids() {
        assert_eq!(item_ref("abc"), "/Items/abc");
        assert_eq!(item_id_from_ref("/Items/abc"), "abc");
        assert_eq!(item_id_from_ref("/Items/abc/"), "abc");
        assert_eq!(item_id_from_ref("/Items/abc?x=1"), "abc");
        assert_eq!(item_id_from_ref("abc"), "abc");
    }
}
