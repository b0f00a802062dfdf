use std::sync::Arc;

use poem_openapi::{
    OpenApi,
    param::{Path, Query},
    payload::Json,
};

use super::models::{
    ChapterListResponse, ImageRequestResponse, PageListResponse, SeriesDetailsResponse,
    SeriesPageResponse, SettingsResponse, SettingsUpdateDto, StatusResponse,
};
use super::services::{
    catalog::{CatalogService, Listing},
    health::HealthService,
    settings::SettingsService,
};
use crate::source::JellyfinSource;

pub struct SourceApi {
    pub source: Arc<JellyfinSource>,
}

#[OpenApi]
impl SourceApi {
    /// Name and version of the configured media server
    #[oai(path = "/status", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn status(&self) -> StatusResponse {
        tracing::debug!("handling /status");
        HealthService::new(&self.source).status().await
    }

    #[oai(path = "/v1/popular", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn popular(
        &self,
        /// Page number starting at 1
        Query(page): Query<Option<u32>>,
    ) -> SeriesPageResponse {
        CatalogService::new(&self.source)
            .series_page(Listing::Popular, page.unwrap_or(1))
            .await
    }

    #[oai(path = "/v1/latest", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn latest(
        &self,
        /// Page number starting at 1
        Query(page): Query<Option<u32>>,
    ) -> SeriesPageResponse {
        CatalogService::new(&self.source)
            .series_page(Listing::Latest, page.unwrap_or(1))
            .await
    }

    #[oai(path = "/v1/search", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn search(
        &self,
        /// Search term matched against item names
        Query(q): Query<String>,
        /// Page number starting at 1
        Query(page): Query<Option<u32>>,
    ) -> SeriesPageResponse {
        CatalogService::new(&self.source)
            .series_page(Listing::Search(&q), page.unwrap_or(1))
            .await
    }

    #[oai(path = "/v1/series/:item_id", method = "get")]
    #[tracing::instrument(level = "debug", skip(self, item_id))]
    async fn series_details(&self, item_id: Path<String>) -> SeriesDetailsResponse {
        CatalogService::new(&self.source)
            .series_details(&item_id.0)
            .await
    }

    /// Chapters of a series. Lookup failures come back as a single placeholder chapter.
    #[oai(path = "/v1/series/:item_id/chapters", method = "get")]
    #[tracing::instrument(level = "debug", skip(self, item_id))]
    async fn chapters(&self, item_id: Path<String>) -> ChapterListResponse {
        CatalogService::new(&self.source).chapters(&item_id.0).await
    }

    #[oai(path = "/v1/chapters/:item_id/pages", method = "get")]
    #[tracing::instrument(level = "debug", skip(self, item_id))]
    async fn pages(&self, item_id: Path<String>) -> PageListResponse {
        CatalogService::new(&self.source).pages(&item_id.0).await
    }

    /// Headers a client must send to fetch a page image
    #[oai(path = "/v1/image-request", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn image_request(&self, Query(url): Query<String>) -> ImageRequestResponse {
        CatalogService::new(&self.source).image_request(&url).await
    }

    #[oai(path = "/v1/settings", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_settings(&self) -> SettingsResponse {
        SettingsService::new(self.source.session()).get().await
    }

    /// Change the server URL or API key. Either change drops the cached user.
    #[oai(path = "/v1/settings", method = "put")]
    #[tracing::instrument(level = "debug", skip(self, body))]
    async fn put_settings(&self, body: Json<SettingsUpdateDto>) -> SettingsResponse {
        SettingsService::new(self.source.session())
            .update(body.0)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        session::Session,
        source::fake::{FakeFactory, FakeServer, remote_item, signed_in_source},
        storage::MemorySettingsStore,
    };
    use poem::{Route, http::StatusCode, test::TestClient};
    use poem_openapi::OpenApiService;
    use uuid::Uuid;

    fn client(source: JellyfinSource) -> TestClient<Route> {
        let api = SourceApi {
            source: Arc::new(source),
        };
        let service = OpenApiService::new(api, "test", "0.0.0");
        TestClient::new(Route::new().nest("/", service))
    }

    fn unconfigured() -> JellyfinSource {
        let session = Session::new(Arc::new(MemorySettingsStore::new()), Uuid::new_v4());
        JellyfinSource::new(session, Arc::new(FakeFactory::new(FakeServer::new())))
    }

    #[tokio::test]
    async fn status_reports_server_version() {
        let cli = client(signed_in_source(FakeServer::new()).await);
        let resp = cli.get("/status").send().await;
        resp.assert_status_is_ok();
        let json = resp.json().await;
        json.value().object().get("version").assert_string("10.9.0");
    }

    #[tokio::test]
    async fn popular_returns_a_page() {
        let server = FakeServer::new();
        server.on_items(|_| vec![remote_item("s1", "Berserk", Some("Folder"))]);
        let cli = client(signed_in_source(server).await);
        let resp = cli.get("/v1/popular").query("page", &1).send().await;
        resp.assert_status_is_ok();
        let json = resp.json().await;
        let page = json.value().object();
        page.get("has_more").assert_bool(false);
        let series = page.get("series").array();
        assert_eq!(series.len(), 1);
        series.get(0).object().get("url").assert_string("/Items/s1");
    }

    #[tokio::test]
    async fn search_passes_the_term() {
        let server = FakeServer::new();
        let cli = client(signed_in_source(server.clone()).await);
        let resp = cli
            .get("/v1/search")
            .query("q", &"guts")
            .query("page", &2)
            .send()
            .await;
        resp.assert_status_is_ok();
        let queries = server.item_queries();
        assert_eq!(queries[0].search_term.as_deref(), Some("guts"));
        assert_eq!(queries[0].start_index, Some(20));
    }

    #[tokio::test]
    async fn chapters_degrade_to_placeholder() {
        let cli = client(signed_in_source(FakeServer::new()).await);
        let resp = cli.get("/v1/series/missing/chapters").send().await;
        resp.assert_status_is_ok();
        let json = resp.json().await;
        let chapters = json.value().array();
        assert_eq!(chapters.len(), 1);
        chapters.get(0).object().get("url").assert_string("/Items/missing");
    }

    #[tokio::test]
    async fn pages_report_kind() {
        let server = FakeServer::new();
        server.add_item(remote_item("b1", "novel.epub", Some("Book")));
        let cli = client(signed_in_source(server).await);
        let resp = cli.get("/v1/chapters/b1/pages").send().await;
        resp.assert_status_is_ok();
        let json = resp.json().await;
        json.value()
            .array()
            .get(0)
            .object()
            .get("kind")
            .assert_string("download");
    }

    #[tokio::test]
    async fn image_request_lists_token_header() {
        let cli = client(signed_in_source(FakeServer::new()).await);
        let resp = cli
            .get("/v1/image-request")
            .query("url", &"/Items/c1/Images/Page/0")
            .send()
            .await;
        resp.assert_status_is_ok();
        let json = resp.json().await;
        let body = json.value().object();
        body.get("url")
            .assert_string("http://media.lan/Items/c1/Images/Page/0");
        let header = body.get("headers").array().get(0).object();
        header.get("name").assert_string("X-Emby-Token");
        header.get("value").assert_string("k");
    }

    #[tokio::test]
    async fn missing_settings_are_bad_requests() {
        let cli = client(unconfigured());
        let resp = cli.get("/v1/popular").send().await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let json = resp.json().await;
        json.value()
            .object()
            .get("message")
            .assert_string("Server URL is not set. Configure it in the source settings.");
    }

    #[tokio::test]
    async fn rejected_key_is_unauthorized() {
        let server = FakeServer::new();
        server.fail("item", 401);
        let cli = client(signed_in_source(server).await);
        let resp = cli.get("/v1/series/s1").send().await;
        resp.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn upstream_failures_are_bad_gateway() {
        let server = FakeServer::new();
        server.fail("user_items", 500);
        let cli = client(signed_in_source(server).await);
        let resp = cli.get("/v1/latest").send().await;
        resp.assert_status(StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let cli = client(unconfigured());
        let resp = cli
            .put("/v1/settings")
            .body_json(&serde_json::json!({
                "server_url": "media.lan:8096/",
                "api_key": "secret",
            }))
            .send()
            .await;
        resp.assert_status_is_ok();

        let resp = cli.get("/v1/settings").send().await;
        resp.assert_status_is_ok();
        let json = resp.json().await;
        let settings = json.value().object();
        settings
            .get("server_url")
            .assert_string("http://media.lan:8096");
        settings.get("has_api_key").assert_bool(true);
    }
}
