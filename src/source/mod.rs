//! The content source: the host's provider contract implemented on top of a
//! Jellyfin server.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::models::{ChapterSummary, ImageRequest, PageRef, SeriesDetails, SeriesPage},
    error::{ConfigError, SourceError},
    jellyfin_client::{ClientFactory, MediaServerApi, SystemInfo},
    session::{Credentials, Session},
};

mod listing;
mod pages;

#[cfg(test)]
pub(crate) mod fake;

pub use listing::{NO_CHAPTERS_MESSAGE, SERIES_PAGE_SIZE, series_query};
pub use pages::{MAX_PROBED_PAGES, is_on_server, resolve_image_url};

/// Operations a reader host calls on a content source.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn popular(&self, page: u32) -> Result<SeriesPage, SourceError>;

    async fn latest(&self, page: u32) -> Result<SeriesPage, SourceError> {
        self.popular(page).await
    }

    async fn search(&self, page: u32, query: &str) -> Result<SeriesPage, SourceError>;

    async fn series_details(&self, series_ref: &str) -> Result<SeriesDetails, SourceError>;

    /// Never empty once authenticated.
    async fn chapter_list(&self, series_ref: &str) -> Result<Vec<ChapterSummary>, SourceError>;

    async fn page_list(&self, chapter_ref: &str) -> Result<Vec<PageRef>, SourceError>;

    async fn image_request(&self, image_url: &str) -> Result<ImageRequest, SourceError>;
}

pub struct JellyfinSource {
    session: Session,
    factory: Arc<dyn ClientFactory>,
}

impl JellyfinSource {
    pub fn new(session: Session, factory: Arc<dyn ClientFactory>) -> Self {
        Self { session, factory }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn ensure_session(&self) -> Result<Credentials, SourceError> {
        self.session.ensure(self.factory.as_ref()).await
    }

    async fn connect(&self) -> Result<(Arc<dyn MediaServerApi>, Credentials), SourceError> {
        let creds = self.ensure_session().await?;
        if creds.server_url.is_empty() {
            return Err(ConfigError::MissingServerUrl.into());
        }
        let api = self.factory.connect(&creds.server_url, &creds.api_key);
        Ok((api, creds))
    }

    /// GET /System/Info with the current credentials.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn server_status(&self) -> Result<SystemInfo, SourceError> {
        let (api, _) = self.connect().await?;
        Ok(self.session.observe(api.system_info().await).await?)
    }
}

#[async_trait]
impl ContentSource for JellyfinSource {
    async fn popular(&self, page: u32) -> Result<SeriesPage, SourceError> {
        self.list_series(page, None).await
    }

    async fn search(&self, page: u32, query: &str) -> Result<SeriesPage, SourceError> {
        self.list_series(page, Some(query)).await
    }

    async fn series_details(&self, series_ref: &str) -> Result<SeriesDetails, SourceError> {
        self.fetch_series_details(series_ref).await
    }

    async fn chapter_list(&self, series_ref: &str) -> Result<Vec<ChapterSummary>, SourceError> {
        self.list_chapters(series_ref).await
    }

    async fn page_list(&self, chapter_ref: &str) -> Result<Vec<PageRef>, SourceError> {
        self.list_pages(chapter_ref).await
    }

    async fn image_request(&self, image_url: &str) -> Result<ImageRequest, SourceError> {
        self.build_image_request(image_url).await
    }
}
