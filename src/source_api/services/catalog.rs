use poem_openapi::payload::Json;

use crate::{
    jellyfin_client::item_ref,
    source::{ContentSource, JellyfinSource},
    source_api::models::{
        ChapterListResponse, ImageRequestResponse, PageListResponse, SeriesDetailsResponse,
        SeriesPageResponse,
    },
};

/// Which listing a series page request asks for.
#[derive(Debug, Clone, Copy)]
pub enum Listing<'q> {
    Popular,
    Latest,
    Search(&'q str),
}

pub struct CatalogService<'a> {
    pub source: &'a JellyfinSource,
}

impl<'a> CatalogService<'a> {
    pub fn new(source: &'a JellyfinSource) -> Self {
        Self { source }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn series_page(&self, listing: Listing<'_>, page: u32) -> SeriesPageResponse {
        let res = match listing {
            Listing::Popular => self.source.popular(page).await,
            Listing::Latest => self.source.latest(page).await,
            Listing::Search(q) => self.source.search(page, q).await,
        };
        match res {
            Ok(page) => SeriesPageResponse::Ok(Json(page.into())),
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), "failed to list series");
                e.into()
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn series_details(&self, item_id: &str) -> SeriesDetailsResponse {
        match self.source.series_details(&item_ref(item_id)).await {
            Ok(details) => SeriesDetailsResponse::Ok(Json(details.into())),
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), %item_id, "failed to load series");
                e.into()
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn chapters(&self, item_id: &str) -> ChapterListResponse {
        match self.source.chapter_list(&item_ref(item_id)).await {
            Ok(chapters) => {
                ChapterListResponse::Ok(Json(chapters.into_iter().map(Into::into).collect()))
            }
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), %item_id, "failed to list chapters");
                e.into()
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn pages(&self, item_id: &str) -> PageListResponse {
        match self.source.page_list(&item_ref(item_id)).await {
            Ok(pages) => PageListResponse::Ok(Json(pages.into_iter().map(Into::into).collect())),
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), %item_id, "failed to list pages");
                e.into()
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn image_request(&self, url: &str) -> ImageRequestResponse {
        match self.source.image_request(url).await {
            Ok(req) => ImageRequestResponse::Ok(Json(req.into())),
            Err(e) => {
                tracing::error!(error = %format!("{:?}", e), "failed to build image request");
                e.into()
            }
        }
    }
}
