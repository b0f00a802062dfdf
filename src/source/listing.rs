use super::JellyfinSource;
use crate::{
    domain::{
        mapping::{
            ItemKind, classify_item, map_chapter, map_series, map_series_details,
            placeholder_chapter,
        },
        models::{ChapterSummary, SeriesDetails, SeriesPage},
    },
    error::{ApiError, SourceError},
    jellyfin_client::{ItemsQuery, MediaServerApi, item_id_from_ref},
};

pub const SERIES_PAGE_SIZE: u32 = 20;
pub const NO_CHAPTERS_MESSAGE: &str = "No chapters found";

const SERIES_ITEM_TYPES: &str = "Folder,BoxSet";
const SERIES_FIELDS: &str = "Overview,Genres,People,ChildCount,DateCreated";
const CHAPTER_ITEM_TYPES: &str = "Book";
const CHAPTER_FIELDS: &str = "DateCreated,Path";
const BOOKS_LIBRARY_NAME: &str = "Books";

/// Query for one page of folder-like items; pages start at 1.
pub fn series_query(page: u32, search: Option<&str>) -> ItemsQuery {
    let page = page.max(1);
    ItemsQuery {
        include_item_types: Some(SERIES_ITEM_TYPES.into()),
        recursive: Some(true),
        sort_by: Some("SortName".into()),
        sort_order: Some("Ascending".into()),
        search_term: search
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string),
        start_index: Some((page - 1).saturating_mul(SERIES_PAGE_SIZE)),
        limit: Some(SERIES_PAGE_SIZE),
        fields: Some(SERIES_FIELDS.into()),
        ..Default::default()
    }
}

fn children_query(parent_id: &str, typed: bool) -> ItemsQuery {
    ItemsQuery {
        parent_id: Some(parent_id.to_string()),
        include_item_types: typed.then(|| CHAPTER_ITEM_TYPES.to_string()),
        recursive: Some(typed),
        sort_by: Some("SortName".into()),
        sort_order: Some("Ascending".into()),
        fields: Some(CHAPTER_FIELDS.into()),
        ..Default::default()
    }
}

impl JellyfinSource {
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn list_series(
        &self,
        page: u32,
        search: Option<&str>,
    ) -> Result<SeriesPage, SourceError> {
        let (api, creds) = self.connect().await?;
        let query = series_query(page, search);
        let mut items = self
            .session
            .observe(api.user_items(&creds.user_id, &query).await)
            .await?
            .items;

        if items.is_empty() {
            if let Some(library_id) = self
                .books_library_id(api.as_ref(), &creds.user_id)
                .await?
            {
                tracing::debug!(%library_id, "direct listing empty, retrying inside Books library");
                let scoped = ItemsQuery {
                    parent_id: Some(library_id),
                    ..query
                };
                items = self
                    .session
                    .observe(api.user_items(&creds.user_id, &scoped).await)
                    .await?
                    .items;
            }
        }

        // A full page is the only hint that another one may follow.
        let has_more = items.len() == SERIES_PAGE_SIZE as usize;
        let series = items
            .iter()
            .map(|item| map_series(api.base_url(), item))
            .collect();
        Ok(SeriesPage { series, has_more })
    }

    /// Id of the "Books" view. A rejected key propagates, other failures mean no view.
    async fn books_library_id(
        &self,
        api: &dyn MediaServerApi,
        user_id: &str,
    ) -> Result<Option<String>, ApiError> {
        match self.session.observe(api.user_views(user_id).await).await {
            Ok(views) => Ok(views
                .items
                .into_iter()
                .find(|v| v.name.eq_ignore_ascii_case(BOOKS_LIBRARY_NAME))
                .map(|v| v.id)),
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "failed to list user views");
                Ok(None)
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn fetch_series_details(&self, series_ref: &str) -> Result<SeriesDetails, SourceError> {
        let (api, _) = self.connect().await?;
        let item_id = item_id_from_ref(series_ref);
        let item = self.session.observe(api.item(item_id).await).await?;
        Ok(map_series_details(api.base_url(), &item))
    }

    /// Chapters of a series. After authentication, failures become a placeholder entry.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn list_chapters(&self, series_ref: &str) -> Result<Vec<ChapterSummary>, SourceError> {
        let (api, creds) = self.connect().await?;
        let item_id = item_id_from_ref(series_ref);
        match self
            .resolve_chapters(api.as_ref(), &creds.user_id, item_id)
            .await
        {
            Ok(chapters) if !chapters.is_empty() => Ok(chapters),
            Ok(_) => {
                tracing::debug!(%item_id, "no chapters found");
                Ok(vec![placeholder_chapter(series_ref, NO_CHAPTERS_MESSAGE)])
            }
            Err(e) => {
                tracing::warn!(error = %e, %item_id, "chapter lookup failed");
                Ok(vec![placeholder_chapter(series_ref, &format!("Error: {}", e))])
            }
        }
    }

    async fn resolve_chapters(
        &self,
        api: &dyn MediaServerApi,
        user_id: &str,
        item_id: &str,
    ) -> Result<Vec<ChapterSummary>, ApiError> {
        let item = self.session.observe(api.item(item_id).await).await?;
        let kind = classify_item(&item);
        tracing::debug!(%item_id, ?kind, item_type = item.item_type.as_deref().unwrap_or(""), "classified item");
        let chapters = match kind {
            ItemKind::Leaf => vec![map_chapter(&item, 1)],
            ItemKind::Container => self.child_chapters(api, user_id, item_id).await?,
            ItemKind::Unknown => {
                let children = self.child_chapters(api, user_id, item_id).await?;
                if children.is_empty() {
                    vec![map_chapter(&item, 1)]
                } else {
                    children
                }
            }
        };
        Ok(chapters)
    }

    async fn child_chapters(
        &self,
        api: &dyn MediaServerApi,
        user_id: &str,
        parent_id: &str,
    ) -> Result<Vec<ChapterSummary>, ApiError> {
        let typed = self
            .session
            .observe(api.user_items(user_id, &children_query(parent_id, true)).await)
            .await?
            .items;
        let children = if typed.is_empty() {
            tracing::debug!(%parent_id, "no typed children, listing all children");
            self.session
                .observe(api.user_items(user_id, &children_query(parent_id, false)).await)
                .await?
                .items
        } else {
            typed
        };
        Ok(children
            .iter()
            .enumerate()
            .map(|(i, child)| map_chapter(child, i + 1))
            .collect())
    }
}
