use super::JellyfinSource;
use crate::{
    domain::{
        mapping::{is_comic_archive, is_image_file_name},
        models::{ImageRequest, PageKind, PageRef},
    },
    error::SourceError,
    jellyfin_client::{
        MediaServerApi, TOKEN_HEADER, attachment_url, download_url, item_id_from_ref,
        page_image_url,
    },
};

/// Upper bound of the sequential page image probe.
pub const MAX_PROBED_PAGES: u32 = 100;

/// Absolute URLs pass through, paths are joined to the server URL.
pub fn resolve_image_url(server_url: &str, url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return url.to_string();
    }
    format!(
        "{}/{}",
        server_url.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}

/// Whether `url` points at the media server itself.
pub fn is_on_server(server_url: &str, url: &str) -> bool {
    let server = server_url.trim_end_matches('/').to_ascii_lowercase();
    let url = url.to_ascii_lowercase();
    if server.is_empty() {
        return false;
    }
    match url.strip_prefix(&server) {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
        None => false,
    }
}

fn download_page(base_url: &str, item_id: &str, api_key: &str) -> Vec<PageRef> {
    vec![PageRef {
        index: 0,
        kind: PageKind::Download,
        url: download_url(base_url, item_id, api_key),
    }]
}

impl JellyfinSource {
    /// Pages of a chapter. Lookup failures degrade to a single download page.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn list_pages(&self, chapter_ref: &str) -> Result<Vec<PageRef>, SourceError> {
        let (api, creds) = self.connect().await?;
        let base_url = api.base_url().to_string();
        let item_id = item_id_from_ref(chapter_ref);

        let item = match self.session.observe(api.item(item_id).await).await {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(error = %e, %item_id, "item lookup failed, offering download");
                return Ok(download_page(&base_url, item_id, &creds.api_key));
            }
        };

        if !is_comic_archive(&item) {
            return Ok(download_page(&base_url, item_id, &creds.api_key));
        }

        let pages = self.attachment_pages(api.as_ref(), item_id).await;
        if !pages.is_empty() {
            tracing::debug!(%item_id, count = pages.len(), "pages from attachments");
            return Ok(pages);
        }

        let pages = self.probe_pages(api.as_ref(), item_id).await;
        if !pages.is_empty() {
            tracing::debug!(%item_id, count = pages.len(), "pages from image probe");
            return Ok(pages);
        }

        tracing::debug!(%item_id, "no page images, offering download");
        Ok(download_page(&base_url, item_id, &creds.api_key))
    }

    async fn attachment_pages(&self, api: &dyn MediaServerApi, item_id: &str) -> Vec<PageRef> {
        let attachments = match self.session.observe(api.attachments(item_id).await).await {
            Ok(attachments) => attachments,
            Err(e) => {
                tracing::debug!(error = %e, %item_id, "attachments unavailable");
                return Vec::new();
            }
        };
        let mut images: Vec<i64> = attachments
            .into_iter()
            .filter(|a| a.file_name.as_deref().is_some_and(is_image_file_name))
            .filter_map(|a| a.index)
            .collect();
        images.sort_unstable();
        images
            .into_iter()
            .enumerate()
            .map(|(i, attachment_index)| PageRef {
                index: i as u32,
                kind: PageKind::Image,
                url: attachment_url(api.base_url(), item_id, attachment_index),
            })
            .collect()
    }

    async fn probe_pages(&self, api: &dyn MediaServerApi, item_id: &str) -> Vec<PageRef> {
        let mut pages = Vec::new();
        for index in 0..MAX_PROBED_PAGES {
            match self
                .session
                .observe(api.page_image_exists(item_id, index).await)
                .await
            {
                Ok(true) => pages.push(PageRef {
                    index,
                    kind: PageKind::Image,
                    url: page_image_url(api.base_url(), item_id, index),
                }),
                Ok(false) => break,
                Err(e) => {
                    tracing::debug!(error = %e, %item_id, index, "page probe failed");
                    break;
                }
            }
        }
        pages
    }

    /// The page URL, with the session token attached only for the media server's own URLs.
    pub async fn build_image_request(&self, image_url: &str) -> Result<ImageRequest, SourceError> {
        let creds = self.ensure_session().await?;
        let url = resolve_image_url(&creds.server_url, image_url);
        let headers = if is_on_server(&creds.server_url, &url) {
            vec![(TOKEN_HEADER.to_string(), creds.api_key)]
        } else {
            tracing::debug!(%url, "image outside the media server, sending no token");
            Vec::new()
        };
        Ok(ImageRequest { url, headers })
    }
}
