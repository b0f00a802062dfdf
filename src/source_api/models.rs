use poem_openapi::{ApiResponse, Enum, Object, payload::Json};

use crate::{
    domain::models::{
        ChapterSummary, ImageRequest, PageKind, PageRef, SeriesDetails, SeriesPage, SeriesSummary,
    },
    error::{AuthError, SourceError},
    jellyfin_client::SystemInfo,
};

#[derive(Debug, Clone, Object)]
pub struct ErrorDto {
    /// Human-readable error message
    pub message: String,
}

impl From<String> for ErrorDto {
    fn from(message: String) -> Self {
        ErrorDto { message }
    }
}

#[derive(Debug, Clone, Object)]
pub struct StatusDto {
    pub server_name: Option<String>,
    pub version: Option<String>,
}

impl From<SystemInfo> for StatusDto {
    fn from(info: SystemInfo) -> Self {
        StatusDto {
            server_name: info.server_name,
            version: info.version,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct SeriesSummaryDto {
    /// Series reference, `/Items/{id}`
    pub url: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
}

impl From<SeriesSummary> for SeriesSummaryDto {
    fn from(s: SeriesSummary) -> Self {
        SeriesSummaryDto {
            url: s.url,
            title: s.title,
            thumbnail_url: s.thumbnail_url,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct SeriesPageDto {
    pub series: Vec<SeriesSummaryDto>,
    pub has_more: bool,
}

impl From<SeriesPage> for SeriesPageDto {
    fn from(page: SeriesPage) -> Self {
        SeriesPageDto {
            series: page.series.into_iter().map(Into::into).collect(),
            has_more: page.has_more,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct SeriesDetailsDto {
    pub url: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub author: Option<String>,
    pub artist: Option<String>,
}

impl From<SeriesDetails> for SeriesDetailsDto {
    fn from(d: SeriesDetails) -> Self {
        SeriesDetailsDto {
            url: d.url,
            title: d.title,
            thumbnail_url: d.thumbnail_url,
            description: d.description,
            genres: d.genres,
            author: d.author,
            artist: d.artist,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct ChapterDto {
    pub url: String,
    pub name: String,
    pub chapter_number: f32,
    /// Epoch milliseconds, 0 when unknown
    pub date_upload: i64,
}

impl From<ChapterSummary> for ChapterDto {
    fn from(c: ChapterSummary) -> Self {
        ChapterDto {
            url: c.url,
            name: c.name,
            chapter_number: c.chapter_number,
            date_upload: c.date_upload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[oai(rename_all = "lowercase")]
pub enum PageKindDto {
    Download,
    Image,
}

impl From<PageKind> for PageKindDto {
    fn from(kind: PageKind) -> Self {
        match kind {
            PageKind::Download => PageKindDto::Download,
            PageKind::Image => PageKindDto::Image,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct PageDto {
    pub index: u32,
    pub kind: PageKindDto,
    pub url: String,
}

impl From<PageRef> for PageDto {
    fn from(p: PageRef) -> Self {
        PageDto {
            index: p.index,
            kind: p.kind.into(),
            url: p.url,
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct HeaderDto {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Object)]
pub struct ImageRequestDto {
    pub url: String,
    pub headers: Vec<HeaderDto>,
}

impl From<ImageRequest> for ImageRequestDto {
    fn from(req: ImageRequest) -> Self {
        ImageRequestDto {
            url: req.url,
            headers: req
                .headers
                .into_iter()
                .map(|(name, value)| HeaderDto { name, value })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct SettingsDto {
    pub server_url: String,
    /// The key itself is never returned
    pub has_api_key: bool,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Object)]
pub struct SettingsUpdateDto {
    pub server_url: Option<String>,
    pub api_key: Option<String>,
}

/// HTTP class of a failed source operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    BadRequest,
    Unauthorized,
    BadGateway,
}

impl FailureKind {
    pub fn of(err: &SourceError) -> Self {
        match err {
            SourceError::Config(_) => FailureKind::BadRequest,
            SourceError::Auth(AuthError::InvalidApiKey | AuthError::InsufficientScope) => {
                FailureKind::Unauthorized
            }
            SourceError::Api(e) if e.is_unauthorized() => FailureKind::Unauthorized,
            _ => FailureKind::BadGateway,
        }
    }
}

// Every source-backed route answers with the same three error statuses.
macro_rules! source_response {
    ($name:ident, $ok:ty, $ok_doc:literal) => {
        #[derive(ApiResponse)]
        pub enum $name {
            #[doc = $ok_doc]
            #[oai(status = 200)]
            Ok(Json<$ok>),

            /// Source settings are incomplete
            #[oai(status = 400)]
            BadRequest(Json<ErrorDto>),

            /// The media server rejected the API key
            #[oai(status = 401)]
            Unauthorized(Json<ErrorDto>),

            /// Upstream media server or storage error
            #[oai(status = 502)]
            BadGateway(Json<ErrorDto>),
        }

        impl From<SourceError> for $name {
            fn from(err: SourceError) -> Self {
                let body = Json(ErrorDto::from(err.to_string()));
                match FailureKind::of(&err) {
                    FailureKind::BadRequest => $name::BadRequest(body),
                    FailureKind::Unauthorized => $name::Unauthorized(body),
                    FailureKind::BadGateway => $name::BadGateway(body),
                }
            }
        }
    };
}

source_response!(StatusResponse, StatusDto, "Media server reachable");
source_response!(SeriesPageResponse, SeriesPageDto, "One page of series");
source_response!(SeriesDetailsResponse, SeriesDetailsDto, "Series details");
source_response!(ChapterListResponse, Vec<ChapterDto>, "Chapters of a series, never empty");
source_response!(PageListResponse, Vec<PageDto>, "Pages of a chapter");
source_response!(ImageRequestResponse, ImageRequestDto, "Image URL with the headers to send");
source_response!(SettingsResponse, SettingsDto, "Current source settings");
