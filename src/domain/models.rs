// Host-facing records mapped from media server items

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    /// Reference string `/Items/{id}`
    pub url: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPage {
    pub series: Vec<SeriesSummary>,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDetails {
    pub url: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub author: Option<String>,
    pub artist: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterSummary {
    pub url: String,
    pub name: String,
    /// 1-based position in the listing
    pub chapter_number: f32,
    /// Epoch milliseconds, 0 when unknown
    pub date_upload: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// The whole chapter file as one opaque download
    Download,
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRef {
    pub index: u32,
    pub kind: PageKind,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}
