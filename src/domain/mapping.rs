// Mapping from Jellyfin items to host records

use chrono::DateTime;

use super::models::{ChapterSummary, SeriesDetails, SeriesSummary};
use crate::jellyfin_client::{Person, RemoteItem, item_ref, primary_image_url};

/// One entry of the name classification table. `matches` sees the lowercased name.
#[derive(Debug, Clone, Copy)]
pub struct LabelRule {
    pub label: &'static str,
    pub matches: fn(&str) -> bool,
}

fn is_chapter_name(name: &str) -> bool {
    name.contains("chapter") || name.contains("ch.") || name.contains("chap ")
}

fn is_volume_name(name: &str) -> bool {
    name.contains("volume") || name.contains("vol.") || name.contains("vol ")
}

fn is_comic_file(name: &str) -> bool {
    COMIC_ARCHIVE_EXTENSIONS
        .iter()
        .any(|ext| name.ends_with(&format!(".{}", ext)))
}

fn is_pdf_file(name: &str) -> bool {
    name.ends_with(".pdf")
}

fn is_epub_file(name: &str) -> bool {
    name.ends_with(".epub")
}

/// Evaluated top to bottom; the first match labels the name.
pub const NAME_LABEL_RULES: &[LabelRule] = &[
    LabelRule { label: "Chapter", matches: is_chapter_name },
    LabelRule { label: "Volume", matches: is_volume_name },
    LabelRule { label: "Comic", matches: is_comic_file },
    LabelRule { label: "PDF", matches: is_pdf_file },
    LabelRule { label: "EPUB", matches: is_epub_file },
];

pub const CHAPTER_FALLBACK_LABEL: &str = "Book";
pub const SERIES_FALLBACK_LABEL: &str = "Series";

pub const COMIC_ARCHIVE_EXTENSIONS: &[&str] = &["cbz", "cbr", "cb7", "cbt"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "avif"];

const CONTAINER_TYPES: &[&str] = &[
    "Folder",
    "CollectionFolder",
    "BoxSet",
    "UserView",
    "Series",
    "Season",
];
const LEAF_TYPES: &[&str] = &["Book", "ComicBook", "Comic"];
const COMIC_TYPES: &[&str] = &["ComicBook", "Comic"];

const AUTHOR_KINDS: &[&str] = &["Author", "Writer"];
const ARTIST_KINDS: &[&str] = &[
    "Artist",
    "Penciller",
    "Illustrator",
    "Inker",
    "Colorist",
    "CoverArtist",
];

pub fn label_for(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    NAME_LABEL_RULES
        .iter()
        .find(|rule| (rule.matches)(&lower))
        .map(|rule| rule.label)
}

pub fn decorate_name(name: &str, fallback_label: &str) -> String {
    format!("[{}] {}", label_for(name).unwrap_or(fallback_label), name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Container,
    Leaf,
    Unknown,
}

fn type_in(item: &RemoteItem, types: &[&str]) -> bool {
    item.item_type
        .as_deref()
        .is_some_and(|t| types.iter().any(|known| t.eq_ignore_ascii_case(known)))
}

pub fn classify_item(item: &RemoteItem) -> ItemKind {
    if type_in(item, CONTAINER_TYPES) {
        ItemKind::Container
    } else if type_in(item, LEAF_TYPES) {
        ItemKind::Leaf
    } else {
        ItemKind::Unknown
    }
}

pub fn is_comic_archive(item: &RemoteItem) -> bool {
    if type_in(item, COMIC_TYPES) {
        return true;
    }
    let container_is_archive = item.container.as_deref().is_some_and(|c| {
        COMIC_ARCHIVE_EXTENSIONS
            .iter()
            .any(|ext| c.eq_ignore_ascii_case(ext))
    });
    if container_is_archive {
        return true;
    }
    let lower = item.name.to_lowercase();
    lower.contains("comic")
        || COMIC_ARCHIVE_EXTENSIONS
            .iter()
            .any(|ext| lower.contains(&format!(".{}", ext)))
}

pub fn is_image_file_name(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

pub fn map_series(base_url: &str, item: &RemoteItem) -> SeriesSummary {
    SeriesSummary {
        url: item_ref(&item.id),
        title: decorate_name(&item.name, SERIES_FALLBACK_LABEL),
        thumbnail_url: Some(primary_image_url(base_url, &item.id)),
    }
}

pub fn map_series_details(base_url: &str, item: &RemoteItem) -> SeriesDetails {
    let people = item.people.as_deref().unwrap_or_default();
    SeriesDetails {
        url: item_ref(&item.id),
        title: item.name.clone(),
        thumbnail_url: Some(primary_image_url(base_url, &item.id)),
        description: item
            .overview
            .as_ref()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty()),
        genres: item.genres.clone().unwrap_or_default(),
        author: join_people(people, AUTHOR_KINDS),
        artist: join_people(people, ARTIST_KINDS),
    }
}

fn join_people(people: &[Person], kinds: &[&str]) -> Option<String> {
    let mut names: Vec<&str> = Vec::new();
    for person in people {
        let kind_matches = person
            .kind
            .as_deref()
            .is_some_and(|k| kinds.iter().any(|known| k.eq_ignore_ascii_case(known)));
        if !kind_matches {
            continue;
        }
        if let Some(name) = person.name.as_deref().filter(|n| !n.is_empty()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    (!names.is_empty()).then(|| names.join(", "))
}

/// `position` is 1-based.
pub fn map_chapter(item: &RemoteItem, position: usize) -> ChapterSummary {
    ChapterSummary {
        url: item_ref(&item.id),
        name: decorate_name(&item.name, CHAPTER_FALLBACK_LABEL),
        chapter_number: position as f32,
        date_upload: parse_date_millis(item.date_created.as_deref()),
    }
}

/// A selectable entry standing in for a failed or empty chapter lookup.
pub fn placeholder_chapter(series_ref: &str, message: &str) -> ChapterSummary {
    ChapterSummary {
        url: series_ref.to_string(),
        name: message.to_string(),
        chapter_number: 1.0,
        date_upload: 0,
    }
}

pub fn parse_date_millis(raw: Option<&str>) -> i64 {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}
