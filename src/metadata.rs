use crate::segmenter::Chapter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_DESCRIPTION: &str = "Importado automáticamente";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Docx,
    Epub,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterEntry {
    pub number: u32,
    pub title: String,
}

/// The `meta.json` record of one book archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMeta {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epub_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chapters: Vec<ChapterEntry>,
    #[serde(default)]
    pub chapters_count: usize,
    pub source: Source,
}

impl BookMeta {
    pub fn set_cover(&mut self, file_name: &str) {
        self.cover_url = Some(format!("/cover/{}", file_name));
    }
}

/// Chapter listing in ascending number, one entry per number.
/// A repeated number keeps its last occurrence, matching the file on disk.
pub fn chapter_entries(chapters: &[Chapter]) -> Vec<ChapterEntry> {
    let mut by_number = BTreeMap::new();
    for chapter in chapters {
        by_number.insert(chapter.number, chapter.title.clone());
    }
    by_number
        .into_iter()
        .map(|(number, title)| ChapterEntry { number, title })
        .collect()
}

pub fn epub_download_url(id: &str) -> String {
    format!("/api/books/{}/download", id)
}

/// Archive id from a source file stem: lower-cased, runs of spaces,
/// underscores and hyphens collapsed to a single `-`.
pub fn slugify(stem: &str) -> String {
    let mut slug = String::with_capacity(stem.len());
    let mut pending_separator = false;

    for c in stem.trim().chars().flat_map(char::to_lowercase) {
        if c == ' ' || c == '_' || c == '-' || c.is_whitespace() {
            pending_separator = true;
            continue;
        }
        if pending_separator && !slug.is_empty() {
            slug.push('-');
        }
        pending_separator = false;
        slug.push(c);
    }

    slug
}
