use crate::archive::{StagedArchive, CHAPTERS_DIR, EPUB_FILE, META_FILE};
use crate::error::Result;
use crate::reader::ImageResource;
use std::path::Path;

/// Write the cover into the archive under its original file name.
/// Returns the file name used.
pub fn write_cover(staged: &StagedArchive, cover: &ImageResource) -> Result<String> {
    let filename = cover_filename(&cover.original_href);
    staged.write_file(&filename, &cover.data)?;
    Ok(filename)
}

fn cover_filename(href: &str) -> String {
    let name = clean_filename(href);
    if name == META_FILE || name == EPUB_FILE || name == CHAPTERS_DIR {
        format!("cover-{}", name)
    } else {
        name
    }
}

fn clean_filename(href: &str) -> String {
    Path::new(href)
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .filter(|f| !f.starts_with('.'))
        .unwrap_or_else(|| "cover.bin".to_string())
}
