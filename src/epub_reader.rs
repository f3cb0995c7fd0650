use crate::error::{IngestError, Result};
use crate::reader::{ImageResource, SourceMetadata};
use rbook::prelude::*;
use rbook::Epub;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct EpubData {
    epub: Epub,
    path: PathBuf,
}

impl EpubData {
    pub fn open(path: &Path) -> Result<Self> {
        let epub = Epub::options()
            .strict(false)
            .open(path)
            .map_err(|e| IngestError::MalformedArchive {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            epub,
            path: path.to_path_buf(),
        })
    }

    pub fn metadata(&self) -> SourceMetadata {
        SourceMetadata {
            title: self.title(),
            authors: self.authors(),
            description: self.description(),
        }
    }

    pub fn title(&self) -> Option<String> {
        self.epub
            .metadata()
            .title()
            .map(|t| t.value().to_string())
    }

    pub fn authors(&self) -> Vec<String> {
        let mut authors = Vec::new();
        for creator in self.epub.metadata().creators() {
            authors.push(creator.value().to_string());
        }
        authors
    }

    pub fn description(&self) -> Option<String> {
        let mut descs = self.epub.metadata().descriptions();
        descs.next().map(|d| d.value().to_string())
    }

    /// Locate the cover image: the declared cover first, then the first image
    /// whose name contains "cover". `None` is not an error.
    pub fn cover_image(&self) -> Result<Option<ImageResource>> {
        let manifest = self.epub.manifest();

        if let Some(entry) = manifest.cover_image() {
            let href = entry.href().to_string();
            debug!(href = %href, "Using declared cover image");
            let data = entry.read_bytes().map_err(|e| self.content_error(&href, e))?;
            return Ok(Some(ImageResource {
                original_href: href,
                data,
            }));
        }

        for entry in manifest.images() {
            let href = entry
                .resource()
                .key()
                .value()
                .unwrap_or("unknown")
                .to_string();

            if !href.to_lowercase().contains("cover") {
                continue;
            }

            debug!(href = %href, "Using cover image found by name");
            let data = entry.read_bytes().map_err(|e| self.content_error(&href, e))?;
            return Ok(Some(ImageResource {
                original_href: href,
                data,
            }));
        }

        Ok(None)
    }

    fn content_error(&self, href: &str, err: impl std::fmt::Display) -> IngestError {
        IngestError::MalformedArchive {
            path: self.path.clone(),
            reason: format!("failed to read {}: {}", href, err),
        }
    }
}
