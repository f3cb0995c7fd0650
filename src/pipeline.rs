use crate::archive::{ArchiveRoot, CHAPTERS_DIR, EPUB_FILE};
use crate::converter::{epub_output_path, Converter};
use crate::docx_reader::DocxData;
use crate::epub_reader::EpubData;
use crate::error::{IngestError, Result};
use crate::heading::HeadingMatcher;
use crate::image;
use crate::metadata::{self, BookMeta, Source, DEFAULT_DESCRIPTION};
use crate::reader::SourceMetadata;
use crate::segmenter::{self, Anomaly};
use clap::ValueEnum;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Docx,
    Epub,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Some(Self::Docx),
            "epub" => Some(Self::Epub),
            _ => None,
        }
    }
}

/// How a batch treats word-processor documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocxMode {
    /// Segment into per-chapter HTML
    Split,
    /// Convert to EPUB first, then decompose the EPUB
    Epub,
}

#[derive(Debug)]
pub struct IngestReport {
    pub id: String,
    pub dir: PathBuf,
    pub source: Source,
    pub chapters: usize,
    pub has_cover: bool,
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConvertOutcome {
    Converted(PathBuf),
    /// The EPUB already existed and `force` was not set
    Skipped(PathBuf),
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub ingested: Vec<IngestReport>,
    pub converted: Vec<PathBuf>,
    pub unsupported: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, IngestError)>,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct Pipeline<C> {
    root: ArchiveRoot,
    matcher: HeadingMatcher,
    converter: C,
}

impl<C: Converter> Pipeline<C> {
    pub fn new(root: ArchiveRoot, matcher: HeadingMatcher, converter: C) -> Self {
        Self {
            root,
            matcher,
            converter,
        }
    }

    pub fn root(&self) -> &ArchiveRoot {
        &self.root
    }

    /// Segment a word-processor manuscript into a chapter archive
    pub fn split_docx(&self, path: &Path, id: Option<&str>) -> Result<IngestReport> {
        ensure_exists(path)?;
        info!(path = %path.display(), "Splitting manuscript into chapters");

        let contents = DocxData::open(path)?.read()?;
        let source_meta = contents.metadata;
        let id = match id {
            Some(id) => id.to_string(),
            None => id_from_path(path)?,
        };

        let chapters = segmenter::segment(&contents.paragraphs, &self.matcher);
        let anomalies = segmenter::anomalies(&chapters);
        for anomaly in &anomalies {
            warn!(path = %path.display(), id = %id, "Segmentation anomaly: {}", anomaly);
        }

        let staged = self.root.stage()?;
        for chapter in &chapters {
            let relative = Path::new(CHAPTERS_DIR).join(format!("{}.html", chapter.number));
            staged.write_file(relative, &chapter.content_html)?;
        }

        let entries = metadata::chapter_entries(&chapters);
        let meta = BookMeta {
            id: id.clone(),
            title: source_meta.title_or_default(),
            author: source_meta.author_or_default(),
            description: description_or_default(&source_meta),
            cover_url: None,
            epub_url: None,
            chapters_count: entries.len(),
            chapters: entries,
            source: Source::Docx,
        };
        let dir = staged.commit(&meta)?;

        info!(id = %id, chapters = meta.chapters_count, "Archived manuscript");
        Ok(IngestReport {
            id,
            dir,
            source: Source::Docx,
            chapters: meta.chapters_count,
            has_cover: false,
            anomalies,
        })
    }

    /// Decompose a compiled EPUB: metadata, cover, and the original archive
    pub fn ingest_epub(&self, path: &Path) -> Result<IngestReport> {
        ensure_exists(path)?;
        info!(path = %path.display(), "Ingesting EPUB");

        let epub = EpubData::open(path)?;
        let id = id_from_path(path)?;
        let source_meta = epub.metadata();

        let staged = self.root.stage()?;
        staged.copy_file(path, EPUB_FILE)?;

        let mut meta = BookMeta {
            id: id.clone(),
            title: source_meta.title_or_default(),
            author: source_meta.author_or_default(),
            description: description_or_default(&source_meta),
            cover_url: None,
            epub_url: Some(metadata::epub_download_url(&id)),
            chapters: Vec::new(),
            chapters_count: 0,
            source: Source::Epub,
        };

        let cover = match epub.cover_image() {
            Ok(cover) => cover,
            Err(e) => {
                warn!(path = %path.display(), "Ignoring unreadable cover: {}", e);
                None
            }
        };
        if let Some(ref cover) = cover {
            let filename = image::write_cover(&staged, cover)?;
            meta.set_cover(&filename);
        }

        let dir = staged.commit(&meta)?;

        info!(id = %id, title = %meta.title, cover = cover.is_some(), "Archived EPUB");
        Ok(IngestReport {
            id,
            dir,
            source: Source::Epub,
            chapters: 0,
            has_cover: cover.is_some(),
            anomalies: Vec::new(),
        })
    }

    /// Convert a word-processor document to EPUB next to the source
    pub fn convert(&self, path: &Path, force: bool) -> Result<ConvertOutcome> {
        ensure_exists(path)?;
        if DocumentKind::from_path(path) != Some(DocumentKind::Docx) {
            return Err(IngestError::UnsupportedFormat(path.to_path_buf()));
        }

        let target = epub_output_path(path);
        if target.exists() && !force {
            info!(path = %path.display(), "Skipping conversion, EPUB already exists");
            return Ok(ConvertOutcome::Skipped(target));
        }

        let output = self.converter.convert(path, &target)?;
        info!(path = %path.display(), output = %output.display(), "Converted to EPUB");
        Ok(ConvertOutcome::Converted(output))
    }

    /// Process every document in `dir`, one at a time. A failing document
    /// is recorded and the rest of the batch continues.
    pub fn run_batch(&self, dir: &Path, mode: DocxMode, force: bool) -> Result<BatchSummary> {
        if !dir.is_dir() {
            return Err(IngestError::NotFound(dir.to_path_buf()));
        }

        let mut summary = BatchSummary::default();
        let files = list_documents(dir)?;
        info!(path = %dir.display(), files = files.len(), "Starting batch");

        // docx source -> EPUB the converter produced for it
        let mut produced = HashMap::new();
        if mode == DocxMode::Epub {
            for path in files
                .iter()
                .filter(|p| DocumentKind::from_path(p) == Some(DocumentKind::Docx))
            {
                match self.convert(path, force) {
                    Ok(ConvertOutcome::Converted(out)) => {
                        summary.converted.push(out.clone());
                        produced.insert(path.clone(), out);
                    }
                    Ok(ConvertOutcome::Skipped(out)) => {
                        produced.insert(path.clone(), out);
                    }
                    Err(e) => {
                        error!(path = %path.display(), "{}", e);
                        summary.failures.push((path.clone(), e));
                    }
                }
            }
        }
        let outputs: HashSet<&PathBuf> = produced.values().collect();

        for path in &files {
            let result = match DocumentKind::from_path(path) {
                Some(DocumentKind::Epub) if outputs.contains(path) => continue,
                Some(DocumentKind::Epub) => self.ingest_epub(path),
                Some(DocumentKind::Docx) if mode == DocxMode::Epub => match produced.get(path) {
                    Some(epub) => self.ingest_epub(epub),
                    None => continue,
                },
                Some(DocumentKind::Docx) => self.split_docx(path, None),
                None => {
                    warn!(path = %path.display(), "Skipping unsupported file");
                    summary.unsupported.push(path.clone());
                    continue;
                }
            };

            match result {
                Ok(report) => summary.ingested.push(report),
                Err(e) => {
                    error!(path = %path.display(), "{}", e);
                    summary.failures.push((path.clone(), e));
                }
            }
        }

        info!(
            ingested = summary.ingested.len(),
            converted = summary.converted.len(),
            unsupported = summary.unsupported.len(),
            failed = summary.failures.len(),
            "Batch complete"
        );
        Ok(summary)
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(IngestError::NotFound(path.to_path_buf()));
    }
    Ok(())
}

fn id_from_path(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let id = metadata::slugify(&stem);
    if id.is_empty() {
        return Err(IngestError::InvalidId(stem));
    }
    Ok(id)
}

fn description_or_default(meta: &SourceMetadata) -> String {
    meta.description()
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string())
}

/// Regular, non-hidden files in `dir`, sorted by name
fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        files.push(entry.path());
    }
    files.sort();
    Ok(files)
}
