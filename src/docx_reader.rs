use crate::error::{IngestError, Result};
use crate::reader::SourceMetadata;
use docx_rust::document::{BodyContent, Paragraph, ParagraphContent, Run, RunContent};
use docx_rust::{Docx, DocxFile};
use std::path::{Path, PathBuf};

pub struct DocxData {
    /// DocxFile owns the raw data; Docx borrows from it.
    file: DocxFile,
    path: PathBuf,
}

impl DocxData {
    pub fn open(path: &Path) -> Result<Self> {
        let file = DocxFile::from_file(path).map_err(|e| IngestError::MalformedDocument {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Parse the document once and read both its body and its core properties.
    pub fn read(&self) -> Result<DocxContents> {
        let docx = self.file.parse().map_err(|e| IngestError::MalformedDocument {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(DocxContents {
            paragraphs: paragraphs(&docx),
            metadata: metadata(&docx),
        })
    }
}

pub struct DocxContents {
    pub paragraphs: Vec<String>,
    pub metadata: SourceMetadata,
}

/// Body paragraphs as plain text, in document order.
/// Content controls are flattened; tables are not paragraphs of the manuscript.
fn paragraphs(docx: &Docx) -> Vec<String> {
    let mut paragraphs = Vec::new();
    for content in &docx.document.body.content {
        collect_body_content(content, &mut paragraphs);
    }
    paragraphs
}

fn metadata(docx: &Docx) -> SourceMetadata {
    // Core has namespaced and non-namespaced variants with the same fields
    let (title, creator, description) = match &docx.core {
        Some(docx_rust::core::Core::CoreNamespace(c)) => (
            c.title.as_deref().map(|s| s.to_string()),
            c.creator.as_deref().map(|s| s.to_string()),
            c.description.as_deref().map(|s| s.to_string()),
        ),
        Some(docx_rust::core::Core::CoreNoNamespace(c)) => (
            c.title.as_deref().map(|s| s.to_string()),
            c.creator.as_deref().map(|s| s.to_string()),
            c.description.as_deref().map(|s| s.to_string()),
        ),
        None => (None, None, None),
    };

    SourceMetadata {
        title,
        authors: creator.into_iter().collect(),
        description,
    }
}

fn collect_body_content(content: &BodyContent, out: &mut Vec<String>) {
    match content {
        BodyContent::Paragraph(para) => out.push(paragraph_text(para)),
        BodyContent::Sdt(sdt) => {
            if let Some(ref sdt_content) = sdt.content {
                for item in &sdt_content.content {
                    collect_body_content(item, out);
                }
            }
        }
        _ => {}
    }
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();

    for pc in &para.content {
        match pc {
            ParagraphContent::Run(run) => push_run_text(run, &mut text),
            ParagraphContent::Link(link) => {
                if let Some(ref run) = link.content {
                    push_run_text(run, &mut text);
                }
            }
            _ => {}
        }
    }

    text
}

fn push_run_text(run: &Run, text: &mut String) {
    for rc in &run.content {
        match rc {
            RunContent::Text(t) => text.push_str(&t.text),
            RunContent::Tab(_) => text.push('\t'),
            RunContent::Break(_) => text.push(' '),
            _ => {}
        }
    }
}
