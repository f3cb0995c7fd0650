use crate::archive::ArchiveRoot;
use crate::converter::PandocConverter;
use crate::heading::HeadingMatcher;
use crate::pipeline::{BatchSummary, ConvertOutcome, DocxMode, IngestReport, Pipeline};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

/// Ingest DOCX manuscripts and EPUB archives into a servable book archive
#[derive(Parser, Debug)]
#[command(name = "manuscript-ingest", version, about)]
pub struct Cli {
    /// Directory holding one folder per book
    #[arg(long, global = true, env = "BOOKS_DIR", default_value = "data/books")]
    pub archive_root: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a .docx manuscript into per-chapter HTML
    Split {
        /// Path to the input .docx file
        input: PathBuf,

        /// Archive id to use instead of the slug of the file name
        #[arg(long)]
        id: Option<String>,

        /// Chapter heading marker word (repeatable). Defaults to CAPÍTULO/CAPITULO.
        #[arg(long = "marker")]
        markers: Vec<String>,
    },

    /// Archive compiled EPUB files as-is, with metadata and cover
    Epub {
        /// EPUB files to ingest
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Convert .docx files to EPUB next to the source
    Convert {
        /// .docx files to convert
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Reconvert even when the EPUB already exists
        #[arg(long, default_value_t = false)]
        force: bool,

        /// pandoc executable
        #[arg(long, env = "PANDOC", default_value = "pandoc")]
        pandoc: PathBuf,
    },

    /// Ingest every document in a source directory
    Batch {
        /// Directory with the source documents
        #[arg(env = "SOURCE_DOCS", default_value = "data/source_docs")]
        source_dir: PathBuf,

        /// How .docx files are ingested
        #[arg(long, value_enum, default_value_t = DocxMode::Split)]
        docx_mode: DocxMode,

        /// Reconvert .docx files even when the EPUB already exists
        #[arg(long, default_value_t = false)]
        force: bool,

        /// pandoc executable
        #[arg(long, env = "PANDOC", default_value = "pandoc")]
        pandoc: PathBuf,

        /// Chapter heading marker word (repeatable)
        #[arg(long = "marker")]
        markers: Vec<String>,
    },

    /// List the books in the archive
    List,
}

pub fn run(cli: Cli) -> Result<()> {
    let root = ArchiveRoot::new(&cli.archive_root);

    match cli.command {
        Command::Split { input, id, markers } => {
            let pipeline = Pipeline::new(root, matcher(&markers)?, PandocConverter::default());
            let report = pipeline.split_docx(&input, id.as_deref())?;
            print_report(&report);
        }
        Command::Epub { inputs } => {
            let pipeline =
                Pipeline::new(root, HeadingMatcher::default(), PandocConverter::default());
            let mut failed = 0;
            for input in &inputs {
                match pipeline.ingest_epub(input) {
                    Ok(report) => print_report(&report),
                    Err(e) => {
                        error!(path = %input.display(), "{}", e);
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                bail!("{} of {} EPUB files failed", failed, inputs.len());
            }
        }
        Command::Convert {
            inputs,
            force,
            pandoc,
        } => {
            let pipeline = Pipeline::new(root, HeadingMatcher::default(), PandocConverter::new(pandoc));
            let mut failed = 0;
            for input in &inputs {
                match pipeline.convert(input, force) {
                    Ok(ConvertOutcome::Converted(out)) => println!("{}", out.display()),
                    Ok(ConvertOutcome::Skipped(out)) => println!("{} (exists)", out.display()),
                    Err(e) => {
                        error!(path = %input.display(), "{}", e);
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                bail!("{} of {} conversions failed", failed, inputs.len());
            }
        }
        Command::Batch {
            source_dir,
            docx_mode,
            force,
            pandoc,
            markers,
        } => {
            let pipeline = Pipeline::new(root, matcher(&markers)?, PandocConverter::new(pandoc));
            let summary = pipeline
                .run_batch(&source_dir, docx_mode, force)
                .with_context(|| format!("Failed to process {}", source_dir.display()))?;
            print_summary(&summary);
            if summary.has_failures() {
                bail!("{} document(s) failed", summary.failures.len());
            }
        }
        Command::List => {
            let books = root
                .catalog()
                .with_context(|| format!("Failed to read {}", root.path().display()))?;
            for book in &books {
                println!(
                    "{}\t{}\t{}\t{}\t{:?}",
                    book.id, book.title, book.author, book.chapters_count, book.source
                );
            }
        }
    }

    Ok(())
}

fn matcher(markers: &[String]) -> Result<HeadingMatcher> {
    if markers.is_empty() {
        return Ok(HeadingMatcher::default());
    }
    HeadingMatcher::new(markers).context("Invalid heading marker")
}

fn print_report(report: &IngestReport) {
    let mut line = format!("{} [{:?}] -> {}", report.id, report.source, report.dir.display());
    if report.chapters > 0 {
        line.push_str(&format!(" ({} chapters)", report.chapters));
    }
    if report.has_cover {
        line.push_str(" [cover]");
    }
    for anomaly in &report.anomalies {
        line.push_str(&format!("\n  warning: {}", anomaly));
    }
    println!("{}", line);
}

fn print_summary(summary: &BatchSummary) {
    for report in &summary.ingested {
        print_report(report);
    }
    for path in &summary.unsupported {
        println!("skipped (unsupported): {}", path.display());
    }
    for (path, err) in &summary.failures {
        println!("failed: {}: {}", path.display(), err);
    }
    println!(
        "{} ingested, {} converted, {} skipped, {} failed",
        summary.ingested.len(),
        summary.converted.len(),
        summary.unsupported.len(),
        summary.failures.len()
    );
}
