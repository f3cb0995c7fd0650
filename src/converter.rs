use crate::error::IngestError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConverterError {
    #[error("converter '{program}' could not be started")]
    Unavailable { program: String },

    #[error("conversion of {} failed: {reason}", .input.display())]
    Failed { input: PathBuf, reason: String },
}

impl From<ConverterError> for IngestError {
    fn from(err: ConverterError) -> Self {
        match err {
            ConverterError::Unavailable { program } => IngestError::ConverterUnavailable { program },
            ConverterError::Failed { input, reason } => IngestError::ConversionFailed {
                path: input,
                reason,
            },
        }
    }
}

/// Document-to-EPUB conversion capability
pub trait Converter {
    /// Convert `input`, asking for the EPUB at `output`. Returns the path
    /// the compiled EPUB was actually written to.
    fn convert(&self, input: &Path, output: &Path) -> Result<PathBuf, ConverterError>;
}

/// Default EPUB location for a source: next to it, same stem
pub fn epub_output_path(input: &Path) -> PathBuf {
    input.with_extension("epub")
}

/// Runs an external `pandoc` binary
pub struct PandocConverter {
    program: PathBuf,
}

impl PandocConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

impl Converter for PandocConverter {
    fn convert(&self, input: &Path, output_path: &Path) -> Result<PathBuf, ConverterError> {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        info!(
            path = %input.display(),
            output = %output_path.display(),
            "Converting to EPUB with pandoc"
        );

        let output = Command::new(&self.program)
            .arg(input)
            .arg("-o")
            .arg(output_path)
            .arg("--toc")
            .arg(format!("--metadata=title:{}", stem))
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    ConverterError::Unavailable {
                        program: self.program.display().to_string(),
                    }
                } else {
                    ConverterError::Failed {
                        input: input.to_path_buf(),
                        reason: e.to_string(),
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConverterError::Failed {
                input: input.to_path_buf(),
                reason: format!("{} ({})", stderr.trim(), output.status),
            });
        }

        Ok(output_path.to_path_buf())
    }
}
