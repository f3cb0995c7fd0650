//! Book-archive directories under the archive root.
//!
//! Every archive is built in a hidden staging directory next to its final
//! location and swapped in by rename, so readers of the root never see a
//! half-written book.

use crate::error::{IngestError, Result};
use crate::metadata::BookMeta;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

pub const META_FILE: &str = "meta.json";
pub const CHAPTERS_DIR: &str = "chapters";
pub const EPUB_FILE: &str = "book.epub";

const STAGING_PREFIX: &str = ".staging-";
const TRASH_PREFIX: &str = ".trash-";

#[derive(Debug, Clone)]
pub struct ArchiveRoot {
    root: PathBuf,
}

impl ArchiveRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn book_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Start a new archive. Nothing is visible under the root until commit.
    pub fn stage(&self) -> Result<StagedArchive> {
        fs::create_dir_all(&self.root)?;
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.root)?;
        Ok(StagedArchive {
            root: self.root.clone(),
            dir,
        })
    }

    pub fn load_meta(&self, id: &str) -> Result<Option<BookMeta>> {
        validate_id(id)?;
        let path = self.book_dir(id).join(META_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&data)?))
    }

    /// Metadata of every committed archive, sorted by id.
    /// Directories without a readable `meta.json` are skipped.
    pub fn catalog(&self) -> Result<Vec<BookMeta>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            ids.push(name);
        }
        ids.sort();

        let mut books = Vec::new();
        for id in ids {
            match self.load_meta(&id) {
                Ok(Some(meta)) => books.push(meta),
                Ok(None) => debug!(id = %id, "Skipping directory without meta.json"),
                Err(e) => warn!(id = %id, "Skipping unreadable archive: {}", e),
            }
        }
        Ok(books)
    }
}

/// An archive under construction. Dropping it without commit discards it.
pub struct StagedArchive {
    root: PathBuf,
    dir: TempDir,
}

impl StagedArchive {
    /// Write a file at a path relative to the archive directory
    pub fn write_file(&self, relative: impl AsRef<Path>, data: impl AsRef<[u8]>) -> Result<PathBuf> {
        let dest = self.dir.path().join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, data)?;
        Ok(dest)
    }

    pub fn copy_file(&self, source: &Path, relative: impl AsRef<Path>) -> Result<PathBuf> {
        let dest = self.dir.path().join(relative);
        fs::copy(source, &dest)?;
        Ok(dest)
    }

    /// Write `meta.json` and replace any archive with the same id.
    pub fn commit(self, meta: &BookMeta) -> Result<PathBuf> {
        validate_id(&meta.id)?;

        let json = serde_json::to_vec_pretty(meta)?;
        fs::write(self.dir.path().join(META_FILE), json)?;

        // staging directories are created owner-only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(self.dir.path(), fs::Permissions::from_mode(0o755))?;
        }

        let dest = self.root.join(&meta.id);
        let trash = self.root.join(format!("{}{}", TRASH_PREFIX, meta.id));

        let previous = if dest.exists() {
            if trash.exists() {
                fs::remove_dir_all(&trash)?;
            }
            fs::rename(&dest, &trash)?;
            Some(trash)
        } else {
            None
        };

        let staged = self.dir.keep();

        if let Err(e) = fs::rename(&staged, &dest) {
            if let Some(ref old) = previous {
                if let Err(restore) = fs::rename(old, &dest) {
                    warn!(id = %meta.id, "Failed to restore previous archive: {}", restore);
                }
            }
            let _ = fs::remove_dir_all(&staged);
            return Err(e.into());
        }

        if let Some(old) = previous {
            if let Err(e) = fs::remove_dir_all(&old) {
                warn!(path = %old.display(), "Failed to remove replaced archive: {}", e);
            }
        }

        Ok(dest)
    }
}

fn validate_id(id: &str) -> Result<()> {
    let bad = id.is_empty()
        || id.starts_with('.')
        || id.contains('/')
        || id.contains('\\')
        || Path::new(id).components().count() != 1;
    if bad {
        return Err(IngestError::InvalidId(id.to_string()));
    }
    Ok(())
}
