//! Program artifacts
//!
//! A program artifact is a tar archive, optionally gzip-compressed. The
//! gateway never unpacks it; it only checks that the bytes decode as a tar
//! stream with at least one entry. The CLI uses [`pack_directory`] to build
//! one from a local source tree.

use flate2::read::GzDecoder;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors raised while inspecting or packing an artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact is empty")]
    Empty,

    #[error("not a tar archive: {0}")]
    NotTar(String),

    #[error("tar archive contains no entries")]
    NoEntries,

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What [`inspect`] learned about a valid archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub entries: usize,
    pub compressed: bool,
}

/// Check that `data` is a readable tar archive.
pub fn inspect(data: &[u8]) -> Result<ArchiveSummary, ArtifactError> {
    if data.is_empty() {
        return Err(ArtifactError::Empty);
    }

    let compressed = data.starts_with(&GZIP_MAGIC);
    let entries = if compressed {
        count_entries(GzDecoder::new(data))?
    } else {
        count_entries(data)?
    };

    if entries == 0 {
        return Err(ArtifactError::NoEntries);
    }

    Ok(ArchiveSummary {
        entries,
        compressed,
    })
}

fn count_entries<R: Read>(reader: R) -> Result<usize, ArtifactError> {
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| ArtifactError::NotTar(e.to_string()))?;

    let mut count = 0;
    for entry in entries {
        let entry = entry.map_err(|e| ArtifactError::NotTar(e.to_string()))?;
        entry
            .path()
            .map_err(|e| ArtifactError::NotTar(e.to_string()))?;
        count += 1;
    }

    Ok(count)
}

/// Pack the contents of `dir` into an uncompressed tar archive.
///
/// Entries are rooted at `.` so the archive unpacks into the working
/// directory. Symlinks are stored as links, not followed.
pub fn pack_directory(dir: &Path) -> Result<Vec<u8>, ArtifactError> {
    if !dir.is_dir() {
        return Err(ArtifactError::NotADirectory(dir.display().to_string()));
    }

    let mut builder = tar::Builder::new(Vec::new());
    builder.follow_symlinks(false);
    builder.append_dir_all(".", dir)?;
    Ok(builder.into_inner()?)
}
