use super::file_node::FolderEntry;
use std::io;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;
use walkdir::WalkDir;

/*
 * This module provides the filesystem lister consumed by the folder browser:
 * given an absolute directory path it reports the direct children of that
 * directory, unsorted, with the metadata the browser displays. It defines the
 * errors specific to listing, a trait `FolderListerOperations` so the presenter
 * can be tested without touching the disk, and the concrete `CoreFolderLister`.
 * It also holds the display formatting for sizes and modification times.
 */

#[derive(Debug)]
pub enum FileSystemError {
    Io(io::Error),
    Walk(walkdir::Error),
    InvalidPath(PathBuf),
}

impl From<io::Error> for FileSystemError {
    fn from(err: io::Error) -> Self {
        FileSystemError::Io(err)
    }
}

impl From<walkdir::Error> for FileSystemError {
    fn from(err: walkdir::Error) -> Self {
        FileSystemError::Walk(err)
    }
}

impl std::fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSystemError::Io(e) => write!(f, "I/O error: {e}"),
            FileSystemError::Walk(e) => write!(f, "Directory read error: {e}"),
            FileSystemError::InvalidPath(p) => write!(f, "Not a readable directory: {p:?}"),
        }
    }
}

impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileSystemError::Io(e) => Some(e),
            FileSystemError::Walk(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileSystemError>;

/*
 * Lists the direct children of a directory. Implementations report an
 * unreadable directory as an error rather than an empty listing, so the caller
 * can keep its previous state.
 */
pub trait FolderListerOperations: Send + Sync {
    fn list_folder(&self, path: &Path) -> Result<Vec<FolderEntry>>;
}

pub struct CoreFolderLister {}

impl CoreFolderLister {
    pub fn new() -> Self {
        CoreFolderLister {}
    }
}

impl Default for CoreFolderLister {
    fn default() -> Self {
        Self::new()
    }
}

impl FolderListerOperations for CoreFolderLister {
    /*
     * Reads exactly one level below `path`. Symbolic links are followed so a
     * link to a directory shows up as a directory. A failure on the directory
     * itself aborts the listing; a failure on a single entry (for example a
     * dangling link) is logged and that entry is skipped.
     */
    fn list_folder(&self, path: &Path) -> Result<Vec<FolderEntry>> {
        if !path.is_dir() {
            return Err(FileSystemError::InvalidPath(path.to_path_buf()));
        }
        log::debug!("FolderLister: Listing {path:?}");

        let mut entries = Vec::new();
        for entry_result in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    log::warn!("FolderLister: Skipping unreadable entry in {path:?}: {e}");
                    continue;
                }
            };

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    log::warn!(
                        "FolderLister: Skipping {:?}, metadata unavailable: {e}",
                        entry.path()
                    );
                    continue;
                }
            };

            entries.push(FolderEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: metadata.is_dir(),
                size_bytes: if metadata.is_dir() { 0 } else { metadata.len() },
                modified: metadata.modified().ok().map(OffsetDateTime::from),
            });
        }

        log::debug!("FolderLister: Found {} entries in {path:?}", entries.len());
        Ok(entries)
    }
}

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/*
 * Human readable size with binary multiples and at most two decimals,
 * e.g. `0 Bytes`, `512 Bytes`, `1.5 KB`, `3 MB`.
 */
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", SIZE_UNITS[unit])
}

/*
 * Formats a modification time as `YYYY-MM-DD HH:MM:SS` (UTC), or `-` when the
 * platform did not report one.
 */
pub fn format_modified(modified: Option<OffsetDateTime>) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    modified
        .and_then(|dt| dt.format(&format).ok())
        .unwrap_or_else(|| "-".to_string())
}
