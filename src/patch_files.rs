//! Directory discovery for a patch repository.
//!
//! Two walks live here: the shallow one over the repository root that finds
//! patch directories, and the recursive one over a single patch directory
//! that yields its payload files.

use crate::descriptor::{FILES_FILENAME, PATCH_FILENAME, REPO_FILENAME};
use crate::util::slash_path::relative_slash_path;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, thiserror::Error)]
pub enum PatchFilesError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),
}

impl PatchFilesError {
    fn from_io(path: &Path, e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            PatchFilesError::PermissionDenied(path.to_path_buf())
        } else {
            PatchFilesError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    }

    fn from_walk(root: &Path, e: walkdir::Error) -> Self {
        let path = e.path().unwrap_or(root).to_path_buf();
        let io = e.into_io_error().unwrap_or_else(|| {
            std::io::Error::other("filesystem loop while walking patch directory")
        });
        Self::from_io(&path, io)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFile {
    /// Patch-relative path with `/` separators; the key used in `files.js`.
    pub relative_path: String,
    pub full_path: PathBuf,
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Whether a file named `name` belongs to a patch's payload.
///
/// Descriptor files and hidden files are bookkeeping, not payload.
pub fn is_patch_file(name: &str) -> bool {
    !matches!(name, REPO_FILENAME | PATCH_FILENAME | FILES_FILENAME) && !is_hidden(name)
}

fn entry_name(entry: &DirEntry) -> Option<&str> {
    entry.file_name().to_str()
}

/// Lists the ids of all patches directly under `root`, sorted by name.
///
/// A patch is an immediate, non-hidden subdirectory that contains
/// `patch.js`.
pub fn find_patch_ids(root: &Path) -> Result<Vec<String>, PatchFilesError> {
    let mut ids = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| PatchFilesError::from_walk(root, e))?;
        if !entry.file_type().is_dir() {
            continue;
        }

        if !entry.path().join(PATCH_FILENAME).is_file() {
            continue;
        }

        let Some(name) = entry_name(&entry) else {
            return Err(PatchFilesError::NonUtf8Path(entry.path().to_path_buf()));
        };
        if !is_hidden(name) {
            ids.push(name.to_string());
        }
    }

    Ok(ids)
}

/// Recursively lists the payload files of the patch at `patch_dir`.
///
/// Hidden directories are not descended into. Entries come back sorted by
/// file name at each level, so repeated runs visit files in the same order.
pub fn list_patch_files(patch_dir: &Path) -> Result<Vec<PatchFile>, PatchFilesError> {
    let mut files = Vec::new();

    let walker = WalkDir::new(patch_dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || entry_name(e).is_none_or(|n| !is_hidden(n)));

    for entry in walker {
        let entry = entry.map_err(|e| PatchFilesError::from_walk(patch_dir, e))?;
        if entry.file_type().is_dir() {
            continue;
        }

        let Some(name) = entry_name(&entry) else {
            return Err(PatchFilesError::NonUtf8Path(entry.path().to_path_buf()));
        };
        if !is_patch_file(name) {
            continue;
        }

        let full_path = entry.path().to_path_buf();
        let relative = full_path
            .strip_prefix(patch_dir)
            .map_err(|_| PatchFilesError::NonUtf8Path(full_path.clone()))?;
        let relative_path = relative_slash_path(relative)
            .ok_or_else(|| PatchFilesError::NonUtf8Path(full_path.clone()))?;

        files.push(PatchFile {
            relative_path,
            full_path,
        });
    }

    Ok(files)
}
