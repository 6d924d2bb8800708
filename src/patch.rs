use crate::checksum::{ChecksumError, checksum_file};
use crate::descriptor::{
    DescriptorError, FILES_FILENAME, FileIndex, JsonDescriptor, PATCH_FILENAME, PatchDescriptor,
};
use crate::patch_files::{PatchFilesError, list_patch_files};
use crate::prompt::{PromptError, Prompter, enter_missing};
use crate::repo::Roots;
use crate::util::human_size::format_size;
use crate::util::slash_path::join_url_dir;
use filetime::FileTime;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("Patch descriptor not found: {0}")]
    MissingDescriptor(PathBuf),
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),
    #[error("Directory walk error: {0}")]
    Files(#[from] PatchFilesError),
    #[error("Checksum error: {0}")]
    Checksum(#[from] ChecksumError),
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write progress output: {0}")]
    Output(std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSummary {
    /// Title to record under this patch in `repo.js`.
    pub title: String,
    pub file_count: usize,
    pub total_size: u64,
}

/// Derives a patch's download URLs from the repository's, keeping order.
pub fn patch_servers(repo_servers: &[String], patch_id: &str) -> Vec<String> {
    repo_servers
        .iter()
        .map(|base| join_url_dir(base, patch_id))
        .collect()
}

/// Brings `patch.js` in line with its directory and repository: prompts for a
/// missing title, overwrites `id` and `servers`, drops the legacy inline
/// file list.
pub fn normalize_descriptor(
    patch: &mut PatchDescriptor,
    patch_id: &str,
    repo_servers: &[String],
    prompter: &mut dyn Prompter,
) -> Result<(), PromptError> {
    enter_missing(
        &mut patch.title,
        &format!("Enter a nice title for \"{patch_id}\": "),
        prompter,
    )?;

    if patch.id != patch_id {
        debug!("Patch id {:?} replaced by directory name {patch_id}", patch.id);
    }
    patch.id = patch_id.to_string();
    patch.servers = patch_servers(repo_servers, patch_id);

    if patch.files.take().is_some() {
        info!("Dropped obsolete \"files\" list from {patch_id}/{PATCH_FILENAME}");
    }

    Ok(())
}

fn create_dir_all(path: &Path) -> Result<(), PatchError> {
    std::fs::create_dir_all(path).map_err(|source| PatchError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Copies `from` over `to`, then carries the access and modification times
/// across.
fn copy_preserving_times(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::copy(from, to)?;
    let metadata = std::fs::metadata(from)?;
    filetime::set_file_times(
        to,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )
}

/// Updates the patch in `<source>/<patch_id>`.
///
/// # Behavior
///
/// - `patch.js` must exist; a missing one is fatal
///   ([`PatchError::MissingDescriptor`]).
/// - The normalized `patch.js` is written back to the source tree only.
/// - `files.js` is rebuilt from scratch and written to both the source and
///   destination patch directories.
/// - When the roots differ, every payload file is copied to the destination,
///   overwriting what is there.
/// - A progress line `<id>...<n> files, <size>` (one dot per file) is
///   written to `out`.
///
/// Nothing is rolled back on error; files already written stay written.
pub fn build_patch(
    patch_id: &str,
    repo_servers: &[String],
    roots: &Roots,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<PatchSummary, PatchError> {
    let source_dir = roots.source.join(patch_id);
    let dest_dir = roots.dest.join(patch_id);

    info!("Building patch {patch_id}");

    let patch_path = source_dir.join(PATCH_FILENAME);
    let mut patch = PatchDescriptor::load(&patch_path).map_err(|e| {
        if e.is_not_found() {
            PatchError::MissingDescriptor(patch_path.clone())
        } else {
            PatchError::Descriptor(e)
        }
    })?;

    normalize_descriptor(&mut patch, patch_id, repo_servers, prompter)?;
    patch.save(&patch_path)?;

    let files = list_patch_files(&source_dir)?;

    write!(out, "{patch_id}").map_err(PatchError::Output)?;

    let mut index = FileIndex::default();
    let mut total_size = 0u64;

    for file in &files {
        write!(out, ".").map_err(PatchError::Output)?;
        out.flush().map_err(PatchError::Output)?;

        let checksum = checksum_file(&file.full_path)?;
        index
            .entries
            .insert(file.relative_path.clone(), checksum.crc32);
        total_size += checksum.size;

        let dest_file = dest_dir.join(&file.relative_path);
        if let Some(parent) = dest_file.parent() {
            create_dir_all(parent)?;
        }

        if !roots.same {
            debug!(
                "Copying {} to {}",
                file.full_path.display(),
                dest_file.display()
            );
            copy_preserving_times(&file.full_path, &dest_file).map_err(|source| {
                PatchError::Copy {
                    from: file.full_path.clone(),
                    to: dest_file.clone(),
                    source,
                }
            })?;
        }
    }

    index.save(&source_dir.join(FILES_FILENAME))?;
    if !roots.same {
        create_dir_all(&dest_dir)?;
        index.save(&dest_dir.join(FILES_FILENAME))?;
    }

    writeln!(
        out,
        "{} files, {}",
        index.entries.len(),
        format_size(total_size)
    )
    .map_err(PatchError::Output)?;

    Ok(PatchSummary {
        title: patch.title,
        file_count: index.entries.len(),
        total_size,
    })
}
