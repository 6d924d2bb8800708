use crate::descriptor::{DescriptorError, JsonDescriptor, REPO_FILENAME, RepoDescriptor};
use crate::patch::{PatchError, build_patch};
use crate::patch_files::{PatchFilesError, find_patch_ids};
use crate::prompt::{PromptError, Prompter, enter_missing, enter_missing_server};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),
    #[error("Patch discovery error: {0}")]
    Files(#[from] PatchFilesError),
    #[error("Patch {id}: {source}")]
    Patch { id: String, source: PatchError },
    #[error("Failed to create destination directory {path}: {source}")]
    CreateDest {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Source and destination repository roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    pub source: PathBuf,
    pub dest: PathBuf,
    /// Both roots name the same directory, so nothing is mirrored and every
    /// "write to both" happens once.
    pub same: bool,
}

impl Roots {
    /// Paths are compared literally first, then by canonical form if both
    /// exist. A destination that does not exist yet is never the source.
    pub fn new(source: PathBuf, dest: PathBuf) -> Self {
        let same = source == dest
            || matches!(
                (source.canonicalize(), dest.canonicalize()),
                (Ok(s), Ok(d)) if s == d
            );
        Roots { source, dest, same }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoSummary {
    pub patches: usize,
    pub files: usize,
    pub total_size: u64,
}

fn save_to_roots(repo: &RepoDescriptor, roots: &Roots) -> Result<(), DescriptorError> {
    repo.save(&roots.source.join(REPO_FILENAME))?;
    if !roots.same {
        repo.save(&roots.dest.join(REPO_FILENAME))?;
    }
    Ok(())
}

/// Loads `repo.js` (or starts a new one), fills in required fields, rebuilds
/// every patch under the source root and writes `repo.js` to both roots.
///
/// The `patches` map is rebuilt from the directories found on this run;
/// entries for patches whose directories are gone do not survive.
pub fn build_repository(
    roots: &Roots,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<RepoSummary, RepoError> {
    if !roots.same {
        std::fs::create_dir_all(&roots.dest).map_err(|source| RepoError::CreateDest {
            path: roots.dest.clone(),
            source,
        })?;
    }

    let repo_path = roots.source.join(REPO_FILENAME);
    let mut repo = match RepoDescriptor::load_optional(&repo_path)? {
        Some(repo) => repo,
        None => {
            info!("{} does not exist", repo_path.display());
            writeln!(
                out,
                "No {REPO_FILENAME} found in the source directory. Creating a new repository."
            )?;
            RepoDescriptor::default()
        }
    };

    enter_missing(&mut repo.id, "Enter a repository ID: ", prompter)?;
    enter_missing(&mut repo.title, "Enter a nice repository title: ", prompter)?;
    enter_missing(
        &mut repo.contact,
        "Enter a contact e-mail address: ",
        prompter,
    )?;

    // Checkpoint, so the answers above survive a failure further down.
    save_to_roots(&repo, roots)?;

    enter_missing_server(
        &mut repo.servers,
        "Enter the public URL of your repository (the path that contains repo.js): ",
        prompter,
    )?;

    repo.patches.clear();
    let mut summary = RepoSummary::default();

    for patch_id in find_patch_ids(&roots.source)? {
        let patch = build_patch(&patch_id, &repo.servers, roots, prompter, out).map_err(
            |source| RepoError::Patch {
                id: patch_id.clone(),
                source,
            },
        )?;

        summary.patches += 1;
        summary.files += patch.file_count;
        summary.total_size += patch.total_size;
        repo.patches.insert(patch_id, patch.title);
    }

    save_to_roots(&repo, roots)?;

    info!(
        "Processed {} patches, {} files",
        summary.patches, summary.files
    );

    Ok(summary)
}
