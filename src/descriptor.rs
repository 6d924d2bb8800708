//! JSON descriptors that make up a patch repository.
//!
//! A repository root holds `repo.js`; every patch directory holds `patch.js`
//! and the generated `files.js` index. All three are plain JSON despite the
//! extension.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const REPO_FILENAME: &str = "repo.js";
pub const PATCH_FILENAME: &str = "patch.js";
pub const FILES_FILENAME: &str = "files.js";

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Invalid JSON in {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DescriptorError {
    fn from_io(path: &Path, e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            DescriptorError::PermissionDenied(path.to_path_buf())
        } else {
            DescriptorError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DescriptorError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Load/save behaviour shared by every descriptor file.
///
/// Output is tab-indented with a trailing newline. Maps are `BTreeMap`
/// backed, so writing the same record twice yields identical bytes.
pub trait JsonDescriptor: Serialize + DeserializeOwned {
    fn from_json(content: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(content)?)
    }

    fn to_json(&self) -> Result<Vec<u8>, DescriptorError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        buf.push(b'\n');
        Ok(buf)
    }

    fn load(path: &Path) -> Result<Self, DescriptorError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DescriptorError::from_io(path, e))?;

        Self::from_json(&content).map_err(|e| match e {
            DescriptorError::Json(source) => DescriptorError::Invalid {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Writes the descriptor atomically: temp file in the same directory,
    /// fsync, rename into place.
    fn save(&self, path: &Path) -> Result<(), DescriptorError> {
        use std::io::Write;

        let content = self.to_json()?;

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| DescriptorError::from_io(parent, e))?;

        temp_file
            .write_all(&content)
            .map_err(|e| DescriptorError::from_io(path, e))?;

        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| DescriptorError::from_io(path, e))?;

        temp_file
            .persist(path)
            .map_err(|e| DescriptorError::from_io(path, e.error))?;

        Ok(())
    }
}

/// Reads a field whose stored value is about to be replaced anyway.
///
/// A value of the wrong shape becomes the default instead of failing the
/// whole descriptor.
fn replaced_on_update<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Top-level `repo.js`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub servers: Vec<String>,
    /// Patch id to patch title. Rebuilt on every run.
    #[serde(default, deserialize_with = "replaced_on_update")]
    pub patches: BTreeMap<String, String>,
    /// Keys this tool does not manage (`neighbors`, ...), kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JsonDescriptor for RepoDescriptor {}

impl RepoDescriptor {
    /// Like `load`, but a missing file yields `Ok(None)`.
    pub fn load_optional(path: &Path) -> Result<Option<Self>, DescriptorError> {
        match Self::load(path) {
            Ok(repo) => Ok(Some(repo)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Per-patch `patch.js`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchDescriptor {
    /// Always overwritten with the directory name.
    #[serde(default, deserialize_with = "replaced_on_update")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Always rebuilt from the repository's servers.
    #[serde(default, deserialize_with = "replaced_on_update")]
    pub servers: Vec<String>,
    /// Inline file list from the old format. Read so it can be dropped,
    /// never written.
    #[serde(default, skip_serializing)]
    pub files: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JsonDescriptor for PatchDescriptor {}

/// Per-patch `files.js`: patch-relative path to CRC-32.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileIndex {
    pub entries: BTreeMap<String, u32>,
}

impl JsonDescriptor for FileIndex {}
