use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
}

impl ChecksumError {
    fn from_io(path: &Path, e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ChecksumError::PermissionDenied(path.to_path_buf())
        } else {
            ChecksumError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileChecksum {
    pub crc32: u32,
    /// Number of bytes fed through the hasher.
    pub size: u64,
}

/// Computes the CRC-32 (IEEE) of a file's raw contents.
///
/// The file is streamed in fixed-size chunks, so memory use does not depend
/// on file size. The returned `size` is the number of bytes actually read,
/// not the size reported by metadata.
pub fn checksum_file(path: &Path) -> Result<FileChecksum, ChecksumError> {
    let mut file = File::open(path).map_err(|e| ChecksumError::from_io(path, e))?;
    let mut hasher = crc32fast::Hasher::new();
    let mut buffer = [0u8; 8192];
    let mut size = 0u64;

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| ChecksumError::from_io(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        size += bytes_read as u64;
    }

    let crc32 = hasher.finalize();

    debug!("Checksum of {} is {:08x}", path.display(), crc32);

    Ok(FileChecksum { crc32, size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_checksum_known_value() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"123456789").unwrap();
        temp_file.flush().unwrap();

        let result = checksum_file(temp_file.path()).unwrap();

        // Standard CRC-32/ISO-HDLC check value.
        assert_eq!(result.crc32, 0xcbf4_3926);
        assert_eq!(result.size, 9);
    }

    #[test]
    fn test_checksum_empty_file() {
        let temp_file = NamedTempFile::new().unwrap();

        let result = checksum_file(temp_file.path()).unwrap();

        assert_eq!(result.crc32, 0);
        assert_eq!(result.size, 0);
    }

    #[test]
    fn test_checksum_spans_multiple_chunks() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let content: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        temp_file.write_all(&content).unwrap();
        temp_file.flush().unwrap();

        let result = checksum_file(temp_file.path()).unwrap();

        assert_eq!(result.crc32, crc32fast::hash(&content));
        assert_eq!(result.size, content.len() as u64);
    }

    #[test]
    fn test_checksum_nonexistent_file() {
        let result = checksum_file(Path::new("/nonexistent/file.dat"));

        match result {
            Err(ChecksumError::Io { path, .. }) => {
                assert_eq!(path, Path::new("/nonexistent/file.dat"));
            }
            _ => panic!("Expected IO error for nonexistent file"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_checksum_permission_denied() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"test content").unwrap();
        temp_file.flush().unwrap();

        let mut perms = fs::metadata(temp_file.path()).unwrap().permissions();
        perms.set_mode(0o000);
        fs::set_permissions(temp_file.path(), perms).unwrap();

        // Root ignores file modes, so there is nothing to observe there.
        if File::open(temp_file.path()).is_ok() {
            return;
        }

        match checksum_file(temp_file.path()) {
            Err(ChecksumError::PermissionDenied(_)) => {}
            _ => panic!("Expected PermissionDenied error"),
        }
    }
}
