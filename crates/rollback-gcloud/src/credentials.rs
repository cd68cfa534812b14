use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::GcloudError;

/// A service-account key written to disk for the duration of a run.
///
/// The temporary variant is removed when dropped; the persisted variant stays
/// at the path the operator asked for.
#[derive(Debug)]
pub enum CredentialFile {
    Temporary(NamedTempFile),
    Persisted(PathBuf),
}

impl CredentialFile {
    /// Write `payload` to a fresh temporary file.
    pub fn temporary(payload: &str) -> Result<Self, GcloudError> {
        let mut file = tempfile::Builder::new()
            .prefix("rollback-key-")
            .suffix(".json")
            .tempfile()
            .map_err(GcloudError::Credentials)?;
        file.write_all(payload.as_bytes())
            .map_err(GcloudError::Credentials)?;
        file.flush().map_err(GcloudError::Credentials)?;
        Ok(CredentialFile::Temporary(file))
    }

    /// Write `payload` to `path`, replacing it atomically.
    pub fn persisted(payload: &str, path: &Path) -> Result<Self, GcloudError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(GcloudError::Credentials)?;

        // temp file + rename; NamedTempFile is created owner-only on unix
        let mut temp = NamedTempFile::new_in(dir).map_err(GcloudError::Credentials)?;
        temp.write_all(payload.as_bytes())
            .map_err(GcloudError::Credentials)?;
        temp.flush().map_err(GcloudError::Credentials)?;
        temp.persist(path)
            .map_err(|e| GcloudError::Credentials(e.error))?;

        Ok(CredentialFile::Persisted(path.to_path_buf()))
    }

    pub fn write(payload: &str, path: Option<&Path>) -> Result<Self, GcloudError> {
        match path {
            Some(path) => Self::persisted(payload, path),
            None => Self::temporary(payload),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            CredentialFile::Temporary(file) => file.path(),
            CredentialFile::Persisted(path) => path,
        }
    }
}
