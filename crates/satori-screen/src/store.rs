//! Small persisted state files.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Persistence error types
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Underlying filesystem failure
    Io(String),
    /// File exists but its content cannot be used
    Corrupt(String),
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "IO error: {}", msg),
            StoreError::Corrupt(msg) => write!(f, "Corrupt data: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Read a whole file, `None` when it does not exist
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StoreError::Io(format!("{}: {}", path.display(), err))),
    }
}

/// Replace a file's content via a sibling temp file and rename
pub(crate) fn write_replace(path: &Path, content: &str) -> Result<(), StoreError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content)
        .map_err(|err| StoreError::Io(format!("{}: {}", tmp.display(), err)))?;
    fs::rename(&tmp, path).map_err(|err| StoreError::Io(format!("{}: {}", path.display(), err)))
}

#[cfg(test)]
pub(crate) fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("satori-screen-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    let _ = fs::create_dir_all(&dir);
    dir
}
