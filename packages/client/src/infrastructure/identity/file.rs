//! File-backed identity store.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::domain::{AnonymousId, IdentityError, IdentityStore};

/// Keeps the anonymous identifier as a single line in a file.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Result<Option<AnonymousId>, IdentityError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(AnonymousId::new(contents)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, id: &AnonymousId) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{}\n", id.as_str()))?;
        tracing::debug!("Saved anonymous identity to {}", self.path.display());
        Ok(())
    }

    fn forget(&self) -> Result<(), IdentityError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Removed anonymous identity at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
