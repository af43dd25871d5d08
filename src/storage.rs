//! Local storage for relocated resources

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::relocator::{Persist, PersistError};

/// Writes every resource as a file directly inside one directory
///
/// A resource is never written over an existing file; that is reported as
/// a [`PersistError`] instead.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectorySink { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the given resource name is stored at
    pub fn path_for(&self, name: &str) -> Result<PathBuf, PersistError> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
            || name.contains('\0')
        {
            return Err(PersistError::new(format!(
                "refusing to store resource under \"{name}\""
            )));
        }
        Ok(self.root.join(name))
    }
}

impl Persist for DirectorySink {
    fn persist(&self, name: &str, data: &[u8]) -> Result<(), PersistError> {
        let path = self.path_for(name)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| PersistError::new(format!("{}: {}", path.display(), e)))?;
        file.write_all(data)
            .map_err(|e| PersistError::new(format!("{}: {}", path.display(), e)))
    }
}
