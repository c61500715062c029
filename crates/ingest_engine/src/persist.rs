//! The directory an export run writes into.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use ingest_logging::ingest_debug;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{} exists and is not a directory", .path.display())]
    NotADirectory { path: PathBuf },
    #[error("cannot prepare output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("document name {name:?} is not a plain file name")]
    InvalidName { name: String },
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An existing output directory. Documents are only ever written directly
/// inside it.
#[derive(Debug, Clone)]
pub struct ExportDir {
    root: PathBuf,
}

impl ExportDir {
    /// Use `root`, creating it and its parents when missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let root = root.into();
        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(PersistError::NotADirectory { path: root }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&root).map_err(|source| PersistError::CreateDir {
                    path: root.clone(),
                    source,
                })?;
                ingest_debug!("created output directory {}", root.display());
            }
            Err(source) => return Err(PersistError::CreateDir { path: root, source }),
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Replace `name` with `content`. Readers see either the old document or
    /// the complete new one.
    pub fn write_document(&self, name: &str, content: &str) -> Result<PathBuf, PersistError> {
        let target = self.document_path(name)?;
        self.replace(&target, content.as_bytes())
            .map_err(|source| PersistError::Write {
                path: target.clone(),
                source,
            })?;
        Ok(target)
    }

    fn document_path(&self, name: &str) -> Result<PathBuf, PersistError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(name)),
            _ => Err(PersistError::InvalidName {
                name: name.to_string(),
            }),
        }
    }

    fn replace(&self, target: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut staged = NamedTempFile::new_in(&self.root)?;
        staged.write_all(bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(target)?;
        Ok(())
    }
}
