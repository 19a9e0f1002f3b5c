//! Filesystem access with errors that keep "not found" apart from other IO failures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure while touching the filesystem.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("path not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to {action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    fn from_io(action: &'static str, path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            FsError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            FsError::Io {
                action,
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Path the failing operation was applied to.
    pub fn path(&self) -> &Path {
        match self {
            FsError::NotFound { path } | FsError::Io { path, .. } => path,
        }
    }
}

/// Coarse classification of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks, sockets, fifos and anything else that is neither.
    Other,
}

impl EntryKind {
    fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        }
    }
}

/// Classify a path, following symlinks.
pub fn stat(path: &Path) -> Result<EntryKind, FsError> {
    fs::metadata(path)
        .map(|meta| EntryKind::from_file_type(meta.file_type()))
        .map_err(|err| FsError::from_io("stat", path, err))
}

/// List a directory in enumeration order. Entry kinds do not follow symlinks.
pub fn read_dir(path: &Path) -> Result<Vec<(String, EntryKind)>, FsError> {
    let entries = fs::read_dir(path).map_err(|err| FsError::from_io("read directory", path, err))?;
    let mut listing = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| FsError::from_io("read directory", path, err))?;
        let file_type = entry
            .file_type()
            .map_err(|err| FsError::from_io("stat", &entry.path(), err))?;
        listing.push((
            entry.file_name().to_string_lossy().into_owned(),
            EntryKind::from_file_type(file_type),
        ));
    }
    Ok(listing)
}

pub fn read_file(path: &Path) -> Result<Vec<u8>, FsError> {
    fs::read(path).map_err(|err| FsError::from_io("read", path, err))
}
