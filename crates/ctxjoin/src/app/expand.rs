//! Recursive directory expansion into text files.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rayon::prelude::*;

use crate::app::binary::is_binary;
use crate::infra::fs::{self, FsError};

/// Collect every non-binary regular file beneath `dir`.
///
/// Files come back depth-first in filesystem enumeration order: a subdirectory's files are
/// placed where the subdirectory itself was listed. No ignore files or hidden-file rules are
/// applied and symlinks are skipped. Any listing or read failure aborts the expansion.
pub fn expand_directory(dir: &Path) -> Result<Vec<PathBuf>, FsError> {
    let mut candidates = Vec::new();
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for result in walker {
        let entry = result.map_err(|err| walk_error(dir, err))?;
        if entry.depth() == 0 {
            continue;
        }
        if entry.file_type().is_some_and(|kind| kind.is_file()) {
            candidates.push(entry.into_path());
        }
    }

    // Reads run in parallel; `collect` keeps the walk order.
    let verdicts: Vec<(PathBuf, bool)> = candidates
        .into_par_iter()
        .map(|path| {
            let bytes = fs::read_file(&path)?;
            let text = !is_binary(&bytes);
            Ok((path, text))
        })
        .collect::<Result<_, FsError>>()?;

    let files: Vec<PathBuf> = verdicts
        .into_iter()
        .filter_map(|(path, text)| text.then_some(path))
        .collect();

    tracing::debug!(dir = %dir.display(), files = files.len(), "expanded directory");
    Ok(files)
}

fn walk_error(dir: &Path, err: ignore::Error) -> FsError {
    let path = walk_error_path(&err).unwrap_or(dir).to_path_buf();
    match err.into_io_error() {
        Some(source) if source.kind() == std::io::ErrorKind::NotFound => FsError::NotFound { path },
        Some(source) => FsError::Io {
            action: "read directory",
            path,
            source,
        },
        None => FsError::Io {
            action: "walk",
            path,
            source: std::io::Error::other("directory walk failed"),
        },
    }
}

fn walk_error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err)
        }
        _ => None,
    }
}
