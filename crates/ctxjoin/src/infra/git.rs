//! Workspace root discovery.

use std::path::{Path, PathBuf};

/// Working tree root of the git repository containing `path`, if any.
pub fn repository_root(path: &Path) -> Option<PathBuf> {
    let repo = match gix::discover(path) {
        Ok(repo) => repo,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "no git repository");
            return None;
        }
    };
    repo.work_dir()
        .map(Path::to_path_buf)
        .or_else(|| repo.path().parent().map(Path::to_path_buf))
}

/// Root used for the project tree and relative labels.
///
/// Prefers the enclosing git working tree and falls back to `start` itself.
pub fn workspace_root(start: &Path) -> PathBuf {
    repository_root(start).unwrap_or_else(|| start.to_path_buf())
}
