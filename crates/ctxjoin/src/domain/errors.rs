//! Domain-specific errors.

use thiserror::Error;

use crate::infra::fs::FsError;

#[derive(Debug, Error)]
pub enum SelectionError {
    /// Every candidate in the selection was binary, or a directory holding only binary files.
    #[error("ctxjoin does not join binary files ({rejected} binary selection(s) skipped)")]
    AllBinary { rejected: usize },
    #[error(transparent)]
    Filesystem(#[from] FsError),
}
