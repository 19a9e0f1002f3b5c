//! Classifying raw selections and resolving them into ordered text-file lists.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use icu_collator::{Collator, CollatorOptions, Strength};
use indexmap::IndexSet;

use crate::app::binary::is_binary;
use crate::app::expand::expand_directory;
use crate::domain::errors::SelectionError;
use crate::domain::model::{ItemKind, OrderingPolicy, SelectedItem};
use crate::infra::fs::{self, EntryKind, FsError};

/// Turns raw selected paths into an ordered, deduplicated list of text files.
///
/// Directory expansions computed while classifying are cached and reused by [`resolve`], so each
/// file beneath a selected directory is read once per run. A resolver is meant to live for a
/// single selection; create a fresh one when the filesystem may have changed.
///
/// [`resolve`]: SelectionResolver::resolve
#[derive(Debug, Default)]
pub struct SelectionResolver {
    expansions: HashMap<PathBuf, Vec<PathBuf>>,
}

impl SelectionResolver {
    /// Create a resolver with an empty expansion cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify raw paths into accepted files and directories.
    ///
    /// Binary files and directories without any text file are dropped. When nothing is accepted
    /// and at least one path was dropped for being binary, [`SelectionError::AllBinary`] is
    /// returned instead of an empty list. Paths that are neither files nor directories are
    /// skipped without counting as binary.
    pub fn classify<P: AsRef<Path>>(
        &mut self,
        raw_paths: &[P],
    ) -> Result<Vec<SelectedItem>, SelectionError> {
        let mut accepted = Vec::new();
        let mut rejected = 0usize;

        for raw in raw_paths {
            let path = raw.as_ref();
            match fs::stat(path)? {
                EntryKind::File => {
                    let bytes = fs::read_file(path)?;
                    if is_binary(&bytes) {
                        tracing::debug!(path = %path.display(), "rejecting binary file");
                        rejected += 1;
                    } else {
                        accepted.push(SelectedItem::file(path));
                    }
                }
                EntryKind::Directory => {
                    if self.expansion(path)?.is_empty() {
                        tracing::debug!(path = %path.display(), "rejecting directory without text files");
                        rejected += 1;
                    } else {
                        accepted.push(SelectedItem::directory(path));
                    }
                }
                EntryKind::Other => {
                    tracing::debug!(path = %path.display(), "skipping special file");
                }
            }
        }

        if accepted.is_empty() && rejected > 0 {
            return Err(SelectionError::AllBinary { rejected });
        }

        Ok(accepted)
    }

    /// Expand items into the final file list.
    ///
    /// Paths reached more than once collapse to their first occurrence. With
    /// [`OrderingPolicy::TreeOrder`] the list is then collated by full path (see
    /// [`sort_tree_order`]); with [`OrderingPolicy::SelectionOrder`] insertion order is kept, a
    /// directory's files sitting where the directory was selected.
    pub fn resolve(
        &mut self,
        items: &[SelectedItem],
        order: OrderingPolicy,
    ) -> Result<Vec<PathBuf>, FsError> {
        let mut files: IndexSet<PathBuf> = IndexSet::new();

        for item in items {
            match item.kind {
                ItemKind::File => {
                    files.insert(item.path.clone());
                }
                ItemKind::Directory => {
                    files.extend(self.expansion(&item.path)?.iter().cloned());
                }
            }
        }

        let mut ordered: Vec<PathBuf> = files.into_iter().collect();
        if order == OrderingPolicy::TreeOrder {
            sort_tree_order(&mut ordered);
        }

        tracing::debug!(files = ordered.len(), order = %order, "resolved selection");
        Ok(ordered)
    }

    fn expansion(&mut self, dir: &Path) -> Result<&[PathBuf], FsError> {
        if !self.expansions.contains_key(dir) {
            let files = expand_directory(dir)?;
            self.expansions.insert(dir.to_path_buf(), files);
        }
        Ok(self
            .expansions
            .get(dir)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }
}

/// Sort paths by their full textual form using root-locale collation at primary strength.
///
/// Case and accents are ignored and punctuation sorts in collation order, so `mod_test.rs`
/// precedes `mod.rs`. The sort is stable: paths that collate equal keep their relative order.
pub fn sort_tree_order(paths: &mut [PathBuf]) {
    let collator = match tree_order_collator() {
        Ok(collator) => collator,
        Err(err) => {
            tracing::warn!(?err, "collator unavailable, sorting case-insensitively");
            paths.sort_by_cached_key(|path| path.to_string_lossy().to_lowercase());
            return;
        }
    };

    let mut keyed: Vec<(String, PathBuf)> = paths
        .iter()
        .map(|path| (path.to_string_lossy().into_owned(), path.clone()))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| collator.compare(a, b));
    for (slot, (_, path)) in paths.iter_mut().zip(keyed) {
        *slot = path;
    }
}

fn tree_order_collator() -> Result<Collator, icu_collator::CollatorError> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Primary);
    Collator::try_new(&Default::default(), options)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs as stdfs;

    fn fixture() -> anyhow::Result<tempfile::TempDir> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        stdfs::create_dir_all(root.join("D/inner"))?;
        stdfs::write(root.join("D/a.txt"), b"alpha")?;
        stdfs::write(root.join("D/inner/b.txt"), b"beta")?;
        stdfs::write(root.join("D/logo.png"), b"\x89PNG\0")?;
        stdfs::write(root.join("Zeta.md"), b"zeta")?;
        stdfs::write(root.join("blob.bin"), b"\0\0\0")?;
        stdfs::write(root.join("notes.txt"), b"notes")?;
        Ok(temp)
    }

    #[test]
    fn dedups_file_selected_alongside_its_directory() -> anyhow::Result<()> {
        let temp = fixture()?;
        let root = temp.path();
        let raw = [root.join("D"), root.join("D/a.txt")];

        let mut resolver = SelectionResolver::new();
        let items = resolver.classify(&raw)?;
        let files = resolver.resolve(&items, OrderingPolicy::SelectionOrder)?;

        let count = files.iter().filter(|p| **p == root.join("D/a.txt")).count();
        assert_eq!(count, 1);
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[test]
    fn binary_files_never_resolve() -> anyhow::Result<()> {
        let temp = fixture()?;
        let root = temp.path();
        let raw = [root.join("D"), root.join("blob.bin"), root.join("Zeta.md")];

        let mut resolver = SelectionResolver::new();
        let items = resolver.classify(&raw)?;
        assert_eq!(items.len(), 2);

        let files = resolver.resolve(&items, OrderingPolicy::TreeOrder)?;
        assert!(!files.contains(&root.join("blob.bin")));
        assert!(!files.contains(&root.join("D/logo.png")));
        Ok(())
    }

    #[test]
    fn single_binary_file_signals_all_binary() -> anyhow::Result<()> {
        let temp = fixture()?;
        let mut resolver = SelectionResolver::new();

        let err = resolver.classify(&[temp.path().join("blob.bin")]).unwrap_err();
        assert!(matches!(err, SelectionError::AllBinary { rejected: 1 }));
        Ok(())
    }

    #[test]
    fn binary_only_directory_counts_as_binary() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        stdfs::create_dir(temp.path().join("assets"))?;
        stdfs::write(temp.path().join("assets/font.woff"), b"wOFF\0")?;
        stdfs::write(temp.path().join("raw.dat"), b"\0")?;

        let mut resolver = SelectionResolver::new();
        let err = resolver
            .classify(&[temp.path().join("assets"), temp.path().join("raw.dat")])
            .unwrap_err();
        assert!(matches!(err, SelectionError::AllBinary { rejected: 2 }));
        Ok(())
    }

    #[test]
    fn empty_selection_is_not_an_error() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        stdfs::create_dir(temp.path().join("empty"))?;

        let mut resolver = SelectionResolver::new();
        let none: [PathBuf; 0] = [];
        assert!(resolver.classify(&none)?.is_empty());
        let items = resolver.classify(&[temp.path().join("empty")])?;
        assert!(items.is_empty());
        assert!(resolver.resolve(&items, OrderingPolicy::TreeOrder)?.is_empty());
        Ok(())
    }

    #[test]
    fn missing_path_surfaces_filesystem_error() {
        let temp = tempfile::tempdir().unwrap();
        let mut resolver = SelectionResolver::new();
        let err = resolver.classify(&[temp.path().join("missing.rs")]).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::Filesystem(FsError::NotFound { .. })
        ));
    }

    #[test]
    fn selection_order_keeps_insertion_order() -> anyhow::Result<()> {
        let temp = fixture()?;
        let root = temp.path();
        let raw = [root.join("Zeta.md"), root.join("D/inner/b.txt"), root.join("D/a.txt")];

        let mut resolver = SelectionResolver::new();
        let items = resolver.classify(&raw)?;
        let files = resolver.resolve(&items, OrderingPolicy::SelectionOrder)?;
        assert_eq!(files, raw.to_vec());
        Ok(())
    }

    #[test]
    fn selection_order_places_directory_contents_where_selected() -> anyhow::Result<()> {
        let temp = fixture()?;
        let root = temp.path();
        let raw = [root.join("Zeta.md"), root.join("D"), root.join("notes.txt")];

        let mut resolver = SelectionResolver::new();
        let items = resolver.classify(&raw)?;
        let files = resolver.resolve(&items, OrderingPolicy::SelectionOrder)?;

        let mut expected = vec![root.join("Zeta.md")];
        expected.extend(expand_directory(&root.join("D"))?);
        expected.push(root.join("notes.txt"));
        assert_eq!(files, expected);
        assert_eq!(files.len(), 4);
        assert!(files[1..3].iter().all(|p| p.starts_with(root.join("D"))));
        Ok(())
    }

    #[test]
    fn tree_order_collates_punctuation_and_accents() {
        let mut paths: Vec<PathBuf> = [
            "/p/zed.txt",
            "/p/src/mod.rs",
            "/p/Émile.txt",
            "/p/a/b/x.rs",
            "/p/B.txt",
            "/p/src/mod_test.rs",
            "/p/a.txt",
            "/p/a/b_c.rs",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        sort_tree_order(&mut paths);

        let expected: Vec<PathBuf> = [
            "/p/a.txt",
            "/p/a/b_c.rs",
            "/p/a/b/x.rs",
            "/p/B.txt",
            "/p/Émile.txt",
            "/p/src/mod_test.rs",
            "/p/src/mod.rs",
            "/p/zed.txt",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn tree_order_keeps_case_variants_in_insertion_order() {
        let mut paths: Vec<PathBuf> = ["/a/README.md", "/a/readme.md", "/a/Readme.md"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let before = paths.clone();
        sort_tree_order(&mut paths);
        assert_eq!(paths, before);
    }

    #[test]
    fn tree_order_sorts_case_insensitively() {
        let mut paths: Vec<PathBuf> = ["/a/B.txt", "/a/a.txt", "/a/C.txt"]
            .iter()
            .map(PathBuf::from)
            .collect();
        sort_tree_order(&mut paths);

        let expected: Vec<PathBuf> = ["/a/a.txt", "/a/B.txt", "/a/C.txt"]
            .iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn resolving_twice_is_idempotent() -> anyhow::Result<()> {
        let temp = fixture()?;
        let root = temp.path();
        let raw = [root.join("Zeta.md"), root.join("D")];

        let first = {
            let mut resolver = SelectionResolver::new();
            let items = resolver.classify(&raw)?;
            resolver.resolve(&items, OrderingPolicy::SelectionOrder)?
        };
        let second = {
            let mut resolver = SelectionResolver::new();
            let items = resolver.classify(&raw)?;
            resolver.resolve(&items, OrderingPolicy::SelectionOrder)?
        };
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn resolve_expands_uncached_directories() -> anyhow::Result<()> {
        let temp = fixture()?;
        let root = temp.path();

        let mut resolver = SelectionResolver::new();
        let items = vec![SelectedItem::directory(root.join("D"))];
        let files = resolver.resolve(&items, OrderingPolicy::TreeOrder)?;
        assert_eq!(files, vec![root.join("D/a.txt"), root.join("D/inner/b.txt")]);
        Ok(())
    }
}
