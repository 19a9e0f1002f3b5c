//! Project tree construction and filtering.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::app::ignore::IgnoreRules;
use crate::app::render::render;
use crate::domain::model::{FsNode, TreeNode};
use crate::infra::fs::{self, EntryKind};

/// Inputs controlling how the project tree is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSettings {
    /// Fixed walk depth used when pruning is off.
    pub depth: usize,
    /// Restrict the tree to ancestors of the selected files, bypassing ignore rules.
    pub prune: bool,
    /// Ignore file name, resolved against the tree root.
    pub ignore_file: String,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            depth: 3,
            prune: false,
            ignore_file: ".gitignore".into(),
        }
    }
}

/// Build, filter, and render the tree for `root`.
///
/// Returns an empty string when every node, including the root, is filtered away.
pub fn project_tree(root: &Path, settings: &TreeSettings, keep_set: &[PathBuf]) -> Result<String> {
    let rules = IgnoreRules::load(&root.join(&settings.ignore_file));
    let depth = tree_depth(settings.prune, settings.depth, root, keep_set);
    tracing::debug!(root = %root.display(), depth, prune = settings.prune, "building project tree");

    let raw = build_fs_tree(root, depth)
        .with_context(|| format!("failed to read project tree at {}", root.display()))?;

    Ok(filter_tree(&raw, &rules, keep_set, settings.prune)
        .map(|tree| render(&tree))
        .unwrap_or_default())
}

/// Depth to walk: deep enough for every kept file when pruning, the configured depth otherwise.
///
/// Depth is the difference in path components between a file and the root.
pub fn tree_depth(prune: bool, configured: usize, root: &Path, keep_set: &[PathBuf]) -> usize {
    if !prune {
        return configured;
    }
    let root_depth = root.components().count();
    keep_set
        .iter()
        .map(|file| file.components().count().saturating_sub(root_depth))
        .max()
        .unwrap_or(0)
}

/// Walk `root` into a raw tree, listing at most `depth` levels below it.
///
/// Entries are sorted by name. Subdirectories that cannot be listed and entries whose type cannot
/// be determined are left out; failing to list the root itself is an error.
pub fn build_fs_tree(root: &Path, depth: usize) -> Result<FsNode, fs::FsError> {
    let children = if depth > 0 {
        Some(read_children(root, 1, depth)?)
    } else {
        None
    };
    Ok(FsNode {
        name: node_name(root),
        path: root.to_path_buf(),
        children,
    })
}

fn read_children(dir: &Path, level: usize, depth: usize) -> Result<Vec<FsNode>, fs::FsError> {
    let mut listing = fs::read_dir(dir)?;
    listing.sort_by(|a, b| a.0.cmp(&b.0));

    let mut nodes = Vec::with_capacity(listing.len());
    for (name, kind) in listing {
        let path = dir.join(&name);
        let kind = match kind {
            EntryKind::Other => match fs::stat(&path) {
                Ok(kind) => kind,
                Err(err) => {
                    tracing::debug!(path = %path.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            },
            kind => kind,
        };

        match kind {
            EntryKind::File => nodes.push(FsNode::file(name, path)),
            EntryKind::Directory if level < depth => match read_children(&path, level + 1, depth) {
                Ok(children) => nodes.push(FsNode::dir(name, path, children)),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable directory");
                }
            },
            EntryKind::Directory => nodes.push(FsNode {
                name,
                path,
                children: None,
            }),
            EntryKind::Other => {}
        }
    }
    Ok(nodes)
}

fn node_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Recursive pruning policy over a raw tree.
#[derive(Debug)]
pub struct TreeFilter<'a> {
    rules: &'a IgnoreRules,
    keep: Vec<String>,
    prune: bool,
}

impl<'a> TreeFilter<'a> {
    pub fn new(rules: &'a IgnoreRules, keep_set: &[PathBuf], prune: bool) -> Self {
        Self {
            rules,
            keep: keep_set
                .iter()
                .map(|path| path.to_string_lossy().into_owned())
                .collect(),
            prune,
        }
    }

    /// Filter `node` and its descendants; `None` means the node itself was dropped.
    ///
    /// Ignore rules apply only when pruning is off. When pruning, a node survives if its path
    /// occurs as a substring of any kept path, which keeps every ancestor directory of a selected
    /// file. Nodes whose raw children are non-empty get a trailing `/` on their label.
    pub fn filter(&self, node: &FsNode) -> Option<TreeNode> {
        let path = node.path.to_string_lossy();
        let ignored = !self.prune && self.rules.matches(&path);
        let pruned = self.prune && !self.keep.iter().any(|kept| kept.contains(path.as_ref()));
        if ignored || pruned {
            return None;
        }

        let mut tree = TreeNode::leaf(node.name.clone());
        if let Some(children) = node.children.as_ref().filter(|children| !children.is_empty()) {
            tree.children = children.iter().filter_map(|child| self.filter(child)).collect();
            tree.label.push('/');
        }
        Some(tree)
    }
}

/// Convenience wrapper around [`TreeFilter`].
pub fn filter_tree(
    node: &FsNode,
    rules: &IgnoreRules,
    keep_set: &[PathBuf],
    prune: bool,
) -> Option<TreeNode> {
    TreeFilter::new(rules, keep_set, prune).filter(node)
}
