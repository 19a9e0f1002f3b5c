//! Domain models for selections, orderings, and project trees.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether a selected path names a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    File,
    Directory,
}

/// One accepted entry of a raw selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedItem {
    pub kind: ItemKind,
    pub path: PathBuf,
}

impl SelectedItem {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ItemKind::File,
            path: path.into(),
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ItemKind::Directory,
            path: path.into(),
        }
    }
}

/// Ordering applied to the resolved file list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "camelCase")]
#[value(rename_all = "camelCase")]
pub enum OrderingPolicy {
    /// Case-insensitive sort by full path.
    #[default]
    TreeOrder,
    /// Order in which items were selected, directory contents depth-first.
    SelectionOrder,
}

impl OrderingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderingPolicy::TreeOrder => "treeOrder",
            OrderingPolicy::SelectionOrder => "selectionOrder",
        }
    }
}

impl fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderingPolicy {
    type Err = OrderingPolicyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "treeorder" | "tree" => Ok(OrderingPolicy::TreeOrder),
            "selectionorder" | "selection" => Ok(OrderingPolicy::SelectionOrder),
            other => Err(OrderingPolicyParseError::Unknown(other.to_string())),
        }
    }
}

/// Error returned when parsing an [`OrderingPolicy`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum OrderingPolicyParseError {
    #[error("unknown file ordering '{0}' (expected treeOrder or selectionOrder)")]
    Unknown(String),
}

/// Raw mirror of a filesystem subtree, bounded by the walk depth.
///
/// `children` is `None` for files and for directories the walk did not descend into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsNode {
    pub name: String,
    pub path: PathBuf,
    pub children: Option<Vec<FsNode>>,
}

impl FsNode {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            children: None,
        }
    }

    pub fn dir(name: impl Into<String>, path: impl Into<PathBuf>, children: Vec<FsNode>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            children: Some(children),
        }
    }
}

/// Filtered tree ready for rendering. Each node owns its children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }
}
