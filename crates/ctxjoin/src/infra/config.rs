//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::app::tree::TreeSettings;
use crate::domain::model::OrderingPolicy;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
pub const WORKSPACE_CONFIG_FILE: &str = ".ctxjoin.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
///
/// Every field is optional so a layer only overrides what it sets; accessors fall back to the
/// built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub selection: Selection,
    #[serde(default)]
    pub tree: Tree,
    #[serde(default)]
    pub output: Output,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Selection {
    #[serde(default)]
    pub order_files_by: Option<OrderingPolicy>,
}

impl Selection {
    pub fn order_files_by(&self) -> OrderingPolicy {
        self.order_files_by.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Tree {
    #[serde(default)]
    pub include: Option<bool>,
    #[serde(default)]
    pub depth: Option<usize>,
    #[serde(default)]
    pub prune: Option<bool>,
    #[serde(default)]
    pub ignore_file: Option<String>,
}

impl Tree {
    fn default_depth() -> usize {
        3
    }

    fn default_ignore_file() -> &'static str {
        ".gitignore"
    }

    pub fn include(&self) -> bool {
        self.include.unwrap_or(true)
    }

    pub fn depth(&self) -> usize {
        self.depth.unwrap_or_else(Self::default_depth)
    }

    pub fn prune(&self) -> bool {
        self.prune.unwrap_or(false)
    }

    pub fn ignore_file(&self) -> String {
        self.ignore_file
            .clone()
            .unwrap_or_else(|| Self::default_ignore_file().to_owned())
    }

    /// Settings consumed by the tree builder.
    pub fn settings(&self) -> TreeSettings {
        TreeSettings {
            depth: self.depth(),
            prune: self.prune(),
            ignore_file: self.ignore_file(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Output {
    #[serde(default)]
    pub comment_at_file_begin: Option<String>,
    #[serde(default)]
    pub comment_at_file_end: Option<String>,
    #[serde(default)]
    pub include_separator: Option<bool>,
    #[serde(default)]
    pub separator_character: Option<String>,
    #[serde(default)]
    pub separator_length: Option<usize>,
    #[serde(default)]
    pub wrap_in_code_block: Option<bool>,
}

impl Output {
    pub fn comment_at_file_begin(&self) -> String {
        self.comment_at_file_begin
            .clone()
            .unwrap_or_else(|| "// BEGIN $file".to_owned())
    }

    pub fn comment_at_file_end(&self) -> String {
        self.comment_at_file_end
            .clone()
            .unwrap_or_else(|| "// END $file".to_owned())
    }

    pub fn include_separator(&self) -> bool {
        self.include_separator.unwrap_or(false)
    }

    pub fn separator_character(&self) -> String {
        self.separator_character
            .clone()
            .unwrap_or_else(|| "-".to_owned())
    }

    pub fn separator_length(&self) -> usize {
        self.separator_length.unwrap_or(80)
    }

    pub fn wrap_in_code_block(&self) -> bool {
        self.wrap_in_code_block.unwrap_or(false)
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    order_files_by: Option<String>,
    ignore_file: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            order_files_by: env::var("CTXJOIN_ORDER_FILES_BY").ok(),
            ignore_file: env::var("CTXJOIN_IGNORE_FILE").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(order_files_by: &str, ignore_file: &str) -> Self {
        Self {
            order_files_by: Some(order_files_by.to_owned()),
            ignore_file: Some(ignore_file.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration for a workspace: defaults, user config, `<root>/.ctxjoin.toml`, env.
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = Some(workspace_root.join(WORKSPACE_CONFIG_FILE));
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_toml(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading user config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        apply_env_overrides(merged, env_overrides)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_toml(&data).with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_toml(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    /// Overlay `other` on `self`; every value set in `other` wins.
    pub fn merge(self, other: Self) -> Self {
        Self {
            selection: Selection {
                order_files_by: other.selection.order_files_by.or(self.selection.order_files_by),
            },
            tree: merge_tree(self.tree, other.tree),
            output: merge_output(self.output, other.output),
        }
    }
}

fn merge_tree(base: Tree, overlay: Tree) -> Tree {
    Tree {
        include: overlay.include.or(base.include),
        depth: overlay.depth.or(base.depth),
        prune: overlay.prune.or(base.prune),
        ignore_file: overlay.ignore_file.or(base.ignore_file),
    }
}

fn merge_output(base: Output, overlay: Output) -> Output {
    Output {
        comment_at_file_begin: overlay.comment_at_file_begin.or(base.comment_at_file_begin),
        comment_at_file_end: overlay.comment_at_file_end.or(base.comment_at_file_end),
        include_separator: overlay.include_separator.or(base.include_separator),
        separator_character: overlay.separator_character.or(base.separator_character),
        separator_length: overlay.separator_length.or(base.separator_length),
        wrap_in_code_block: overlay.wrap_in_code_block.or(base.wrap_in_code_block),
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("ctxjoin/config.toml"))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Result<Config> {
    if let Some(order) = env.order_files_by {
        let order = order
            .parse::<OrderingPolicy>()
            .context("invalid CTXJOIN_ORDER_FILES_BY")?;
        config.selection.order_files_by = Some(order);
    }
    if let Some(ignore_file) = env.ignore_file {
        config.tree.ignore_file = Some(ignore_file);
    }
    Ok(config)
}
