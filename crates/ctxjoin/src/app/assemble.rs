//! Artifact assembly: selection, optional project tree, and wrapped file contents.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::app::selection::SelectionResolver;
use crate::app::tree::{TreeSettings, project_tree};
use crate::domain::errors::SelectionError;
use crate::domain::model::OrderingPolicy;
use crate::infra::config::Config;

/// Runtime options controlling assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleOptions {
    pub order: OrderingPolicy,
    pub include_tree: bool,
    pub tree: TreeSettings,
    pub layout: Layout,
}

impl AssembleOptions {
    /// Build options from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            order: config.selection.order_files_by(),
            include_tree: config.tree.include(),
            tree: config.tree.settings(),
            layout: Layout::from_config(config),
        }
    }
}

/// Text layout of the artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Line placed before each file; `$file` becomes the file label.
    pub begin_comment: String,
    /// Line placed after each file; `$file` becomes the file label.
    pub end_comment: String,
    /// Separator between files, `None` for a blank line.
    pub separator: Option<String>,
    pub wrap_in_code_block: bool,
}

impl Layout {
    pub fn from_config(config: &Config) -> Self {
        let output = &config.output;
        let separator = output.include_separator().then(|| {
            output
                .separator_character()
                .repeat(output.separator_length())
        });
        Self {
            begin_comment: output.comment_at_file_begin(),
            end_comment: output.comment_at_file_end(),
            separator,
            wrap_in_code_block: output.wrap_in_code_block(),
        }
    }

    /// Wrap one file's contents in its begin/end comments.
    pub fn wrap(&self, label: &str, contents: &str) -> String {
        format!(
            "{}\n{}\n{}\n",
            self.begin_comment.replacen("$file", label, 1),
            contents,
            self.end_comment.replacen("$file", label, 1)
        )
    }

    /// Join the optional tree and the wrapped blocks into the final text.
    pub fn compose(&self, tree: &str, blocks: &[String]) -> String {
        let mut text = String::new();
        if self.wrap_in_code_block {
            text.push_str("```\n");
        }
        if !tree.is_empty() {
            text.push_str(tree);
            text.push_str("\n\n");
        }
        let joiner = match &self.separator {
            Some(separator) => format!("\n{separator}\n\n"),
            None => "\n\n".to_owned(),
        };
        text.push_str(&blocks.join(&joiner));
        if self.wrap_in_code_block {
            text.push_str("\n```");
        }
        text
    }
}

/// A finished artifact, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub text: String,
    pub files: Vec<PathBuf>,
    pub tree: String,
}

impl Artifact {
    /// Length of the text in UTF-16 code units, the count editors and clipboards report.
    pub fn characters(&self) -> usize {
        self.text.encode_utf16().count()
    }
}

/// Resolved selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Files(Vec<PathBuf>),
    /// Every selected path was binary.
    AllBinary { rejected: usize },
}

/// Result of an assembly run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Artifact(Artifact),
    /// Every selected path was binary; nothing should be delivered.
    AllBinary { rejected: usize },
    /// No text file was selected.
    NothingSelected,
}

/// Result of rendering only the project tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOutcome {
    Rendered(String),
    /// Pruning was requested but every selected path was binary.
    AllBinary { rejected: usize },
}

/// Runs the selection → tree → contents pipeline for one workspace.
#[derive(Debug, Clone)]
pub struct Assembler {
    root: PathBuf,
    options: AssembleOptions,
}

impl Assembler {
    pub fn new(root: impl Into<PathBuf>, options: AssembleOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    /// Resolve `raw_paths` into the ordered file list without reading contents.
    pub fn resolve<P: AsRef<Path>>(&self, raw_paths: &[P]) -> Result<Resolution> {
        let mut resolver = SelectionResolver::new();
        let items = match resolver.classify(raw_paths) {
            Ok(items) => items,
            Err(SelectionError::AllBinary { rejected }) => {
                tracing::info!(rejected, "selection contained only binary files");
                return Ok(Resolution::AllBinary { rejected });
            }
            Err(err) => return Err(err).context("failed to classify selection"),
        };
        let files = resolver
            .resolve(&items, self.options.order)
            .context("failed to resolve selection")?;
        Ok(Resolution::Files(files))
    }

    /// Assemble the artifact for `raw_paths`.
    ///
    /// Nothing is written anywhere; any failure leaves no partial output behind.
    pub fn assemble<P: AsRef<Path>>(&self, raw_paths: &[P]) -> Result<Outcome> {
        let files = match self.resolve(raw_paths)? {
            Resolution::Files(files) => files,
            Resolution::AllBinary { rejected } => return Ok(Outcome::AllBinary { rejected }),
        };
        if files.is_empty() {
            return Ok(Outcome::NothingSelected);
        }

        let tree = if self.options.include_tree {
            project_tree(&self.root, &self.options.tree, &files)?
        } else {
            String::new()
        };

        let mut blocks = Vec::with_capacity(files.len());
        for path in &files {
            let bytes =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            let contents = String::from_utf8_lossy(&bytes);
            blocks.push(self.options.layout.wrap(&self.label(path), &contents));
        }

        let text = self.options.layout.compose(&tree, &blocks);
        let artifact = Artifact { text, files, tree };
        tracing::info!(
            files = artifact.files.len(),
            chars = artifact.characters(),
            "assembled artifact"
        );
        Ok(Outcome::Artifact(artifact))
    }

    /// Label for a file: its path relative to the root, or the full path outside it.
    pub fn label(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    /// Render only the project tree, using `raw_paths` as the keep-set when pruning.
    pub fn tree<P: AsRef<Path>>(&self, raw_paths: &[P]) -> Result<TreeOutcome> {
        let keep = if self.options.tree.prune && !raw_paths.is_empty() {
            match self.resolve(raw_paths)? {
                Resolution::Files(files) => files,
                Resolution::AllBinary { rejected } => return Ok(TreeOutcome::AllBinary { rejected }),
            }
        } else {
            Vec::new()
        };
        let mut settings = self.options.tree.clone();
        // Pruning against an empty keep-set would drop the root.
        settings.prune = settings.prune && !keep.is_empty();
        Ok(TreeOutcome::Rendered(project_tree(&self.root, &settings, &keep)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;

    fn layout() -> Layout {
        Layout {
            begin_comment: "// start $file".into(),
            end_comment: "// end $file".into(),
            separator: None,
            wrap_in_code_block: false,
        }
    }

    fn options(include_tree: bool) -> AssembleOptions {
        AssembleOptions {
            order: OrderingPolicy::TreeOrder,
            include_tree,
            tree: TreeSettings::default(),
            layout: layout(),
        }
    }

    #[test]
    fn wraps_contents_with_labelled_comments() {
        assert_eq!(
            layout().wrap("src/lib.rs", "fn lib() {}"),
            "// start src/lib.rs\nfn lib() {}\n// end src/lib.rs\n"
        );
    }

    #[test]
    fn composes_blocks_with_separator_and_fence() {
        let layout = Layout {
            separator: Some("=".repeat(3)),
            wrap_in_code_block: true,
            ..layout()
        };
        let text = layout.compose("root/\n", &["a\n".into(), "b\n".into()]);
        assert_eq!(text, "```\nroot/\n\n\na\n\n===\n\nb\n\n```");
    }

    #[test]
    fn composes_without_tree() {
        let text = layout().compose("", &["a\n".into(), "b\n".into()]);
        assert_eq!(text, "a\n\n\nb\n");
    }

    #[test]
    fn separator_comes_from_config() {
        let mut config = Config::default();
        config.output.include_separator = Some(true);
        config.output.separator_character = Some("*".into());
        config.output.separator_length = Some(4);
        assert_eq!(Layout::from_config(&config).separator.as_deref(), Some("****"));
    }

    #[test]
    fn assembles_selected_files_in_tree_order() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        stdfs::create_dir_all(root.join("src"))?;
        stdfs::write(root.join("src/b.rs"), "fn b() {}")?;
        stdfs::write(root.join("src/A.rs"), "fn a() {}")?;

        let assembler = Assembler::new(root, options(false));
        let artifact = match assembler.assemble(&[root.join("src")])? {
            Outcome::Artifact(artifact) => artifact,
            other => panic!("expected artifact, got {other:?}"),
        };

        let label_a = Path::new("src").join("A.rs").display().to_string();
        let label_b = Path::new("src").join("b.rs").display().to_string();
        assert_eq!(
            artifact.text,
            format!("// start {label_a}\nfn a() {{}}\n// end {label_a}\n\n\n// start {label_b}\nfn b() {{}}\n// end {label_b}\n")
        );
        assert_eq!(artifact.files.len(), 2);
        assert_eq!(artifact.characters(), artifact.text.len());
        Ok(())
    }

    #[test]
    fn includes_pruned_tree_when_enabled() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path().join("proj");
        stdfs::create_dir_all(root.join("src"))?;
        stdfs::write(root.join("src/main.rs"), "fn main() {}")?;
        stdfs::write(root.join("other.txt"), "other")?;

        let mut opts = options(true);
        opts.tree.prune = true;
        let assembler = Assembler::new(&root, opts);
        let artifact = match assembler.assemble(&[root.join("src/main.rs")])? {
            Outcome::Artifact(artifact) => artifact,
            other => panic!("expected artifact, got {other:?}"),
        };

        assert_eq!(artifact.tree, "proj/\n└─┬ src/\n  └── main.rs\n");
        assert!(artifact.text.starts_with("proj/\n└─┬ src/\n  └── main.rs\n\n\n// start "));
        Ok(())
    }

    #[test]
    fn binary_only_selection_is_reported() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        stdfs::write(temp.path().join("blob.bin"), b"\0\x01")?;

        let assembler = Assembler::new(temp.path(), options(true));
        let outcome = assembler.assemble(&[temp.path().join("blob.bin")])?;
        assert_eq!(outcome, Outcome::AllBinary { rejected: 1 });
        Ok(())
    }

    #[test]
    fn empty_directory_is_nothing_selected() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        stdfs::create_dir(temp.path().join("empty"))?;

        let assembler = Assembler::new(temp.path(), options(true));
        assert_eq!(
            assembler.assemble(&[temp.path().join("empty")])?,
            Outcome::NothingSelected
        );
        Ok(())
    }

    #[test]
    fn missing_file_aborts_assembly() {
        let temp = tempfile::tempdir().unwrap();
        let assembler = Assembler::new(temp.path(), options(false));
        assert!(assembler.assemble(&[temp.path().join("missing.rs")]).is_err());
    }

    #[test]
    fn characters_count_utf16_code_units() {
        let artifact = Artifact {
            text: "é😀\n".into(),
            files: Vec::new(),
            tree: String::new(),
        };
        assert_eq!(artifact.characters(), 4);
    }

    #[test]
    fn pruned_tree_of_binary_selection_is_reported() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        stdfs::write(temp.path().join("blob.bin"), b"\0\x01")?;
        stdfs::write(temp.path().join("notes.txt"), "notes")?;

        let mut opts = options(true);
        opts.tree.prune = true;
        let assembler = Assembler::new(temp.path(), opts);
        assert_eq!(
            assembler.tree(&[temp.path().join("blob.bin")])?,
            TreeOutcome::AllBinary { rejected: 1 }
        );
        Ok(())
    }

    #[test]
    fn unpruned_tree_ignores_binary_selection() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        stdfs::write(temp.path().join("blob.bin"), b"\0\x01")?;

        let assembler = Assembler::new(temp.path(), options(true));
        assert!(matches!(
            assembler.tree(&[temp.path().join("blob.bin")])?,
            TreeOutcome::Rendered(tree) if tree.contains("blob.bin")
        ));
        Ok(())
    }

    #[test]
    fn labels_fall_back_to_full_path_outside_root() {
        let assembler = Assembler::new("/work/proj", options(false));
        assert_eq!(assembler.label(Path::new("/elsewhere/x.rs")), "/elsewhere/x.rs");
    }
}
