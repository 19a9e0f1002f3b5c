//! Command line front end.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::assemble::{AssembleOptions, Assembler, Outcome, Resolution, TreeOutcome};
use crate::domain::model::OrderingPolicy;
use crate::infra::clipboard::Clipboard;
use crate::infra::config::Config;
use crate::infra::git;

#[derive(Debug, Parser)]
#[command(
    name = "ctxjoin",
    author,
    version,
    about = "Join selected files and a project tree into one clipboard-ready text",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root for the project tree and file labels [default: enclosing git checkout or
    /// the current directory]
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Order of files in the output
    #[arg(long, global = true, value_enum)]
    pub order: Option<OrderingPolicy>,

    /// Project tree depth when not pruning
    #[arg(long, global = true)]
    pub depth: Option<usize>,

    /// Limit the project tree to the selected files
    #[arg(long, global = true, overrides_with = "no_prune")]
    pub prune: bool,

    #[arg(long, global = true, hide = true)]
    pub no_prune: bool,

    /// Prefix the output with the project tree
    #[arg(long = "tree", global = true, overrides_with = "no_tree")]
    pub include_tree: bool,

    /// Leave the project tree out
    #[arg(long, global = true)]
    pub no_tree: bool,

    /// Ignore file read from the workspace root
    #[arg(long, global = true)]
    pub ignore_file: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Join the selected files and copy the result to the clipboard
    Copy {
        /// Files and directories to join
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print the result instead of copying it
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
        /// Write the result to a file instead of copying it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the files a selection resolves to
    Files {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Print the project tree, pruned to PATHS when pruning is enabled
    Tree { paths: Vec<PathBuf> },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Execute the parsed command.
    pub fn run(self) -> Result<ExitCode> {
        if let Commands::Completions { shell } = &self.command {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "ctxjoin", &mut io::stdout());
            return Ok(ExitCode::SUCCESS);
        }

        let root = self.workspace_root()?;
        let config = Config::load(&root)?.merge(self.overrides());
        tracing::debug!(root = %root.display(), ?config, "loaded configuration");
        let assembler = Assembler::new(&root, AssembleOptions::from_config(&config));

        match &self.command {
            Commands::Copy {
                paths,
                stdout,
                output,
            } => {
                let paths = normalized_paths(paths)?;
                copy(&assembler, &paths, *stdout, output.as_deref())
            }
            Commands::Files { paths, json } => {
                let paths = normalized_paths(paths)?;
                list_files(&assembler, &paths, *json)
            }
            Commands::Tree { paths } => {
                let paths = normalized_paths(paths)?;
                match assembler.tree(&paths)? {
                    TreeOutcome::Rendered(tree) => print!("{tree}"),
                    TreeOutcome::AllBinary { .. } => eprintln!("ctxjoin does not join binary files"),
                }
                Ok(ExitCode::SUCCESS)
            }
            Commands::Completions { .. } => Ok(ExitCode::SUCCESS),
        }
    }

    fn workspace_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => normalize(root),
            None => {
                let cwd = std::env::current_dir().context("unable to determine working directory")?;
                normalize(&git::workspace_root(&cwd))
            }
        }
    }

    /// Command line flags as the highest-precedence config layer.
    fn overrides(&self) -> Config {
        let mut layer = Config::default();
        layer.selection.order_files_by = self.order;
        layer.tree.depth = self.depth;
        layer.tree.ignore_file = self.ignore_file.clone();
        layer.tree.prune = flag_pair(self.prune, self.no_prune);
        layer.tree.include = flag_pair(self.include_tree, self.no_tree);
        layer
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// Absolute, canonical form of `path`; a path that cannot be canonicalized (usually a missing
/// one) keeps its absolute spelling so classification reports it.
fn normalize(path: &Path) -> Result<PathBuf> {
    let absolute =
        std::path::absolute(path).with_context(|| format!("invalid path {}", path.display()))?;
    Ok(absolute.canonicalize().unwrap_or(absolute))
}

fn normalized_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    paths.iter().map(|path| normalize(path)).collect()
}

fn copy(
    assembler: &Assembler,
    paths: &[PathBuf],
    to_stdout: bool,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let artifact = match assembler.assemble(paths)? {
        Outcome::Artifact(artifact) => artifact,
        Outcome::AllBinary { .. } => {
            eprintln!("ctxjoin does not join binary files");
            return Ok(ExitCode::SUCCESS);
        }
        Outcome::NothingSelected => {
            eprintln!("No file or folder selected.");
            return Ok(ExitCode::SUCCESS);
        }
    };

    let destination = if to_stdout {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(artifact.text.as_bytes())
            .context("failed to write to stdout")?;
        stdout.flush().context("failed to write to stdout")?;
        "stdout".to_owned()
    } else if let Some(path) = output {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(path, &artifact.text)
            .with_context(|| format!("failed to write output to {}", path.display()))?;
        path.display().to_string()
    } else {
        Clipboard::new()
            .copy(&artifact.text)
            .context("failed to copy result to clipboard")?;
        "your clipboard".to_owned()
    };

    let count = artifact.files.len();
    eprintln!(
        "copied {count} {} ({} chars) to {destination}",
        if count == 1 { "file" } else { "files" },
        artifact.characters()
    );
    Ok(ExitCode::SUCCESS)
}

fn list_files(assembler: &Assembler, paths: &[PathBuf], json: bool) -> Result<ExitCode> {
    let files = match assembler.resolve(paths)? {
        Resolution::Files(files) => files,
        Resolution::AllBinary { .. } => {
            eprintln!("ctxjoin does not join binary files");
            return Ok(ExitCode::SUCCESS);
        }
    };

    if json {
        let listed: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&listed).context("failed to serialize file list")?
        );
    } else {
        for file in &files {
            println!("{}", file.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}
