use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ctxjoin test suite through cargo nextest
    Nextest {
        #[arg(long)]
        profile: Option<String>,
        /// Review pending insta snapshots afterwards
        #[arg(long)]
        review: bool,
    },
    /// Check formatting and run clippy with warnings denied
    Lint,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Nextest { profile, review } => {
            run_nextest(profile)?;
            if review {
                cargo(&["insta", "review"])?;
            }
        }
        Commands::Lint => {
            cargo(&["fmt", "--all", "--", "--check"])?;
            cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;
        }
    }
    Ok(())
}

fn run_nextest(profile: Option<String>) -> Result<()> {
    let mut args = vec!["nextest", "run", "--package", "ctxjoin"];
    if let Some(profile) = profile.as_deref() {
        args.extend(["--profile", profile]);
    }
    cargo(&args)
}

fn cargo(args: &[&str]) -> Result<()> {
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {} failed", args.join(" "));
    }
    Ok(())
}
