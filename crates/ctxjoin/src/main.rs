use std::process::ExitCode;

use clap::Parser;

fn main() -> anyhow::Result<ExitCode> {
    let cli = ctxjoin::cli::Cli::parse();
    ctxjoin::infra::logging::init(cli.verbose);
    cli.run()
}
