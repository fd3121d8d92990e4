//! conftier command-line tool
//!
//! Inspect and edit layered configuration files.

use anyhow::Result;
use clap::Parser;
use conftier::cli::{Cli, Command, init, set, show};
use conftier::logging::{self, LogTarget};
use conftier::paths::ConfigPaths;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let target: LogTarget = cli.log.parse()?;
    logging::init(&target, cli.verbose)?;

    let paths = ConfigPaths::discover(cli.command.config_name());
    tracing::debug!(?paths, "Resolved config paths");

    let output = match &cli.command {
        Command::InitProject(args) => init::run_init_project(args, paths)?,
        Command::InitUser(args) => init::run_init_user(args, paths)?,
        Command::ShowConfig(args) => show::run_show(args, paths)?,
        Command::GetConfig(args) => show::run_get(args, paths)?,
        Command::SetConfig(args) => set::run_set(args, paths)?,
    };
    println!("{}", output.trim_end());

    Ok(())
}
