//! Template creation commands.

use crate::config::{ConfigManager, Mapping, Schema};
use crate::paths::{ConfigPaths, project_config_path_in};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the init-project command.
#[derive(Args, Debug)]
pub struct InitProjectArgs {
    /// Config name
    pub name: String,

    /// Project root (default: detected project root, then the current directory)
    #[arg(short, long, value_name = "DIR")]
    pub path: Option<PathBuf>,
}

/// Arguments for the init-user command.
#[derive(Args, Debug)]
pub struct InitUserArgs {
    /// Config name
    pub name: String,
}

/// Create the project template. Returns the message to print.
pub fn run_init_project(args: &InitProjectArgs, paths: ConfigPaths) -> Result<String> {
    let root = match args.path.as_ref().or(paths.project_root.as_ref()) {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to resolve the current directory")?,
    };
    let target = project_config_path_in(&root, &args.name);
    let existed = target.exists();

    let manager = manager_for(&args.name, paths);
    let path = manager.create_project_template(Some(&root))?;
    Ok(report(&path, existed))
}

/// Create the user template. Returns the message to print.
pub fn run_init_user(args: &InitUserArgs, paths: ConfigPaths) -> Result<String> {
    let existed = paths.user_exists();
    let manager = manager_for(&args.name, paths);
    let path = manager.create_user_template()?;
    Ok(report(&path, existed))
}

fn manager_for(name: &str, paths: ConfigPaths) -> ConfigManager<Mapping> {
    ConfigManager::new(name, Schema::free_form()).with_paths(paths)
}

fn report(path: &std::path::Path, existed: bool) -> String {
    if existed {
        format!("Config file already exists: {}", path.display())
    } else {
        format!("Created config file: {}", path.display())
    }
}
