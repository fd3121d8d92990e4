//! The set-config command.

use super::{display_value, parse_value};
use crate::config::{ConfigLayer, ConfigManager, Schema};
use crate::paths::ConfigPaths;
use anyhow::{Result, bail};
use clap::Args;

/// Arguments for the set-config command.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Config name
    pub name: String,

    /// Dotted key, e.g. `database.port`
    #[arg(short, long)]
    pub key: String,

    /// New value; booleans and numbers are inferred
    #[arg(long)]
    pub value: String,

    /// Write to the project file instead of the user file
    #[arg(long)]
    pub project: bool,
}

/// Set one key and persist it. Returns the message to print.
pub fn run_set(args: &SetArgs, paths: ConfigPaths) -> Result<String> {
    let value = parse_value(&args.value);
    let mut manager = ConfigManager::new(&args.name, Schema::free_form()).with_paths(paths);

    let (layer, applied) = if args.project {
        (
            ConfigLayer::Project,
            manager.set_project_value(&args.key, value.clone())?,
        )
    } else {
        (
            ConfigLayer::User,
            manager.set_user_value(&args.key, value.clone())?,
        )
    };

    if !applied {
        bail!("Cannot set '{}' in the {} config", args.key, layer);
    }

    let path = match layer {
        ConfigLayer::Project => manager.project_config_path(),
        _ => Some(manager.user_config_path()),
    };
    let target = path.map(|p| p.display().to_string()).unwrap_or_default();
    Ok(format!(
        "Set {} = {} in {} config ({})",
        args.key,
        display_value(&value),
        layer,
        target
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, ErrorCode};
    use tempfile::TempDir;

    fn args(key: &str, value: &str, project: bool) -> SetArgs {
        SetArgs {
            name: "demo".to_string(),
            key: key.to_string(),
            value: value.to_string(),
            project,
        }
    }

    #[test]
    fn test_set_user_nested_value() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs("demo", temp.path(), None);

        let message = run_set(&args("db.port", "5432", false), paths.clone()).unwrap();
        assert!(message.contains("db.port = 5432"));

        let mut manager = ConfigManager::new("demo", Schema::free_form()).with_paths(paths);
        let user = manager.get_user_config().unwrap();
        assert_eq!(user["db"]["port"], 5432);
    }

    #[test]
    fn test_set_project_without_root() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs("demo", temp.path(), None);

        let err = run_set(&args("debug", "true", true), paths).unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>().unwrap();
        assert_eq!(config_err.code, ErrorCode::NoProjectRoot);
    }
}
