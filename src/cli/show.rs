//! Read-only commands: show-config and get-config.

use super::display_value;
use crate::config::{ConfigManager, Mapping, MissingPolicy, Schema, read_structured};
use crate::paths::ConfigPaths;
use anyhow::{Result, bail};
use clap::Args;
use serde_json::Value;
use std::fmt::Write;
use std::path::Path;

/// Arguments for the show-config command.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Config name
    pub name: String,
}

/// Arguments for the get-config command.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Config name
    pub name: String,

    /// Dotted key, e.g. `database.port`
    pub key: String,
}

/// Render every layer file and the effective configuration.
pub fn run_show(args: &ShowArgs, paths: ConfigPaths) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Configuration: {}", args.name)?;
    writeln!(out)?;

    write_layer(&mut out, "User", Some(&paths.user_config))?;
    write_layer(&mut out, "Project", paths.project_config.as_deref())?;

    let mut manager = effective_manager(&args.name, paths);
    let layers = manager
        .contributing_layers()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    let effective = manager.config()?.clone();

    writeln!(out, "Effective ({}):", layers.join(" < "))?;
    write_mapping(&mut out, &effective);
    Ok(out)
}

/// Look up one dotted key in the effective configuration.
pub fn run_get(args: &GetArgs, paths: ConfigPaths) -> Result<String> {
    let mut manager = effective_manager(&args.name, paths);
    match manager.config_model()?.get_value(&args.key) {
        Some(value) => Ok(display_value(&value).trim_end().to_string()),
        None => bail!("Key '{}' not found in {} configuration", args.key, args.name),
    }
}

fn effective_manager(name: &str, paths: ConfigPaths) -> ConfigManager<Mapping> {
    ConfigManager::new(name, Schema::free_form())
        .with_paths(paths)
        .with_missing_policy(MissingPolicy::UseDefaults)
}

fn write_layer(out: &mut String, label: &str, path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        writeln!(out, "{} config: (no project root found)", label)?;
        writeln!(out)?;
        return Ok(());
    };

    writeln!(out, "{} config: {}", label, path.display())?;
    match read_structured(path) {
        Ok(Some(mapping)) if !mapping.is_empty() => write_mapping(out, &mapping),
        Ok(_) if path.exists() => writeln!(out, "  (empty)")?,
        Ok(_) => writeln!(out, "  (not found)")?,
        Err(e) => writeln!(out, "  (unreadable: {})", e)?,
    }
    writeln!(out)?;
    Ok(())
}

fn write_mapping(out: &mut String, mapping: &Mapping) {
    if mapping.is_empty() {
        out.push_str("  {}\n");
        return;
    }
    let rendered = display_value(&Value::Object(mapping.clone()));
    for line in rendered.lines() {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
}
