//! Structured file I/O for configuration layers.
//!
//! Layer files are YAML mappings. An absent file, an empty file and a file
//! holding only `null` all read as "no mapping".

use super::Mapping;
use crate::error::{ConfigError, ConfigResult};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Read a layer file into a mapping.
///
/// Returns `Ok(None)` when the file is absent or has no content. Unreadable
/// files and content that is not a YAML mapping are errors.
pub fn read_structured(path: &Path) -> ConfigResult<Option<Mapping>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    if content.trim().is_empty() {
        debug!(path = %path.display(), "Config file is empty");
        return Ok(None);
    }

    let value: Value = serde_yaml::from_str(&content).map_err(|e| ConfigError::parse(path, e))?;
    match value {
        Value::Null => Ok(None),
        Value::Object(mapping) => Ok(Some(mapping)),
        other => Err(ConfigError::parse(
            path,
            format!("top-level value is {}, expected a mapping", value_kind(&other)),
        )),
    }
}

/// Write a mapping to a layer file, creating parent directories as needed.
pub fn write_structured(path: &Path, mapping: &Mapping) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
    }

    let yaml = serde_yaml::to_string(mapping).map_err(ConfigError::serialize)?;
    std::fs::write(path, yaml).map_err(|e| ConfigError::io(path, e))?;
    debug!(path = %path.display(), "Wrote config file");
    Ok(())
}

/// Write a mapping only if the file does not exist yet.
///
/// Returns `true` when the file was created.
pub fn write_if_absent(path: &Path, mapping: &Mapping) -> ConfigResult<bool> {
    if path.exists() {
        return Ok(false);
    }
    write_structured(path, mapping)?;
    info!(path = %path.display(), "Created config template");
    Ok(true)
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
