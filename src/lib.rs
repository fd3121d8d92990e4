//! Layered configuration library.
//!
//! A configuration named `<name>` is assembled from three layers, lowest to
//! highest priority: the schema defaults, the user file at
//! `~/.zeeland/<name>/config.yaml` and the project file at
//! `<project root>/.<name>/config.yaml`.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use config::{
    AutoCreate, ConfigLayer, ConfigManager, ConfigModel, Mapping, MissingPolicy, Record, Schema,
    SchemaKind, deep_merge,
};
pub use error::{ConfigError, ConfigResult, ErrorCode};
pub use paths::ConfigPaths;
