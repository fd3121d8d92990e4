//! Structured error types for configuration operations.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Schema errors
    UnsupportedSchemaKind,

    // Layer resolution errors
    NoConfigurationFound,
    NoProjectRoot,

    // File errors
    IoError,
    ParseError,
    SerializeError,
}

/// Structured error for configuration operations.
#[derive(Debug, Error, Serialize)]
#[error("{message}")]
pub struct ConfigError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ConfigError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
            details: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors

    pub fn unsupported_schema(reason: &str) -> Self {
        Self::new(
            ErrorCode::UnsupportedSchemaKind,
            format!(
                "Schema must be a validated record, a plain record, or a mapping: {}",
                reason
            ),
        )
    }

    pub fn no_configuration(user_path: &Path, project_path: Option<&Path>) -> Self {
        let mut message = String::from("Configuration files not found. ");
        if let Some(path) = project_path {
            message.push_str(&format!("Project config missing at {}. ", path.display()));
        }
        message.push_str(&format!(
            "User config missing at {}. ",
            user_path.display()
        ));
        message.push_str(
            "Create a template with create_user_template() or create_project_template(), \
             or enable auto-create.",
        );
        Self::new(ErrorCode::NoConfigurationFound, message).with_path(user_path)
    }

    pub fn no_project_root() -> Self {
        Self::new(
            ErrorCode::NoProjectRoot,
            "No project root found. Cannot update project configuration.",
        )
    }

    pub fn io(path: &Path, err: impl fmt::Display) -> Self {
        let details = err.to_string();
        Self::new(
            ErrorCode::IoError,
            format!("I/O error on {}: {}", path.display(), details),
        )
        .with_path(path)
        .with_details(details)
    }

    pub fn parse(path: &Path, err: impl fmt::Display) -> Self {
        let details = err.to_string();
        Self::new(
            ErrorCode::ParseError,
            format!("Failed to parse {}: {}", path.display(), details),
        )
        .with_path(path)
        .with_details(details)
    }

    pub fn serialize(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::SerializeError, err.to_string())
    }

    /// True for errors a caller can recover from by creating a file or
    /// skipping the project layer.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::NoConfigurationFound | ErrorCode::NoProjectRoot
        )
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
