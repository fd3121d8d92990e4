//! CLI command definitions for conftier
//!
//! This module defines the CLI structure using clap's derive macros.
//! Every command works on a free-form mapping schema, so any config name can
//! be inspected or edited without knowing its record type.

pub mod init;
pub mod set;
pub mod show;

use clap::{Parser, Subcommand};
use init::{InitProjectArgs, InitUserArgs};
use serde_json::{Number, Value};
use set::SetArgs;
use show::{GetArgs, ShowArgs};

/// Layered configuration tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the project config file for a name
    InitProject(InitProjectArgs),

    /// Create the user config file for a name
    InitUser(InitUserArgs),

    /// Show every layer and the effective configuration
    ShowConfig(ShowArgs),

    /// Print the effective value at a dotted key
    GetConfig(GetArgs),

    /// Set a dotted key in the user or project file
    SetConfig(SetArgs),
}

impl Command {
    /// The config name the command operates on.
    pub fn config_name(&self) -> &str {
        match self {
            Command::InitProject(args) => &args.name,
            Command::InitUser(args) => &args.name,
            Command::ShowConfig(args) => &args.name,
            Command::GetConfig(args) => &args.name,
            Command::SetConfig(args) => &args.name,
        }
    }
}

/// Infer a typed value from command-line text.
///
/// `true`/`false` in any case become booleans, then integers, then finite
/// floats. Anything else stays a string.
pub fn parse_value(text: &str) -> Value {
    if text.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(int) = text.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Ok(float) = text.parse::<f64>() {
        if let Some(number) = Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    Value::String(text.to_string())
}

/// Render a value for terminal output. Strings print bare.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_yaml::to_string(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value_booleans() {
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("FALSE"), json!(false));
        assert_eq!(parse_value("True"), json!(true));
    }

    #[test]
    fn test_parse_value_numbers() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("-7"), json!(-7));
        assert_eq!(parse_value("0.5"), json!(0.5));
    }

    #[test]
    fn test_parse_value_strings() {
        assert_eq!(parse_value("hello"), json!("hello"));
        assert_eq!(parse_value("NaN"), json!("NaN"));
        assert_eq!(parse_value("inf"), json!("inf"));
        assert_eq!(parse_value(""), json!(""));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("plain")), "plain");
        assert_eq!(display_value(&json!(3)), "3");
        assert_eq!(display_value(&json!({"a": 1})), "a: 1\n");
    }

    #[test]
    fn test_cli_parses_set_config() {
        let cli = Cli::try_parse_from([
            "conftier",
            "set-config",
            "demo",
            "--key",
            "db.port",
            "--value",
            "5432",
            "--project",
        ])
        .unwrap();
        assert_eq!(cli.command.config_name(), "demo");
        assert_eq!(cli.log, "2");
        match cli.command {
            Command::SetConfig(args) => {
                assert_eq!(args.key, "db.port");
                assert!(args.project);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
