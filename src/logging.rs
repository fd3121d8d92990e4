//! Logging setup for the command-line tool.
//!
//! Library code only emits `tracing` events; the binary decides where they go.
//! `RUST_LOG` takes precedence over the `--verbose` flag when set.

use anyhow::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// No logging
    Off,
    Stdout,
    Stderr,
    /// Append to a file
    File(PathBuf),
}

impl FromStr for LogTarget {
    type Err = std::convert::Infallible;

    /// Accepts `0`/`off`, `1`/`stdout`, `2`/`stderr`, or a file name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" | "off" => LogTarget::Off,
            "1" | "stdout" => LogTarget::Stdout,
            "2" | "stderr" => LogTarget::Stderr,
            filename => LogTarget::File(PathBuf::from(filename)),
        })
    }
}

/// Level directive used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber for `target`.
pub fn init(target: &LogTarget, verbose: bool) -> Result<()> {
    match target {
        LogTarget::Off => {
            // No logging
        }
        LogTarget::Stdout => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(verbose))
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::Stderr => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(verbose))
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(verbose))
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        assert_eq!("0".parse::<LogTarget>().unwrap(), LogTarget::Off);
        assert_eq!("off".parse::<LogTarget>().unwrap(), LogTarget::Off);
        assert_eq!("1".parse::<LogTarget>().unwrap(), LogTarget::Stdout);
        assert_eq!("stderr".parse::<LogTarget>().unwrap(), LogTarget::Stderr);
        assert_eq!(
            "conftier.log".parse::<LogTarget>().unwrap(),
            LogTarget::File(PathBuf::from("conftier.log"))
        );
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(true), "debug");
        assert_eq!(default_directive(false), "warn");
    }
}
