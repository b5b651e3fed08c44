//! Configuration parsing for the seedline binary.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides
//! - Sensible defaults for quick start

use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::PopulateError;
use crate::executor::DEFAULT_BATCH_SIZE;
use crate::populator::Populator;
use crate::script::Script;

/// Seedline: populate a SQLite database from line-oriented SQL scripts.
#[derive(Parser, Debug, Clone)]
#[command(name = "seedline")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// SQLite database file to populate (created if missing)
    #[arg(short, long, env = "SEEDLINE_DATABASE")]
    pub database: PathBuf,

    /// SQL scripts to execute, in order (one statement per line)
    #[arg(required = true)]
    pub scripts: Vec<PathBuf>,

    /// Encoding of the scripts (UTF-8, US-ASCII, ISO-8859-1)
    #[arg(long, env = "SEEDLINE_SQL_SCRIPT_ENCODING")]
    pub encoding: Option<String>,

    /// Number of statements per committed batch
    #[arg(short, long, env = "SEEDLINE_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Log and skip every failing statement
    #[arg(long, env = "SEEDLINE_CONTINUE_ON_ERROR")]
    pub continue_on_error: bool,

    /// Log and skip failing DROP statements
    #[arg(long, env = "SEEDLINE_IGNORE_FAILED_DROPS")]
    pub ignore_failed_drops: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown output format: {s}")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build the populator described by this configuration.
    pub fn to_populator(&self) -> Result<Populator, PopulateError> {
        let mut builder = Populator::builder()
            .scripts(self.scripts.iter().map(Script::file))
            .batch_size(self.batch_size)
            .continue_on_error(self.continue_on_error)
            .ignore_failed_drops(self.ignore_failed_drops);

        if let Some(encoding) = &self.encoding {
            builder = builder.sql_script_encoding(encoding.clone());
        }

        builder.build()
    }

    /// Create a configuration for testing.
    #[cfg(test)]
    pub fn test_config(database: PathBuf, scripts: Vec<PathBuf>) -> Self {
        Self {
            database,
            scripts,
            log_level: "debug".into(),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("seedline.db"),
            scripts: Vec::new(),
            encoding: None,
            batch_size: DEFAULT_BATCH_SIZE,
            continue_on_error: false,
            ignore_failed_drops: false,
            log_level: "info".into(),
            output: OutputFormat::Text,
        }
    }
}
