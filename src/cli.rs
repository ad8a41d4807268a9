//! Command-line interface for tabregress

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tabregress")]
#[command(about = "Detect schema and value regressions between two versions of a table")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare the current version of a table against the previous one
    Compare {
        /// Current table (csv, tsv, json, jsonl or parquet)
        current: PathBuf,

        /// Previous table to compare against
        previous: PathBuf,

        /// Primary key column; repeat or comma-separate for a composite key
        #[arg(short, long = "key", value_delimiter = ',')]
        key: Vec<String>,

        /// Output format: "pretty", "json"
        #[arg(long, value_parser = validate_format)]
        format: Option<String>,

        /// Also write the JSON report to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// JSON config file providing defaults for these options
        #[arg(long)]
        config: Option<PathBuf>,

        /// Exit with status 2 when a potential regression is found
        #[arg(long)]
        fail_on_regression: bool,
    },

    /// Run the comparison on a built-in product catalogue
    Demo {
        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty", value_parser = validate_format)]
        format: String,
    },
}

/// Parse output format string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

fn validate_format(s: &str) -> Result<String, String> {
    OutputFormat::parse(s).map(|_| s.to_lowercase())
}
