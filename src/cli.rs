//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// LocScout - subcellular location survey of UniProt records
///
/// Reads a table of genes and their protein accessions, fetches every
/// UniProt entry, collects the subcellular locations per gene and writes
/// ranked tables, pie charts and a summary.
///
/// Examples:
///   locscout --input genes.csv
///   locscout --input genes.tsv --output-dir out --resume
///   locscout --report-only --output-dir out --format json
///   locscout --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Gene table (CSV by default; see [input] in the config file)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Directory for the snapshot, tables, charts and summary
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .locscout.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Continue from the existing snapshot, skipping genes already recorded
    #[arg(long)]
    pub resume: bool,

    /// Skip fetching and report from the existing snapshot
    #[arg(long, conflicts_with = "resume")]
    pub report_only: bool,

    /// First data row of the gene table to process (1-based)
    #[arg(long, value_name = "ROW")]
    pub first_row: Option<usize>,

    /// Maximum number of data rows to process
    #[arg(long, value_name = "COUNT")]
    pub max_rows: Option<usize>,

    /// Record URL template containing {accession}
    #[arg(long, value_name = "URL", env = "LOCSCOUT_URL_TEMPLATE")]
    pub url_template: Option<String>,

    /// Request timeout in seconds (default: HTTP client default)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of locations shown in charts and in the summary
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Summary format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Exit with code 2 if any gene ends up without a location
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .locscout.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// File extension for the summary file.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(first_row) = self.first_row {
            if first_row == 0 {
                return Err("First row is 1-based and must be at least 1".to_string());
            }
        }

        if let Some(max_rows) = self.max_rows {
            if max_rows == 0 {
                return Err("Max rows must be at least 1".to_string());
            }
        }

        if let Some(top) = self.top {
            if top == 0 {
                return Err("Top must be at least 1".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref template) = self.url_template {
            if !template.starts_with("http://") && !template.starts_with("https://") {
                return Err("URL template must start with 'http://' or 'https://'".to_string());
            }
            if !template.contains("{accession}") {
                return Err("URL template must contain {accession}".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if !self.report_only && !input.is_file() {
                return Err(format!("Gene table does not exist: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
