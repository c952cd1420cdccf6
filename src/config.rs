//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.locscout.toml` files.

use crate::fetch::ClientConfig;
use crate::input::TableLayout;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".locscout.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Record source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Gene table settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where and how records are fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL template; `{accession}` is replaced by each accession.
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// Request timeout in seconds. Unset keeps the HTTP client default.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            timeout_seconds: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_url_template() -> String {
    ClientConfig::default().url_template
}

fn default_user_agent() -> String {
    ClientConfig::default().user_agent
}

/// Gene table location and layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path of the gene table.
    #[serde(default = "default_input_path")]
    pub path: PathBuf,

    /// Field delimiter (a single character).
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Header of the gene column.
    #[serde(default = "default_gene_column")]
    pub gene_column: String,

    /// Header of the accession list column.
    #[serde(default = "default_members_column")]
    pub members_column: String,

    /// Separator between accessions in one cell.
    #[serde(default = "default_member_separator")]
    pub member_separator: String,

    /// First data row to read (1-based).
    #[serde(default = "default_first_row")]
    pub first_row: usize,

    /// Maximum number of data rows to read.
    #[serde(default)]
    pub max_rows: Option<usize>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            delimiter: default_delimiter(),
            gene_column: default_gene_column(),
            members_column: default_members_column(),
            member_separator: default_member_separator(),
            first_row: default_first_row(),
            max_rows: None,
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("genes.csv")
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_gene_column() -> String {
    "gene".to_string()
}

fn default_members_column() -> String {
    "accessions".to_string()
}

fn default_member_separator() -> String {
    ";".to_string()
}

fn default_first_row() -> usize {
    1
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving every artifact.
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// Snapshot file name inside the output directory.
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            snapshot_file: default_snapshot_file(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("locscout_out")
}

fn default_snapshot_file() -> String {
    "locations.json".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of locations plotted in each pie chart.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

fn default_top_n() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.input.path = input.clone();
        }
        if let Some(first_row) = args.first_row {
            self.input.first_row = first_row;
        }
        if let Some(max_rows) = args.max_rows {
            self.input.max_rows = Some(max_rows);
        }

        if let Some(ref dir) = args.output_dir {
            self.output.directory = dir.clone();
        }

        if let Some(ref template) = args.url_template {
            self.source.url_template = template.clone();
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = Some(timeout);
        }

        if let Some(top) = args.top {
            self.report.top_n = top;
        }
    }

    /// Path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.output.directory.join(&self.output.snapshot_file)
    }

    /// HTTP client settings.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            url_template: self.source.url_template.clone(),
            timeout_seconds: self.source.timeout_seconds,
            user_agent: self.source.user_agent.clone(),
        }
    }

    /// Gene table layout, validating the single-character settings.
    pub fn table_layout(&self) -> Result<TableLayout> {
        let delimiter = single_char(&self.input.delimiter, "input.delimiter")?;
        if !delimiter.is_ascii() {
            anyhow::bail!("input.delimiter must be an ASCII character");
        }
        let member_separator = single_char(&self.input.member_separator, "input.member_separator")?;

        Ok(TableLayout {
            delimiter: delimiter as u8,
            gene_column: self.input.gene_column.clone(),
            members_column: self.input.members_column.clone(),
            member_separator,
            first_row: self.input.first_row,
            max_rows: self.input.max_rows,
        })
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

fn single_char(value: &str, key: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => anyhow::bail!("{} must be exactly one character, got {:?}", key, value),
    }
}
