//! Command line and configuration file handling.
//!
//! Settings are layered: built-in defaults, then an optional TOML file
//! (`hr-dashboard.toml` or `--config`), then `HR_DASHBOARD__*` environment
//! variables, then command line flags.
//!
//! ```toml
//! drive_file_id = "1PYjw9lKCby0Kuj1d_VGFPYRIHFSBX7FM"
//! drop_missing = true
//! charts_follow_filters = false
//! timeout_secs = 60
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::remote::{DataSource, LoadOptions, DEFAULT_DRIVE_FILE_ID};

const DEFAULT_CONFIG_FILE: &str = "hr-dashboard.toml";

#[derive(Parser, Debug, Default)]
#[command(name = "hr-dashboard")]
#[command(about = "Employee performance analysis and HR dashboard")]
pub struct Args {
    /// Shared drive file id of the employee CSV
    #[arg(long, conflicts_with_all = ["url", "file"])]
    pub file_id: Option<String>,

    /// Download the employee CSV from this URL instead
    #[arg(long, conflicts_with_all = ["file_id", "file"])]
    pub url: Option<String>,

    /// Read a local .csv, .json or .parquet file instead of downloading
    #[arg(short, long, conflicts_with_all = ["file_id", "url"])]
    pub file: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Drop rows with missing values before filtering (`--drop-missing=false` to keep them)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub drop_missing: Option<bool>,

    /// HTTP timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub drive_file_id: String,
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    pub drop_missing: bool,
    /// Charts and statistics use the filtered rows instead of the whole table.
    pub charts_follow_filters: bool,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            drive_file_id: DEFAULT_DRIVE_FILE_ID.to_string(),
            url: None,
            file: None,
            drop_missing: false,
            charts_follow_filters: true,
            timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load settings from the config file and environment, then apply `args`.
    pub fn load(args: &Args) -> Result<Self> {
        let (path, required) = match &args.config {
            Some(p) => (p.as_path(), true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        let settings: Settings = Config::builder()
            .add_source(File::from(path).required(required))
            .add_source(Environment::with_prefix("HR_DASHBOARD").separator("__"))
            .build()
            .with_context(|| format!("reading configuration {}", path.display()))?
            .try_deserialize()
            .context("invalid configuration")?;

        Ok(settings.with_args(args))
    }

    /// Command line flags take precedence over everything else.
    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(id) = &args.file_id {
            self.drive_file_id = id.clone();
            self.url = None;
            self.file = None;
        }
        if let Some(url) = &args.url {
            self.url = Some(url.clone());
            self.file = None;
        }
        if let Some(file) = &args.file {
            self.file = Some(file.clone());
            self.url = None;
        }
        if let Some(drop_missing) = args.drop_missing {
            self.drop_missing = drop_missing;
        }
        if let Some(secs) = args.timeout_secs {
            self.timeout_secs = secs;
        }
        self
    }

    /// The data source, most specific first: file, URL, drive id.
    pub fn source(&self) -> DataSource {
        if let Some(path) = &self.file {
            DataSource::File(path.clone())
        } else if let Some(url) = &self.url {
            DataSource::Url(url.clone())
        } else {
            DataSource::Drive {
                file_id: self.drive_file_id.clone(),
            }
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            drop_missing: self.drop_missing,
        }
    }
}
