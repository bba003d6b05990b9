use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::document::DEFAULT_MAX_CHAIN_DEPTH;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Field names (tier id before `@`) to export and report; empty means all
    #[serde(default)]
    pub export_fields: Vec<String>,

    /// Field used as coverage baseline; first tier of each speaker when unset
    #[serde(default)]
    pub baseline_field: Option<String>,

    /// Maximum number of governing-reference hops when resolving intervals
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,

    /// CSV file written by the export command
    #[serde(default = "default_csv_file")]
    pub csv_file: String,

    /// Append to the CSV file instead of replacing it
    #[serde(default)]
    pub csv_append: bool,

    /// Template (.etf or .eaf) whose linguistic types are imported before edits
    #[serde(default)]
    pub template: Option<String>,

    /// Suffix inserted before `.eaf` in edited output files
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_max_chain_depth() -> usize {
    DEFAULT_MAX_CHAIN_DEPTH
}

fn default_csv_file() -> String {
    "export.csv".to_string()
}

fn default_output_suffix() -> String {
    "edited".to_string()
}

impl Config {
    /// Load the configuration from a JSON file, creating a default one when missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .context(format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .context(format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path.as_ref(), config_json)
            .context(format!("Failed to write config to file: {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.max_chain_depth == 0 {
            return Err(anyhow!("max_chain_depth must be at least 1"));
        }

        if let Some(field) = self.export_fields.iter().find(|f| f.trim().is_empty()) {
            return Err(anyhow!("Export field names must not be empty (got '{}')", field));
        }

        if self.baseline_field.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(anyhow!("baseline_field must not be empty when set"));
        }

        if self.csv_file.trim().is_empty() {
            return Err(anyhow!("csv_file must not be empty"));
        }

        if self.output_suffix.contains(['/', '\\']) {
            return Err(anyhow!("output_suffix must not contain path separators"));
        }

        Ok(())
    }

    /// Export fields as a filter, `None` when every tier is selected
    pub fn field_filter(&self) -> Option<Vec<&str>> {
        if self.export_fields.is_empty() {
            None
        } else {
            Some(self.export_fields.iter().map(String::as_str).collect())
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            export_fields: Vec::new(),
            baseline_field: None,
            max_chain_depth: default_max_chain_depth(),
            csv_file: default_csv_file(),
            csv_append: false,
            template: None,
            output_suffix: default_output_suffix(),
            log_level: LogLevel::default(),
        }
    }
}
