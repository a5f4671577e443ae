//! Configuration types for the EXIF date fixer

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory to scan for image files
    pub input_dir: PathBuf,

    /// Scan subdirectories as well
    #[serde(default)]
    pub recursive: bool,

    /// Dry run mode - report what would change without writing
    #[serde(default)]
    pub dry_run: bool,

    /// Restore each file's modification time after writing EXIF
    #[serde(default = "default_true")]
    pub preserve_mtime: bool,

    /// Write a JSON report of the run to this file
    #[serde(default)]
    pub report_file: Option<PathBuf>,

    /// Directory for log files (defaults to `Log` next to the executable)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Output log format as JSON
    #[serde(default)]
    pub json_log: bool,
}

/// Leading comment block of saved config files
const HEADER: &str = "\
# EXIF Date Fixer Configuration File
#
# input_dir       directory to scan for .jpg, .jpeg, .heic and .heif files
# recursive       scan subdirectories as well
# dry_run         show what would change without writing anything
# preserve_mtime  keep each file's modification time after writing EXIF
# report_file     write a JSON report of every file's outcome
# log_dir         directory for log files (default: Log next to the executable)
# verbose         show detailed processing information
# json_log        write the log file as JSON lines
";

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            recursive: false,
            dry_run: false,
            preserve_mtime: true,
            report_file: None,
            log_dir: None,
            verbose: false,
            json_log: false,
        }
    }
}

impl Config {
    /// Check that the input directory exists and is a directory
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.input_dir.is_dir() {
            return Err(ConfigError::InvalidInputDir {
                path: self.input_dir.clone(),
            });
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file, as written by `--init-config`
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let body =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError { source: e })?;
        let content = format!("{}\n{}", HEADER, body);

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }
}

/// Errors that can occur when loading, saving or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to write config file '{}': {source}", path.display())]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {source}")]
    SerializeError { source: toml::ser::Error },

    #[error("Path '{}' does not exist or is not a directory", path.display())]
    InvalidInputDir { path: PathBuf },
}
