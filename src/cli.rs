//! CLI argument parsing with clap

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// EXIF Date Fixer - Adds EXIF date metadata to images based on filename patterns
///
/// Scans a directory for .jpg, .jpeg, .heic and .heif files. Files without an
/// EXIF capture date get one inferred from WhatsApp, Samsung or Windows Phone
/// style filenames.
#[derive(Parser, Debug)]
#[command(name = "exif-date-fixer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to scan for image files [default: .]
    pub path: Option<PathBuf>,

    /// Scan directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Preview changes without modifying files
    #[arg(short, long)]
    pub dry_run: bool,

    /// Path to configuration file (TOML format)
    ///
    /// Settings from the file are used as defaults; CLI flags override them.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Write a JSON report of every file's outcome
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Let the file modification time change when EXIF is written
    #[arg(long)]
    pub no_preserve_mtime: bool,

    /// Directory for log files
    #[arg(long, env = "EXIF_DATE_FIXER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Save the effective configuration to the given file and exit
    #[arg(long, value_name = "FILE")]
    pub init_config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,
}

impl Cli {
    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref path) = self.path {
            config.input_dir = path.clone();
        }
        if self.recursive {
            config.recursive = true;
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if let Some(ref report) = self.report {
            config.report_file = Some(report.clone());
        }
        if self.no_preserve_mtime {
            config.preserve_mtime = false;
        }
        if let Some(ref log_dir) = self.log_dir {
            config.log_dir = Some(log_dir.clone());
        }
        if self.verbose {
            config.verbose = true;
        }
        if self.json_log {
            config.json_log = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        Config {
            input_dir: self.path.clone().unwrap_or_else(|| PathBuf::from(".")),
            recursive: self.recursive,
            dry_run: self.dry_run,
            preserve_mtime: !self.no_preserve_mtime,
            report_file: self.report.clone(),
            log_dir: self.log_dir.clone(),
            verbose: self.verbose,
            json_log: self.json_log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["exif-date-fixer"]);
        let config = cli.to_config();
        assert_eq!(config.input_dir, PathBuf::from("."));
        assert!(!config.recursive);
        assert!(!config.dry_run);
        assert!(config.preserve_mtime);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "exif-date-fixer",
            "/photos",
            "-r",
            "-d",
            "--report",
            "out.json",
            "--no-preserve-mtime",
        ]);
        let config = cli.to_config();
        assert_eq!(config.input_dir, PathBuf::from("/photos"));
        assert!(config.recursive);
        assert!(config.dry_run);
        assert!(!config.preserve_mtime);
        assert_eq!(config.report_file, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_merge_with_config() {
        let file_config = Config {
            input_dir: PathBuf::from("/from/file"),
            recursive: true,
            ..Default::default()
        };

        // No explicit path keeps the file's input dir
        let cli = Cli::parse_from(["exif-date-fixer", "--dry-run"]);
        let merged = cli.merge_with_config(file_config.clone());
        assert_eq!(merged.input_dir, PathBuf::from("/from/file"));
        assert!(merged.recursive);
        assert!(merged.dry_run);

        let cli = Cli::parse_from(["exif-date-fixer", "/from/cli"]);
        let merged = cli.merge_with_config(file_config.clone());
        assert_eq!(merged.input_dir, PathBuf::from("/from/cli"));
        assert!(!merged.dry_run);

        // An explicitly typed "." still wins over the file
        let cli = Cli::parse_from(["exif-date-fixer", "."]);
        let merged = cli.merge_with_config(file_config);
        assert_eq!(merged.input_dir, PathBuf::from("."));
    }
}
