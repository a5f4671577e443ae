//! EXIF Date Fixer - restore missing capture dates from filenames
//!
//! This library provides functionality for photos whose EXIF metadata was
//! stripped but whose original filenames still encode the capture time:
//! - Filename date parsing for WhatsApp, Samsung and Windows Phone names
//! - EXIF capture date detection and writing
//! - Supported image discovery
//! - Sequential batch processing with per-file progress and a summary

pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod i18n;
pub mod process;
pub mod report;
pub mod time;

pub use cli::Cli;
pub use config::{Config, ConfigError};
pub use discover::{SUPPORTED_EXTENSIONS, discover};
pub use error::{Error, Result};
pub use process::{BatchRun, BatchSummary, FileResult, ProcessingStatus, Processor, ProgressEvent};
pub use report::RunReport;
pub use time::exif::{ExifGateway, MetadataGateway};
pub use time::filename::{FilenameConvention, FilenameDateParser, ParseOutcome, ParserRegistry};
