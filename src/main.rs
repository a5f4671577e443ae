//! EXIF Date Fixer - restore missing capture dates from filenames
//!
//! A CLI tool that scans a directory for images without an EXIF capture
//! date and writes one inferred from the filename.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use exif_date_fixer::i18n::Strings;
use exif_date_fixer::{
    BatchSummary, Cli, Config, ExifGateway, ProcessingStatus, Processor, ProgressEvent,
    RunReport, SUPPORTED_EXTENSIONS, discover,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Colored, consistently formatted terminal output.

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(&format!("{}\n", "─".repeat(60))));
    }

    pub fn print_title(title: &str) {
        let _ = stdout().execute(Print(style(title).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_hint(msg: &str) {
        let _ = stdout().execute(Print(style("→ ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_key_value(key: &str, value: &str) {
        let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(style(value).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print a summary line: `- key: value`
    pub fn print_stat(key: &str, value: usize, color: Color) {
        let _ = stdout().execute(Print("- "));
        let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(style(value.to_string()).with(color).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print the `[i/n] name` line for a file
    pub fn print_progress(index: usize, total: usize, name: &str) {
        let counter = style(format!("[{}/{}]", index, total)).with(CliTheme::ACCENT);
        let _ = stdout().execute(Print(counter));
        let _ = stdout().execute(Print(format!(" {}\n", name)));
    }

    /// Print a per-file result line
    pub fn print_result(status_icon: &str, status_color: Color, label: &str, message: &str) {
        let icon_styled = style(status_icon).with(status_color).bold();
        let label_styled = style(label).with(status_color);
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(icon_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(label_styled));
        let _ = stdout().execute(Print(format!(": {}\n", message)));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Some(ref path) = cli.init_config {
        config.save_to_file(path)?;
        cli_output::print_hint(&format!("{}: {}", Strings::config_written(), path.display()));
        return Ok(ExitCode::SUCCESS);
    }

    let log_path = get_log_path(&config)?;
    let _guard = setup_logging(&config, &log_path)?;
    install_panic_hook();

    info!(version = env!("CARGO_PKG_VERSION"), "EXIF Date Fixer starting");
    if config.verbose {
        info!(?config, "Configuration loaded");
    }
    info!(log_file = %log_path.display(), "Log file location");

    // The core never validates the root; refuse to start instead.
    // Return rather than exit so the log guard flushes.
    if !check_input_dir(&config) {
        return Ok(ExitCode::FAILURE);
    }

    run(&config, &log_path)?;
    Ok(ExitCode::SUCCESS)
}

fn check_input_dir(config: &Config) -> bool {
    match config.validate() {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "Invalid input directory");
            cli_output::print_error(&Strings::path_not_exist(
                &config.input_dir.display().to_string(),
            ));
            false
        }
    }
}

/// Route panic reports into the log instead of the default stderr block
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        error!(panic = %info, "Panic");
    }));
}

fn run(config: &Config, log_path: &Path) -> Result<()> {
    use cli_output::*;

    let absolute = std::path::absolute(&config.input_dir)?;
    let yes_no = |flag: bool| if flag { Strings::yes() } else { Strings::no() };

    let dry_run_text = if config.dry_run {
        format!(" {}", Strings::dry_run_tag())
    } else {
        String::new()
    };
    print_title(&format!(
        "{} v{} - {}: {}{}",
        Strings::app_title(),
        env!("CARGO_PKG_VERSION"),
        Strings::scanning(),
        absolute.display(),
        dry_run_text
    ));
    print_key_value(Strings::recursive(), yes_no(config.recursive));
    print_key_value(Strings::dry_run(), yes_no(config.dry_run));
    let extensions: Vec<String> = SUPPORTED_EXTENSIONS.iter().map(|e| format!(".{}", e)).collect();
    print_key_value(Strings::supported_extensions(), &extensions.join(", "));
    print_blank();

    print_hint(Strings::finding_files());
    let files = discover(&config.input_dir, config.recursive);

    if files.is_empty() {
        print_warning(Strings::no_files_found());
        return Ok(());
    }

    print_hint(&Strings::found_files(files.len()));
    print_blank();

    let processor = Processor::new(ExifGateway::new(config.preserve_mtime));
    let results = processor.process(&files, config.dry_run, print_event);

    // Summary reuses the results from the single pass above
    let summary = BatchSummary::from_results(&results);
    print_summary(&summary, config.dry_run);

    if let Some(ref report_path) = config.report_file {
        let report = RunReport::new(&absolute, config.recursive, config.dry_run, &results);
        match report.save(report_path) {
            Ok(path) => print_hint(&format!("{}: {}", Strings::report_saved(), path.display())),
            Err(e) => {
                error!(error = %e, "Failed to save report");
                print_error(&e.to_string());
            }
        }
    }

    print_separator();
    print_hint(&format!("{}: {}", Strings::log_file(), log_path.display()));
    info!(log_file = %log_path.display(), "Processing complete. Log saved to");

    Ok(())
}

fn print_event(event: &ProgressEvent) {
    use cli_output::*;

    print_progress(event.index, event.total, &event.file_name);

    let result = &event.result;
    match result.status {
        ProcessingStatus::Updated => {
            print_result("✓", CliTheme::SUCCESS, Strings::status_updated(), &result.message)
        }
        ProcessingStatus::WouldUpdate => print_result(
            "→",
            CliTheme::ACCENT,
            Strings::status_would_update(),
            &result.message,
        ),
        ProcessingStatus::SkippedHasDate | ProcessingStatus::SkippedNoDateInFilename => {
            print_result("-", CliTheme::WARNING, Strings::status_skipped(), &result.message)
        }
        ProcessingStatus::Error => {
            print_result("✗", CliTheme::ERROR, Strings::status_error(), &result.message)
        }
    }
    print_blank();
}

fn print_summary(summary: &BatchSummary, dry_run: bool) {
    use cli_output::*;

    print_separator();
    print_title(&format!("{}:", Strings::summary()));
    print_stat(Strings::total_files(), summary.total(), CliTheme::ACCENT);
    if dry_run {
        print_stat(Strings::status_would_update(), summary.would_update, CliTheme::SUCCESS);
    } else {
        print_stat(Strings::status_updated(), summary.updated, CliTheme::SUCCESS);
    }
    print_stat(Strings::skipped_has_date(), summary.skipped_has_date, CliTheme::WARNING);
    print_stat(Strings::skipped_no_date(), summary.skipped_no_date, CliTheme::WARNING);
    print_stat(Strings::errors(), summary.errors, CliTheme::ERROR);

    if dry_run {
        print_blank();
        print_warning(Strings::dry_run_notice());
    }
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref config_path) => {
            let file_config = Config::load_from_file(config_path)?;
            cli.merge_with_config(file_config)
        }
        None => cli.to_config(),
    };
    Ok(config)
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Log file path: `<log_dir>/Run_<timestamp>.log`
fn get_log_path(config: &Config) -> Result<PathBuf> {
    let log_dir = match config.log_dir {
        Some(ref dir) => dir.clone(),
        None => get_executable_dir()?.join("Log"),
    };
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    Ok(log_dir.join(format!("Run_{}.log", timestamp)))
}

/// Setup logging (file + console)
fn setup_logging(config: &Config, log_path: &Path) -> Result<WorkerGuard> {
    let level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // Per-file output already goes to stdout; keep the console layer to warnings
    macro_rules! console {
        () => {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::filter::LevelFilter::WARN)
        };
    }

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .with(console!())
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(console!())
            .init();
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_invalid_input_dir_reaches_log_file() {
        let dir = tempdir().unwrap();
        let config = Config {
            input_dir: dir.path().join("missing"),
            log_dir: Some(dir.path().join("Log")),
            ..Default::default()
        };
        let log_path = get_log_path(&config).unwrap();

        let guard = setup_logging(&config, &log_path).unwrap();
        assert!(!check_input_dir(&config));
        drop(guard);

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("Invalid input directory"));
    }

    #[test]
    fn test_panic_hook_logs_panic() {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        install_panic_hook();
        tracing::subscriber::with_default(subscriber, || {
            let caught = std::panic::catch_unwind(|| panic!("little_exif blew up"));
            assert!(caught.is_err());
        });
        let _ = std::panic::take_hook();

        assert!(buffer.contents().contains("little_exif blew up"));
    }
}
