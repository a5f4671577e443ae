//! Batch processor
//!
//! Handles the core logic of:
//! - Deciding per file whether to skip, simulate, update or fail
//! - Emitting one progress event per file, in order
//! - Tallying results into a summary
//!
//! Files are processed strictly one at a time. No state is shared between
//! files, so a file's result depends only on its own path and metadata.

use crate::time::exif::MetadataGateway;
use crate::time::filename::{ParseOutcome, ParserRegistry};
use crate::time::{Timestamp, format_timestamp};
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span};

const MSG_HAS_DATE: &str = "EXIF date already exists";
const MSG_NO_DATE: &str = "Could not parse date from filename";
const MSG_WRITE_FAILED: &str = "Failed to write EXIF data";
const MSG_UNEXPECTED: &str = "Unexpected error while processing file";

/// Status of file processing, exactly one per file per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Capture date was written
    Updated,
    /// Dry run - capture date would have been written
    WouldUpdate,
    /// File already carries a capture date
    SkippedHasDate,
    /// No filename convention matched
    SkippedNoDateInFilename,
    /// Writing failed or processing hit an unexpected error
    Error,
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProcessingStatus::Updated => "updated",
            ProcessingStatus::WouldUpdate => "would update",
            ProcessingStatus::SkippedHasDate => "skipped (has date)",
            ProcessingStatus::SkippedNoDateInFilename => "skipped (no date in filename)",
            ProcessingStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// Result of processing a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileResult {
    /// Source file path
    pub path: PathBuf,
    /// Processing status
    pub status: ProcessingStatus,
    /// Human-readable outcome
    pub message: String,
    /// Inferred timestamp (for updates and dry runs)
    pub timestamp: Option<Timestamp>,
    /// Name of the parser that matched (for updates and dry runs)
    pub parser: Option<String>,
}

impl FileResult {
    fn skipped(path: &Path, status: ProcessingStatus, message: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
            message: message.to_string(),
            timestamp: None,
            parser: None,
        }
    }

    fn error(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            status: ProcessingStatus::Error,
            message: message.into(),
            timestamp: None,
            parser: None,
        }
    }

    fn dated(path: &Path, status: ProcessingStatus, timestamp: Timestamp, parser: String) -> Self {
        let verb = match status {
            ProcessingStatus::WouldUpdate => "Would add",
            _ => "Added",
        };
        Self {
            path: path.to_path_buf(),
            status,
            message: format!("{} EXIF date {}", verb, format_timestamp(&timestamp)),
            timestamp: Some(timestamp),
            parser: Some(parser),
        }
    }
}

/// Progress notification, emitted once per file in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub path: PathBuf,
    pub file_name: String,
    /// 1-based position in the batch
    pub index: usize,
    pub total: usize,
    pub result: FileResult,
}

/// Per-status counts for a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub updated: usize,
    pub would_update: usize,
    pub skipped_has_date: usize,
    pub skipped_no_date: usize,
    pub errors: usize,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally a list of results
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a FileResult>) -> Self {
        let mut summary = Self::new();
        for result in results {
            summary.record(result.status);
        }
        summary
    }

    pub fn record(&mut self, status: ProcessingStatus) {
        match status {
            ProcessingStatus::Updated => self.updated += 1,
            ProcessingStatus::WouldUpdate => self.would_update += 1,
            ProcessingStatus::SkippedHasDate => self.skipped_has_date += 1,
            ProcessingStatus::SkippedNoDateInFilename => self.skipped_no_date += 1,
            ProcessingStatus::Error => self.errors += 1,
        }
    }

    /// Number of files tallied
    pub fn total(&self) -> usize {
        self.updated + self.would_update + self.skipped_has_date + self.skipped_no_date + self.errors
    }

    /// Headline change count: would-update in a dry run, updated otherwise
    pub fn changes(&self, dry_run: bool) -> usize {
        if dry_run {
            self.would_update
        } else {
            self.updated
        }
    }

    pub fn summary(&self, dry_run: bool) -> String {
        format!(
            "Total: {}, {}: {}, Skipped (has date): {}, Skipped (no date in filename): {}, Errors: {}",
            self.total(),
            if dry_run { "Would update" } else { "Updated" },
            self.changes(dry_run),
            self.skipped_has_date,
            self.skipped_no_date,
            self.errors
        )
    }
}

/// Main processor: consults the metadata gateway and the filename parsers
/// for each file.
pub struct Processor<G> {
    gateway: G,
    parsers: ParserRegistry,
}

impl<G: MetadataGateway> Processor<G> {
    /// Create a processor with the default filename conventions
    pub fn new(gateway: G) -> Self {
        Self::with_parsers(gateway, ParserRegistry::default())
    }

    pub fn with_parsers(gateway: G, parsers: ParserRegistry) -> Self {
        Self { gateway, parsers }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Decide and apply the outcome for one file.
    ///
    /// Never panics and never returns an error: anything unexpected becomes
    /// a [`ProcessingStatus::Error`] result carrying the failure text.
    pub fn decide(&self, path: &Path, dry_run: bool) -> FileResult {
        let _file_span = span!(Level::DEBUG, "process_file", ?path).entered();

        match panic::catch_unwind(AssertUnwindSafe(|| self.decide_inner(path, dry_run))) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(?path, error = %message, "Unexpected failure while processing file");
                FileResult::error(path, message)
            }
        }
    }

    fn decide_inner(&self, path: &Path, dry_run: bool) -> FileResult {
        if self.gateway.has_capture_date(path) {
            debug!(?path, "File already has an EXIF date, skipping");
            return FileResult::skipped(path, ProcessingStatus::SkippedHasDate, MSG_HAS_DATE);
        }

        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (timestamp, parser) = match self.parsers.parse(&filename) {
            ParseOutcome::Matched { timestamp, parser } => (timestamp, parser),
            ParseOutcome::NoMatch => {
                debug!(?path, "No date found in filename");
                return FileResult::skipped(
                    path,
                    ProcessingStatus::SkippedNoDateInFilename,
                    MSG_NO_DATE,
                );
            }
        };

        if dry_run {
            debug!(?path, %timestamp, %parser, "Would write EXIF date");
            return FileResult::dated(path, ProcessingStatus::WouldUpdate, timestamp, parser);
        }

        match self.gateway.write_capture_date(path, timestamp) {
            Ok(()) => {
                info!(?path, %timestamp, %parser, "Wrote EXIF date");
                FileResult::dated(path, ProcessingStatus::Updated, timestamp, parser)
            }
            Err(e) => {
                error!(?path, error = %e, "Failed to write EXIF date");
                FileResult::error(path, MSG_WRITE_FAILED)
            }
        }
    }

    /// Lazily process `paths`, one file per iteration step.
    ///
    /// Dropping the iterator stops the batch at a file boundary.
    pub fn run<'a>(&'a self, paths: &'a [PathBuf], dry_run: bool) -> BatchRun<'a, G> {
        BatchRun {
            processor: self,
            paths,
            dry_run,
            next: 0,
        }
    }

    /// Process every path, calling `on_progress` once per file in order.
    pub fn process<F>(&self, paths: &[PathBuf], dry_run: bool, mut on_progress: F) -> Vec<FileResult>
    where
        F: FnMut(&ProgressEvent),
    {
        let _span = span!(Level::INFO, "batch", total = paths.len(), dry_run).entered();

        let mut results = Vec::with_capacity(paths.len());
        for event in self.run(paths, dry_run) {
            on_progress(&event);
            results.push(event.result);
        }

        info!("{}", BatchSummary::from_results(&results).summary(dry_run));
        results
    }
}

/// Iterator over a batch, see [`Processor::run`]
pub struct BatchRun<'a, G> {
    processor: &'a Processor<G>,
    paths: &'a [PathBuf],
    dry_run: bool,
    next: usize,
}

impl<G: MetadataGateway> Iterator for BatchRun<'_, G> {
    type Item = ProgressEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.get(self.next)?;
        self.next += 1;

        let result = self.processor.decide(path, self.dry_run);
        Some(ProgressEvent {
            path: path.clone(),
            file_name: path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default(),
            index: self.next,
            total: self.paths.len(),
            result,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.paths.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl<G: MetadataGateway> ExactSizeIterator for BatchRun<'_, G> {}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        MSG_UNEXPECTED.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::time::filename::FilenameDateParser;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    #[derive(Default)]
    struct StubGateway {
        has_date: bool,
        write_fails: bool,
        panic_on_read: bool,
        writes: RefCell<Vec<(PathBuf, Timestamp)>>,
    }

    impl MetadataGateway for StubGateway {
        fn has_capture_date(&self, _path: &Path) -> bool {
            if self.panic_on_read {
                panic!("metadata reader exploded");
            }
            self.has_date
        }

        fn write_capture_date(&self, path: &Path, timestamp: Timestamp) -> Result<()> {
            self.writes.borrow_mut().push((path.to_path_buf(), timestamp));
            if self.write_fails {
                Err(Error::ExifWrite {
                    path: path.to_path_buf(),
                    message: "read-only".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn batch() -> Vec<PathBuf> {
        vec![
            PathBuf::from("/photos/IMG-20230115-WA0001.jpg"),
            PathBuf::from("/photos/20230115_123045.jpg"),
            PathBuf::from("/photos/WP_20230115_12_30_45_Pro.jpg"),
            PathBuf::from("/photos/photo.jpg"),
            PathBuf::from("/photos/prefix_20230115_123045.jpg"),
        ]
    }

    #[test]
    fn test_dry_run_would_update() {
        let processor = Processor::new(StubGateway::default());
        let result = processor.decide(Path::new("/photos/IMG-20230115-WA0001.jpg"), true);

        assert_eq!(result.status, ProcessingStatus::WouldUpdate);
        assert_eq!(result.timestamp, Some(dt(2023, 1, 15, 0, 0, 0)));
        assert_eq!(result.parser.as_deref(), Some("WhatsApp"));
        assert_eq!(result.message, "Would add EXIF date 2023-01-15 00:00:00");
        assert!(processor.gateway().writes.borrow().is_empty());
    }

    #[test]
    fn test_live_run_updates() {
        let processor = Processor::new(StubGateway::default());
        let path = Path::new("/photos/20230115_123045.jpg");
        let result = processor.decide(path, false);

        assert_eq!(result.status, ProcessingStatus::Updated);
        assert_eq!(result.timestamp, Some(dt(2023, 1, 15, 12, 30, 45)));
        assert_eq!(result.parser.as_deref(), Some("Samsung"));
        assert_eq!(result.message, "Added EXIF date 2023-01-15 12:30:45");
        assert_eq!(
            *processor.gateway().writes.borrow(),
            vec![(path.to_path_buf(), dt(2023, 1, 15, 12, 30, 45))]
        );
    }

    #[test]
    fn test_write_failure_is_error() {
        let processor = Processor::new(StubGateway {
            write_fails: true,
            ..Default::default()
        });
        let result = processor.decide(Path::new("/photos/WP_20230115_12_30_45_Pro.jpg"), false);

        assert_eq!(result.status, ProcessingStatus::Error);
        assert_eq!(result.message, "Failed to write EXIF data");
        assert_eq!(result.timestamp, None);
        assert_eq!(processor.gateway().writes.borrow().len(), 1);
    }

    #[test]
    fn test_existing_date_is_skipped() {
        let processor = Processor::new(StubGateway {
            has_date: true,
            ..Default::default()
        });

        for path in batch() {
            let result = processor.decide(&path, false);
            assert_eq!(result.status, ProcessingStatus::SkippedHasDate);
            assert_eq!(result.message, "EXIF date already exists");
        }
        assert!(processor.gateway().writes.borrow().is_empty());
    }

    #[test]
    fn test_no_date_in_filename() {
        let processor = Processor::new(StubGateway::default());

        let result = processor.decide(Path::new("/photos/photo.jpg"), false);
        assert_eq!(result.status, ProcessingStatus::SkippedNoDateInFilename);
        assert_eq!(result.message, "Could not parse date from filename");

        let result = processor.decide(Path::new("/photos/prefix_20230115_123045.jpg"), false);
        assert_eq!(result.status, ProcessingStatus::SkippedNoDateInFilename);

        let result = processor.decide(Path::new("/photos/20231315_123045.jpg"), false);
        assert_eq!(result.status, ProcessingStatus::SkippedNoDateInFilename);

        let result = processor.decide(Path::new("/photos/20230115_253045.jpg"), false);
        assert_eq!(result.status, ProcessingStatus::SkippedNoDateInFilename);

        assert!(processor.gateway().writes.borrow().is_empty());
    }

    #[test]
    fn test_only_base_name_is_parsed() {
        let processor = Processor::new(StubGateway::default());
        let result = processor.decide(Path::new("/20230115_123045/photo.jpg"), true);
        assert_eq!(result.status, ProcessingStatus::SkippedNoDateInFilename);
    }

    #[test]
    fn test_unexpected_failure_becomes_error() {
        let processor = Processor::new(StubGateway {
            panic_on_read: true,
            ..Default::default()
        });
        let result = processor.decide(Path::new("/photos/20230115_123045.jpg"), false);

        assert_eq!(result.status, ProcessingStatus::Error);
        assert_eq!(result.message, "metadata reader exploded");
    }

    #[test]
    fn test_decide_is_deterministic() {
        let processor = Processor::new(StubGateway::default());
        for path in batch() {
            assert_eq!(processor.decide(&path, true), processor.decide(&path, true));
        }
    }

    struct AlwaysMatches;

    impl FilenameDateParser for AlwaysMatches {
        fn name(&self) -> &str {
            "Stub"
        }

        fn parse(&self, _filename: &str) -> Option<Timestamp> {
            Some(dt(2000, 2, 29, 1, 2, 3))
        }
    }

    #[test]
    fn test_stubbed_parser_set() {
        let processor = Processor::with_parsers(
            StubGateway::default(),
            ParserRegistry::new(vec![Box::new(AlwaysMatches)]),
        );
        let result = processor.decide(Path::new("/photos/photo.jpg"), true);

        assert_eq!(result.status, ProcessingStatus::WouldUpdate);
        assert_eq!(result.parser.as_deref(), Some("Stub"));
        assert_eq!(result.timestamp, Some(dt(2000, 2, 29, 1, 2, 3)));

        let empty = Processor::with_parsers(StubGateway::default(), ParserRegistry::new(vec![]));
        let result = empty.decide(Path::new("/photos/20230115_123045.jpg"), false);
        assert_eq!(result.status, ProcessingStatus::SkippedNoDateInFilename);
    }

    #[test]
    fn test_process_emits_one_event_per_file_in_order() {
        let processor = Processor::new(StubGateway::default());
        let paths = batch();

        let mut events = Vec::new();
        let results = processor.process(&paths, false, |event| events.push(event.clone()));

        assert_eq!(events.len(), paths.len());
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.index, i + 1);
            assert_eq!(event.total, paths.len());
            assert_eq!(event.path, paths[i]);
            assert_eq!(event.result, results[i]);
        }
        assert_eq!(events.last().unwrap().index, paths.len());
        assert_eq!(events[0].file_name, "IMG-20230115-WA0001.jpg");

        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.updated, 3);
        assert_eq!(summary.skipped_no_date, 2);
        assert_eq!(summary.total(), paths.len());
        assert_eq!(summary.changes(false), 3);
    }

    #[test]
    fn test_dry_run_never_writes() {
        let processor = Processor::new(StubGateway::default());
        let results = processor.process(&batch(), true, |_| {});

        assert!(processor.gateway().writes.borrow().is_empty());
        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.would_update, 3);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.changes(true), 3);
    }

    #[test]
    fn test_run_can_stop_at_file_boundary() {
        let processor = Processor::new(StubGateway::default());
        let paths = batch();

        let mut run = processor.run(&paths, false);
        assert_eq!(run.len(), 5);
        let first = run.next().unwrap();
        let second = run.next().unwrap();
        assert_eq!(run.len(), 3);
        drop(run);

        assert_eq!(first.index, 1);
        assert_eq!(second.index, 2);
        assert_eq!(processor.gateway().writes.borrow().len(), 2);
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = BatchSummary::new();
        summary.record(ProcessingStatus::Updated);
        summary.record(ProcessingStatus::SkippedHasDate);
        summary.record(ProcessingStatus::SkippedHasDate);
        summary.record(ProcessingStatus::Error);

        assert_eq!(summary.total(), 4);
        let text = summary.summary(false);
        assert!(text.contains("Total: 4"));
        assert!(text.contains("Updated: 1"));
        assert!(text.contains("Skipped (has date): 2"));
        assert!(text.contains("Errors: 1"));
        assert!(summary.summary(true).contains("Would update: 0"));
    }

    #[test]
    fn test_empty_batch() {
        let processor = Processor::new(StubGateway::default());
        let results = processor.process(&[], false, |_| panic!("no events expected"));
        assert!(results.is_empty());
        assert_eq!(BatchSummary::from_results(&results).total(), 0);
    }
}
