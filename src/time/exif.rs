//! EXIF capture date detection and writing

use crate::error::{Error, Result};
use crate::time::{EXIF_FORMAT, Timestamp};
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use filetime::FileTime;
use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;
use std::fs::{self, File};
use std::io::BufReader;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, trace, warn};

/// EXIF tags that count as a capture date: primary, original, digitized
const DATE_TAGS: &[Tag] = &[
    Tag::DateTime,          // Primary (IFD0)
    Tag::DateTimeOriginal,  // When the original image was taken
    Tag::DateTimeDigitized, // When the image was digitized
];

/// Read and write access to an image's capture-date tags.
///
/// Neither operation may fail loudly: unreadable metadata means "no date",
/// and a failed write is reported through the returned `Result`.
pub trait MetadataGateway {
    /// True iff any capture-date tag holds a real (non-zero) date
    fn has_capture_date(&self, path: &Path) -> bool;

    /// Write `timestamp` into all three capture-date tags in one save
    fn write_capture_date(&self, path: &Path, timestamp: Timestamp) -> Result<()>;
}

/// Metadata gateway backed by kamadak-exif (read) and little_exif (write)
#[derive(Debug, Clone)]
pub struct ExifGateway {
    preserve_mtime: bool,
}

impl Default for ExifGateway {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ExifGateway {
    /// Create a gateway; with `preserve_mtime` the file's modification time
    /// is restored after a successful write.
    pub fn new(preserve_mtime: bool) -> Self {
        Self { preserve_mtime }
    }
}

impl MetadataGateway for ExifGateway {
    fn has_capture_date(&self, path: &Path) -> bool {
        match read_capture_date(path) {
            Ok(found) => found.is_some(),
            Err(e) => {
                debug!(?path, error = %e, "Could not read EXIF, treating as undated");
                false
            }
        }
    }

    fn write_capture_date(&self, path: &Path, timestamp: Timestamp) -> Result<()> {
        let previous_mtime = if self.preserve_mtime {
            fs::metadata(path)
                .ok()
                .map(|m| FileTime::from_last_modification_time(&m))
        } else {
            None
        };

        let value = timestamp.format(EXIF_FORMAT).to_string();

        // little_exif can panic on malformed containers
        let written = panic::catch_unwind(AssertUnwindSafe(|| write_date_tags(path, &value)));
        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(Error::ExifWrite {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
            Err(_) => {
                return Err(Error::ExifWrite {
                    path: path.to_path_buf(),
                    message: "metadata writer panicked".to_string(),
                });
            }
        }

        if let Some(mtime) = previous_mtime
            && let Err(e) = filetime::set_file_mtime(path, mtime)
        {
            warn!(?path, error = %e, "Failed to restore modification time");
        }

        trace!(?path, %value, "Wrote EXIF capture date");
        Ok(())
    }
}

/// Find the first capture-date tag holding a real date.
///
/// `Ok(None)` means the EXIF block was readable but had no usable date.
pub fn read_capture_date(path: &Path) -> Result<Option<NaiveDateTime>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| Error::ExifRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    for tag in DATE_TAGS {
        if let Some(field) = exif.get_field(*tag, In::PRIMARY)
            && let Value::Ascii(ref values) = field.value
            && let Some(raw) = values.first()
            && let Some(datetime) = parse_exif_datetime(&String::from_utf8_lossy(raw))
        {
            trace!(?path, ?tag, "Found EXIF date");
            return Ok(Some(datetime));
        }
    }

    Ok(None)
}

/// Parse EXIF datetime string format: "YYYY:MM:DD HH:MM:SS"
///
/// Zeroed or blank values (`0000:00:00 00:00:00`) are not valid dates and
/// yield `None`.
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches(|c: char| c == '"' || c == '\0');

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, EXIF_FORMAT) {
        return Some(dt);
    }

    // Try with subseconds
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S%.f") {
        return Some(dt);
    }

    let formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    None
}

/// Set DateTime (0x0132), DateTimeOriginal (0x9003) and DateTimeDigitized
/// (0x9004) and save once.
///
/// Existing tags must survive the write, so empty metadata is only used when
/// the file has no EXIF block at all. EXIF that little_exif cannot load is an
/// error rather than something to overwrite.
fn write_date_tags(path: &Path, value: &str) -> std::io::Result<()> {
    let mut metadata = match Metadata::new_from_path(path) {
        Ok(metadata) => metadata,
        Err(e) if has_no_exif(path) => {
            debug!(?path, error = %e, "No existing EXIF, starting fresh");
            Metadata::new()
        }
        Err(e) => {
            return Err(std::io::Error::other(format!(
                "existing EXIF could not be loaded for rewriting: {}",
                e
            )));
        }
    };

    metadata.set_tag(ExifTag::ModifyDate(value.to_string()));
    metadata.set_tag(ExifTag::DateTimeOriginal(value.to_string()));
    metadata.set_tag(ExifTag::CreateDate(value.to_string()));

    metadata.write_to_file(path)
}

/// True only when the container was readable and carried no EXIF block
fn has_no_exif(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    matches!(
        Reader::new().read_from_container(&mut BufReader::new(file)),
        Err(exif::Error::NotFound(_))
    )
}
