//! Supported image discovery
//!
//! Walks a root directory and collects files whose extension is on the
//! allow-list. Walk errors never abort the scan; whatever was found before
//! an unreadable or vanished directory is still returned.

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Extensions the fixer handles, compared case-insensitively
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "heic", "heif"];

/// Check whether a path has a supported image extension
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Collect supported files under `root`.
///
/// With `recursive` unset only the top level is listed. Entries are visited
/// in file-name order so repeated scans return the same sequence. A missing
/// root yields an empty list.
pub fn discover(root: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if entry.file_type().is_file() && is_supported(entry.path()) {
            files.push(entry.into_path());
        }
    }

    info!(root = %root.display(), recursive, count = files.len(), "Discovered image files");
    files
}
