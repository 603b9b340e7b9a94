//! Reference repair after entry renames
//!
//! Description files reference other files in the package by relative path or
//! bare filename. When sanitization renamed an entry, every description file
//! is rewritten so those references point at the names that actually exist on
//! disk. This is a literal string substitution, not a structured rewrite: the
//! format is line-oriented and only specific fields hold filenames, so a full
//! parse would risk altering unrelated content.

use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::paths::RenameMap;

/// Extension of the description files scanned for references
pub(crate) const DESCRIPTION_EXTENSION: &str = "osu";

pub(crate) fn is_description_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DESCRIPTION_EXTENSION))
}

/// Rewrite renamed paths and filenames inside every description file under `root`
///
/// Failures here are cosmetic and never fail the extraction.
pub(crate) fn repair_references(root: &Path, renames: &RenameMap) {
    if renames.is_empty() {
        return;
    }

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() || !is_description_file(entry.path()) {
            continue;
        }
        match rewrite_file(entry.path(), renames) {
            Ok(true) => debug!(path = ?entry.path(), "rewrote renamed references"),
            Ok(false) => {}
            Err(e) => warn!(path = ?entry.path(), error = %e, "reference repair skipped"),
        }
    }
}

/// Apply all substitutions to one file; write back only if content changed
fn rewrite_file(path: &Path, renames: &RenameMap) -> std::io::Result<bool> {
    let content = std::fs::read_to_string(path)?;
    let mut updated = content.clone();

    // Paths first, then bare filenames, so a filename inside an already
    // rewritten path is not touched twice
    for (original, sanitized) in &renames.paths {
        updated = updated.replace(original, sanitized);
        // Some description formats spell the same path with OS-native separators
        let original_bs = original.replace('/', "\\");
        if original_bs != *original {
            updated = updated.replace(&original_bs, &sanitized.replace('/', "\\"));
        }
    }
    for (original, sanitized) in &renames.files {
        updated = updated.replace(original, sanitized);
    }

    if updated == content {
        return Ok(false);
    }
    std::fs::write(path, updated)?;
    Ok(true)
}
