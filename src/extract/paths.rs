//! Entry path sanitization and rename bookkeeping
//!
//! Every archive entry path passes through here before anything is written:
//! `..` segments abort the extraction outright, empty and `.` segments are
//! dropped, and the remaining segments are rewritten into filesystem-safe
//! form. Sanitization changes are tracked so reference repair can fix up
//! description files afterwards.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Characters that cannot appear in a file or folder name
const ILLEGAL_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// An entry path that climbed out of the destination with `..`
///
/// Structural, not encoding-dependent: the whole extraction is aborted and
/// never retried under another encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TraversalAttempt {
    /// The offending entry name as decoded
    pub name: String,
}

/// An archive entry path after sanitization
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SanitizedEntry {
    /// Original segments joined with `/` (empty and `.` segments dropped)
    pub original_path: String,
    /// Sanitized segments joined with `/`
    pub sanitized_path: String,
    /// Sanitized segments, ready to be joined onto the destination root
    pub segments: Vec<String>,
    /// Final original segment (the filename as the archive spelled it)
    pub original_name: String,
    /// Final sanitized segment
    pub sanitized_name: String,
}

/// Original → sanitized mappings produced during one extraction pass
///
/// Scoped to a single extraction call; consulted once by reference repair and
/// then discarded. Keys are only present when sanitization actually changed
/// the value, and the first occurrence of a key wins.
#[derive(Clone, Debug, Default)]
pub(crate) struct RenameMap {
    /// Original filename → sanitized filename
    pub files: HashMap<String, String>,
    /// Original relative path → sanitized relative path
    pub paths: HashMap<String, String>,
}

impl RenameMap {
    pub(crate) fn is_empty(&self) -> bool {
        self.files.is_empty() && self.paths.is_empty()
    }

    /// Record an entry's renames, keeping the first mapping seen for each key
    pub(crate) fn record(&mut self, entry: &SanitizedEntry) {
        if entry.sanitized_path != entry.original_path {
            self.paths
                .entry(entry.original_path.clone())
                .or_insert_with(|| entry.sanitized_path.clone());
        }
        if entry.sanitized_name != entry.original_name {
            self.files
                .entry(entry.original_name.clone())
                .or_insert_with(|| entry.sanitized_name.clone());
        }
    }
}

/// Replace filesystem-illegal characters in a display name with `_`
pub(crate) fn sanitize_display_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if ILLEGAL_NAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}

/// Sanitize one path segment: illegal characters become `_`, trailing dots
/// are stripped, and a segment left empty becomes `_`
fn sanitize_segment(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| {
            if ILLEGAL_NAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    while out.ends_with('.') {
        out.pop();
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// Sanitize a decoded entry name into a safe relative path
///
/// Returns `Ok(None)` for names that resolve to nothing (directory markers,
/// bare separators), and `Err` when a `..` segment is present.
pub(crate) fn sanitize_entry_path(
    name: &str,
) -> std::result::Result<Option<SanitizedEntry>, TraversalAttempt> {
    let normalized = name.replace('\\', "/");

    let mut original_segments = Vec::new();
    let mut sanitized_segments = Vec::new();
    for segment in normalized.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            return Err(TraversalAttempt {
                name: name.to_string(),
            });
        }
        original_segments.push(segment.to_string());
        sanitized_segments.push(sanitize_segment(segment));
    }

    let Some(original_name) = original_segments.last().cloned() else {
        return Ok(None);
    };
    let Some(sanitized_name) = sanitized_segments.last().cloned() else {
        return Ok(None);
    };

    Ok(Some(SanitizedEntry {
        original_path: original_segments.join("/"),
        sanitized_path: sanitized_segments.join("/"),
        segments: sanitized_segments,
        original_name,
        sanitized_name,
    }))
}

/// Resolve a sanitized entry under the destination root and verify the result
/// stays inside it
///
/// Segment-level filtering already forbids traversal; this re-checks the
/// joined path component by component.
pub(crate) fn resolve_within(root: &Path, entry: &SanitizedEntry) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    for segment in &entry.segments {
        let part = Path::new(segment);
        if part
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        resolved.push(part);
    }
    if resolved.starts_with(root) {
        Some(resolved)
    } else {
        None
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_paths_pass_through_with_no_renames() {
        let entry = sanitize_entry_path("sb/bg.jpg").unwrap().unwrap();

        assert_eq!(entry.original_path, "sb/bg.jpg");
        assert_eq!(entry.sanitized_path, "sb/bg.jpg");

        let mut renames = RenameMap::default();
        renames.record(&entry);
        assert!(renames.is_empty(), "no-op renames must not be tracked");
    }

    #[test]
    fn parent_segments_are_a_hard_failure() {
        assert!(sanitize_entry_path("../evil.dll").is_err());
        assert!(sanitize_entry_path("ok/../../evil.dll").is_err());
        assert!(sanitize_entry_path("ok\\..\\evil.dll").is_err());
    }

    #[test]
    fn empty_and_dot_segments_are_skipped() {
        let entry = sanitize_entry_path("./a//b/./c.png").unwrap().unwrap();
        assert_eq!(entry.sanitized_path, "a/b/c.png");
    }

    #[test]
    fn illegal_characters_become_underscores() {
        let entry = sanitize_entry_path("what?/na:me*.osu").unwrap().unwrap();
        assert_eq!(entry.sanitized_path, "what_/na_me_.osu");
        assert_eq!(entry.sanitized_name, "na_me_.osu");
    }

    #[test]
    fn trailing_dots_are_stripped() {
        let entry = sanitize_entry_path("dir.../file.mp3").unwrap().unwrap();
        assert_eq!(entry.sanitized_path, "dir/file.mp3");
    }

    #[test]
    fn all_dots_segment_becomes_underscore() {
        // Not a traversal (three dots), but empty after stripping
        let entry = sanitize_entry_path(".../x.wav").unwrap().unwrap();
        assert_eq!(entry.sanitized_path, "_/x.wav");
    }

    #[test]
    fn directory_markers_resolve_to_nothing() {
        assert!(sanitize_entry_path("").unwrap().is_none());
        assert!(sanitize_entry_path("/").unwrap().is_none());
        assert!(sanitize_entry_path("./").unwrap().is_none());
    }

    #[test]
    fn backslash_separated_paths_are_split() {
        let entry = sanitize_entry_path("sb\\fg\\dancer.png").unwrap().unwrap();
        assert_eq!(entry.sanitized_path, "sb/fg/dancer.png");
    }

    #[test]
    fn first_recorded_rename_wins() {
        let mut renames = RenameMap::default();

        let first = sanitize_entry_path("a?b.png").unwrap().unwrap();
        renames.record(&first);
        // A second entry whose original collides must not overwrite
        let mut second = first.clone();
        second.sanitized_path = "other.png".to_string();
        second.sanitized_name = "other.png".to_string();
        renames.record(&second);

        assert_eq!(renames.files.get("a?b.png").unwrap(), "a_b.png");
        assert_eq!(renames.paths.get("a?b.png").unwrap(), "a_b.png");
    }

    #[test]
    fn resolve_within_stays_under_root() {
        let entry = sanitize_entry_path("a/b.ogg").unwrap().unwrap();
        let resolved = resolve_within(Path::new("/dest/set"), &entry).unwrap();
        assert_eq!(resolved, PathBuf::from("/dest/set/a/b.ogg"));
    }
}
