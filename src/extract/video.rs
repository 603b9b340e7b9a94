//! Video filename mismatch repair
//!
//! Some packaging pipelines mangle exactly one character of a video filename
//! while leaving the remainder intact (a single-byte transcoding slip at a
//! fixed position, not general encoding breakage). The result is a
//! description file declaring a video that almost exists. This pass
//! reconciles the two on increasingly loose evidence, and gives up rather
//! than rename on ambiguous evidence. Every rename is best-effort: an I/O
//! failure here never fails the extraction.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use walkdir::WalkDir;

use super::refs::is_description_file;

/// File extensions treated as video assets
const VIDEO_EXTENSIONS: &[&str] = &[
    "avi", "flv", "m4v", "mkv", "mov", "mp4", "mpeg", "mpg", "webm", "wmv",
];

/// Matches a video declaration line, quoted or bare filename, in either the
/// event spelling (`Video,0,"clip.mp4"`) or the colon spelling
/// (`Video: 0,0,"clip.mp4"`), with optional trailing offsets
const VIDEO_LINE: &str = r#"(?mi)^[ \t]*video[ \t]*[,:][ \t]*(?:-?\d+[ \t]*,[ \t]*)*(?:"([^"\r\n]+)"(?:[ \t]*,[^\r\n]*)?|([^",\r\n]+?))[ \t\r]*$"#;

/// Reconcile declared video filenames with the files actually on disk
pub(crate) fn repair_video_references(root: &Path) {
    let Ok(pattern) = Regex::new(VIDEO_LINE) else {
        return;
    };

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() || !is_description_file(entry.path()) {
            continue;
        }
        let Some(base) = entry.path().parent() else {
            continue;
        };
        let content = match std::fs::read_to_string(entry.path()) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = ?entry.path(), error = %e, "video repair skipped unreadable file");
                continue;
            }
        };
        for captures in pattern.captures_iter(&content) {
            let declared = captures
                .get(1)
                .or_else(|| captures.get(2))
                .map(|m| m.as_str().trim());
            if let Some(declared) = declared
                && !declared.is_empty()
            {
                resolve_declared_video(base, declared);
            }
        }
    }
}

fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|v| v.eq_ignore_ascii_case(ext))
        })
}

/// Unicode-decompose, strip combining marks, case-fold
fn normalize_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// True when the slices differ by at most one single-character edit
/// (substitution, insertion, or deletion)
fn within_one_edit(a: &[char], b: &[char]) -> bool {
    if a == b {
        return true;
    }
    match a.len().abs_diff(b.len()) {
        0 => a.iter().zip(b.iter()).filter(|(x, y)| x != y).count() <= 1,
        1 => {
            let (long, short) = if a.len() > b.len() { (a, b) } else { (b, a) };
            let mut i = 0;
            let mut j = 0;
            let mut skipped = false;
            while i < short.len() && j < long.len() {
                if short[i] == long[j] {
                    i += 1;
                    j += 1;
                } else if skipped {
                    return false;
                } else {
                    skipped = true;
                    j += 1;
                }
            }
            true
        }
        _ => false,
    }
}

fn best_effort_rename(from: &Path, to: &Path) {
    match std::fs::rename(from, to) {
        Ok(()) => debug!(?from, ?to, "renamed mismatched video"),
        Err(e) => warn!(?from, ?to, error = %e, "video rename failed"),
    }
}

/// Find the file the declaration meant and rename it into place
fn resolve_declared_video(base: &Path, declared: &str) {
    let declared_rel = declared.replace('\\', "/");
    let declared_path = base.join(&declared_rel);
    if declared_path.exists() {
        return;
    }

    let Some(declared_name) = declared_rel.rsplit('/').next() else {
        return;
    };
    let Some(dir) = declared_path.parent() else {
        return;
    };
    let Ok(listing) = std::fs::read_dir(dir) else {
        return;
    };

    let mut candidates: Vec<PathBuf> = listing
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_video_extension(p))
        .collect();
    candidates.sort();

    // Directory-entry-name mismatches masked by accents or case
    let declared_normalized = normalize_name(declared_name);
    for candidate in &candidates {
        let Some(name) = candidate.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if normalize_name(name) == declared_normalized {
            best_effort_rename(candidate, &declared_path);
            return;
        }
    }

    // Leading character swapped, tail intact (within one edit)
    let declared_chars: Vec<char> = declared_name.to_lowercase().chars().collect();
    for candidate in &candidates {
        let Some(name) = candidate.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let candidate_chars: Vec<char> = name.to_lowercase().chars().collect();
        let (Some(declared_first), Some(candidate_first)) =
            (declared_chars.first(), candidate_chars.first())
        else {
            continue;
        };
        if declared_first != candidate_first
            && within_one_edit(&declared_chars[1..], &candidate_chars[1..])
        {
            best_effort_rename(candidate, &declared_path);
            return;
        }
    }

    // A lone video file is the intended asset whatever it is called
    if let [only] = candidates.as_slice() {
        best_effort_rename(only, &declared_path);
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_osu(dir: &Path, declaration: &str) -> PathBuf {
        let path = dir.join("song.osu");
        std::fs::write(&path, format!("[Events]\n{declaration}\n0,0,\"bg.jpg\"\n")).unwrap();
        path
    }

    #[test]
    fn first_letter_swap_is_repaired() {
        let dir = TempDir::new().unwrap();
        write_osu(dir.path(), "Video: 0,0,\"Clïp.mp4\"");
        std::fs::write(dir.path().join("Alïp.mp4"), b"video").unwrap();

        repair_video_references(dir.path());

        assert!(dir.path().join("Clïp.mp4").exists());
        assert!(!dir.path().join("Alïp.mp4").exists());
    }

    #[test]
    fn event_spelling_is_recognized() {
        let dir = TempDir::new().unwrap();
        write_osu(dir.path(), "Video,1200,\"intro.mp4\"");
        std::fs::write(dir.path().join("Untro.mp4"), b"video").unwrap();

        repair_video_references(dir.path());

        assert!(dir.path().join("intro.mp4").exists());
    }

    #[test]
    fn existing_declared_file_is_left_alone() {
        let dir = TempDir::new().unwrap();
        write_osu(dir.path(), "Video,0,\"clip.mp4\"");
        std::fs::write(dir.path().join("clip.mp4"), b"declared").unwrap();
        std::fs::write(dir.path().join("other.mp4"), b"other").unwrap();

        repair_video_references(dir.path());

        assert_eq!(
            std::fs::read(dir.path().join("clip.mp4")).unwrap(),
            b"declared"
        );
        assert!(dir.path().join("other.mp4").exists());
    }

    #[test]
    fn accent_and_case_mismatch_is_matched_by_normalization() {
        let dir = TempDir::new().unwrap();
        write_osu(dir.path(), "Video,0,\"CLIP.mp4\"");
        std::fs::write(dir.path().join("clïp.mp4"), b"video").unwrap();

        repair_video_references(dir.path());

        assert!(dir.path().join("CLIP.mp4").exists());
    }

    #[test]
    fn sole_video_file_is_adopted_regardless_of_name() {
        let dir = TempDir::new().unwrap();
        write_osu(dir.path(), "Video,0,\"expected.avi\"");
        std::fs::write(dir.path().join("whatever.flv"), b"video").unwrap();

        repair_video_references(dir.path());

        assert!(dir.path().join("expected.avi").exists());
        assert!(!dir.path().join("whatever.flv").exists());
    }

    #[test]
    fn ambiguous_candidates_are_not_touched() {
        let dir = TempDir::new().unwrap();
        write_osu(dir.path(), "Video,0,\"clip.mp4\"");
        std::fs::write(dir.path().join("one.mp4"), b"one").unwrap();
        std::fs::write(dir.path().join("two.mp4"), b"two").unwrap();

        repair_video_references(dir.path());

        assert!(!dir.path().join("clip.mp4").exists());
        assert!(dir.path().join("one.mp4").exists());
        assert!(dir.path().join("two.mp4").exists());
    }

    #[test]
    fn non_video_files_are_never_candidates() {
        let dir = TempDir::new().unwrap();
        write_osu(dir.path(), "Video,0,\"clip.mp4\"");
        std::fs::write(dir.path().join("audio.mp3"), b"audio").unwrap();

        repair_video_references(dir.path());

        assert!(!dir.path().join("clip.mp4").exists());
        assert!(dir.path().join("audio.mp3").exists());
    }

    #[test]
    fn within_one_edit_accepts_substitution_insertion_deletion() {
        let a: Vec<char> = "lip.mp4".chars().collect();
        assert!(within_one_edit(&a, &"lip.mp4".chars().collect::<Vec<_>>()));
        assert!(within_one_edit(&a, &"lap.mp4".chars().collect::<Vec<_>>()));
        assert!(within_one_edit(&a, &"liip.mp4".chars().collect::<Vec<_>>()));
        assert!(within_one_edit(&a, &"ip.mp4".chars().collect::<Vec<_>>()));
        assert!(!within_one_edit(&a, &"lap.mp3".chars().collect::<Vec<_>>()));
    }

    #[test]
    fn declared_path_in_subdirectory_is_resolved_there() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("vids")).unwrap();
        write_osu(dir.path(), "Video,0,\"vids/clip.mp4\"");
        std::fs::write(dir.path().join("vids/flip.mp4"), b"video").unwrap();
        // A video at the root must not be considered
        std::fs::write(dir.path().join("decoy.mp4"), b"decoy").unwrap();

        repair_video_references(dir.path());

        assert!(dir.path().join("vids/clip.mp4").exists());
        assert!(dir.path().join("decoy.mp4").exists());
    }
}
