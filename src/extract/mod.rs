//! Archive extraction
//!
//! Turns a downloaded beatmapset archive into a usable, correctly-named
//! folder under a destination root. Entry-name text encoding is unknown and
//! inconsistent across packaging tools, so extraction walks an ordered
//! candidate-encoding list under two independent ZIP reading strategies,
//! committing only when a full pass succeeds. Entry paths are sanitized and
//! traversal attempts abort the extraction. After a successful pass,
//! renamed entries are fixed up inside description files and mistranscoded
//! video filenames are reconciled.
//!
//! The archive file is a scoped temporary resource: it is deleted when
//! extraction returns, success or not. On failure the destination folder is
//! recursively removed, so retries never observe partial state.

mod encoding;
mod paths;
mod refs;
mod strategy;
mod video;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, ExtractError, Result};
use crate::types::{BeatmapsetId, ExtractionOutcome};

use encoding::NAME_ENCODINGS;
use paths::{RenameMap, sanitize_display_name};
use strategy::{PassError, Strategy, run_pass};

/// Extract a downloaded archive into a new folder under `destination_root`
///
/// The folder is named `<sanitized-display-name> [<id>]`, with a numeric
/// suffix on collision. Fails with an I/O-class error if the archive is
/// missing, the destination root is invalid, or no files could be extracted.
///
/// Blocking filesystem work runs on the blocking thread pool; the returned
/// future resolves when the folder is fully populated and repaired.
pub async fn extract(
    archive: &Path,
    destination_root: &Path,
    display_name: &str,
    id: BeatmapsetId,
) -> Result<PathBuf> {
    if !archive.is_file() {
        return Err(ExtractError::ArchiveMissing {
            path: archive.to_path_buf(),
        }
        .into());
    }
    if !destination_root.is_dir() {
        return Err(ExtractError::InvalidDestination {
            path: destination_root.to_path_buf(),
        }
        .into());
    }

    let target = unique_target_dir(destination_root, display_name, id);
    info!(?archive, ?target, beatmapset_id = id.0, "extracting archive");

    let archive = archive.to_path_buf();
    tokio::task::spawn_blocking(move || extract_blocking(&archive, &target, id))
        .await
        .map_err(|e| Error::Other(format!("extraction task panicked: {e}")))?
}

/// Destination folder name: sanitized display name plus the id, suffixed
/// `-2`, `-3`, … until free under the root
pub(crate) fn unique_target_dir(
    destination_root: &Path,
    display_name: &str,
    id: BeatmapsetId,
) -> PathBuf {
    let base = format!("{} [{}]", sanitize_display_name(display_name), id);
    let mut candidate = destination_root.join(&base);
    let mut suffix = 2u32;
    while candidate.exists() {
        candidate = destination_root.join(format!("{base}-{suffix}"));
        suffix += 1;
    }
    candidate
}

fn extract_blocking(archive: &Path, target: &Path, id: BeatmapsetId) -> Result<PathBuf> {
    let result = std::fs::create_dir_all(target)
        .map_err(Error::from)
        .and_then(|()| run_matrix(archive, target));

    // The archive is a scoped temporary regardless of how extraction went
    if let Err(e) = std::fs::remove_file(archive) {
        warn!(?archive, error = %e, "failed to delete source archive");
    }

    match result {
        Ok((outcome, renames)) => {
            info!(
                beatmapset_id = id.0,
                files = outcome.files_extracted,
                bytes = outcome.bytes_written,
                "extraction complete"
            );
            if !renames.is_empty() {
                refs::repair_references(target, &renames);
            }
            video::repair_video_references(target);
            Ok(target.to_path_buf())
        }
        Err(error) => {
            // Roll back so no partial folder survives under a name a caller
            // might reuse
            if target.exists()
                && let Err(e) = std::fs::remove_dir_all(target)
            {
                warn!(?target, error = %e, "failed to remove destination after error");
            }
            Err(error)
        }
    }
}

/// Try every candidate encoding under each strategy until one pass succeeds
fn run_matrix(archive: &Path, target: &Path) -> Result<(ExtractionOutcome, RenameMap)> {
    let mut last_error: Option<ExtractError> = None;

    for (strategy_index, strategy) in Strategy::ALL.into_iter().enumerate() {
        if strategy_index > 0 {
            // The previous strategy may have written files before failing
            reset_dir(target)?;
        }
        for encoding in NAME_ENCODINGS {
            debug!(
                strategy = strategy.label(),
                encoding = encoding.name(),
                "attempting extraction pass"
            );
            match run_pass(strategy, archive, target, encoding) {
                Ok(pass) => {
                    if pass.outcome.files_extracted == 0 {
                        // An archive that unzips cleanly but is empty is a
                        // failed download, not a legitimate empty package
                        return Err(ExtractError::NoContent {
                            archive: archive.to_path_buf(),
                        }
                        .into());
                    }
                    return Ok((pass.outcome, pass.renames));
                }
                Err(PassError::Fatal(error)) => return Err(error.into()),
                Err(PassError::Retry(error)) => {
                    debug!(
                        strategy = strategy.label(),
                        encoding = encoding.name(),
                        error = %error,
                        "pass failed, trying next candidate"
                    );
                    last_error = Some(error);
                }
            }
        }
    }

    Err(last_error
        .map(Error::from)
        .unwrap_or_else(|| Error::Other("no extraction attempt produced a result".to_string())))
}

fn reset_dir(target: &Path) -> Result<()> {
    std::fs::remove_dir_all(target)?;
    std::fs::create_dir_all(target)?;
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn folder_names_carry_sanitized_display_name_and_id() {
        let root = TempDir::new().unwrap();
        let target = unique_target_dir(root.path(), "Artist - Ti:tle?", BeatmapsetId(123));
        assert_eq!(
            target.file_name().and_then(|n| n.to_str()).unwrap(),
            "Artist - Ti_tle_ [123]"
        );
    }

    #[test]
    fn collision_suffixes_increase_monotonically() {
        let root = TempDir::new().unwrap();
        let first = unique_target_dir(root.path(), "Song", BeatmapsetId(7));
        std::fs::create_dir(&first).unwrap();

        let second = unique_target_dir(root.path(), "Song", BeatmapsetId(7));
        assert!(second.to_string_lossy().ends_with("Song [7]-2"));
        std::fs::create_dir(&second).unwrap();

        let third = unique_target_dir(root.path(), "Song", BeatmapsetId(7));
        assert!(third.to_string_lossy().ends_with("Song [7]-3"));
    }
}
