//! ZIP extraction strategies
//!
//! Two independent reading implementations over the same archive: the
//! central-directory reader handles well-formed archives, and the sequential
//! local-header stream reader tolerates archives whose central directory the
//! first strategy cannot open at all. Each pass decodes and sanitizes every
//! entry name before the first write, so a failed candidate leaves no residue.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use encoding_rs::Encoding;
use tracing::trace;

use crate::error::ExtractError;
use crate::types::ExtractionOutcome;

use super::encoding::decode_name;
use super::paths::{RenameMap, SanitizedEntry, resolve_within, sanitize_entry_path};

/// How a failed pass affects the encoding/strategy matrix
#[derive(Debug)]
pub(crate) enum PassError {
    /// Abort the whole extraction (path traversal is structural, not
    /// encoding-dependent)
    Fatal(ExtractError),
    /// Try the next candidate
    Retry(ExtractError),
}

/// What one successful pass produced
#[derive(Debug, Default)]
pub(crate) struct PassResult {
    pub outcome: ExtractionOutcome,
    pub renames: RenameMap,
}

/// One archive-reading implementation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// `zip::ZipArchive` over the central directory
    CentralDirectory,
    /// `zip::read::read_zipfile_from_stream` over sequential local headers
    Stream,
}

impl Strategy {
    /// Attempt order: central directory first, stream reader as the fallback
    pub(crate) const ALL: [Strategy; 2] = [Strategy::CentralDirectory, Strategy::Stream];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Strategy::CentralDirectory => "central-directory",
            Strategy::Stream => "stream",
        }
    }
}

/// Run one full extraction pass under one strategy and one name encoding
pub(crate) fn run_pass(
    strategy: Strategy,
    archive_path: &Path,
    dest: &Path,
    encoding: &'static Encoding,
) -> Result<PassResult, PassError> {
    match strategy {
        Strategy::CentralDirectory => central_directory_pass(archive_path, dest, encoding),
        Strategy::Stream => stream_pass(archive_path, dest, encoding),
    }
}

fn structural(archive_path: &Path, reason: impl std::fmt::Display) -> ExtractError {
    ExtractError::Structural {
        archive: archive_path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Directory markers carry no data and are skipped; their tree is recreated
/// from the file entries' parent paths
fn is_directory_marker(raw: &[u8]) -> bool {
    raw.is_empty() || raw.ends_with(b"/") || raw.ends_with(b"\\")
}

/// Decode and sanitize one raw entry name
///
/// `Ok(None)` means the entry resolves to nothing and is skipped.
fn plan_entry(
    raw: &[u8],
    archive_path: &Path,
    encoding: &'static Encoding,
) -> Result<Option<SanitizedEntry>, PassError> {
    let name = decode_name(encoding, raw).ok_or_else(|| {
        PassError::Retry(ExtractError::Undecodable {
            archive: archive_path.to_path_buf(),
            encoding: encoding.name(),
        })
    })?;

    match sanitize_entry_path(&name) {
        Err(traversal) => Err(PassError::Fatal(ExtractError::UnsafePath {
            archive: archive_path.to_path_buf(),
            name: traversal.name,
        })),
        Ok(entry) => Ok(entry),
    }
}

/// Write one planned entry's data under the destination root
fn write_entry(
    reader: &mut impl Read,
    dest: &Path,
    entry: &SanitizedEntry,
    archive_path: &Path,
) -> Result<u64, PassError> {
    let target = resolve_within(dest, entry).ok_or_else(|| {
        PassError::Fatal(ExtractError::UnsafePath {
            archive: archive_path.to_path_buf(),
            name: entry.original_path.clone(),
        })
    })?;

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            PassError::Retry(ExtractError::WriteFailed {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })
        })?;
    }

    let mut out = File::create(&target).map_err(|e| {
        PassError::Retry(ExtractError::WriteFailed {
            path: target.clone(),
            reason: e.to_string(),
        })
    })?;

    // A copy failure here may be corrupt entry data rather than a disk
    // problem, so it stays retryable across the matrix
    let written = std::io::copy(reader, &mut out).map_err(|e| {
        PassError::Retry(structural(
            archive_path,
            format!("failed to extract {}: {}", entry.sanitized_path, e),
        ))
    })?;

    trace!(path = ?target, bytes = written, "wrote entry");
    Ok(written)
}

/// Central-directory pass: plan all entry names, then commit
fn central_directory_pass(
    archive_path: &Path,
    dest: &Path,
    encoding: &'static Encoding,
) -> Result<PassResult, PassError> {
    let file = File::open(archive_path)
        .map_err(|e| PassError::Retry(structural(archive_path, e)))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| PassError::Retry(structural(archive_path, e)))?;

    let mut plan: Vec<(usize, SanitizedEntry)> = Vec::new();
    for index in 0..archive.len() {
        let raw = {
            let entry = archive
                .by_index(index)
                .map_err(|e| PassError::Retry(structural(archive_path, e)))?;
            entry.name_raw().to_vec()
        };
        if is_directory_marker(&raw) {
            continue;
        }
        if let Some(entry) = plan_entry(&raw, archive_path, encoding)? {
            plan.push((index, entry));
        }
    }

    let mut result = PassResult::default();
    for (index, entry) in &plan {
        let mut zip_file = archive
            .by_index(*index)
            .map_err(|e| PassError::Retry(structural(archive_path, e)))?;
        let written = write_entry(&mut zip_file, dest, entry, archive_path)?;
        result.outcome.files_extracted += 1;
        result.outcome.bytes_written += written;
        result.renames.record(entry);
    }
    Ok(result)
}

/// Stream pass: one read-through to plan, a second to commit
///
/// Entries are matched between the two read-throughs by position.
fn stream_pass(
    archive_path: &Path,
    dest: &Path,
    encoding: &'static Encoding,
) -> Result<PassResult, PassError> {
    let mut file = File::open(archive_path)
        .map_err(|e| PassError::Retry(structural(archive_path, e)))?;

    let mut plan: Vec<Option<SanitizedEntry>> = Vec::new();
    loop {
        match zip::read::read_zipfile_from_stream(&mut file) {
            Ok(Some(entry)) => {
                let raw = entry.name_raw().to_vec();
                drop(entry);
                if is_directory_marker(&raw) {
                    plan.push(None);
                } else {
                    plan.push(plan_entry(&raw, archive_path, encoding)?);
                }
            }
            Ok(None) => break,
            Err(e) => return Err(PassError::Retry(structural(archive_path, e))),
        }
    }

    let mut file = File::open(archive_path)
        .map_err(|e| PassError::Retry(structural(archive_path, e)))?;

    let mut result = PassResult::default();
    let mut position = 0usize;
    loop {
        match zip::read::read_zipfile_from_stream(&mut file) {
            Ok(Some(mut zip_file)) => {
                let planned = plan.get(position).cloned().flatten();
                position += 1;
                if let Some(entry) = planned {
                    let written = write_entry(&mut zip_file, dest, &entry, archive_path)?;
                    result.outcome.files_extracted += 1;
                    result.outcome.bytes_written += written;
                    result.renames.record(&entry);
                }
            }
            Ok(None) => break,
            Err(e) => return Err(PassError::Retry(structural(archive_path, e))),
        }
    }
    Ok(result)
}
