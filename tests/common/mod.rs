//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

/// Build a well-formed ZIP in memory with UTF-8 entry names
///
/// Names ending in `/` become directory entries.
pub fn utf8_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::FileOptions::default();
        for (name, data) in entries {
            if name.ends_with('/') {
                writer
                    .add_directory(name.trim_end_matches('/'), options)
                    .unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

/// Hand-assembled ZIP with raw entry-name bytes
///
/// The writer API only accepts UTF-8 names, so fixtures for legacy-encoded
/// (or hostile) names are assembled directly: stored entries, one local
/// header each, central directory, end-of-central-directory record.
pub struct RawZipBuilder {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl RawZipBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add one stored entry; a name ending in `/` is a directory marker
    pub fn entry(mut self, name: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        self.entries.push((name.into(), data.into()));
        self
    }

    /// Complete archive
    pub fn build(&self) -> Vec<u8> {
        self.assemble(true)
    }

    /// Archive whose end-of-central-directory record is missing, so only a
    /// sequential local-header reader can open it
    pub fn build_without_eocd(&self) -> Vec<u8> {
        self.assemble(false)
    }

    fn assemble(&self, include_eocd: bool) -> Vec<u8> {
        let mut out = Vec::new();
        let mut offsets = Vec::new();

        for (name, data) in &self.entries {
            offsets.push(out.len() as u32);
            out.extend_from_slice(&0x04034b50u32.to_le_bytes()); // local header
            out.extend_from_slice(&20u16.to_le_bytes()); // version needed
            out.extend_from_slice(&0u16.to_le_bytes()); // flags
            out.extend_from_slice(&0u16.to_le_bytes()); // stored
            out.extend_from_slice(&0u16.to_le_bytes()); // mod time
            out.extend_from_slice(&0x21u16.to_le_bytes()); // mod date (1980-01-01)
            out.extend_from_slice(&crc32(data).to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(&(name.len() as u16).to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes()); // extra len
            out.extend_from_slice(name);
            out.extend_from_slice(data);
        }

        let cd_offset = out.len() as u32;
        let mut central = Vec::new();
        for (i, (name, data)) in self.entries.iter().enumerate() {
            central.extend_from_slice(&0x02014b50u32.to_le_bytes()); // central header
            central.extend_from_slice(&20u16.to_le_bytes()); // version made by
            central.extend_from_slice(&20u16.to_le_bytes()); // version needed
            central.extend_from_slice(&0u16.to_le_bytes()); // flags
            central.extend_from_slice(&0u16.to_le_bytes()); // stored
            central.extend_from_slice(&0u16.to_le_bytes()); // mod time
            central.extend_from_slice(&0x21u16.to_le_bytes()); // mod date
            central.extend_from_slice(&crc32(data).to_le_bytes());
            central.extend_from_slice(&(data.len() as u32).to_le_bytes());
            central.extend_from_slice(&(data.len() as u32).to_le_bytes());
            central.extend_from_slice(&(name.len() as u16).to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes()); // extra len
            central.extend_from_slice(&0u16.to_le_bytes()); // comment len
            central.extend_from_slice(&0u16.to_le_bytes()); // disk number
            central.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
            central.extend_from_slice(&0u32.to_le_bytes()); // external attrs
            central.extend_from_slice(&offsets[i].to_le_bytes());
            central.extend_from_slice(name);
        }
        out.extend_from_slice(&central);

        if include_eocd {
            let count = self.entries.len() as u16;
            out.extend_from_slice(&0x06054b50u32.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes()); // disk number
            out.extend_from_slice(&0u16.to_le_bytes()); // central directory disk
            out.extend_from_slice(&count.to_le_bytes());
            out.extend_from_slice(&count.to_le_bytes());
            out.extend_from_slice(&(central.len() as u32).to_le_bytes());
            out.extend_from_slice(&cd_offset.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes()); // comment len
        }
        out
    }
}

fn crc32(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Write archive bytes into `dir` and return the file path
pub fn write_archive(dir: &Path, bytes: &[u8]) -> PathBuf {
    let path = dir.join("download.osz");
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Relative paths of all files under `root`, `/`-separated and sorted
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
