//! Core types for mapset-dl

use serde::{Deserialize, Serialize};

/// Unique identifier for a beatmapset
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeatmapsetId(pub u64);

impl BeatmapsetId {
    /// Create a new BeatmapsetId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for BeatmapsetId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<BeatmapsetId> for u64 {
    fn from(id: BeatmapsetId) -> Self {
        id.0
    }
}

impl std::fmt::Display for BeatmapsetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BeatmapsetId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Summary of a downloadable beatmapset, as returned by a source's search or fetch result
///
/// Immutable value; the composite display name derived from it names the
/// destination folder on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatmapsetSummary {
    /// Numeric beatmapset id
    pub id: BeatmapsetId,
    /// Song artist
    pub artist: String,
    /// Song title
    pub title: String,
    /// Mapper name
    pub creator: String,
    /// Whether a video variant of the package exists
    pub has_video: bool,
}

impl BeatmapsetSummary {
    /// Human-readable composite name, used to derive the destination folder name
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

/// A single download progress event
///
/// Ephemeral; emitted through a [`ProgressSink`](crate::progress::ProgressSink)
/// while a source streams an archive, never persisted.
#[derive(Clone, Copy, Debug)]
pub struct DownloadProgress {
    /// The beatmapset being downloaded
    pub beatmapset_id: BeatmapsetId,
    /// Bytes received so far
    pub downloaded_bytes: u64,
    /// Total size if the server reported one
    pub total_bytes: Option<u64>,
}

/// What one successful extraction pass produced
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractionOutcome {
    /// Number of files written to the destination folder
    pub files_extracted: usize,
    /// Total bytes written
    pub bytes_written: u64,
}

/// A search request against a source
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text keywords
    pub keywords: String,
    /// Zero-based result page
    pub page: u32,
}

impl SearchQuery {
    /// Create a query for the first page of results
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            page: 0,
        }
    }
}

/// One page of search results from a source
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// The beatmapsets on this page
    pub beatmapsets: Vec<BeatmapsetSummary>,
    /// Whether the source reported more pages after this one
    pub has_more: bool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beatmapset_id_round_trips_through_display_and_parse() {
        let id = BeatmapsetId::new(1234567);
        let parsed: BeatmapsetId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn display_name_is_artist_dash_title() {
        let summary = BeatmapsetSummary {
            id: BeatmapsetId(1),
            artist: "Artist".to_string(),
            title: "Title".to_string(),
            creator: "mapper".to_string(),
            has_video: false,
        };
        assert_eq!(summary.display_name(), "Artist - Title");
    }

    #[test]
    fn beatmapset_id_serializes_transparently() {
        let id = BeatmapsetId(99);
        assert_eq!(serde_json::to_string(&id).unwrap(), "99");
        let back: BeatmapsetId = serde_json::from_str("99").unwrap();
        assert_eq!(back, id);
    }
}
