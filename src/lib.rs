//! # mapset-dl
//!
//! Backend library for beatmapset download applications.
//!
//! ## Design Philosophy
//!
//! mapset-dl is designed to be:
//! - **Failover-first** - Sources are tried in order until one yields a usable archive
//! - **Safe by default** - Entry paths are sanitized and traversal attempts abort extraction
//! - **Encoding-tolerant** - Entry names are decoded across a candidate list of legacy codepages
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//!
//! ## Quick Start
//!
//! ```no_run
//! use mapset_dl::{BeatmapsetId, BeatmapsetSummary, Config, MapsetDownloader, NoProgress};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = MapsetDownloader::new(&Config::default())?;
//!
//!     let item = BeatmapsetSummary {
//!         id: BeatmapsetId(1),
//!         artist: "Artist".to_string(),
//!         title: "Title".to_string(),
//!         creator: "mapper".to_string(),
//!         has_video: false,
//!     };
//!
//!     let (folder, source) = downloader
//!         .acquire(&item, Path::new("./songs"), None, &NoProgress)
//!         .await?;
//!     println!("downloaded from {source} into {}", folder.display());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Acquisition orchestration (failover and official-source services)
pub mod acquire;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Archive extraction
pub mod extract;
/// Persistent failure records
pub mod failure_log;
/// Download progress reporting
pub mod progress;
/// Remote beatmapset sources
pub mod sources;
/// Core types
pub mod types;

// Re-export commonly used types
pub use acquire::{MapsetDownloader, OfficialDownloader};
pub use config::{Config, HttpConfig, MirrorConfig, OfficialConfig};
pub use error::{Error, ExtractError, IsRetryable, Result, SourceError};
pub use extract::extract;
pub use failure_log::{FailureLog, FailureRecord};
pub use progress::{NoProgress, ProgressSink};
pub use sources::{
    CatboySource, NerinyanSource, OfficialSource, SayobotSource, SourceProvider,
    StaticTokenProvider, TokenProvider,
};
pub use types::{
    BeatmapsetId, BeatmapsetSummary, DownloadProgress, ExtractionOutcome, SearchQuery,
    SearchResults,
};
