//! Error types for mapset-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Source, Extract, Config)
//! - Multi-source failure aggregation for the download orchestrator
//! - Transient/permanent classification via [`IsRetryable`]

use std::path::PathBuf;
use thiserror::Error;

use crate::types::BeatmapsetId;

/// Result type alias for mapset-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mapset-dl
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "destination_root")
        key: Option<String>,
    },

    /// Remote source error (authentication, HTTP status, malformed response)
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Archive extraction error
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Every configured source was tried and every attempt failed
    ///
    /// The message enumerates each attempted source and its reason, one per
    /// line, in attempt order.
    #[error("all sources failed for beatmapset {id}:\n{reasons}")]
    AllSourcesFailed {
        /// The beatmapset that could not be acquired
        id: BeatmapsetId,
        /// Newline-joined `source: reason` lines, in attempt order
        reasons: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Remote source errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// The session credential was missing, expired, or rejected
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The remote server answered with a non-success status
    #[error("HTTP status {status} from {url}")]
    Status {
        /// The HTTP status code returned by the server
        status: u16,
        /// The request URL that produced the status
        url: String,
    },

    /// The server response could not be interpreted
    #[error("malformed response from {source_name}: {reason}")]
    BadResponse {
        /// The source that produced the response
        source_name: String,
        /// Why the response could not be interpreted
        reason: String,
    },
}

/// Archive extraction errors
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The downloaded archive file does not exist
    #[error("archive not found: {path}")]
    ArchiveMissing {
        /// The expected archive location
        path: PathBuf,
    },

    /// The destination root is missing or not a directory
    #[error("destination root is not a directory: {path}")]
    InvalidDestination {
        /// The invalid destination root
        path: PathBuf,
    },

    /// An entry name could not be decoded under the attempted encoding
    #[error("undecodable entry name in {archive} under {encoding}")]
    Undecodable {
        /// The archive containing the entry
        archive: PathBuf,
        /// The encoding label the entry name was attempted under
        encoding: &'static str,
    },

    /// An entry path attempts to escape the destination folder
    #[error("unsafe entry path in {archive}: {name}")]
    UnsafePath {
        /// The archive containing the entry
        archive: PathBuf,
        /// The offending entry name
        name: String,
    },

    /// The archive could not be read (corrupt structure, bad entry data)
    #[error("failed to read archive {archive}: {reason}")]
    Structural {
        /// The archive that could not be read
        archive: PathBuf,
        /// The underlying reason
        reason: String,
    },

    /// An extracted file could not be written
    #[error("failed to write {path}: {reason}")]
    WriteFailed {
        /// The destination path that could not be written
        path: PathBuf,
        /// The underlying reason
        reason: String,
    },

    /// The archive unpacked cleanly but contained no files
    #[error("archive {archive} contained no files")]
    NoContent {
        /// The empty archive
        archive: PathBuf,
    },
}

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network timeouts, server busy) should return `true`.
/// Permanent failures (bad credentials, corrupt archive, invalid config)
/// should return `false`. The orchestrator never retries the same source
/// within one acquisition; this classification is for callers deciding
/// whether a whole acquisition is worth repeating later.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation may succeed on a later attempt
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            // Server-side failures may clear up; client-side rejections will not
            Error::Source(SourceError::Status { status, .. }) => *status >= 500,
            Error::Source(_) => false,
            // Extraction failures are permanent for a given archive
            Error::Extract(_) => false,
            // Config errors are permanent
            Error::Config { .. } => false,
            // The aggregate already represents exhausted attempts
            Error::AllSourcesFailed { .. } => false,
            // Serialization errors are permanent
            Error::Serialization(_) => false,
            // Unknown errors - be conservative and don't retry
            Error::Other(_) => false,
        }
    }
}
