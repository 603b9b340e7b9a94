//! Remote beatmapset sources
//!
//! Each source is a small value holding its base URL and an HTTP client,
//! implementing the same four-method contract: identify itself, search, and
//! download an archive by id while emitting progress events. The download
//! orchestrator only calls `download`; `search` is for UI-facing
//! collaborators.

mod catboy;
mod nerinyan;
mod official;
mod sayobot;

pub use catboy::CatboySource;
pub use nerinyan::NerinyanSource;
pub use official::{OfficialSource, StaticTokenProvider, TokenProvider};
pub use sayobot::SayobotSource;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::{Error, Result, SourceError};
use crate::progress::ProgressSink;
use crate::types::{BeatmapsetId, DownloadProgress, SearchQuery, SearchResults};

/// A remote service capable of locating and supplying beatmapset archives
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Stable identifier used in configuration and preferred-source selection
    fn id(&self) -> &'static str;

    /// Human-readable name shown in failure messages and UIs
    fn display_name(&self) -> &'static str;

    /// Fetch one page of search results
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults>;

    /// Download the archive for `id` into the temp directory
    ///
    /// The returned path is a short-lived temporary artifact, consumed (and
    /// always deleted) by extraction.
    async fn download(&self, id: BeatmapsetId, progress: &dyn ProgressSink) -> Result<PathBuf>;
}

/// Build the shared HTTP client from config
pub(crate) fn http_client(http: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(http.user_agent.clone())
        .timeout(Duration::from_secs(http.request_timeout_secs))
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .build()
        .map_err(Error::from)
}

/// Where a source parks an in-flight archive download
pub(crate) fn temp_archive_path(temp_dir: &Path, source_id: &str, id: BeatmapsetId) -> PathBuf {
    temp_dir.join(format!("{source_id}-{id}.osz"))
}

/// Send a prepared request and stream the body to `target`, reporting
/// progress per received chunk
///
/// Progress callbacks run synchronously on the download task, so sinks must
/// be cheap and non-blocking.
pub(crate) async fn fetch_archive(
    request: reqwest::RequestBuilder,
    beatmapset_id: BeatmapsetId,
    target: &Path,
    progress: &dyn ProgressSink,
) -> Result<PathBuf> {
    let response = request.send().await?;
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(SourceError::Unauthenticated(format!(
            "server rejected credentials with status {status}"
        ))
        .into());
    }
    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        }
        .into());
    }

    let total_bytes = response.content_length();
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let stream_to_disk = async {
        let mut file = tokio::fs::File::create(target).await?;
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            progress.report(DownloadProgress {
                beatmapset_id,
                downloaded_bytes: downloaded,
                total_bytes,
            });
        }
        file.flush().await?;
        Ok::<u64, Error>(downloaded)
    };

    match stream_to_disk.await {
        Ok(downloaded) => {
            debug!(?target, bytes = downloaded, beatmapset_id = beatmapset_id.0, "archive downloaded");
            Ok(target.to_path_buf())
        }
        Err(error) => {
            // A half-written archive must not linger in the temp directory
            if let Err(e) = tokio::fs::remove_file(target).await {
                warn!(?target, error = %e, "failed to remove partial download");
            }
            Err(error)
        }
    }
}
