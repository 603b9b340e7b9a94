//! Acquisition orchestration
//!
//! [`MapsetDownloader`] walks a ranked list of sources until one yields a
//! usable archive, then hands it to the extractor. Source attempts are
//! strictly sequential so failure attribution stays unambiguous and the same
//! item is never downloaded twice concurrently. Per-source failures are
//! collected and, when every source fails, surfaced as one aggregate error
//! that enumerates each attempted source and its reason.
//!
//! [`OfficialDownloader`] is the single-source specialization for the
//! authoritative API: it needs a session credential and supports the
//! skip-video content variant, but shares the same extraction path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract;
use crate::failure_log::FailureLog;
use crate::progress::ProgressSink;
use crate::sources::{
    CatboySource, NerinyanSource, OfficialSource, SayobotSource, SourceProvider, TokenProvider,
};
use crate::types::BeatmapsetSummary;

fn ensure_destination_root(destination_root: &Path) -> Result<()> {
    if destination_root.is_dir() {
        Ok(())
    } else {
        Err(Error::Config {
            message: format!(
                "destination root {} is not a directory",
                destination_root.display()
            ),
            key: Some("destination_root".to_string()),
        })
    }
}

/// Failover downloader over the configured mirror sources
pub struct MapsetDownloader {
    sources: Vec<Arc<dyn SourceProvider>>,
    failure_log: Option<FailureLog>,
}

impl std::fmt::Debug for MapsetDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsetDownloader")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.id()).collect::<Vec<_>>(),
            )
            .field("failure_log", &self.failure_log)
            .finish()
    }
}

impl MapsetDownloader {
    /// Build the downloader with the mirrors named in `config.source_order`
    pub fn new(config: &Config) -> Result<Self> {
        let mut sources: Vec<Arc<dyn SourceProvider>> = Vec::new();
        for source_id in &config.source_order {
            let source: Arc<dyn SourceProvider> = match source_id.as_str() {
                "catboy" => Arc::new(CatboySource::new(config)?),
                "nerinyan" => Arc::new(NerinyanSource::new(config)?),
                "sayobot" => Arc::new(SayobotSource::new(config)?),
                other => {
                    return Err(Error::Config {
                        message: format!("unknown source id: {other}"),
                        key: Some("source_order".to_string()),
                    });
                }
            };
            sources.push(source);
        }
        Ok(Self::from_sources(
            sources,
            config.failure_log.clone().map(FailureLog::new),
        ))
    }

    /// Build the downloader from explicit sources, in priority order
    pub fn from_sources(
        sources: Vec<Arc<dyn SourceProvider>>,
        failure_log: Option<FailureLog>,
    ) -> Self {
        Self {
            sources,
            failure_log,
        }
    }

    /// The configured sources, in priority order (UI-facing collaborators
    /// run `search` against these)
    pub fn sources(&self) -> &[Arc<dyn SourceProvider>] {
        &self.sources
    }

    /// Download `item` from the first source that succeeds and extract it
    /// under `destination_root`
    ///
    /// Returns the populated folder and the display name of the source that
    /// supplied it. When every source fails, the error message lists each
    /// attempted source with its reason, in attempt order.
    pub async fn acquire(
        &self,
        item: &BeatmapsetSummary,
        destination_root: &Path,
        preferred_source: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> Result<(PathBuf, String)> {
        ensure_destination_root(destination_root)?;
        if self.sources.is_empty() {
            return Err(Error::Config {
                message: "no sources configured".to_string(),
                key: Some("source_order".to_string()),
            });
        }

        let mut failures: Vec<String> = Vec::new();
        for source in self.attempt_order(preferred_source) {
            info!(
                source = source.id(),
                beatmapset_id = item.id.0,
                "attempting download"
            );
            match self
                .try_source(source.as_ref(), item, destination_root, progress)
                .await
            {
                Ok(folder) => {
                    info!(
                        source = source.id(),
                        beatmapset_id = item.id.0,
                        ?folder,
                        "acquisition complete"
                    );
                    return Ok((folder, source.display_name().to_string()));
                }
                Err(error) => {
                    warn!(
                        source = source.id(),
                        beatmapset_id = item.id.0,
                        error = %error,
                        "source attempt failed"
                    );
                    self.log_extraction_failure(item, source.display_name(), &error);
                    failures.push(format!("{}: {}", source.display_name(), error));
                }
            }
        }

        Err(Error::AllSourcesFailed {
            id: item.id,
            reasons: failures.join("\n"),
        })
    }

    /// Preferred source first, then the configured order, each source at
    /// most once
    fn attempt_order(&self, preferred_source: Option<&str>) -> Vec<Arc<dyn SourceProvider>> {
        let mut order: Vec<Arc<dyn SourceProvider>> = Vec::with_capacity(self.sources.len());
        if let Some(preferred) = preferred_source
            && let Some(source) = self.sources.iter().find(|s| s.id() == preferred)
        {
            order.push(Arc::clone(source));
        }
        for source in &self.sources {
            if order.iter().all(|s| s.id() != source.id()) {
                order.push(Arc::clone(source));
            }
        }
        order
    }

    async fn try_source(
        &self,
        source: &dyn SourceProvider,
        item: &BeatmapsetSummary,
        destination_root: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<PathBuf> {
        let archive = source.download(item.id, progress).await?;
        extract::extract(&archive, destination_root, &item.display_name(), item.id).await
    }

    fn log_extraction_failure(&self, item: &BeatmapsetSummary, source: &str, error: &Error) {
        if !matches!(error, Error::Extract(_)) {
            return;
        }
        if let Some(log) = &self.failure_log
            && let Err(e) = log.record_failure(item.id, source, error)
        {
            warn!(error = %e, "failed to append failure record");
        }
    }
}

/// Single-source download service for the official API
pub struct OfficialDownloader {
    source: OfficialSource,
    failure_log: Option<FailureLog>,
}

impl OfficialDownloader {
    /// Build the service from config and a credential supplier
    pub fn new(config: &Config, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        Ok(Self {
            source: OfficialSource::new(config, tokens)?,
            failure_log: config.failure_log.clone().map(FailureLog::new),
        })
    }

    /// The underlying source, for search
    pub fn source(&self) -> &OfficialSource {
        &self.source
    }

    /// Download `item` (optionally without its video asset) and extract it
    /// under `destination_root`
    pub async fn acquire(
        &self,
        item: &BeatmapsetSummary,
        destination_root: &Path,
        include_video: bool,
        progress: &dyn ProgressSink,
    ) -> Result<PathBuf> {
        ensure_destination_root(destination_root)?;

        let archive = self
            .source
            .download_variant(item.id, include_video, progress)
            .await?;
        let result =
            extract::extract(&archive, destination_root, &item.display_name(), item.id).await;

        if let Err(error) = &result
            && matches!(error, Error::Extract(_))
            && let Some(log) = &self.failure_log
            && let Err(e) = log.record_failure(item.id, self.source.display_name(), error)
        {
            warn!(error = %e, "failed to append failure record");
        }
        result
    }
}
