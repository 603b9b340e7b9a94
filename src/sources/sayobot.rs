//! Sayobot mirror source
//!
//! Search and download live on separate hosts, and the list API wraps its
//! payload in a status envelope.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{Result, SourceError};
use crate::progress::ProgressSink;
use crate::types::{BeatmapsetId, BeatmapsetSummary, SearchQuery, SearchResults};

use super::{SourceProvider, fetch_archive, http_client, temp_archive_path};

const SEARCH_PAGE_SIZE: usize = 25;

/// Mirror backed by the Sayobot API
pub struct SayobotSource {
    client: reqwest::Client,
    api_base_url: String,
    download_base_url: String,
    temp_dir: PathBuf,
}

impl SayobotSource {
    /// Build the source from config
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(&config.http)?,
            api_base_url: config.mirrors.sayobot_api_base_url.clone(),
            download_base_url: config.mirrors.sayobot_download_base_url.clone(),
            temp_dir: config.temp_dir.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SayobotList {
    status: i64,
    #[serde(default)]
    data: Vec<SayobotSet>,
}

#[derive(Debug, Deserialize)]
struct SayobotSet {
    sid: u64,
    artist: String,
    title: String,
    creator: String,
    #[serde(default)]
    video: bool,
}

impl From<SayobotSet> for BeatmapsetSummary {
    fn from(set: SayobotSet) -> Self {
        Self {
            id: BeatmapsetId(set.sid),
            artist: set.artist,
            title: set.title,
            creator: set.creator,
            has_video: set.video,
        }
    }
}

#[async_trait]
impl SourceProvider for SayobotSource {
    fn id(&self) -> &'static str {
        "sayobot"
    }

    fn display_name(&self) -> &'static str {
        "Sayobot"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResults> {
        let url = format!(
            "{}/beatmaplist?word={}&limit={}&offset={}",
            self.api_base_url,
            urlencoding::encode(&query.keywords),
            SEARCH_PAGE_SIZE,
            query.page as usize * SEARCH_PAGE_SIZE
        );
        let list: SayobotList = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if list.status != 0 {
            return Err(SourceError::BadResponse {
                source_name: self.display_name().to_string(),
                reason: format!("list API returned status {}", list.status),
            }
            .into());
        }

        Ok(SearchResults {
            has_more: list.data.len() == SEARCH_PAGE_SIZE,
            beatmapsets: list.data.into_iter().map(Into::into).collect(),
        })
    }

    async fn download(&self, id: BeatmapsetId, progress: &dyn ProgressSink) -> Result<PathBuf> {
        let url = format!("{}/beatmaps/download/full/{}", self.download_base_url, id);
        let target = temp_archive_path(&self.temp_dir, self.id(), id);
        fetch_archive(self.client.get(&url), id, &target, progress).await
    }
}
