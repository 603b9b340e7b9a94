//! Mino (catboy.best) mirror source

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::error::Result;
use crate::progress::ProgressSink;
use crate::types::{BeatmapsetId, BeatmapsetSummary, SearchQuery, SearchResults};

use super::{SourceProvider, fetch_archive, http_client, temp_archive_path};

const SEARCH_PAGE_SIZE: usize = 50;

/// Mirror backed by the Mino API
pub struct CatboySource {
    client: reqwest::Client,
    base_url: String,
    temp_dir: PathBuf,
}

impl CatboySource {
    /// Build the source from config
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: http_client(&config.http)?,
            base_url: config.mirrors.catboy_base_url.clone(),
            temp_dir: config.temp_dir.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct MinoSet {
    id: u64,
    artist: String,
    title: String,
    creator: String,
    #[serde(default)]
    video: bool,
}

impl From<MinoSet> for BeatmapsetSummary {
    fn from(set: MinoSet) -> Self {
        Self {
            id: BeatmapsetId(set.id),
            artist: set.artist,
            title: set.title,
            creator: set.creator,
            has_video: set.video,
        }
    }
}

#[async_trait]
impl SourceProvider for CatboySource {
    fn id(&self) -> &'static str {
        "catboy"
    }

    fn display_name(&self) -> &'static str {
        "Mino (catboy.best)"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResults> {
        let url = format!(
            "{}/api/v2/search?query={}&limit={}&offset={}",
            self.base_url,
            urlencoding::encode(&query.keywords),
            SEARCH_PAGE_SIZE,
            query.page as usize * SEARCH_PAGE_SIZE
        );
        let sets: Vec<MinoSet> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(SearchResults {
            has_more: sets.len() == SEARCH_PAGE_SIZE,
            beatmapsets: sets.into_iter().map(Into::into).collect(),
        })
    }

    async fn download(&self, id: BeatmapsetId, progress: &dyn ProgressSink) -> Result<PathBuf> {
        let url = format!("{}/d/{}", self.base_url, id);
        let target = temp_archive_path(&self.temp_dir, self.id(), id);
        fetch_archive(self.client.get(&url), id, &target, progress).await
    }
}
