//! Official osu! API source
//!
//! The only source that requires an authenticated session. The credential is
//! an opaque bearer token handed in by a [`TokenProvider`]; refreshing or
//! acquiring it is the collaborator's concern, and an expired token surfaces
//! as a propagated download failure, never an internal retry.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, SourceError};
use crate::progress::ProgressSink;
use crate::types::{BeatmapsetId, BeatmapsetSummary, SearchQuery, SearchResults};

use super::{SourceProvider, fetch_archive, http_client, temp_archive_path};

/// Supplier of the opaque session credential
pub trait TokenProvider: Send + Sync {
    /// Current bearer token, or an error when no session is available
    fn bearer_token(&self) -> Result<String>;
}

/// Token provider holding one fixed token, for callers that manage refresh
/// themselves
#[derive(Clone, Debug)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Wrap an already-acquired token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// The authoritative beatmapset source
pub struct OfficialSource {
    client: reqwest::Client,
    api_base_url: String,
    temp_dir: PathBuf,
    tokens: Arc<dyn TokenProvider>,
}

impl OfficialSource {
    /// Build the source from config and a credential supplier
    pub fn new(config: &Config, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        Ok(Self {
            client: http_client(&config.http)?,
            api_base_url: config.official.api_base_url.clone(),
            temp_dir: config.temp_dir.clone(),
            tokens,
        })
    }

    /// Download with an explicit content variant
    ///
    /// `include_video=false` asks the server for the variant without the
    /// video asset; this is a download-time parameter, not post-processing.
    pub async fn download_variant(
        &self,
        id: BeatmapsetId,
        include_video: bool,
        progress: &dyn ProgressSink,
    ) -> Result<PathBuf> {
        let token = self
            .tokens
            .bearer_token()
            .map_err(|e| SourceError::Unauthenticated(e.to_string()))?;

        let mut url = format!("{}/beatmapsets/{}/download", self.api_base_url, id);
        if !include_video {
            url.push_str("?noVideo=1");
        }
        debug!(%url, beatmapset_id = id.0, "requesting official download");

        let request = self.client.get(&url).bearer_auth(token);
        let target = temp_archive_path(&self.temp_dir, self.id(), id);
        fetch_archive(request, id, &target, progress).await
    }
}

#[derive(Debug, Deserialize)]
struct ApiSearchResponse {
    beatmapsets: Vec<ApiBeatmapset>,
    cursor_string: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiBeatmapset {
    id: u64,
    artist: String,
    title: String,
    creator: String,
    #[serde(default)]
    video: bool,
}

impl From<ApiBeatmapset> for BeatmapsetSummary {
    fn from(set: ApiBeatmapset) -> Self {
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
impl SourceProvider for OfficialSource {
    fn id(&self) -> &'static str {
        "official"
    }

    fn display_name(&self) -> &'static str {
        "osu!"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResults> {
        let token = self
            .tokens
            .bearer_token()
            .map_err(|e| SourceError::Unauthenticated(e.to_string()))?;

        let url = format!(
            "{}/beatmapsets/search?q={}&page={}",
            self.api_base_url,
            urlencoding::encode(&query.keywords),
            query.page + 1
        );
        let response: ApiSearchResponse = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(SearchResults {
            has_more: response.cursor_string.is_some(),
            beatmapsets: response.beatmapsets.into_iter().map(Into::into).collect(),
        })
    }

    async fn download(&self, id: BeatmapsetId, progress: &dyn ProgressSink) -> Result<PathBuf> {
        self.download_variant(id, true, progress).await
    }
}
