//! Configuration types for mapset-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP client configuration shared by all sources
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request (default: "mapset-dl/0.1")
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total per-request timeout in seconds (default: 600)
    ///
    /// Covers the whole archive download, so it is deliberately generous.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds (default: 30)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Official osu! API endpoints
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OfficialConfig {
    /// Base URL of the official v2 API (default: "https://osu.ppy.sh/api/v2")
    #[serde(default = "default_official_api_base_url")]
    pub api_base_url: String,
}

impl Default for OfficialConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_official_api_base_url(),
        }
    }
}

/// Mirror endpoints, one base URL per source
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// catboy.best (Mino) base URL
    #[serde(default = "default_catboy_base_url")]
    pub catboy_base_url: String,

    /// Nerinyan API base URL
    #[serde(default = "default_nerinyan_base_url")]
    pub nerinyan_base_url: String,

    /// Sayobot API base URL (search)
    #[serde(default = "default_sayobot_api_base_url")]
    pub sayobot_api_base_url: String,

    /// Sayobot download base URL (archives are served from a separate host)
    #[serde(default = "default_sayobot_download_base_url")]
    pub sayobot_download_base_url: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            catboy_base_url: default_catboy_base_url(),
            nerinyan_base_url: default_nerinyan_base_url(),
            sayobot_api_base_url: default_sayobot_api_base_url(),
            sayobot_download_base_url: default_sayobot_download_base_url(),
        }
    }
}

/// Main configuration for mapset-dl
///
/// Fields are organized into logical sub-configs:
/// - [`http`](HttpConfig) — client identity and timeouts
/// - [`official`](OfficialConfig) — official API endpoints
/// - [`mirrors`](MirrorConfig) — per-mirror base URLs
///
/// Sub-config fields are flattened for serialization, so the JSON/TOML format
/// stays un-nested.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Directory for in-flight archive downloads (default: "./temp")
    ///
    /// Archives are short-lived temporary artifacts: a source writes one
    /// here, and extraction deletes it regardless of outcome.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Mirror priority order, by source id (default: catboy, nerinyan, sayobot)
    #[serde(default = "default_source_order")]
    pub source_order: Vec<String>,

    /// Where unrecoverable extraction failures are appended as JSON lines
    /// (None disables the log)
    #[serde(default = "default_failure_log")]
    pub failure_log: Option<PathBuf>,

    /// HTTP client settings
    #[serde(flatten)]
    pub http: HttpConfig,

    /// Official API endpoints
    #[serde(flatten)]
    pub official: OfficialConfig,

    /// Mirror endpoints
    #[serde(flatten)]
    pub mirrors: MirrorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            source_order: default_source_order(),
            failure_log: default_failure_log(),
            http: HttpConfig::default(),
            official: OfficialConfig::default(),
            mirrors: MirrorConfig::default(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("mapset-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout_secs() -> u64 {
    600
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_official_api_base_url() -> String {
    "https://osu.ppy.sh/api/v2".to_string()
}

fn default_catboy_base_url() -> String {
    "https://catboy.best".to_string()
}

fn default_nerinyan_base_url() -> String {
    "https://api.nerinyan.moe".to_string()
}

fn default_sayobot_api_base_url() -> String {
    "https://api.sayobot.cn".to_string()
}

fn default_sayobot_download_base_url() -> String {
    "https://dl.sayobot.cn".to_string()
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("./temp")
}

fn default_source_order() -> Vec<String> {
    vec![
        "catboy".to_string(),
        "nerinyan".to_string(),
        "sayobot".to_string(),
    ]
}

fn default_failure_log() -> Option<PathBuf> {
    Some(PathBuf::from("./failed_downloads.jsonl"))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config.temp_dir, PathBuf::from("./temp"));
        assert_eq!(config.source_order, vec!["catboy", "nerinyan", "sayobot"]);
        assert!(config.failure_log.is_some());
        assert_eq!(config.http.request_timeout_secs, 600);
        assert!(config.official.api_base_url.starts_with("https://osu.ppy.sh"));
    }

    #[test]
    fn flattened_fields_deserialize_without_nesting() {
        let config: Config = serde_json::from_str(
            r#"{
                "user_agent": "custom/1.0",
                "catboy_base_url": "http://localhost:9000",
                "source_order": ["sayobot"]
            }"#,
        )
        .unwrap();

        assert_eq!(config.http.user_agent, "custom/1.0");
        assert_eq!(config.mirrors.catboy_base_url, "http://localhost:9000");
        assert_eq!(config.source_order, vec!["sayobot"]);
        // Untouched fields keep their defaults
        assert_eq!(config.http.connect_timeout_secs, 30);
    }
}
