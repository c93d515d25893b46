//! Configuration for the dashboard.
//!
//! Loaded from a TOML file (default `feedboard.toml`, overridable as the
//! first CLI argument), with serde defaults for everything so a minimal
//! file only needs the feed URLs and credentials.  Secrets can also come
//! from environment variables so they never have to live in the file:
//!
//! * `FEEDBOARD_CONSUMER_KEY` / `FEEDBOARD_CONSUMER_SECRET`
//! * `FEEDBOARD_ACCESS_TOKEN` / `FEEDBOARD_ACCESS_TOKEN_SECRET`
//! * `FEEDBOARD_VIDEO_API_KEY`

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::source::timeline::TimelineCredentials;

/// Top-level configuration, one section per dashboard column.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub articles: ArticlesConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub videos: VideosConfig,
}

/// Article column: RSS feed URLs and cadence.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticlesConfig {
    /// Feed URLs merged into the article column.
    #[serde(default)]
    pub urls: Vec<String>,
    /// Display cap for the column.
    #[serde(default = "default_article_cap")]
    pub max_items: usize,
    /// Minutes between automatic refreshes.
    #[serde(default = "default_article_refresh")]
    pub refresh_minutes: u64,
}

fn default_article_cap() -> usize {
    40
}

fn default_article_refresh() -> u64 {
    10
}

impl Default for ArticlesConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            max_items: default_article_cap(),
            refresh_minutes: default_article_refresh(),
        }
    }
}

/// Timeline column: credentials, selected list, cadence.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineConfig {
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub consumer_secret: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub access_token_secret: String,
    /// Start on this list instead of the first one the API returns.
    #[serde(default)]
    pub list_id: Option<u64>,
    #[serde(default = "default_timeline_cap")]
    pub max_items: usize,
    #[serde(default = "default_timeline_refresh")]
    pub refresh_minutes: u64,
    #[serde(default = "default_timeline_api_host")]
    pub api_host: String,
    #[serde(default = "default_timeline_link_host")]
    pub link_host: String,
}

fn default_timeline_cap() -> usize {
    50
}

fn default_timeline_refresh() -> u64 {
    1
}

fn default_timeline_api_host() -> String {
    "api.twitter.com".to_string()
}

fn default_timeline_link_host() -> String {
    "twitter.com".to_string()
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            consumer_secret: String::new(),
            access_token: String::new(),
            access_token_secret: String::new(),
            list_id: None,
            max_items: default_timeline_cap(),
            refresh_minutes: default_timeline_refresh(),
            api_host: default_timeline_api_host(),
            link_host: default_timeline_link_host(),
        }
    }
}

impl TimelineConfig {
    pub fn credentials(&self) -> TimelineCredentials {
        TimelineCredentials {
            consumer_key: self.consumer_key.clone(),
            consumer_secret: self.consumer_secret.clone(),
            access_token: self.access_token.clone(),
            access_token_secret: self.access_token_secret.clone(),
        }
    }
}

/// Video column: API key, subscriber identity, caps.
///
/// `max_per_channel` and `max_items` are deliberately independent knobs:
/// how deep to search each subscribed channel versus how much to show.
#[derive(Debug, Clone, Deserialize)]
pub struct VideosConfig {
    #[serde(default)]
    pub api_key: String,
    /// Channel id of the user whose subscriptions are searched.
    #[serde(default)]
    pub subscriber_id: String,
    #[serde(default = "default_videos_per_channel")]
    pub max_per_channel: usize,
    #[serde(default = "default_videos_cap")]
    pub max_items: usize,
    #[serde(default = "default_videos_api_base")]
    pub api_base: String,
    #[serde(default = "default_videos_watch_host")]
    pub watch_host: String,
}

fn default_videos_per_channel() -> usize {
    1
}

fn default_videos_cap() -> usize {
    10
}

fn default_videos_api_base() -> String {
    "www.googleapis.com/youtube/v3".to_string()
}

fn default_videos_watch_host() -> String {
    "www.youtube.com".to_string()
}

impl Default for VideosConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            subscriber_id: String::new(),
            max_per_channel: default_videos_per_channel(),
            max_items: default_videos_cap(),
            api_base: default_videos_api_base(),
            watch_host: default_videos_watch_host(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and apply environment variable
    /// overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading config file {}", path.as_ref().display()))?;
        let mut config = Self::parse(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing config file")
    }

    /// Secrets from the environment take priority over the file.
    pub fn apply_env_overrides(&mut self) {
        let take = |var: &str, field: &mut String| {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    *field = value;
                }
            }
        };
        take("FEEDBOARD_CONSUMER_KEY", &mut self.timeline.consumer_key);
        take("FEEDBOARD_CONSUMER_SECRET", &mut self.timeline.consumer_secret);
        take("FEEDBOARD_ACCESS_TOKEN", &mut self.timeline.access_token);
        take(
            "FEEDBOARD_ACCESS_TOKEN_SECRET",
            &mut self.timeline.access_token_secret,
        );
        take("FEEDBOARD_VIDEO_API_KEY", &mut self.videos.api_key);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.articles.urls.is_empty());
        assert_eq!(config.articles.max_items, 40);
        assert_eq!(config.articles.refresh_minutes, 10);
        assert_eq!(config.timeline.max_items, 50);
        assert_eq!(config.timeline.refresh_minutes, 1);
        assert_eq!(config.videos.max_per_channel, 1);
        assert_eq!(config.videos.max_items, 10);
    }

    #[test]
    fn parses_full_config() {
        let toml = r#"
[articles]
urls = ["https://example.com/a.xml", "https://example.com/b.xml"]
max_items = 20
refresh_minutes = 5

[timeline]
consumer_key = "ck"
consumer_secret = "cs"
access_token = "at"
access_token_secret = "ats"
list_id = 84839422
max_items = 25

[videos]
api_key = "yt-key"
subscriber_id = "UCme"
max_per_channel = 3
max_items = 15
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.articles.urls.len(), 2);
        assert_eq!(config.articles.max_items, 20);
        assert_eq!(config.articles.refresh_minutes, 5);
        assert_eq!(config.timeline.list_id, Some(84839422));
        assert_eq!(config.timeline.credentials().consumer_key, "ck");
        assert_eq!(config.videos.max_per_channel, 3);
        assert_eq!(config.videos.max_items, 15);
        // Unset fields still default.
        assert_eq!(config.timeline.api_host, "api.twitter.com");
        assert_eq!(config.videos.watch_host, "www.youtube.com");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::parse("articles = nonsense [").is_err());
    }
}
