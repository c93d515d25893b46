//! Video-subscription source.
//!
//! Two-step fetch against the video platform's JSON API: list the user's
//! channel subscriptions, then search each subscribed channel for its most
//! recent uploads or livestreams, capped per channel.  The flattened
//! results cross one aggregation like any other source, so the overall
//! display cap is independent of the per-channel cap.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::aggregate::{FeedError, RawItem};
use crate::source::{DataSource, FetchResult};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Which kind of channel activity to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventType {
    #[default]
    Upload,
    Live,
}

impl EventType {
    pub fn toggled(self) -> Self {
        match self {
            EventType::Upload => EventType::Live,
            EventType::Live => EventType::Upload,
        }
    }

    /// The API's query-parameter value, if the kind needs one.
    fn query_value(self) -> Option<&'static str> {
        match self {
            EventType::Upload => None,
            EventType::Live => Some("live"),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Upload => write!(f, "Uploads"),
            EventType::Live => write!(f, "Livestreams"),
        }
    }
}

// -- wire format ------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubscriptionsResponse {
    pub items: Vec<Subscription>,
}

#[derive(Debug, Deserialize)]
pub struct Subscription {
    pub snippet: SubscriptionSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSnippet {
    pub title: String,
    pub resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub channel_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub id: VideoId,
    pub snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoId {
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    pub channel_title: String,
    pub published_at: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize, Default)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

// -- source -----------------------------------------------------------------

/// The video-subscription source.
pub struct VideoSource {
    pub api_key: String,
    /// Channel id of the user whose subscriptions are searched.
    pub subscriber_id: String,
    pub event_type: EventType,
    /// Most-recent-video cap applied per subscribed channel.
    pub max_per_channel: usize,
    /// API base, e.g. `www.googleapis.com/youtube/v3`.
    pub api_base: String,
    /// Hostname used to build watch links, e.g. `www.youtube.com`.
    pub watch_host: String,
    pub label: String,
}

impl VideoSource {
    /// Map one channel's search results onto raw items.
    ///
    /// Pure function; see the tests for the fixture payload shape.
    pub fn map_search_results(response: SearchResponse, watch_host: &str) -> Vec<RawItem> {
        response
            .items
            .into_iter()
            .map(|result| RawItem {
                published: result.snippet.published_at,
                title: result.snippet.title,
                author: result.snippet.channel_title,
                link: format!("https://{}/watch?v={}", watch_host, result.id.video_id),
                summary: None,
                thumbnail: result.snippet.thumbnails.default.map(|t| t.url),
            })
            .collect()
    }
}

impl DataSource for VideoSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn fetch(&self) -> Result<FetchResult, FeedError> {
        let unavailable = |reason: String| FeedError::SourceUnavailable {
            source_name: self.label.clone(),
            reason,
        };

        // The client is scoped to this call: constructed per fetch and
        // dropped as soon as the quota-limited API work is done.
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| unavailable(e.to_string()))?;

        let subs_url = format!(
            "https://{}/subscriptions?part=snippet&channelId={}&maxResults=50&key={}",
            self.api_base, self.subscriber_id, self.api_key
        );
        let subs = client
            .get(&subs_url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(e.to_string()))?
            .json::<SubscriptionsResponse>()
            .map_err(|e| unavailable(e.to_string()))?;

        let mut items = Vec::new();
        for sub in subs.items {
            let mut search_url = format!(
                "https://{}/search?part=snippet&channelId={}&type=video&order=date&maxResults={}&key={}",
                self.api_base,
                sub.snippet.resource_id.channel_id,
                self.max_per_channel,
                self.api_key
            );
            if let Some(event) = self.event_type.query_value() {
                search_url.push_str("&eventType=");
                search_url.push_str(event);
            }

            let results = client
                .get(&search_url)
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(|e| unavailable(format!("{}: {e}", sub.snippet.title)))?
                .json::<SearchResponse>()
                .map_err(|e| unavailable(format!("{}: {e}", sub.snippet.title)))?;

            items.extend(Self::map_search_results(results, &self.watch_host));
        }
        Ok(FetchResult::new(items))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_JSON: &str = r#"{
  "items": [
    {
      "id": { "videoId": "dQw4w9WgXcQ" },
      "snippet": {
        "title": "Newest Video",
        "channelTitle": "Some Channel",
        "publishedAt": "2024-05-01T10:00:00Z",
        "thumbnails": { "default": { "url": "https://img.example.com/v1.jpg" } }
      }
    },
    {
      "id": { "videoId": "abc123def45" },
      "snippet": {
        "title": "Older Video",
        "channelTitle": "Some Channel",
        "publishedAt": "2024-04-01T10:00:00Z",
        "thumbnails": {}
      }
    }
  ]
}"#;

    #[test]
    fn map_search_results_builds_watch_links() {
        let response: SearchResponse = serde_json::from_str(SEARCH_JSON).unwrap();
        let items = VideoSource::map_search_results(response, "www.youtube.com");

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].link, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(items[0].title, "Newest Video");
        assert_eq!(items[0].author, "Some Channel");
        assert_eq!(items[0].published, "2024-05-01T10:00:00Z");
        assert_eq!(
            items[0].thumbnail.as_deref(),
            Some("https://img.example.com/v1.jpg")
        );
        assert!(items[1].thumbnail.is_none());
    }

    #[test]
    fn subscriptions_payload_deserializes() {
        let json = r#"{
  "items": [
    { "snippet": { "title": "Some Channel",
                   "resourceId": { "channelId": "UCabc" } } }
  ]
}"#;
        let subs: SubscriptionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(subs.items.len(), 1);
        assert_eq!(subs.items[0].snippet.title, "Some Channel");
        assert_eq!(subs.items[0].snippet.resource_id.channel_id, "UCabc");
    }

    #[test]
    fn event_type_toggles_between_uploads_and_live() {
        assert_eq!(EventType::Upload.toggled(), EventType::Live);
        assert_eq!(EventType::Live.toggled(), EventType::Upload);
    }

    #[test]
    fn only_livestream_search_carries_an_event_type() {
        assert_eq!(EventType::Upload.query_value(), None);
        assert_eq!(EventType::Live.query_value(), Some("live"));
    }

    #[test]
    fn event_type_labels() {
        assert_eq!(EventType::Upload.to_string(), "Uploads");
        assert_eq!(EventType::Live.to_string(), "Livestreams");
    }
}
