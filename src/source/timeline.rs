//! Social-media list timeline source.
//!
//! Talks to the social API's v1.1-style JSON endpoints: one call to
//! enumerate the user's lists (for the list selector) and one call per
//! refresh to pull the selected list's timeline.  Credentials are four
//! opaque secret strings supplied by the caller through
//! [`TimelineCredentials`]; nothing here is module state.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::aggregate::{FeedError, RawItem};
use crate::source::{DataSource, FetchResult};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// The four opaque secrets the social API wants.
#[derive(Debug, Clone, Default)]
pub struct TimelineCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl TimelineCredentials {
    /// Build the Authorization header value for one request.
    fn auth_header(&self) -> String {
        format!(
            "OAuth oauth_consumer_key=\"{}\", oauth_consumer_secret=\"{}\", \
             oauth_token=\"{}\", oauth_token_secret=\"{}\"",
            self.consumer_key, self.consumer_secret, self.access_token, self.access_token_secret
        )
    }
}

/// One of the user's lists, as shown in the list selector.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TimelineList {
    pub id: u64,
    pub name: String,
}

// -- wire format ------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct Post {
    pub id_str: String,
    pub text: String,
    pub created_at: String,
    pub user: PostUser,
}

#[derive(Debug, Deserialize)]
pub struct PostUser {
    /// Display name ("Jane Doe").
    pub name: String,
    /// Handle without the leading @.
    pub screen_name: String,
    pub profile_image_url_https: Option<String>,
}

// -- source -----------------------------------------------------------------

/// The social timeline source for one selected list.
pub struct TimelineSource {
    pub creds: TimelineCredentials,
    /// Selected list, or `None` when no list is available yet.
    pub list_id: Option<u64>,
    /// How many posts to request from the API per refresh.
    pub count: usize,
    /// API hostname, e.g. `api.twitter.com`.
    pub api_host: String,
    /// Hostname used to build outbound post links, e.g. `twitter.com`.
    pub link_host: String,
    pub label: String,
}

impl TimelineSource {
    /// Map timeline posts onto raw items.
    ///
    /// Per the dashboard convention the post author's display name is the
    /// headline and the body text is the excerpt.  Links are rebuilt as
    /// `https://<host>/<screen_name>/status/<id>`.
    pub fn map_posts(posts: Vec<Post>, link_host: &str) -> Vec<RawItem> {
        posts
            .into_iter()
            .map(|post| RawItem {
                published: post.created_at,
                title: post.user.name,
                author: format!("@{}", post.user.screen_name),
                link: format!(
                    "https://{}/{}/status/{}",
                    link_host, post.user.screen_name, post.id_str
                ),
                summary: Some(post.text),
                thumbnail: post.user.profile_image_url_https,
            })
            .collect()
    }

    /// Enumerate the user's lists for the list-selector control.
    pub fn fetch_lists(
        creds: &TimelineCredentials,
        api_host: &str,
    ) -> Result<Vec<TimelineList>, FeedError> {
        let unavailable = |reason: String| FeedError::SourceUnavailable {
            source_name: "Timeline lists".to_string(),
            reason,
        };

        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| unavailable(e.to_string()))?;

        let url = format!("https://{api_host}/1.1/lists/list.json");
        client
            .get(&url)
            .header("Authorization", creds.auth_header())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(e.to_string()))?
            .json::<Vec<TimelineList>>()
            .map_err(|e| unavailable(e.to_string()))
    }
}

impl DataSource for TimelineSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn fetch(&self) -> Result<FetchResult, FeedError> {
        let unavailable = |reason: String| FeedError::SourceUnavailable {
            source_name: self.label.clone(),
            reason,
        };

        let list_id = self
            .list_id
            .ok_or_else(|| unavailable("no list selected".to_string()))?;

        // Client lives only for this one fetch cycle.
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| unavailable(e.to_string()))?;

        let url = format!(
            "https://{}/1.1/lists/statuses.json?list_id={}&count={}",
            self.api_host, list_id, self.count
        );
        let posts = client
            .get(&url)
            .header("Authorization", self.creds.auth_header())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(e.to_string()))?
            .json::<Vec<Post>>()
            .map_err(|e| unavailable(e.to_string()))?;

        Ok(FetchResult::new(Self::map_posts(posts, &self.link_host)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TIMELINE_JSON: &str = r#"[
  {
    "id_str": "1050118621198921728",
    "text": "First post body",
    "created_at": "Wed Oct 10 20:19:24 +0000 2018",
    "user": {
      "name": "Jane Doe",
      "screen_name": "janedoe",
      "profile_image_url_https": "https://img.example.com/janedoe.png"
    }
  },
  {
    "id_str": "1050118621198921729",
    "text": "Second post body",
    "created_at": "Wed Oct 10 21:00:00 +0000 2018",
    "user": {
      "name": "John Roe",
      "screen_name": "johnroe",
      "profile_image_url_https": null
    }
  }
]"#;

    #[test]
    fn map_posts_builds_status_links() {
        let posts: Vec<Post> = serde_json::from_str(TIMELINE_JSON).unwrap();
        let items = TimelineSource::map_posts(posts, "twitter.com");

        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].link,
            "https://twitter.com/janedoe/status/1050118621198921728"
        );
        assert_eq!(items[0].title, "Jane Doe");
        assert_eq!(items[0].author, "@janedoe");
        assert_eq!(items[0].summary.as_deref(), Some("First post body"));
        assert_eq!(items[0].published, "Wed Oct 10 20:19:24 +0000 2018");
        assert_eq!(
            items[0].thumbnail.as_deref(),
            Some("https://img.example.com/janedoe.png")
        );
        assert!(items[1].thumbnail.is_none());
    }

    #[test]
    fn lists_payload_deserializes() {
        let json = r#"[{"id": 84839422, "name": "Market news"},
                       {"id": 84839423, "name": "Friends"}]"#;
        let lists: Vec<TimelineList> = serde_json::from_str(json).unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].id, 84839422);
        assert_eq!(lists[0].name, "Market news");
    }

    #[test]
    fn fetch_without_selected_list_is_source_unavailable() {
        let src = TimelineSource {
            creds: TimelineCredentials::default(),
            list_id: None,
            count: 50,
            api_host: "api.example.com".to_string(),
            link_host: "example.com".to_string(),
            label: "Timeline".to_string(),
        };
        let err = src.fetch().unwrap_err();
        assert!(matches!(err, FeedError::SourceUnavailable { .. }));
    }

    #[test]
    fn auth_header_carries_all_four_secrets() {
        let creds = TimelineCredentials {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            access_token: "at".into(),
            access_token_secret: "ats".into(),
        };
        let header = creds.auth_header();
        for secret in ["ck", "cs", "at", "ats"] {
            assert!(header.contains(secret));
        }
    }
}
