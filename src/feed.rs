//! Podcast feed client.
//!
//! Sermon audio lives on a podcast host; the database only stores each
//! episode's slug. This module fetches the host's RSS feed, parses it,
//! and resolves slugs to playable media URLs. Parsed episodes are cached
//! briefly so repeated lookups don't refetch the feed.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;

const CACHE_MAX_AGE: Duration = Duration::from_secs(5 * 60);

/// Feed client errors.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Feed returned status {0}")]
    Status(u16),

    #[error("Failed to parse feed: {0}")]
    Parse(#[from] quick_xml::DeError),
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    enclosure: Option<Enclosure>,
}

#[derive(Debug, Deserialize)]
struct Enclosure {
    #[serde(rename = "@url")]
    url: String,
}

/// A playable feed episode.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub title: String,
    pub slug: String,
    pub link: String,
    pub media_url: String,
    pub description: String,
}

/// Client for the sermon podcast feed.
pub struct FeedClient {
    client: reqwest::Client,
    feed_url: String,
    cache: Mutex<Option<(Instant, Vec<Episode>)>>,
}

impl FeedClient {
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            feed_url: feed_url.into(),
            cache: Mutex::new(None),
        }
    }

    /// All episodes in the feed, via the cache when it is fresh.
    pub async fn episodes(&self) -> Result<Vec<Episode>, FeedError> {
        if let Some((fetched_at, episodes)) = self.cache.lock().unwrap().as_ref() {
            if fetched_at.elapsed() < CACHE_MAX_AGE {
                return Ok(episodes.clone());
            }
        }

        let response = self.client.get(&self.feed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let xml = response.text().await?;
        let episodes = parse_feed(&xml)?;
        tracing::info!("parsed {} feed episodes", episodes.len());

        *self.cache.lock().unwrap() = Some((Instant::now(), episodes.clone()));
        Ok(episodes)
    }

    /// Look up an episode by its slug.
    ///
    /// Tries an exact slug match first, then a relaxed match that ignores
    /// case and trailing slashes and falls back to substring-of-link.
    pub async fn episode_by_slug(&self, slug: &str) -> Result<Option<Episode>, FeedError> {
        if slug.is_empty() {
            return Ok(None);
        }

        let episodes = self.episodes().await?;
        if let Some(episode) = episodes.iter().find(|ep| ep.slug == slug) {
            return Ok(Some(episode.clone()));
        }

        let clean = slug.trim_end_matches('/').to_lowercase();
        let found = episodes
            .iter()
            .find(|ep| ep.slug.to_lowercase() == clean || ep.link.to_lowercase().contains(&clean))
            .cloned();

        if found.is_none() {
            tracing::warn!("no feed episode for slug {:?}", slug);
        }
        Ok(found)
    }
}

/// Parse an RSS document into episodes. Items without an enclosure are
/// skipped; they have nothing to play.
fn parse_feed(xml: &str) -> Result<Vec<Episode>, FeedError> {
    let rss: Rss = quick_xml::de::from_str(xml)?;

    let episodes = rss
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let media_url = item.enclosure.map(|e| e.url)?;
            let link = item.link.unwrap_or_default();
            Some(Episode {
                title: item.title.unwrap_or_default(),
                slug: slug_from_link(&link),
                link,
                media_url,
                description: strip_html(&item.description.unwrap_or_default()),
            })
        })
        .collect();

    Ok(episodes)
}

/// Extract the episode slug from a link like
/// `https://host.example/e/12-a-profile/`.
fn slug_from_link(link: &str) -> String {
    link.trim_end_matches('/')
        .rsplit_once("/e/")
        .map(|(_, slug)| slug.to_string())
        .unwrap_or_default()
}

/// Flatten an HTML description to plain text for terminal display.
fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Sermon Archive</title>
    <item>
      <title>12 A Profile</title>
      <link>https://pecharchive.podbean.com/e/12-a-profile/</link>
      <description>&lt;p&gt;Part twelve of the series.&lt;/p&gt;</description>
      <enclosure url="https://mcdn.podbean.com/mf/web/abc/12-a-profile.mp3" type="audio/mpeg" length="1234"/>
    </item>
    <item>
      <title>No Audio Yet</title>
      <link>https://pecharchive.podbean.com/e/no-audio/</link>
      <description>Pending upload</description>
    </item>
    <item>
      <title>13 The Sequel</title>
      <link>https://pecharchive.podbean.com/e/13-The-Sequel/</link>
      <description></description>
      <enclosure url="https://mcdn.podbean.com/mf/web/def/13.mp3" type="audio/mpeg" length="99"/>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed_extracts_slug_and_media() {
        let episodes = parse_feed(FEED).unwrap();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].slug, "12-a-profile");
        assert_eq!(
            episodes[0].media_url,
            "https://mcdn.podbean.com/mf/web/abc/12-a-profile.mp3"
        );
        assert_eq!(episodes[0].description, "Part twelve of the series.");
    }

    #[test]
    fn test_parse_feed_skips_items_without_enclosure() {
        let episodes = parse_feed(FEED).unwrap();
        assert!(episodes.iter().all(|ep| ep.slug != "no-audio"));
    }

    #[test]
    fn test_slug_from_link() {
        assert_eq!(
            slug_from_link("https://x.example/e/12-a-profile/"),
            "12-a-profile"
        );
        assert_eq!(slug_from_link("https://x.example/e/12-a-profile"), "12-a-profile");
        assert_eq!(slug_from_link("https://x.example/about"), "");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>Hope &amp; peace</p><br/> for all"),
            "Hope & peace for all"
        );
        assert_eq!(strip_html("plain"), "plain");
    }

    #[tokio::test]
    async fn test_relaxed_slug_match_ignores_case_and_slash() {
        let episodes = parse_feed(FEED).unwrap();
        let client = FeedClient::new("http://unused.invalid/feed.xml");
        *client.cache.lock().unwrap() = Some((Instant::now(), episodes));

        let found = client.episode_by_slug("13-the-sequel/").await.unwrap();
        assert_eq!(found.unwrap().title, "13 The Sequel");

        let missing = client.episode_by_slug("nope").await.unwrap();
        assert!(missing.is_none());
    }
}
