//! Row models for the church media database.
//!
//! Column names follow the hosted schema, which mixes camelCase and
//! snake_case across tables, so each field is renamed explicitly.

use serde::{Deserialize, Serialize};

use crate::route;

/// Sentinel stored in `youtube_url` when a song has no video.
const EMPTY_VIDEO: &str = "emptyUrl";

/// A song from the `songsList` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    #[serde(rename = "songTitle")]
    pub title: String,

    /// Google Slides presentation holding the lyrics. Either a full
    /// docs.google.com URL or a bare file id.
    #[serde(rename = "lyricsUrl")]
    pub lyrics_url: Option<String>,

    /// YouTube video id (not a URL).
    #[serde(rename = "youtube_url")]
    pub video_id: Option<String>,

    /// Playback window within the video, in seconds.
    #[serde(rename = "startAt")]
    pub start_at: Option<u32>,
    #[serde(rename = "endAt")]
    pub end_at: Option<u32>,

    #[serde(rename = "copyRight")]
    pub copyright: Option<String>,

    #[serde(rename = "new_song", default)]
    pub is_new: bool,
}

impl Song {
    /// Route fragment for this song's player view.
    pub fn href(&self) -> String {
        route::fragment("song-player", &[("title", &self.title)])
    }

    fn video_id(&self) -> Option<&str> {
        match self.video_id.as_deref() {
            Some(id) if !id.trim().is_empty() && id != EMPTY_VIDEO => Some(id.trim()),
            _ => None,
        }
    }

    /// Embeddable lyrics presentation URL, if the song has slides.
    pub fn slide_embed_url(&self) -> Option<String> {
        let raw = self.lyrics_url.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }

        // Accept either a share URL with a /d/<id> segment or a bare id.
        let file_id = if raw.contains("docs.google.com") {
            let rest = raw.split("/d/").nth(1)?;
            rest.split(|c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '_')
                .next()
                .filter(|id| !id.is_empty())?
        } else {
            raw
        };

        Some(format!(
            "https://docs.google.com/presentation/d/{}/embed?rm=minimal&start=false&loop=false",
            file_id
        ))
    }

    /// Embeddable video URL with the song's playback window applied.
    pub fn video_embed_url(&self) -> Option<String> {
        let id = self.video_id()?;
        let mut url = format!(
            "https://www.youtube.com/embed/{}?start={}",
            id,
            self.start_at.unwrap_or(0)
        );
        if let Some(end) = self.end_at {
            url.push_str(&format!("&end={}", end));
        }
        url.push_str("&autoplay=1");
        Some(url)
    }

    /// Watch URL for opening the video outside the app.
    pub fn video_watch_url(&self) -> Option<String> {
        let id = self.video_id()?;
        let mut url = format!("https://www.youtube.com/watch?v={}", id);
        if let Some(start) = self.start_at.filter(|s| *s > 0) {
            url.push_str(&format!("&t={}s", start));
        }
        Some(url)
    }
}

/// A sermon recording from the `sermonList` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sermon {
    pub title: String,
    pub speaker: Option<String>,
    pub date: Option<String>,

    /// Episode slug on the podcast host, used to locate the audio.
    #[serde(rename = "permalink_url")]
    pub slug: Option<String>,

    /// Tag linking the sermon to its series.
    #[serde(rename = "episode_tag")]
    pub series_tag: Option<String>,

    /// Bible passage reference, e.g. "John 3:1-16".
    #[serde(rename = "full_ref")]
    pub passage: Option<String>,
}

impl Sermon {
    pub fn speaker_or_unknown(&self) -> &str {
        self.speaker.as_deref().unwrap_or("Unknown Speaker")
    }

    /// Episode page on the podcast host, for playing outside the app.
    pub fn external_url(&self) -> Option<String> {
        let slug = self.slug.as_deref().filter(|s| !s.is_empty())?;
        Some(format!("https://pecharchive.podbean.com/e/{}", slug))
    }
}

/// A preaching series, from `bookSeries` or `topicSeries`.
///
/// The two tables disagree on the tag column's case, so both spellings
/// are accepted via an alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(rename = "seriesTitle")]
    pub title: String,

    #[serde(rename = "series_tag", alias = "SeriesTag")]
    pub tag: Option<String>,

    #[serde(rename = "dateFrom")]
    pub date_from: Option<String>,
    #[serde(rename = "dateTo")]
    pub date_to: Option<String>,

    /// Marks the series currently being preached.
    #[serde(default)]
    pub current: bool,

    #[serde(default)]
    pub sequence: Option<i32>,
}

impl Series {
    /// Route fragment for this series' details view.
    pub fn href(&self, kind: &str) -> String {
        route::fragment(
            "series-details",
            &[
                ("title", &self.title),
                ("type", kind),
                ("tag", self.tag.as_deref().unwrap_or("")),
            ],
        )
    }

    /// "2023-01 - 2023-06" style date range, or empty when unknown.
    pub fn date_range(&self) -> String {
        match (self.date_from.as_deref(), self.date_to.as_deref()) {
            (Some(from), Some(to)) => format!("{} - {}", from, to),
            (Some(from), None) => from.to_string(),
            _ => String::new(),
        }
    }
}

/// A row from the `speakerNames` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Speaker {
    #[serde(rename = "speaker")]
    pub name: String,
}
