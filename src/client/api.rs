//! HTTP client for the church media database (PostgREST API).

use reqwest::Client;
use thiserror::Error;

use super::models::*;

/// Data client errors.
#[derive(Debug, Error)]
pub enum DataClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status} for {table}")]
    Status { table: String, status: u16 },

    #[error("Invalid response for {table}: {message}")]
    InvalidResponse { table: String, message: String },
}

/// Client for the hosted media catalog.
///
/// Every table is read through `GET /rest/v1/<table>` with PostgREST
/// query operators; the anon key rides along as both the `apikey`
/// header and a bearer token.
#[derive(Debug, Clone)]
pub struct ChurchClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ChurchClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Build the URL for a table query.
    fn build_url(&self, table: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}/rest/v1/{}", self.base_url, table);

        let mut query_parts: Vec<String> = vec![String::from("select=*")];
        for (key, value) in params {
            query_parts.push(format!("{}={}", key, urlencoding::encode(value)));
        }

        url.push('?');
        url.push_str(&query_parts.join("&"));
        url
    }

    /// Fetch all rows a table query returns.
    async fn rows<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, DataClientError> {
        let url = self.build_url(table, params);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataClientError::Status {
                table: table.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            let body: String = text.chars().take(500).collect();
            DataClientError::InvalidResponse {
                table: table.to_string(),
                message: format!("{}. Body: {}", e, body),
            }
        })
    }

    // =========================================================================
    // Songs
    // =========================================================================

    /// All songs, ordered by title.
    pub async fn songs(&self) -> Result<Vec<Song>, DataClientError> {
        self.rows("songsList", &[("order", "songTitle.asc")]).await
    }

    // =========================================================================
    // Sermons
    // =========================================================================

    /// Most recent sermons, newest first.
    pub async fn recent_sermons(&self, limit: u32) -> Result<Vec<Sermon>, DataClientError> {
        let limit_str = limit.to_string();
        self.rows(
            "sermonList",
            &[("order", "date.desc"), ("limit", &limit_str)],
        )
        .await
    }

    /// Sermons belonging to a series, newest first.
    pub async fn sermons_by_series(&self, tag: &str) -> Result<Vec<Sermon>, DataClientError> {
        if tag.is_empty() {
            return Ok(Vec::new());
        }
        self.rows(
            "sermonList",
            &[
                ("episode_tag", &format!("eq.{}", tag)),
                ("order", "publish_time.desc"),
            ],
        )
        .await
    }

    /// Search sermons by any combination of title, passage reference, and
    /// speaker. Empty criteria are skipped; results come back newest first.
    pub async fn search_sermons(
        &self,
        title: &str,
        passage: &str,
        speaker: &str,
    ) -> Result<Vec<Sermon>, DataClientError> {
        let title_op;
        let passage_op;
        let speaker_op;

        let mut params: Vec<(&str, &str)> = Vec::new();
        if !title.is_empty() {
            title_op = format!("ilike.*{}*", title);
            params.push(("title", &title_op));
        }
        if !passage.is_empty() {
            passage_op = format!("ilike.*{}*", passage);
            params.push(("full_ref", &passage_op));
        }
        if !speaker.is_empty() {
            speaker_op = format!("eq.{}", speaker);
            params.push(("speaker", &speaker_op));
        }
        params.push(("order", "date.desc"));

        self.rows("sermonList", &params).await
    }

    /// Distinct speaker names, alphabetical.
    pub async fn speakers(&self) -> Result<Vec<Speaker>, DataClientError> {
        self.rows("speakerNames", &[("order", "speaker.asc")]).await
    }

    // =========================================================================
    // Series
    // =========================================================================

    /// Book (expository) series in preaching order.
    pub async fn book_series(&self) -> Result<Vec<Series>, DataClientError> {
        self.rows("bookSeries", &[("order", "sequence.asc")]).await
    }

    /// Topical series in preaching order.
    pub async fn topic_series(&self) -> Result<Vec<Series>, DataClientError> {
        self.rows("topicSeries", &[("order", "sequence.asc")]).await
    }

    /// Series flagged as currently being preached.
    pub async fn current_series(&self) -> Result<Vec<Series>, DataClientError> {
        self.rows(
            "bookSeries",
            &[("current", "eq.true"), ("order", "sequence.asc")],
        )
        .await
    }
}
