//! Fallback web search service
//!
//! Issues a single external search call when the clinical reference backend
//! is unavailable or returned nothing usable. Unlike the reference client,
//! errors here propagate as `Result` — the conversation router is the one
//! place that turns them into user-facing apology text.

use crate::config::SearchConfig;
use crate::errors::EngineError;
use std::time::Duration;
use tracing::{debug, info};

/// Timeout for search backend calls.
const SEARCH_TIMEOUT_SECS: u64 = 30;

/// How many related-topic snippets to fold into the result text.
const MAX_RELATED_TOPICS: usize = 3;

/// Client for the instant-answer search endpoint.
pub struct SearchClient {
    base_url: String,
    client: reqwest::Client,
}

impl SearchClient {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Run one search and return raw result text.
    ///
    /// The endpoint speaks the instant-answer JSON shape (`AbstractText`,
    /// `Answer`, `RelatedTopics[].Text`); a non-JSON body is returned as-is.
    pub async fn search(&self, query: &str) -> Result<String, EngineError> {
        info!("Running web search: {}", query);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("format", "json"), ("no_html", "1")])
            .send()
            .await
            .map_err(|e| EngineError::Search(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::Search(format!(
                "search backend returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| EngineError::Search(e.to_string()))?;

        let parsed: serde_json::Value = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) => {
                debug!("Search response was not JSON; returning raw body");
                return Ok(body.trim().to_string());
            }
        };

        Ok(extract_result_text(&parsed))
    }
}

/// Collect the useful text fields out of an instant-answer payload.
fn extract_result_text(value: &serde_json::Value) -> String {
    let mut parts = Vec::new();

    for key in ["AbstractText", "Answer"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        }
    }

    if let Some(topics) = value.get("RelatedTopics").and_then(|v| v.as_array()) {
        for topic in topics.iter().take(MAX_RELATED_TOPICS) {
            if let Some(text) = topic.get("Text").and_then(|v| v.as_str()) {
                if !text.is_empty() {
                    parts.push(text.to_string());
                }
            }
        }
    }

    if parts.is_empty() {
        "No results found.".to_string()
    } else {
        parts.join("\n")
    }
}
