//! Clinical reference query service
//!
//! Wraps the external retrieval backend that answers questions from the
//! clinical nephrology reference library. The backend is opaque: this module
//! only posts free text and receives a synthesized answer plus a count of
//! supporting documents.
//!
//! Outcomes are typed ([`ReferenceOutcome`]) rather than signaled through
//! sentinel substrings, so callers branch on the variant instead of sniffing
//! answer text. A client without a configured backend returns `Unavailable`
//! for every query; runtime failures are captured into `Error` and never
//! propagate.

use crate::config::ReferenceConfig;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

/// Timeout for reference backend calls.
const REFERENCE_TIMEOUT_SECS: u64 = 30;

/// Outcome of a reference query.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceOutcome {
    /// The backend produced an answer backed by `source_count` documents.
    Answer {
        text: String,
        source_count: usize,
    },

    /// No backend is configured or it never initialized.
    Unavailable,

    /// The backend was reachable in principle but the query failed.
    Error(String),
}

impl ReferenceOutcome {
    /// True for answers long enough to stand on their own. Short answers are
    /// treated like misses and sent down the fallback path.
    pub fn is_usable(&self) -> bool {
        matches!(self, ReferenceOutcome::Answer { text, .. } if text.len() > 50)
    }
}

#[derive(Debug, Deserialize)]
struct BackendResponse {
    answer: String,

    #[serde(default)]
    source_count: usize,
}

struct Backend {
    base_url: String,
    top_k: usize,
    client: reqwest::Client,
}

/// Client for the clinical reference backend.
pub struct ReferenceClient {
    backend: Option<Backend>,
}

impl ReferenceClient {
    /// Build a client from configuration. Without a `base_url` the client is
    /// permanently unavailable and every query reports that state.
    pub fn new(config: &ReferenceConfig) -> Self {
        match &config.base_url {
            Some(base_url) => {
                info!("Reference backend configured at {}", base_url);
                Self {
                    backend: Some(Backend {
                        base_url: base_url.trim_end_matches('/').to_string(),
                        top_k: config.top_k,
                        client: reqwest::Client::builder()
                            .timeout(Duration::from_secs(REFERENCE_TIMEOUT_SECS))
                            .build()
                            .unwrap_or_else(|_| reqwest::Client::new()),
                    }),
                }
            }
            None => {
                warn!("No reference backend configured; clinical queries will fall back to web search");
                Self { backend: None }
            }
        }
    }

    /// A client with no backend, for tests and degraded deployments.
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Whether a backend is configured at all.
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Query the reference library.
    ///
    /// On success the answer text carries a citation suffix naming the number
    /// of supporting documents. Never returns an error to the caller; failed
    /// queries come back as [`ReferenceOutcome::Error`].
    pub async fn query(&self, text: &str) -> ReferenceOutcome {
        let backend = match &self.backend {
            Some(backend) => backend,
            None => return ReferenceOutcome::Unavailable,
        };

        let url = format!("{}/query", backend.base_url);
        let payload = serde_json::json!({
            "query": text,
            "top_k": backend.top_k,
        });

        let response = match backend.client.post(&url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Reference query failed: {}", e);
                return ReferenceOutcome::Error(format!("Error querying reference materials: {}", e));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            warn!("Reference backend returned {}", status);
            return ReferenceOutcome::Error(format!(
                "Error querying reference materials: backend returned {}",
                status
            ));
        }

        let parsed: BackendResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Reference response could not be parsed: {}", e);
                return ReferenceOutcome::Error(format!("Error querying reference materials: {}", e));
            }
        };

        let mut answer = parsed.answer;
        if parsed.source_count > 0 {
            info!("Reference query succeeded with {} source documents", parsed.source_count);
            answer.push_str(&format!(
                "\n\n[Citations: Based on {} references from the comprehensive clinical nephrology text]",
                parsed.source_count
            ));
        } else {
            info!("Reference query succeeded with no source documents");
        }

        ReferenceOutcome::Answer {
            text: answer,
            source_count: parsed.source_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_client_is_unavailable() {
        let client = ReferenceClient::disabled();
        assert!(!client.is_available());
        assert_eq!(client.query("any question").await, ReferenceOutcome::Unavailable);
    }

    #[test]
    fn test_usability_requires_length() {
        let short = ReferenceOutcome::Answer {
            text: "Drink water.".to_string(),
            source_count: 3,
        };
        assert!(!short.is_usable());

        let long = ReferenceOutcome::Answer {
            text: "Fluid intake after discharge should be tailored to the patient's \
                   residual kidney function and diuretic regimen."
                .to_string(),
            source_count: 3,
        };
        assert!(long.is_usable());

        assert!(!ReferenceOutcome::Unavailable.is_usable());
        assert!(!ReferenceOutcome::Error("boom".to_string()).is_usable());
    }
}
