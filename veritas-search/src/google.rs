//! Client for the Google Custom Search JSON API (web vertical).

use std::borrow::Cow;
use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use veritas_common::{EvidenceRecord, SearchConfig};
use veritas_http::{Auth, HttpClient, RequestOpts};

use crate::{SearchError, SearchProvider};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

// The API rejects num outside 1..=10.
const MAX_PAGE_SIZE: usize = 10;

/// Response shape for `GET /customsearch/v1`.
///
/// Only the fields we consume are modelled. A response without `items`
/// is how the API reports zero hits.
#[derive(Debug, Clone, Deserialize)]
pub struct CseResponse {
    #[serde(default)]
    pub items: Vec<CseItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CseItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Clone, Debug)]
pub struct GoogleSearchClient {
    http: HttpClient,
    api_key: String,
    engine_id: String,
}

impl GoogleSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Construct against a non-default endpoint (mock servers in tests).
    pub fn with_base_url(config: &SearchConfig, base_url: &str) -> Result<Self, SearchError> {
        let mut missing = Vec::new();
        if config.api_key.trim().is_empty() {
            missing.push("GOOGLE_API_KEY");
        }
        if config.engine_id.trim().is_empty() {
            missing.push("GOOGLE_CSE_ID");
        }
        if !missing.is_empty() {
            return Err(SearchError::Credentials(format!(
                "Missing Google Custom Search credentials: {}. \
                 Set them in your environment or .env file.",
                missing.join(", ")
            )));
        }

        let http = HttpClient::new(base_url)?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            engine_id: config.engine_id.clone(),
        })
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchClient {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<EvidenceRecord>, SearchError> {
        let num = limit.clamp(1, MAX_PAGE_SIZE);
        let query_snippet = if query.chars().count() > 160 {
            format!("{}...", query.chars().take(160).collect::<String>())
        } else {
            query.to_string()
        };
        let started = Instant::now();
        tracing::info!(
            target: "search.google",
            query = %query_snippet,
            num,
            "google.search.start"
        );

        let num_str = num.to_string();
        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("q", Cow::Borrowed(query)),
            ("cx", Cow::Borrowed(self.engine_id.as_str())),
            ("num", Cow::Owned(num_str)),
        ];

        let resp: CseResponse = match self
            .http
            .get_json(
                "customsearch/v1",
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "key",
                        value: Cow::Borrowed(self.api_key.as_str()),
                    }),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(
                    target: "search.google",
                    query = %query_snippet,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "google.search.error"
                );
                return Err(e.into());
            }
        };

        let records: Vec<EvidenceRecord> = resp
            .items
            .into_iter()
            .map(|item| EvidenceRecord {
                title: item.title.unwrap_or_default(),
                url: item.link.unwrap_or_default(),
                snippet: item.snippet.unwrap_or_default(),
            })
            .collect();

        tracing::info!(
            target: "search.google",
            query = %query_snippet,
            hit_count = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "google.search.success"
        );
        Ok(records)
    }

    fn provider_name(&self) -> &str {
        "google-cse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SearchConfig {
        SearchConfig {
            api_key: "k".to_string(),
            engine_id: "cx".to_string(),
            result_limit: 5,
        }
    }

    #[test]
    fn construction_requires_credentials() {
        let cfg = SearchConfig {
            api_key: String::new(),
            engine_id: String::new(),
            result_limit: 5,
        };
        let err = GoogleSearchClient::new(&cfg).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("GOOGLE_API_KEY"));
        assert!(msg.contains("GOOGLE_CSE_ID"));
    }

    #[test]
    fn blank_engine_id_is_reported_alone() {
        let cfg = SearchConfig {
            api_key: "k".to_string(),
            engine_id: "  ".to_string(),
            result_limit: 5,
        };
        let err = GoogleSearchClient::new(&cfg).unwrap_err();
        let msg = err.to_string();
        assert!(!msg.contains("GOOGLE_API_KEY"));
        assert!(msg.contains("GOOGLE_CSE_ID"));
    }

    #[test]
    fn valid_credentials_construct() {
        assert!(GoogleSearchClient::new(&config()).is_ok());
    }
}
