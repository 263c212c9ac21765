//! Evidence retrieval for claim verification.
//!
//! This crate exposes the [`SearchProvider`] trait used by the verdict
//! pipeline and a concrete client for the Google Custom Search JSON API.
//! Providers return plain [`EvidenceRecord`]s; ranking and truncation are
//! the caller's concern.

use async_trait::async_trait;
use thiserror::Error;
use veritas_common::EvidenceRecord;

pub mod google;

pub use google::GoogleSearchClient;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Required credentials were absent or blank.
    #[error("{0}")]
    Credentials(String),
    #[error("search request failed: {0}")]
    Request(#[from] veritas_http::HttpError),
}

/// A source of evidence for a claim.
///
/// Implementations perform one query and hand back results in provider
/// order. An empty result set is a valid answer, not an error.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize)
        -> Result<Vec<EvidenceRecord>, SearchError>;

    /// Short provider label used in logs.
    fn provider_name(&self) -> &str;
}
