use std::sync::Arc;

use veritas_common::FactCheckResult;
use veritas_llm::traits::{LlmClient, LlmError};
use veritas_search::{SearchError, SearchProvider};

use crate::{normalize, prompt};

/// Terminal failure of one fact-check request. No stage is retried and no
/// partial result is returned on any of these paths.
#[derive(thiserror::Error, Debug)]
pub enum FactCheckError {
    #[error("Claim must not be empty.")]
    EmptyClaim,

    #[error("{0}")]
    Retrieval(#[from] SearchError),

    #[error("{0}")]
    Reasoning(#[from] LlmError),
}

/// Sequences retrieval, prompt building, model reasoning, and output
/// normalization for one claim.
///
/// Both provider handles are resolved once at process start and injected,
/// so the checker holds no per-request mutable state and one instance is
/// shared across concurrent requests.
pub struct FactChecker {
    search: Arc<dyn SearchProvider>,
    llm: Arc<dyn LlmClient + Send + Sync>,
    result_limit: usize,
    temperature: f32,
}

impl FactChecker {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        llm: Arc<dyn LlmClient + Send + Sync>,
        result_limit: usize,
        temperature: f32,
    ) -> Self {
        Self {
            search,
            llm,
            result_limit,
            temperature,
        }
    }

    /// Run the full pipeline for one claim.
    ///
    /// An empty or whitespace-only claim fails before any external call.
    /// Each stage must complete before the next starts; the first failure
    /// is terminal for the request.
    pub async fn check(&self, claim: &str) -> Result<FactCheckResult, FactCheckError> {
        let claim = claim.trim();
        if claim.is_empty() {
            return Err(FactCheckError::EmptyClaim);
        }

        tracing::info!(
            target: "verdict.check",
            stage = "retrieving",
            claim = %claim,
            "verifying claim"
        );
        let evidence = self.search.search(claim, self.result_limit).await?;

        tracing::info!(
            target: "verdict.check",
            stage = "reasoning",
            hit_count = evidence.len(),
            model = self.llm.model_name(),
            "evidence retrieved, asking the model"
        );
        let final_prompt = prompt::build(claim, &evidence);
        tracing::debug!(
            target: "verdict.check",
            prompt_chars = final_prompt.len(),
            "prompt built"
        );

        let started = std::time::Instant::now();
        let response = self
            .llm
            .generate(&final_prompt, None, None, Some(self.temperature))
            .await?;
        tracing::debug!(
            target: "verdict.check",
            elapsed_ms = started.elapsed().as_millis() as u64,
            "model responded"
        );
        let raw = response.text.trim().to_string();
        if raw.is_empty() {
            return Err(FactCheckError::Reasoning(LlmError::EmptyResponse));
        }

        let verdict = normalize::normalize(&raw);
        tracing::info!(
            target: "verdict.check",
            stage = "done",
            classification = %verdict.classification,
            evidence_urls = verdict.evidence.len(),
            "fact-check complete"
        );

        Ok(FactCheckResult {
            classification: verdict.classification,
            reasoning: verdict.reasoning,
            evidence: verdict.evidence,
            raw,
        })
    }
}
