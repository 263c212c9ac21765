//! Provider-agnostic LLM integration for Veritas.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and concrete
//! provider implementations for Ollama and Gemini. It also provides a
//! convenience function to initialize a ready client from a
//! [`veritas_common::LlmConfig`].
//!
//! # Examples
//! ```no_run
//! use veritas_common::LlmConfig;
//! use veritas_llm::init_llm;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), veritas_llm::traits::LlmError> {
//! let cfg = LlmConfig::default();
//! let client = init_llm(&cfg).await?;
//! assert!(!client.model_name().is_empty());
//! # Ok(())
//! # }
//! ```
#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "ollama")]
pub mod ollama;
pub mod traits;

#[cfg(feature = "gemini")]
use gemini::GeminiClient;
#[cfg(feature = "ollama")]
use ollama::OllamaClient;
use std::sync::Arc;
use traits::{LlmClient, LlmError};
use veritas_common::LlmConfig;

pub use veritas_common::{DEFAULT_GEMINI_MODEL, DEFAULT_OLLAMA_MODEL};

/// Build a ready-to-use client for the configured provider.
///
/// Readiness is verified up front: the Ollama path probes the server and
/// checks the model is pulled, so a misconfigured deployment fails at
/// startup instead of on the first claim.
pub async fn init_llm(
    config: &LlmConfig,
) -> Result<Arc<dyn LlmClient + Send + Sync + 'static>, LlmError> {
    match config {
        #[cfg(feature = "ollama")]
        LlmConfig::Ollama {
            base_url, model, ..
        } => {
            let client = OllamaClient::new(base_url.clone(), model.clone()).await?;
            Ok(Arc::new(client))
        }
        #[cfg(feature = "gemini")]
        LlmConfig::Gemini { api_key, model, .. } => {
            let client = GeminiClient::new(api_key.clone(), model.clone())?;
            Ok(Arc::new(client))
        }
        LlmConfig::None => Err(LlmError::Config("No LLM configured".to_string())),
        #[allow(unreachable_patterns)]
        _ => Err(LlmError::Config("LLM provider not enabled".to_string())),
    }
}
