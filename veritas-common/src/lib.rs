//! Common types and configuration shared across Veritas crates.
//!
//! This crate defines the verdict data model, provider configuration, and
//! observability helpers used throughout the Veritas workspace. It is
//! intentionally lightweight so that all crates can depend on it without
//! introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`EvidenceRecord`]: One retrieved search result backing a verdict
//! - [`Classification`] and [`FactCheckResult`]: The normalized verdict shape
//! - [`LlmConfig`] and [`SearchConfig`]: Provider configuration
//! - [`observability`]: Centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use veritas_common::{Classification, FactCheckResult};
//!
//! let verdict = FactCheckResult {
//!     classification: Classification::Unknown,
//!     reasoning: "no verdict could be extracted".to_string(),
//!     evidence: vec![],
//!     raw: String::new(),
//! };
//! assert_eq!(verdict.classification.as_str(), "unknown");
//! ```
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod observability;

/// Temperature applied to reasoning calls when none is configured.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Model used for local Ollama reasoning when none is configured.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";

/// Endpoint of a local Ollama server when none is configured.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Gemini model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// One search result retrieved as evidence for a claim.
///
/// Fields the provider omitted are carried as empty strings rather than
/// `Option`, matching the wire shape handed to prompt formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Verdict category extracted from the model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Real,
    Fake,
    Unknown,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Real => "real",
            Classification::Fake => "fake",
            Classification::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized outcome of a completed fact-check.
///
/// `raw` always carries the unmodified model output so callers can audit
/// what the normalizer extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCheckResult {
    pub classification: Classification,
    pub reasoning: String,
    pub evidence: Vec<String>,
    pub raw: String,
}

/// Configuration for an LLM provider.
///
/// Feature flags control which variants are compiled in. See the
/// `veritas-llm` crate for the concrete client implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmConfig {
    #[cfg(feature = "ollama")]
    Ollama {
        base_url: String,
        model: String,
        #[serde(default = "default_temperature")]
        temperature: f32,
    },
    #[cfg(feature = "gemini")]
    Gemini {
        api_key: String,
        model: String,
        #[serde(default = "default_temperature")]
        temperature: f32,
    },
    None,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl LlmConfig {
    /// Sampling temperature for reasoning calls.
    pub fn temperature(&self) -> f32 {
        match self {
            #[cfg(feature = "ollama")]
            LlmConfig::Ollama { temperature, .. } => *temperature,
            #[cfg(feature = "gemini")]
            LlmConfig::Gemini { temperature, .. } => *temperature,
            LlmConfig::None => DEFAULT_TEMPERATURE,
        }
    }

    /// Model identifier for logs, or "none" when no provider is set.
    pub fn model_label(&self) -> &str {
        match self {
            #[cfg(feature = "ollama")]
            LlmConfig::Ollama { model, .. } => model,
            #[cfg(feature = "gemini")]
            LlmConfig::Gemini { model, .. } => model,
            LlmConfig::None => "none",
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        // Default to a local Ollama if the feature is enabled
        #[cfg(feature = "ollama")]
        {
            Self::Ollama {
                base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
                model: DEFAULT_OLLAMA_MODEL.to_string(),
                temperature: DEFAULT_TEMPERATURE,
            }
        }
        #[cfg(not(feature = "ollama"))]
        {
            Self::None
        }
    }
}

/// Credentials and limits for the evidence retrieval provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub api_key: String,
    pub engine_id: String,
    /// Number of results requested per query.
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
}

fn default_result_limit() -> usize {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            engine_id: String::new(),
            result_limit: default_result_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_serializes_lowercase() {
        let json = serde_json::to_string(&Classification::Real).unwrap();
        assert_eq!(json, "\"real\"");
        let back: Classification = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(back, Classification::Unknown);
    }

    #[test]
    fn fact_check_result_wire_shape() {
        let verdict = FactCheckResult {
            classification: Classification::Fake,
            reasoning: "contradicted by [1]".to_string(),
            evidence: vec!["https://example.com/a".to_string()],
            raw: "Classification: FAKE".to_string(),
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["classification"], "fake");
        assert_eq!(json["evidence"][0], "https://example.com/a");
        assert_eq!(json["raw"], "Classification: FAKE");
    }

    #[test]
    fn search_config_defaults_result_limit() {
        let cfg: SearchConfig =
            serde_json::from_str(r#"{"api_key":"k","engine_id":"cx"}"#).unwrap();
        assert_eq!(cfg.result_limit, 5);
    }
}
