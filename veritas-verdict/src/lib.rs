//! The fact-checking pipeline: prompt construction, output normalization,
//! and the orchestrator that ties retrieval and reasoning together.
//!
//! - [`prompt`]: formats a claim and its evidence into the reasoning prompt
//! - [`normalize`]: parses free-text model output into a structured verdict
//! - [`checker`]: sequences the stages and owns the error taxonomy
//!
//! # Examples
//!
//! ```rust
//! use veritas_verdict::normalize::normalize;
//!
//! let raw = "Classification: FAKE\nReasoning: Contradicted by [1].\nEvidence: [\"https://a.com\"]";
//! let verdict = normalize(raw);
//! assert_eq!(verdict.classification.as_str(), "fake");
//! assert_eq!(verdict.evidence, vec!["https://a.com"]);
//! ```
pub mod checker;
pub mod normalize;
pub mod prompt;

pub use checker::{FactCheckError, FactChecker};
pub use normalize::NormalizedVerdict;
