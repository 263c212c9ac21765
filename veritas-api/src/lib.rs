//! HTTP API for the Veritas fact-checking service.
//!
//! The routing and handler logic lives in [`http`]; the binary in
//! `main.rs` wires configuration, logging, and provider construction
//! around it.
pub mod http;

pub use http::{build_router, serve, AppState};
