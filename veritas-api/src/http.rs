//! HTTP surface for the fact-checking service.
//!
//! Each endpoint has a thin axum handler that delegates to an inner
//! function. The inner functions return `(StatusCode, serde_json::Value)`
//! and are directly testable without axum dispatch machinery.
//!
//! Endpoints:
//! - POST /fact-check — run the full retrieve-and-reason pipeline
//! - GET  /health     — reasoning-provider probe plus model name
//! - GET  /version    — service version info

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;
use veritas_llm::traits::LlmClient;
use veritas_verdict::FactChecker;

/// Shared state for all HTTP handlers.
///
/// Both handles are built once at startup and never mutated afterwards, so
/// concurrent requests share them without locking.
#[derive(Clone)]
pub struct AppState {
    pub checker: Arc<FactChecker>,
    pub llm: Arc<dyn LlmClient + Send + Sync>,
}

#[derive(Debug, Deserialize)]
pub struct FactCheckRequest {
    pub claim: String,
}

/// Build the axum router with all endpoints.
pub fn build_router(state: AppState, allowed_origin: &str) -> Router {
    Router::new()
        .route("/fact-check", post(fact_check_handler))
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .layer(cors_layer(allowed_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for the browser frontend.
///
/// A concrete origin gets credentials plus an explicit method/header list;
/// `*` means any origin, which the CORS spec does not allow to carry
/// credentials. An unparseable origin falls back to the permissive form.
pub fn cors_layer(allowed_origin: &str) -> CorsLayer {
    if allowed_origin == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]),
        Err(_) => {
            tracing::warn!(
                target: "api.cors",
                origin = %allowed_origin,
                "allowed origin is not a valid header value, allowing any origin"
            );
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Serve the API until ctrl-c.
pub async fn serve(
    state: AppState,
    host: &str,
    port: u16,
    allowed_origin: &str,
) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let app = build_router(state, allowed_origin);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(target: "api", %addr, "veritas API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!(target: "api", "shutdown signal received");
}

/// Inner fact-check: runs the pipeline and maps every failure to a
/// 500 with a human-readable `detail` string.
pub async fn fact_check_inner(
    checker: &FactChecker,
    req: FactCheckRequest,
) -> (StatusCode, serde_json::Value) {
    let request_id = Uuid::new_v4();
    let started = Instant::now();
    tracing::info!(
        target: "api.fact_check",
        %request_id,
        claim_chars = req.claim.chars().count(),
        "request.start"
    );

    match checker.check(&req.claim).await {
        Ok(result) => {
            tracing::info!(
                target: "api.fact_check",
                %request_id,
                classification = %result.classification,
                evidence_count = result.evidence.len(),
                took_ms = started.elapsed().as_millis() as u64,
                "request.done"
            );
            (
                StatusCode::OK,
                serde_json::json!({
                    "classification": result.classification,
                    "reasoning": result.reasoning,
                    "evidence": result.evidence,
                    "raw": result.raw,
                }),
            )
        }
        Err(e) => {
            tracing::warn!(
                target: "api.fact_check",
                %request_id,
                error = %e,
                took_ms = started.elapsed().as_millis() as u64,
                "request.failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "detail": e.to_string() }),
            )
        }
    }
}

/// Inner health check: probes the reasoning provider.
pub async fn health_inner(
    llm: &Arc<dyn LlmClient + Send + Sync>,
) -> (StatusCode, serde_json::Value) {
    match llm.health_check().await {
        Ok(true) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "model": llm.model_name(),
            }),
        ),
        Ok(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "model": llm.model_name(),
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "model": llm.model_name(),
                "detail": e.to_string(),
            }),
        ),
    }
}

/// Inner version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "service": "veritas",
        "version": env!("CARGO_PKG_VERSION"),
    })
}

async fn fact_check_handler(
    State(state): State<AppState>,
    Json(req): Json<FactCheckRequest>,
) -> impl IntoResponse {
    let (status, body) = fact_check_inner(&state.checker, req).await;
    (status, Json(body))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (status, body) = health_inner(&state.llm).await;
    (status, Json(body))
}

async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use veritas_common::EvidenceRecord;
    use veritas_llm::traits::{LlmError, LlmResponse};
    use veritas_search::{SearchError, SearchProvider};

    struct StaticSearch(Vec<EvidenceRecord>);

    #[async_trait]
    impl SearchProvider for StaticSearch {
        async fn search(
            &self,
            _query: &str,
            limit: usize,
        ) -> Result<Vec<EvidenceRecord>, SearchError> {
            Ok(self.0.iter().take(limit).cloned().collect())
        }

        fn provider_name(&self) -> &str {
            "static"
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(
            &self,
            _query: &str,
            _limit: usize,
        ) -> Result<Vec<EvidenceRecord>, SearchError> {
            Err(SearchError::Credentials(
                "Missing Google Custom Search credentials: GOOGLE_API_KEY. \
                 Set them in your environment or .env file."
                    .to_string(),
            ))
        }

        fn provider_name(&self) -> &str {
            "failing"
        }
    }

    struct ScriptedLlm {
        reply: &'static str,
        healthy: bool,
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn generate(
            &self,
            _prompt: &str,
            _system_prompt: Option<&str>,
            _max_tokens: Option<u32>,
            _temperature: Option<f32>,
        ) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse {
                text: self.reply.to_string(),
                model: Some("stub-model".to_string()),
                tokens_used: None,
            })
        }

        async fn health_check(&self) -> Result<bool, LlmError> {
            Ok(self.healthy)
        }

        fn model_name(&self) -> &str {
            "stub-model"
        }
    }

    const REPLY: &str = "Classification: REAL\nReasoning: Corroborated [1].\nEvidence: [\"https://a.com/x\"]";

    fn records() -> Vec<EvidenceRecord> {
        vec![EvidenceRecord {
            title: "First source".to_string(),
            url: "https://a.com/x".to_string(),
            snippet: "alpha".to_string(),
        }]
    }

    fn state_with(
        search: Arc<dyn SearchProvider>,
        llm: Arc<dyn LlmClient + Send + Sync>,
    ) -> AppState {
        AppState {
            checker: Arc::new(FactChecker::new(search, llm.clone(), 5, 0.1)),
            llm,
        }
    }

    fn healthy_state() -> AppState {
        state_with(
            Arc::new(StaticSearch(records())),
            Arc::new(ScriptedLlm {
                reply: REPLY,
                healthy: true,
            }),
        )
    }

    #[tokio::test]
    async fn fact_check_inner_returns_the_verdict_shape() {
        let state = healthy_state();
        let (status, body) = fact_check_inner(
            &state.checker,
            FactCheckRequest {
                claim: "The event happened".to_string(),
            },
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["classification"], "real");
        assert_eq!(body["reasoning"], "Corroborated [1].");
        assert_eq!(body["evidence"][0], "https://a.com/x");
        assert_eq!(body["raw"], REPLY);
    }

    #[tokio::test]
    async fn empty_claim_maps_to_500_with_detail() {
        let state = healthy_state();
        let (status, body) = fact_check_inner(
            &state.checker,
            FactCheckRequest {
                claim: "   ".to_string(),
            },
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Claim must not be empty.");
    }

    #[tokio::test]
    async fn retrieval_failure_maps_to_500_with_detail() {
        let state = state_with(
            Arc::new(FailingSearch),
            Arc::new(ScriptedLlm {
                reply: REPLY,
                healthy: true,
            }),
        );
        let (status, body) = fact_check_inner(
            &state.checker,
            FactCheckRequest {
                claim: "The event happened".to_string(),
            },
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("GOOGLE_API_KEY"));
    }

    #[tokio::test]
    async fn health_inner_reports_the_model_name() {
        let state = healthy_state();
        let (status, body) = health_inner(&state.llm).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"], "stub-model");
    }

    #[tokio::test]
    async fn health_inner_maps_probe_failure_to_503() {
        let state = state_with(
            Arc::new(StaticSearch(records())),
            Arc::new(ScriptedLlm {
                reply: REPLY,
                healthy: false,
            }),
        );
        let (status, body) = health_inner(&state.llm).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
    }

    #[test]
    fn version_inner_is_pure() {
        let v = version_inner();
        assert_eq!(v["service"], "veritas");
        assert!(v["version"].is_string());
    }

    #[tokio::test]
    async fn router_serves_fact_check_posts() {
        let app = build_router(healthy_state(), "http://localhost:5173");
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/fact-check")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"claim":"The event happened"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn router_rejects_unknown_routes_and_wrong_methods() {
        let app = build_router(healthy_state(), "*");
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/fact-check")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
