mod common;

use veritas_llm::ollama::OllamaClient;
use veritas_llm::traits::{LlmClient, LlmError};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "llama3.1:8b";

async fn mount_tags(server: &MockServer, models: &[&str]) {
    let entries: Vec<serde_json::Value> = models
        .iter()
        .map(|name| serde_json::json!({"name": name}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": entries})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn construction_verifies_server_and_model() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    mount_tags(&server, &[MODEL, "mistral:7b"]).await;

    let client = OllamaClient::new(server.uri(), MODEL.to_string())
        .await
        .unwrap();
    assert_eq!(client.model_name(), MODEL);
    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
async fn unreachable_server_names_the_remedy() {
    common::init_test_tracing();
    let err = OllamaClient::new("http://127.0.0.1:1".to_string(), MODEL.to_string())
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("http://127.0.0.1:1"));
    assert!(msg.contains("ollama serve"));
}

#[tokio::test]
async fn missing_model_asks_for_a_pull() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    mount_tags(&server, &["mistral:7b"]).await;

    let err = OllamaClient::new(server.uri(), MODEL.to_string())
        .await
        .unwrap_err();
    match err {
        LlmError::ModelNotAvailable(msg) => {
            assert!(msg.contains(&format!("ollama pull {MODEL}")));
        }
        other => panic!("expected ModelNotAvailable, got {other:?}"),
    }
}

#[tokio::test]
async fn generate_returns_text_and_token_count() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    mount_tags(&server, &[MODEL]).await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({
            "model": MODEL,
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "Classification: REAL",
            "eval_count": 42
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), MODEL.to_string())
        .await
        .unwrap();
    let resp = client
        .generate("verify this claim", None, None, Some(0.1))
        .await
        .unwrap();
    assert_eq!(resp.text, "Classification: REAL");
    assert_eq!(resp.tokens_used, Some(42));
    assert_eq!(resp.model.as_deref(), Some(MODEL));
}

#[tokio::test]
async fn generate_maps_404_to_missing_model() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    mount_tags(&server, &[MODEL]).await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), MODEL.to_string())
        .await
        .unwrap();
    let err = client
        .generate("verify this claim", None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::ModelNotAvailable(_)));
}

#[tokio::test]
#[ignore]
async fn ollama_generate_smoketest() {
    common::init_test_tracing();
    let base_url =
        std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
    let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| MODEL.to_string());

    let client = OllamaClient::new(base_url, model)
        .await
        .expect("local Ollama should be running for this smoke test");
    let response = client
        .generate("Say Ok", None, Some(8), Some(0.2))
        .await
        .expect("generate should succeed");

    tracing::debug!("Ollama response is: {}", response.text);
    assert!(
        !response.text.trim().is_empty(),
        "response text should not be empty"
    );
}
