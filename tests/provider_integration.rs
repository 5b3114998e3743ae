//! Integration tests for the OpenAI-backed providers
//!
//! Runs the real HTTP clients against a local mock server

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use synergy::core::{
    propose_via_generation, EmbeddingProvider, GenerativeProvider, OpenAiEmbedder,
    OpenAiResponsesClient,
};
use synergy::types::{EngineError, ExclusionSet};

fn client(server: &MockServer) -> OpenAiResponsesClient {
    OpenAiResponsesClient::new(Some("sk-test".to_string())).with_base_url(&server.uri())
}

fn pair_exclusions() -> ExclusionSet {
    ExclusionSet::normalize_list(["car", "road"])
}

#[tokio::test]
async fn test_responses_structured_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "gpt-5-nano", "max_output_tokens": 32})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp_abc",
            "object": "response",
            "status": "completed",
            "output": [
                {"type": "reasoning", "id": "rs_1", "summary": []},
                {"type": "message", "role": "assistant", "content": [
                    {"type": "output_text", "text": "Highway", "annotations": []}
                ]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let word = propose_via_generation(&client(&server), "car", "road", &pair_exclusions()).await;
    assert_eq!(word.unwrap(), "highway");
}

#[tokio::test]
async fn test_responses_error_status_is_no_word() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let raw = client(&server).generate("sys", "user").await.unwrap();
    assert_eq!(raw.status, 500);
    assert!(!raw.is_success());

    let word = propose_via_generation(&client(&server), "car", "road", &pair_exclusions()).await;
    assert!(word.is_none());
}

#[tokio::test]
async fn test_responses_timeout_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"output_text": "lane"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let slow = OpenAiResponsesClient::with_model(
        Some("sk-test".to_string()),
        "gpt-5-nano",
        Duration::from_millis(200),
    )
    .with_base_url(&server.uri());

    let err = slow.generate("sys", "user").await.unwrap_err();
    assert!(matches!(err, EngineError::ProviderError { .. }));
    assert!(propose_via_generation(&slow, "car", "road", &pair_exclusions()).await.is_none());
}

#[tokio::test]
async fn test_embeddings_batch_keeps_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.0, 2.0]},
                {"object": "embedding", "index": 0, "embedding": [3.0, 4.0]}
            ]
        })))
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::with_model(Some("sk-test".to_string()), "tiny".to_string(), 2)
        .with_base_url(&server.uri());

    let vectors = embedder
        .embed_batch(&["car".to_string(), "road".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors.len(), 2);
    assert!((vectors[0][0] - 0.6).abs() < 1e-6);
    assert!((vectors[0][1] - 0.8).abs() < 1e-6);
    assert!((vectors[1][1] - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_embeddings_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(Some("sk-bad".to_string())).with_base_url(&server.uri());
    let err = embedder.embed("car").await.unwrap_err();
    assert!(matches!(err, EngineError::ProviderError { .. }));
}
