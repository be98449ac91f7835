//! Caption client against a mocked generateContent endpoint.

use std::sync::Arc;

use pomopink_core::caption::RATE_LIMITED_CAPTION;
use pomopink_core::storage::{MemoryStore, PersistentStore};
use pomopink_core::{CaptionClient, CaptionConfig, Clock, GeminiTransport, ManualClock};

const PATH: &str = "/models/test-model:generateContent";

fn config(endpoint: &str) -> CaptionConfig {
    CaptionConfig {
        endpoint: endpoint.to_string(),
        model: "test-model".into(),
        retry_base_ms: 1,
        timeout_secs: 5,
        ..CaptionConfig::default()
    }
}

fn client(config: &CaptionConfig, api_key: Option<&str>) -> (CaptionClient<GeminiTransport>, ManualClock) {
    let clock = ManualClock::new(1_700_000_000_000);
    let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
    let clock_arc: Arc<dyn Clock> = Arc::new(clock.clone());
    let transport = GeminiTransport::with_api_key(config, api_key.map(String::from)).unwrap();
    (CaptionClient::new(transport, store, clock_arc, config), clock)
}

fn reply(text: &str) -> String {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
    .to_string()
}

#[tokio::test]
async fn test_success_sends_prompt_and_key() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "secret")
        .match_body(mockito::Matcher::Regex("They have 3 tasks left".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply("Berry good focus! 🍓"))
        .expect(1)
        .create_async()
        .await;

    let (client, _) = client(&config(&server.url()), Some("secret"));
    assert_eq!(client.request_caption(3).await, "Berry good focus! 🍓");
    assert_eq!(client.cooldown_remaining_ms(), 30_000);

    // Inside the cooldown the server is not contacted again.
    assert_eq!(client.request_caption(3).await, "Keep up the great momentum! 💖");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_is_a_single_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(429)
        .expect(1)
        .create_async()
        .await;

    let (client, _) = client(&config(&server.url()), Some("secret"));
    assert_eq!(client.request_caption(2).await, RATE_LIMITED_CAPTION);
    assert_eq!(client.cooldown_remaining_ms(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_errors_retry_then_fall_back() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let (client, _) = client(&config(&server.url()), Some("secret"));
    assert_eq!(client.request_caption(0).await, "Rest well, you've earned it.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_candidates_use_default_caption() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[]}"#)
        .create_async()
        .await;

    let (client, _) = client(&config(&server.url()), Some("secret"));
    assert_eq!(client.request_caption(1).await, "You're doing amazing! Keep going! ✨");
}

#[tokio::test]
async fn test_missing_key_never_calls_out() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .expect(0)
        .create_async()
        .await;

    let (client, _) = client(&config(&server.url()), None);
    assert_eq!(client.request_caption(5).await, "You've got this, superstar! 💖");
    mock.assert_async().await;
}
