//! Local chat-completions stand-in for client tests.

use std::time::Duration;

use axum::Router;
use serde_json::json;

use crate::llm_client::{GenerationClient, GenerationSettings};

/// Serves `router` on an ephemeral localhost port and returns its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub(crate) fn client(base_url: &str, timeout: Duration, max_attempts: u32) -> GenerationClient {
    GenerationClient::new(GenerationSettings {
        api_key: "test-key".to_string(),
        base_url: base_url.to_string(),
        model: "test-model".to_string(),
        timeout,
        max_attempts,
    })
    .unwrap()
}

/// A successful chat-completions body whose message content is `content`.
pub(crate) fn completion_body(content: &str) -> String {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 5}
    })
    .to_string()
}
