//! Chat and improve endpoints over real HTTP

use crate::integration::test_utils::{spawn_server, ScriptedProvider};
use flowdoc::assist::improve::DEFAULT_SUGGESTIONS;
use flowdoc::provider::MessageRole;
use flowdoc::server::handlers::{CHAT_FAILED, IMPROVE_FAILED};
use serde_json::{json, Value};
use std::sync::Arc;

fn http() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

async fn post(base_url: &str, path: &str, body: Value) -> (u16, Value) {
    let response = http()
        .post(format!("{}{}", base_url, path))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_chat_round_trip_with_history() {
    let provider = Arc::new(ScriptedProvider::with_replies(vec!["Lead with the problem."]));
    let base_url = spawn_server(provider.clone()).await;

    let (status, body) = post(
        &base_url,
        "/api/chat",
        json!({
            "message": "How should I open the plan?",
            "history": [
                { "sender": "user", "content": "Hi" },
                { "sender": "ai", "content": "Hello!" }
            ]
        }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "message": "Lead with the problem.", "sender": "ai" })
    );

    let seen = provider.seen();
    assert_eq!(seen.len(), 1);
    let roles: Vec<MessageRole> = seen[0].iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User
        ]
    );
    assert_eq!(seen[0][3].content, "How should I open the plan?");
}

#[tokio::test]
async fn test_chat_rejections() {
    let provider = Arc::new(ScriptedProvider::default());
    let base_url = spawn_server(provider.clone()).await;

    let (status, body) = post(&base_url, "/api/chat", json!({ "message": "  " })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Message is required");

    // No reply scripted: the backend call fails.
    let (status, body) = post(&base_url, "/api/chat", json!({ "message": "hi" })).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], CHAT_FAILED);

    let response = http()
        .post(format!("{}/api/chat", base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let response = http()
        .get(format!("{}/api/chat", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 405);
}

#[tokio::test]
async fn test_improve_structured_and_fallback_replies() {
    let provider = Arc::new(ScriptedProvider::with_replies(vec![
        r#"{"improved":"我们的产品显著提升效率。","suggestions":["补充数据"]}"#,
        "更简洁的版本。",
    ]));
    let base_url = spawn_server(provider.clone()).await;

    let (status, body) = post(&base_url, "/api/improve", json!({ "text": "我们的产品很好" })).await;
    assert_eq!(status, 200);
    assert_eq!(body["improved"], "我们的产品显著提升效率。");
    assert_eq!(body["suggestions"], json!(["补充数据"]));

    let (status, body) = post(&base_url, "/api/improve", json!({ "text": "我们的产品很好" })).await;
    assert_eq!(status, 200);
    assert_eq!(body["improved"], "更简洁的版本。");
    assert_eq!(body["suggestions"], json!(DEFAULT_SUGGESTIONS));

    let seen = provider.seen();
    assert!(seen[0]
        .iter()
        .any(|m| m.role == MessageRole::User && m.content.contains("我们的产品很好")));
}

#[tokio::test]
async fn test_improve_rejections() {
    let base_url = spawn_server(Arc::new(ScriptedProvider::default())).await;

    let (status, body) = post(&base_url, "/api/improve", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Text is required");

    let (status, body) = post(&base_url, "/api/improve", json!({ "text": "draft" })).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], IMPROVE_FAILED);
}
