//! Integration tests for model provider clients against a mock OpenAI-compatible backend

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use flowdoc::config::{ProviderConfig, ProviderType};
use flowdoc::error::ApiError;
use flowdoc::generator::SectionGenerator;
use flowdoc::provider::{
    ChatMessage, CompletionOptions, ModelProvider, ModelProviderClient, OpenAICompatibleClient,
    ProviderFactory,
};
use flowdoc::transport::{GenerateRequest, StreamEvent};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Seen = Arc<Mutex<Vec<Value>>>;

async fn completions(State(seen): State<Seen>, Json(body): Json<Value>) -> Response {
    seen.lock().unwrap().push(body.clone());

    match body["model"].as_str() {
        Some("missing") => {
            return (StatusCode::NOT_FOUND, "model 'missing' not found").into_response()
        }
        Some("broken") if body["stream"] == json!(true) => {
            let frames = "data: {\"choices\":[{\"delta\":{\"content\":\"半\"}}]}\n\n\
                          data: {\"error\":{\"message\":\"upstream overloaded\"}}\n\n";
            return ([(header::CONTENT_TYPE, "text/event-stream")], frames).into_response();
        }
        _ => {}
    }

    if body["stream"] == json!(true) {
        let frames = [
            json!({"choices":[{"delta":{"role":"assistant"}}]}),
            json!({"choices":[{"delta":{"content":"市场"}}]}),
            json!({"choices":[{"delta":{"content":"规模"}}]}),
            json!({"choices":[{"delta":{"content":"巨大"}}]}),
        ]
        .iter()
        .map(|frame| format!("data: {}\n\n", frame))
        .chain(std::iter::once("data: [DONE]\n\n".to_string()))
        .collect::<String>();
        ([(header::CONTENT_TYPE, "text/event-stream")], frames).into_response()
    } else {
        Json(json!({
            "model": body["model"],
            "choices": [{
                "message": { "role": "assistant", "content": "完整回答" },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7 }
        }))
        .into_response()
    }
}

async fn spawn_backend() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/v1", addr), seen)
}

fn local_client(endpoint: &str, model: &str) -> OpenAICompatibleClient {
    OpenAICompatibleClient::local(model.to_string(), endpoint.to_string(), Some("k".to_string()))
        .unwrap()
}

#[test]
fn test_factory_builds_each_backend() {
    let cases = vec![
        (
            ModelProvider::OpenAI {
                model: "gpt-4o-mini".to_string(),
                api_key: "test-key".to_string(),
                base_url: None,
            },
            "openai",
            "gpt-4o-mini",
        ),
        (
            ModelProvider::Ollama {
                model: "llama3".to_string(),
                base_url: None,
            },
            "ollama",
            "llama3",
        ),
        (
            ModelProvider::LocalCustom {
                model: "local-model".to_string(),
                endpoint: "http://localhost:8080/v1".to_string(),
                api_key: None,
            },
            "local",
            "local-model",
        ),
        (ModelProvider::Demo { chunk_delay_ms: 0 }, "demo", "demo"),
    ];

    for (provider, name, model) in cases {
        let client = ProviderFactory::create_client(&provider).unwrap();
        assert_eq!(client.provider_name(), name);
        assert_eq!(client.model_name(), model);
    }
}

#[test]
fn test_chat_urls() {
    let openai =
        OpenAICompatibleClient::openai("m".to_string(), "k".to_string(), None).unwrap();
    assert_eq!(openai.chat_url(), "https://api.openai.com/v1/chat/completions");

    let ollama = OpenAICompatibleClient::ollama(
        "m".to_string(),
        Some("http://gpu-box:11434/".to_string()),
    )
    .unwrap();
    assert_eq!(ollama.chat_url(), "http://gpu-box:11434/v1/chat/completions");
}

#[test]
fn test_provider_profiles_resolve() {
    let config = ProviderConfig {
        provider_type: ProviderType::LocalCustom,
        model: "qwen".to_string(),
        api_key: None,
        endpoint: Some("http://127.0.0.1:8000/v1".to_string()),
        demo_chunk_delay_ms: 0,
    };
    match config.to_model_provider().unwrap() {
        ModelProvider::LocalCustom { model, endpoint, .. } => {
            assert_eq!(model, "qwen");
            assert_eq!(endpoint, "http://127.0.0.1:8000/v1");
        }
        other => panic!("unexpected provider: {:?}", other),
    }

    let missing_endpoint = ProviderConfig {
        endpoint: None,
        ..config
    };
    assert!(matches!(
        missing_endpoint.to_model_provider(),
        Err(ApiError::ConfigError(_))
    ));
}

#[tokio::test]
async fn test_streaming_completion_yields_chunks() {
    let (endpoint, seen) = spawn_backend().await;
    let client = local_client(&endpoint, "local-model");

    let chunks: Vec<String> = client
        .stream(vec![ChatMessage::user("hi")], CompletionOptions::default())
        .await
        .unwrap()
        .map(|chunk| chunk.unwrap())
        .collect()
        .await;
    assert_eq!(chunks, vec!["市场", "规模", "巨大"]);

    let seen = seen.lock().unwrap();
    let request = &seen[0];
    assert_eq!(request["stream"], json!(true));
    assert_eq!(request["messages"][0]["role"], "user");
}

#[tokio::test]
async fn test_completion_and_json_mode() {
    let (endpoint, seen) = spawn_backend().await;
    let client = local_client(&endpoint, "local-model");

    let options = CompletionOptions {
        json_mode: true,
        max_tokens: Some(200),
        ..Default::default()
    };
    let response = client
        .complete(vec![ChatMessage::user("improve")], options)
        .await
        .unwrap();
    assert_eq!(response.content, "完整回答");
    assert_eq!(response.usage.total_tokens, 7);
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));

    let seen = seen.lock().unwrap();
    let request = &seen[0];
    assert_eq!(request["response_format"], json!({ "type": "json_object" }));
    assert_eq!(request["max_tokens"], 200);
    assert_eq!(request["stream"], json!(false));
}

#[tokio::test]
async fn test_backend_errors_are_mapped() {
    let (endpoint, _) = spawn_backend().await;

    let missing = local_client(&endpoint, "missing");
    let err = missing
        .stream(vec![ChatMessage::user("hi")], CompletionOptions::default())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ApiError::ProviderModelNotFound(_)), "{}", err);

    let broken = local_client(&endpoint, "broken");
    let items: Vec<Result<String, ApiError>> = broken
        .stream(vec![ChatMessage::user("hi")], CompletionOptions::default())
        .await
        .unwrap()
        .collect()
        .await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), "半");
    assert!(items[1]
        .as_ref()
        .err()
        .unwrap()
        .to_string()
        .contains("upstream overloaded"));
}

#[tokio::test]
async fn test_generator_over_real_backend() {
    let (endpoint, seen) = spawn_backend().await;
    let generator = SectionGenerator::new(
        Arc::new(local_client(&endpoint, "local-model")),
        CompletionOptions::default(),
    );

    let events: Vec<StreamEvent> = generator
        .generate(&GenerateRequest::new("市场分析").continuing_from("已有内容"))
        .await
        .unwrap()
        .map(|event| event.unwrap())
        .collect()
        .await;

    let text: String = events
        .iter()
        .filter_map(|event| match event {
            StreamEvent::Delta { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "市场规模巨大");
    match events.last().unwrap() {
        StreamEvent::Complete {
            citation: Some(citation),
        } => assert_eq!(citation.text, "IMF 2024 报告"),
        other => panic!("unexpected terminal event: {:?}", other),
    }

    let messages = seen.lock().unwrap()[0]["messages"].clone();
    let roles: Vec<&str> = messages
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    assert_eq!(messages[2]["content"], "已有内容");
}
