use crate::assist::{ChatRequest, ImproveRequest};
use crate::error::ApiError;
use crate::server::AppState;
use crate::transport::{GenerateRequest, StreamEvent};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, warn};

pub const GENERATE_FAILED: &str = "Failed to generate content";
pub const CHAT_FAILED: &str = "Failed to process chat message";
pub const IMPROVE_FAILED: &str = "Failed to improve text";

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn bad_request(rejection: JsonRejection) -> Response {
    warn!(error = %rejection.body_text(), "Rejected request body");
    error_response(StatusCode::BAD_REQUEST, &rejection.body_text())
}

/// 400 with the validation message for caller errors, 500 with `failure` otherwise.
fn failure_response(err: ApiError, failure: &str) -> Response {
    match err {
        ApiError::ValidationError(message) => error_response(StatusCode::BAD_REQUEST, &message),
        other => {
            error!(error = %other, "{}", failure);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, failure)
        }
    }
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return bad_request(rejection),
    };

    match state.generator.generate(&request).await {
        Ok(events) => {
            let frames = events.map(|item| {
                let event = item.unwrap_or_else(|e| StreamEvent::Error {
                    message: e.to_string(),
                });
                Ok::<Event, Infallible>(Event::default().data(event.to_json().to_string()))
            });
            Sse::new(frames).into_response()
        }
        Err(e) => failure_response(e, GENERATE_FAILED),
    }
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return bad_request(rejection),
    };
    match state.assist.chat(&request).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => failure_response(e, CHAT_FAILED),
    }
}

pub async fn improve(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ImproveRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return bad_request(rejection),
    };
    match state.assist.improve(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => failure_response(e, IMPROVE_FAILED),
    }
}
