//! Decoding of OpenAI-compatible streaming responses.
//!
//! The backend sends `data: {chunk}` frames and a final `data: [DONE]`. Frame reassembly is
//! shared with the generate transport.

use crate::error::ApiError;
use crate::provider::{map_http_error, CompletionStream};
use crate::transport::SseFrameBuffer;
use futures::{stream, Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use tracing::warn;

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<StreamDelta>,
}

#[derive(Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, PartialEq)]
pub(crate) enum ChunkPayload {
    Content(String),
    Done,
    Failed(String),
    Empty,
}

pub(crate) fn parse_chunk_payload(payload: &str) -> ChunkPayload {
    if payload.trim() == "[DONE]" {
        return ChunkPayload::Done;
    }
    let chunk: StreamChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            warn!(error = %e, "Skipping undecodable backend chunk");
            return ChunkPayload::Empty;
        }
    };
    if let Some(error) = chunk.error {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return ChunkPayload::Failed(message);
    }
    let content: String = chunk
        .choices
        .into_iter()
        .filter_map(|choice| choice.delta.and_then(|delta| delta.content))
        .collect();
    if content.is_empty() {
        ChunkPayload::Empty
    } else {
        ChunkPayload::Content(content)
    }
}

struct ChunkState<S> {
    bytes: S,
    buffer: SseFrameBuffer,
    pending: VecDeque<Result<String, ApiError>>,
    finished: bool,
    /// `[DONE]` was received; a body ending without it was cut off.
    done: bool,
}

/// Turn a streaming chat-completions response body into one item per content chunk.
///
/// A body that ends before the `[DONE]` sentinel yields a final `Err`.
pub(crate) fn chat_chunk_stream<S, B>(bytes: S) -> CompletionStream
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send,
{
    let state = ChunkState {
        bytes,
        buffer: SseFrameBuffer::new(),
        pending: VecDeque::new(),
        finished: false,
        done: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                if item.is_err() {
                    state.finished = true;
                    state.pending.clear();
                }
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    for payload in state.buffer.push(chunk.as_ref()) {
                        match parse_chunk_payload(&payload) {
                            ChunkPayload::Content(text) => state.pending.push_back(Ok(text)),
                            ChunkPayload::Failed(message) => {
                                state.pending.push_back(Err(ApiError::ProviderError(message)));
                                break;
                            }
                            ChunkPayload::Done => {
                                state.done = true;
                                state.finished = true;
                                break;
                            }
                            ChunkPayload::Empty => {}
                        }
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(map_http_error(e)), state));
                }
                None => {
                    state.finished = true;
                    if !state.done {
                        warn!("Backend stream closed without [DONE]");
                        let err = ApiError::ProviderError(
                            "backend stream ended before [DONE]".to_string(),
                        );
                        return Some((Err(err), state));
                    }
                }
            }
        }
    }))
}
