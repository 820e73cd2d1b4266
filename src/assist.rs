//! Assistant endpoints backing the editor sidebar: free-form chat and text improvement.
//!
//! Both are single request/response calls to the backend. Neither is streamed.

use crate::error::ApiError;
use crate::provider::{CompletionOptions, ModelProviderClient};
use std::sync::Arc;
use tracing::{debug, info};

pub mod chat;
pub mod improve;

pub use chat::{ChatReply, ChatRequest, ChatTurn};
pub use improve::{ImproveRequest, ImproveResponse};

pub struct AssistService {
    client: Arc<dyn ModelProviderClient>,
    options: CompletionOptions,
}

impl AssistService {
    pub fn new(client: Arc<dyn ModelProviderClient>, options: CompletionOptions) -> Self {
        Self { client, options }
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        if request.message.trim().is_empty() {
            return Err(ApiError::ValidationError("Message is required".to_string()));
        }
        info!(
            provider = self.client.provider_name(),
            history = request.history.len(),
            "Chat request"
        );
        let response = self
            .client
            .complete(chat::build_chat_messages(request), self.options.clone())
            .await?;
        debug!(tokens = response.usage.total_tokens, "Chat reply received");
        Ok(ChatReply::ai(response.content))
    }

    pub async fn improve(&self, request: &ImproveRequest) -> Result<ImproveResponse, ApiError> {
        if request.text.trim().is_empty() {
            return Err(ApiError::ValidationError("Text is required".to_string()));
        }
        info!(
            provider = self.client.provider_name(),
            chars = request.text.chars().count(),
            "Improve request"
        );
        let options = CompletionOptions {
            json_mode: true,
            ..self.options.clone()
        };
        let response = self
            .client
            .complete(improve::build_improve_messages(&request.text), options)
            .await?;
        Ok(improve::parse_improve_output(&response.content, &request.text))
    }
}
