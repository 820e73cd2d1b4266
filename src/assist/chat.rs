//! Writing-assistant chat: request/response shapes and conversation assembly.

use crate::provider::ChatMessage;
use serde::{Deserialize, Serialize};

pub const CHAT_SYSTEM_MESSAGE: &str = "You are an AI writing assistant helping with a business plan. \
Provide helpful, concise, and actionable advice. Keep responses under 200 words. \
If the user asks for improvements or suggestions for specific sections, provide brief guidance tailored to that section. \
Always maintain a professional tone and focus on business value.";

/// Sender tag used for assistant replies.
pub const AI_SENDER: &str = "ai";

/// One prior turn as the client sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub sender: String,
    #[serde(default)]
    pub content: String,
}

impl ChatTurn {
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
        }
    }

    fn to_message(&self) -> ChatMessage {
        if self.sender == "user" {
            ChatMessage::user(self.content.clone())
        } else {
            ChatMessage::assistant(self.content.clone())
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    pub sender: String,
}

impl ChatReply {
    pub fn ai(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sender: AI_SENDER.to_string(),
        }
    }
}

/// System prompt, then the history in order, then the new message.
pub fn build_chat_messages(request: &ChatRequest) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(ChatMessage::system(CHAT_SYSTEM_MESSAGE));
    messages.extend(request.history.iter().map(ChatTurn::to_message));
    messages.push(ChatMessage::user(request.message.clone()));
    messages
}
