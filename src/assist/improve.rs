//! Text improvement: prompt, response shape and recovery from malformed backend output.

use crate::error::ApiError;
use crate::provider::ChatMessage;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const IMPROVE_SYSTEM_MESSAGE: &str = "You are an expert editor and writing improvement assistant. \
Your task is to improve the given text to make it more professional, clear, and impactful. \
Keep your response brief, no more than 200 words total. \
Provide the improved version of the text along with 1-2 brief suggestions for further improvements. \
Your response should be in JSON format with the following structure: \
{\"improved\": \"The improved text goes here\", \"suggestions\": [\"Suggestion 1\", \"Suggestion 2\"]}";

/// Used whenever the backend gives no usable suggestions.
pub const DEFAULT_SUGGESTIONS: [&str; 3] = [
    "考虑添加更多具体数据支持您的观点",
    "可以进一步阐述实施细节",
    "建议增加一个实际案例来说明",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImproveRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImproveResponse {
    pub improved: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

pub fn build_improve_messages(text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(IMPROVE_SYSTEM_MESSAGE),
        ChatMessage::user(format!(
            "Please improve the following text (keep it brief):\n\n{}",
            text
        )),
    ]
}

fn default_suggestions() -> Vec<String> {
    DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

fn parse_strict(raw: &str) -> Result<ImproveResponse, ApiError> {
    let response: ImproveResponse =
        serde_json::from_str(raw.trim()).map_err(|e| ApiError::ParseError(e.to_string()))?;
    if response.improved.trim().is_empty() {
        return Err(ApiError::ParseError("empty \"improved\" field".to_string()));
    }
    Ok(response)
}

/// Interpret backend output, falling back to the raw text (or `original` when the output
/// is blank) plus the default suggestions. Never fails.
pub fn parse_improve_output(raw: &str, original: &str) -> ImproveResponse {
    match parse_strict(raw) {
        Ok(mut response) => {
            response.suggestions.retain(|s| !s.trim().is_empty());
            if response.suggestions.is_empty() {
                response.suggestions = default_suggestions();
            }
            response
        }
        Err(e) => {
            warn!(error = %e, "Improve output was not the expected JSON, using fallback");
            let improved = if raw.trim().is_empty() {
                original.to_string()
            } else {
                raw.to_string()
            };
            ImproveResponse {
                improved,
                suggestions: default_suggestions(),
            }
        }
    }
}
