//! Wire records exchanged over the generate endpoint.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Source attribution attached to a section once it completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub text: String,
    pub url: String,
}

impl Citation {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl GenerateRequest {
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            continue_from: None,
            prompt: None,
        }
    }

    /// Attach prior content; blank content is treated as absent.
    pub fn continuing_from(mut self, prior: impl Into<String>) -> Self {
        let prior = prior.into();
        self.continue_from = if prior.trim().is_empty() {
            None
        } else {
            Some(prior)
        };
        self
    }

    /// Prior content to continue from, if any non-blank content was supplied.
    pub fn prior_content(&self) -> Option<&str> {
        self.continue_from
            .as_deref()
            .filter(|prior| !prior.trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.section.trim().is_empty() {
            return Err(ApiError::ValidationError("Section is required".to_string()));
        }
        Ok(())
    }
}

/// One decoded event of a section stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Delta { text: String },
    Complete { citation: Option<Citation> },
    Error { message: String },
}

/// Tolerant decode target for a frame payload.
#[derive(Debug, Default, Deserialize)]
struct WireRecord {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    citation: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl StreamEvent {
    pub fn delta(text: impl Into<String>) -> Self {
        StreamEvent::Delta { text: text.into() }
    }

    /// `Complete` or `Error`: nothing may follow it in the same stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Delta { .. })
    }

    /// JSON record for this event.
    pub fn to_json(&self) -> Value {
        match self {
            StreamEvent::Delta { text } => json!({ "content": text }),
            StreamEvent::Complete { citation } => json!({ "done": true, "citation": citation }),
            StreamEvent::Error { message } => json!({ "error": message }),
        }
    }

    /// Full frame including the blank-line terminator.
    pub fn to_sse_frame(&self) -> String {
        format!("data: {}\n\n", self.to_json())
    }

    /// Decode one frame payload.
    ///
    /// Invalid JSON is a `ParseError`. A record carrying none of the known keys (or an empty
    /// `content`) decodes to `Ok(None)`. Key precedence is `error`, then `done`, then `content`.
    pub fn from_payload(payload: &str) -> Result<Option<Self>, ApiError> {
        let record: WireRecord = serde_json::from_str(payload)
            .map_err(|e| ApiError::ParseError(format!("Invalid frame payload: {}", e)))?;

        if let Some(message) = record.error {
            return Ok(Some(StreamEvent::Error { message }));
        }
        if record.done == Some(true) {
            let citation = record
                .citation
                .filter(|value| !value.is_null())
                .and_then(|value| serde_json::from_value::<Citation>(value).ok());
            return Ok(Some(StreamEvent::Complete { citation }));
        }
        match record.content {
            Some(text) if !text.is_empty() => Ok(Some(StreamEvent::Delta { text })),
            _ => Ok(None),
        }
    }
}
