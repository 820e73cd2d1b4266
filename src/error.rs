//! Error types for the flowdoc generation pipeline.

use thiserror::Error;

/// Errors surfaced by the provider layer, the transport, the generator and the sequencer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    /// The generate endpoint rejected the request before any event was streamed.
    #[error("Generate endpoint unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend reported a failure in-band after streaming had begun.
    #[error("Stream refused by backend: {0}")]
    StreamRefused(String),

    /// The connection dropped or the stream ended without a terminal event.
    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Malformed backend output: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: String },

    #[error("Section index {index} out of range (document has {len} sections)")]
    SectionOutOfRange { index: usize, len: usize },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ApiError {
    /// True for failures that happen after a section stream has started delivering events.
    pub fn is_stream_error(&self) -> bool {
        matches!(self, ApiError::StreamRefused(_) | ApiError::TransportError(_))
    }

    /// True for caller mistakes that must be rejected before any backend call.
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::ValidationError(_))
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
