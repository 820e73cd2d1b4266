//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::ProviderNotConfigured(msg) => format!(
            "{}\nHint: set provider.provider_type = \"demo\" to try flowdoc without a backend",
            msg
        ),
        ApiError::BackendUnavailable(msg) => {
            format!("Generate server unavailable: {}\nHint: start one with `flowdoc serve`", msg)
        }
        other => other.to_string(),
    }
}
