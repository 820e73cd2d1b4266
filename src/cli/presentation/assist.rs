use crate::assist::ImproveResponse;
use crate::error::ApiError;
use owo_colors::OwoColorize;

pub fn format_improve_result(result: &ImproveResponse, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return serde_json::to_string_pretty(result)
            .map_err(|e| ApiError::ParseError(e.to_string()));
    }
    let mut out = result.improved.clone();
    if !result.suggestions.is_empty() {
        out.push_str(&format!("\n\n{}\n", "Suggestions".bold()));
        for suggestion in &result.suggestions {
            out.push_str(&format!("  - {}\n", suggestion));
        }
    }
    Ok(out.trim_end().to_string())
}
