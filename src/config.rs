//! Configuration System
//!
//! Layered configuration for the backend provider, generation parameters, the HTTP server,
//! the document outline and logging. See [`ConfigLoader`] for the precedence order.

use crate::document::Document;
use crate::logging::LoggingConfig;
use crate::provider::CompletionOptions;
use crate::sequencer::DEFAULT_FAILURE_MARKER;
use serde::{Deserialize, Serialize};

pub use crate::provider::{ProviderConfig, ProviderType};

mod loader;
mod merge;
mod sources;

pub use loader::ConfigLoader;

/// Business-plan outline used when no `[document] sections` are configured.
pub const DEFAULT_SECTIONS: [&str; 7] = [
    "项目背景",
    "市场分析",
    "商业模式",
    "财务预测",
    "风险分析",
    "团队介绍",
    "发展规划",
];

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub document: DocumentConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend parameters shared by generation, chat and improve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Appended to a section whose generation failed
    #[serde(default = "default_failure_marker")]
    pub failure_marker: String,
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f32 {
    0.7
}

fn default_failure_marker() -> String {
    DEFAULT_FAILURE_MARKER.to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            failure_marker: default_failure_marker(),
        }
    }
}

impl GenerationConfig {
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than zero".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Running server that `generate` streams from when `--server` is not given.
    /// Unset means sections are generated in-process.
    #[serde(default)]
    pub public_url: Option<String>,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_url: None,
        }
    }
}

impl ServerConfig {
    /// Server to generate against: `explicit` wins over the configured `public_url`.
    pub fn generate_server(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .or(self.public_url.as_deref())
            .map(|url| url.trim_end_matches('/').to_string())
    }

    pub fn validate(&self) -> Result<(), String> {
        self.bind
            .parse::<std::net::SocketAddr>()
            .map_err(|e| format!("Invalid bind address '{}': {}", self.bind, e))?;
        if let Some(url) = &self.public_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("public_url must be an http(s) URL, got '{}'", url));
            }
        }
        Ok(())
    }
}

/// Document outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_document_title")]
    pub title: String,

    #[serde(default = "default_sections")]
    pub sections: Vec<String>,
}

fn default_document_title() -> String {
    "商业计划书".to_string()
}

fn default_sections() -> Vec<String> {
    DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect()
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: default_document_title(),
            sections: default_sections(),
        }
    }
}

impl DocumentConfig {
    pub fn to_document(&self) -> Document {
        Document::new(self.title.clone(), self.sections.iter().cloned())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sections.is_empty() {
            return Err("At least one section is required".to_string());
        }
        if let Some(blank) = self.sections.iter().position(|s| s.trim().is_empty()) {
            return Err(format!("Section {} has an empty title", blank));
        }
        let mut seen = std::collections::HashSet::new();
        for title in &self.sections {
            if !seen.insert(title.as_str()) {
                return Err(format!("Duplicate section title '{}'", title));
            }
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Provider(String),
    Generation(String),
    Server(String),
    Document(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Server(msg) => write!(f, "Server: {}", msg),
            ValidationError::Document(msg) => write!(f, "Document: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl FlowConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if let Err(e) = self.generation.validate() {
            errors.push(ValidationError::Generation(e));
        }
        if let Err(e) = self.server.validate() {
            errors.push(ValidationError::Server(e));
        }
        if let Err(e) = self.document.validate() {
            errors.push(ValidationError::Document(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
