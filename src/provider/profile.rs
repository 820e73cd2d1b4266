//! Provider profile: the configured backend, validated and resolved into a [`ModelProvider`].

use crate::error::ApiError;
use crate::provider::ModelProvider;
use serde::{Deserialize, Serialize};

/// Environment variable consulted when an OpenAI profile has no key of its own.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[serde(rename = "openai")]
    OpenAI,
    Ollama,
    #[serde(rename = "local")]
    LocalCustom,
    Demo,
}

pub fn provider_type_slug(provider_type: ProviderType) -> &'static str {
    match provider_type {
        ProviderType::OpenAI => "openai",
        ProviderType::Ollama => "ollama",
        ProviderType::LocalCustom => "local",
        ProviderType::Demo => "demo",
    }
}

/// Backend selection from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_type")]
    pub provider_type: ProviderType,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Base URL override (OpenAI, Ollama) or full endpoint (local).
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Delay between demo chunks, in milliseconds
    #[serde(default = "default_demo_chunk_delay_ms")]
    pub demo_chunk_delay_ms: u64,
}

fn default_provider_type() -> ProviderType {
    ProviderType::OpenAI
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_demo_chunk_delay_ms() -> u64 {
    40
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            model: default_model(),
            api_key: None,
            endpoint: None,
            demo_chunk_delay_ms: default_demo_chunk_delay_ms(),
        }
    }
}

impl ProviderConfig {
    /// Structural checks that do not depend on the environment.
    pub fn validate(&self) -> Result<(), String> {
        if self.provider_type != ProviderType::Demo && self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(format!(
                    "Endpoint must start with http:// or https://, got '{}'",
                    endpoint
                ));
            }
        }
        if self.provider_type == ProviderType::LocalCustom && self.endpoint.is_none() {
            return Err("Local providers require an endpoint".to_string());
        }
        Ok(())
    }

    fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(OPENAI_API_KEY_ENV)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
    }

    /// Resolve into a concrete provider, reading the API key from the environment if needed.
    pub fn to_model_provider(&self) -> Result<ModelProvider, ApiError> {
        self.validate().map_err(ApiError::ConfigError)?;
        match self.provider_type {
            ProviderType::OpenAI => {
                let api_key = self.resolve_api_key().ok_or_else(|| {
                    ApiError::ProviderNotConfigured(format!(
                        "OpenAI provider requires an API key (set provider.api_key or {})",
                        OPENAI_API_KEY_ENV
                    ))
                })?;
                Ok(ModelProvider::OpenAI {
                    model: self.model.clone(),
                    api_key,
                    base_url: self.endpoint.clone(),
                })
            }
            ProviderType::Ollama => Ok(ModelProvider::Ollama {
                model: self.model.clone(),
                base_url: self.endpoint.clone(),
            }),
            ProviderType::LocalCustom => Ok(ModelProvider::LocalCustom {
                model: self.model.clone(),
                endpoint: self.endpoint.clone().unwrap_or_default(),
                api_key: self.api_key.clone(),
            }),
            ProviderType::Demo => Ok(ModelProvider::Demo {
                chunk_delay_ms: self.demo_chunk_delay_ms,
            }),
        }
    }
}
