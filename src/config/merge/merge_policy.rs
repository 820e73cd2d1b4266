//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("provider.provider_type", "openai")?
        .set_default("provider.model", "gpt-4o-mini")?
        .set_default("generation.max_tokens", 200)?
        .set_default("generation.temperature", 0.7)?
        .set_default("server.bind", "127.0.0.1:3000")?
        .set_default("document.title", "商业计划书")
}
