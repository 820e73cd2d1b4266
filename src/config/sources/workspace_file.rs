//! Workspace layer: `config/config.toml`, then `config/{FLOWDOC_ENV}.toml` over it.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;
use tracing::debug;

/// Selects the environment-specific workspace file.
pub const ENV_NAME_VAR: &str = "FLOWDOC_ENV";

const DEFAULT_ENV_NAME: &str = "development";

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let config_dir = workspace_root.join("config");
    let env_name = std::env::var(ENV_NAME_VAR).unwrap_or_else(|_| DEFAULT_ENV_NAME.to_string());

    let layers = [
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", env_name)),
    ];
    Ok(layers
        .into_iter()
        .filter(|path| path.is_file())
        .fold(builder, |builder, path| {
            debug!(path = %path.display(), "Adding workspace config layer");
            builder.add_source(File::from(path).required(false))
        }))
}
