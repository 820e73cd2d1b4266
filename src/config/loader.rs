//! Layered configuration loading.

use crate::config::merge::merge_policy;
use crate::config::sources::{environment, global_file, workspace_file};
use crate::config::FlowConfig;
use config::ConfigError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Lowest to highest precedence: built-in defaults, the global file, `config/config.toml`,
    /// `config/{FLOWDOC_ENV}.toml`, then `FLOWDOC__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<FlowConfig, ConfigError> {
        Self::load_layered(workspace_root, global_file::global_config_path().as_deref())
    }

    /// Same as [`ConfigLoader::load`] with an explicit global file location.
    pub fn load_layered(
        workspace_root: &Path,
        global_path: Option<&Path>,
    ) -> Result<FlowConfig, ConfigError> {
        debug!(workspace = %workspace_root.display(), "Loading configuration");
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder, global_path)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);
        builder.build()?.try_deserialize()
    }

    /// Load a single explicit file over the defaults; environment overrides still apply.
    pub fn load_from_file(path: &Path) -> Result<FlowConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        environment::add_to_builder(builder)
            .build()?
            .try_deserialize()
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
