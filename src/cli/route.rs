//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::assist::{AssistService, ChatRequest, ImproveRequest};
use crate::config::{ConfigLoader, FlowConfig};
use crate::document::DocumentStore;
use crate::error::ApiError;
use crate::generator::{LocalSectionSource, SectionGenerator};
use crate::provider::{ModelProviderClient, ProviderFactory};
use crate::sequencer::{DocumentSequencer, StartOutcome};
use crate::server::{self, AppState};
use crate::transport::{HttpSectionSource, SectionSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cli::command_name;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_improve_result, format_run_summary, format_sections, TerminalRenderer,
};

/// Runtime context for CLI execution: workspace and the validated configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: FlowConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Self::with_config(workspace_root, config)
    }

    pub fn with_config(workspace_root: PathBuf, config: FlowConfig) -> Result<Self, ApiError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        info!(command = command_name(command), "Executing command");
        match command {
            Commands::Serve { bind } => self.handle_serve(bind.as_deref()).await,
            Commands::Generate { server, output } => {
                self.handle_generate(server.as_deref(), output.as_deref())
                    .await
            }
            Commands::Chat { message } => self.handle_chat(message).await,
            Commands::Improve { text, format } => self.handle_improve(text, format).await,
            Commands::Sections { format } => format_sections(&self.config.document.sections, format),
            Commands::Config => toml::to_string_pretty(&self.config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e))),
        }
    }

    fn client(&self) -> Result<Arc<dyn ModelProviderClient>, ApiError> {
        ProviderFactory::create_client(&self.config.provider.to_model_provider()?)
    }

    fn generator(&self) -> Result<SectionGenerator, ApiError> {
        Ok(SectionGenerator::new(
            self.client()?,
            self.config.generation.completion_options(),
        ))
    }

    fn assist(&self) -> Result<AssistService, ApiError> {
        Ok(AssistService::new(
            self.client()?,
            self.config.generation.completion_options(),
        ))
    }

    async fn handle_serve(&self, bind: Option<&str>) -> Result<String, ApiError> {
        let bind = bind.unwrap_or(&self.config.server.bind);
        let state = Arc::new(AppState {
            generator: self.generator()?,
            assist: self.assist()?,
        });
        server::bind_and_serve(bind, state).await?;
        Ok("Server stopped".to_string())
    }

    async fn handle_generate(
        &self,
        server_url: Option<&str>,
        output: Option<&Path>,
    ) -> Result<String, ApiError> {
        let store = DocumentStore::shared(self.config.document.to_document());
        store.subscribe(Arc::new(TerminalRenderer::stdout(store.titles())));

        let source: Arc<dyn SectionSource> = match self.config.server.generate_server(server_url) {
            Some(url) => Arc::new(HttpSectionSource::new(&url)?),
            None => Arc::new(LocalSectionSource::new(Arc::new(self.generator()?))),
        };
        let sequencer = DocumentSequencer::new(store.clone(), source)
            .with_failure_marker(self.config.generation.failure_marker.clone());

        let outcome = loop {
            let outcome = run_until_interrupted(&sequencer).await?;
            println!();
            let section = match &outcome {
                StartOutcome::Paused { section } => *section,
                StartOutcome::Failed { section, message } => {
                    warn!(section, error = %message, "Section failed");
                    *section
                }
                StartOutcome::Completed | StartOutcome::AlreadyRunning => break outcome,
            };
            let title = store.section_title(section).unwrap_or_default();
            if !confirm(format!("Resume generation at '{}'?", title)).await? {
                break outcome;
            }
        };

        let document = store.snapshot();
        if let Some(path) = output {
            std::fs::write(path, document.render_text())?;
            info!(path = %path.display(), "Document written");
        }
        Ok(format_run_summary(&document, &outcome))
    }

    async fn handle_chat(&self, message: &str) -> Result<String, ApiError> {
        let request = ChatRequest {
            message: message.to_string(),
            history: Vec::new(),
        };
        Ok(self.assist()?.chat(&request).await?.message)
    }

    async fn handle_improve(&self, text: &str, format: &str) -> Result<String, ApiError> {
        let request = ImproveRequest {
            text: text.to_string(),
        };
        let result = self.assist()?.improve(&request).await?;
        format_improve_result(&result, format)
    }
}

/// Drive the sequencer, pausing it on Ctrl-C.
async fn run_until_interrupted(sequencer: &DocumentSequencer) -> Result<StartOutcome, ApiError> {
    let run = sequencer.start();
    tokio::pin!(run);
    loop {
        tokio::select! {
            outcome = &mut run => return Ok(outcome),
            signal = tokio::signal::ctrl_c() => {
                signal?;
                if let Err(e) = sequencer.pause() {
                    warn!(error = %e, "Interrupt ignored");
                }
            }
        }
    }
}

async fn confirm(prompt: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
    })
    .await
    .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))?
    .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))
}
