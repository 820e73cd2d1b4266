//! CLI help: stable command names for logging.

use crate::cli::parse::Commands;

/// Command name string used in log records (e.g. "generate", "sections").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Serve { .. } => "serve",
        Commands::Generate { .. } => "generate",
        Commands::Chat { .. } => "chat",
        Commands::Improve { .. } => "improve",
        Commands::Sections { .. } => "sections",
        Commands::Config => "config",
    }
}
