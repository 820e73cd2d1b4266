//! CLI parse: clap types for flowdoc. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// flowdoc - streaming, resumable section-by-section document generation
#[derive(Parser)]
#[command(name = "flowdoc")]
#[command(about = "Generate long documents section by section with a pausable streaming backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (config/ is read from here)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the generate, chat and improve endpoints
    Serve {
        /// Listen address (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Generate the configured document, rendering it live. Ctrl-C pauses.
    Generate {
        /// Stream sections from a running flowdoc server instead of calling the backend directly
        #[arg(long)]
        server: Option<String>,
        /// Write the finished document to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Ask the writing assistant a question
    Chat {
        message: String,
    },
    /// Improve a passage of text
    Improve {
        text: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List the document sections and their prompt and citation setup
    Sections {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration
    Config,
}
