use crate::document::{Document, DocumentChange, DocumentObserver};
use crate::error::ApiError;
use crate::generator::prompts;
use crate::sequencer::StartOutcome;
use comfy_table::Table;
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use serde_json::json;
use std::io::Write;

struct RenderState<W> {
    out: W,
    current: Option<usize>,
}

/// Writes deltas as they arrive, with a heading whenever generation moves to another section.
pub struct TerminalRenderer<W: Write + Send> {
    titles: Vec<String>,
    color: bool,
    state: Mutex<RenderState<W>>,
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout(titles: Vec<String>) -> Self {
        Self::new(titles, std::io::stdout(), true)
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(titles: Vec<String>, out: W, color: bool) -> Self {
        Self {
            titles,
            color,
            state: Mutex::new(RenderState { out, current: None }),
        }
    }

    pub fn into_inner(self) -> W {
        self.state.into_inner().out
    }

    fn heading(&self, index: usize) -> String {
        let title = self.titles.get(index).map(String::as_str).unwrap_or("?");
        let heading = format!("## {}", title);
        if self.color {
            heading.bold().to_string()
        } else {
            heading
        }
    }

    fn render(&self, change: &DocumentChange) -> std::io::Result<()> {
        let mut state = self.state.lock();
        if let DocumentChange::Replaced { .. } | DocumentChange::Cleared = change {
            state.current = None;
            return Ok(());
        }
        // A citation can arrive for a section that streamed no text.
        if let Some(index) = change.section_index() {
            if state.current != Some(index) {
                let heading = self.heading(index);
                let lead = if state.current.is_some() { "\n\n" } else { "" };
                write!(state.out, "{}{}\n\n", lead, heading)?;
                state.current = Some(index);
            }
        }
        match change {
            DocumentChange::Appended { text, .. } => {
                write!(state.out, "{}", text)?;
            }
            DocumentChange::CitationSet { citation, .. } => {
                let line = format!("数据来源: {} ({})", citation.text, citation.url);
                if self.color {
                    write!(state.out, "\n{}", line.dimmed())?;
                } else {
                    write!(state.out, "\n{}", line)?;
                }
            }
            DocumentChange::Replaced { .. } | DocumentChange::Cleared => {}
        }
        state.out.flush()
    }
}

impl<W: Write + Send> DocumentObserver for TerminalRenderer<W> {
    fn on_change(&self, change: &DocumentChange) {
        if let Err(e) = self.render(change) {
            tracing::warn!(error = %e, "Failed to render document change");
        }
    }
}

/// Sections with their prompt and citation setup.
pub fn format_sections(titles: &[String], format: &str) -> Result<String, ApiError> {
    if format == "json" {
        let rows: Vec<serde_json::Value> = titles
            .iter()
            .enumerate()
            .map(|(index, title)| {
                json!({
                    "index": index,
                    "title": title,
                    "dedicated_prompt": prompts::has_dedicated_instruction(title),
                    "citation": prompts::citation_for(title),
                })
            })
            .collect();
        return serde_json::to_string_pretty(&rows).map_err(|e| ApiError::ParseError(e.to_string()));
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["#", "Section", "Prompt", "Citation"]);
    for (index, title) in titles.iter().enumerate() {
        let prompt = if prompts::has_dedicated_instruction(title) {
            "dedicated"
        } else {
            "generic"
        };
        let citation = prompts::citation_for(title)
            .map(|c| c.text)
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![index.to_string(), title.clone(), prompt.to_string(), citation]);
    }
    Ok(table.to_string())
}

/// One-line summary printed after a generate run.
pub fn format_run_summary(document: &Document, outcome: &StartOutcome) -> String {
    let chars: usize = document.sections.iter().map(|s| s.content.chars().count()).sum();
    let section_title = |index: &usize| {
        document
            .sections
            .get(*index)
            .map(|s| s.title.clone())
            .unwrap_or_default()
    };
    match outcome {
        StartOutcome::Completed => format!(
            "Generated {} sections ({} characters)",
            document.sections.len(),
            chars
        ),
        StartOutcome::Paused { section } => format!(
            "Paused at section {} ({}), {} characters so far",
            section + 1,
            section_title(section),
            chars
        ),
        StartOutcome::Failed { section, message } => format!(
            "Stopped at section {} ({}): {}",
            section + 1,
            section_title(section),
            message
        ),
        StartOutcome::AlreadyRunning => "Generation already running".to_string(),
    }
}
