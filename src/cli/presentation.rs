//! CLI presentation: live document rendering plus text and json formatters per command.

mod assist;
mod document;

pub use assist::format_improve_result;
pub use document::{format_run_summary, format_sections, TerminalRenderer};
