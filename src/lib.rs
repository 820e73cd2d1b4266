//! flowdoc: Streaming, Resumable Document Generation
//!
//! Generates a multi-section document one section at a time from a streaming text backend.
//! Generation can be paused after any delta and resumed from the same section, with the
//! partial content handed back to the backend as prior output.

pub mod assist;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod generator;
pub mod logging;
pub mod provider;
pub mod sequencer;
pub mod server;
pub mod transport;
