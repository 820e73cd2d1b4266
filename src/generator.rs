//! Section Content Generator
//!
//! Drives the text-generation backend in streaming mode for one section and turns its
//! chunks into section events: one `Delta` per chunk, then a single terminal event.
//! Stateless between requests.

use crate::error::ApiError;
use crate::provider::{ChatMessage, CompletionOptions, CompletionStream, ModelProviderClient};
use crate::transport::{Citation, GenerateRequest, SectionSource, SectionStream, StreamEvent};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info};

pub mod prompts;

pub use prompts::{citation_for, system_instruction};

/// Conversation sent to the backend for `request`.
pub fn build_messages(request: &GenerateRequest) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::system(prompts::system_instruction(&request.section)),
        ChatMessage::user(prompts::section_request(
            &request.section,
            request.prompt.as_deref(),
        )),
    ];
    if let Some(prior) = request.prior_content() {
        messages.push(ChatMessage::assistant(prior));
        messages.push(ChatMessage::user(prompts::CONTINUE_INSTRUCTION));
    }
    messages
}

pub struct SectionGenerator {
    client: Arc<dyn ModelProviderClient>,
    options: CompletionOptions,
}

impl SectionGenerator {
    pub fn new(client: Arc<dyn ModelProviderClient>, options: CompletionOptions) -> Self {
        Self { client, options }
    }

    pub fn client(&self) -> &Arc<dyn ModelProviderClient> {
        &self.client
    }

    /// Open the backend stream for one section.
    ///
    /// Validation and backend failures before the stream opens are returned as `Err`;
    /// anything after that is reported in-band as a terminal `Error` event.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<SectionStream, ApiError> {
        request.validate()?;
        let messages = build_messages(request);
        info!(
            section = %request.section,
            provider = self.client.provider_name(),
            model = self.client.model_name(),
            continuing = request.prior_content().is_some(),
            "Generating section"
        );

        let chunks = self
            .client
            .stream(messages, self.options.clone())
            .await
            .map_err(|e| {
                error!(section = %request.section, error = %e, "Backend stream failed to open");
                e
            })?;

        Ok(section_events(
            request.section.clone(),
            chunks,
            prompts::citation_for(&request.section),
        ))
    }
}

struct EventState {
    section: String,
    chunks: Option<CompletionStream>,
    citation: Option<Citation>,
    deltas: usize,
}

/// Map backend chunks to section events, ending with exactly one terminal event.
fn section_events(
    section: String,
    chunks: CompletionStream,
    citation: Option<Citation>,
) -> SectionStream {
    let state = EventState {
        section,
        chunks: Some(chunks),
        citation,
        deltas: 0,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        let chunks = state.chunks.as_mut()?;
        loop {
            match chunks.next().await {
                Some(Ok(text)) if text.is_empty() => continue,
                Some(Ok(text)) => {
                    state.deltas += 1;
                    return Some((Ok(StreamEvent::Delta { text }), state));
                }
                Some(Err(e)) => {
                    error!(section = %state.section, deltas = state.deltas, error = %e, "Backend stream failed mid-section");
                    state.chunks = None;
                    let event = StreamEvent::Error {
                        message: e.to_string(),
                    };
                    return Some((Ok(event), state));
                }
                None => {
                    debug!(section = %state.section, deltas = state.deltas, "Backend stream completed");
                    state.chunks = None;
                    let event = StreamEvent::Complete {
                        citation: state.citation.take(),
                    };
                    return Some((Ok(event), state));
                }
            }
        }
    }))
}

/// In-process section source: calls the generator directly instead of going over HTTP.
pub struct LocalSectionSource {
    generator: Arc<SectionGenerator>,
}

impl LocalSectionSource {
    pub fn new(generator: Arc<SectionGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl SectionSource for LocalSectionSource {
    async fn open(&self, request: &GenerateRequest) -> Result<SectionStream, ApiError> {
        self.generator.generate(request).await
    }

    fn source_name(&self) -> &str {
        "local"
    }
}
