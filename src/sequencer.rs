//! Document Sequencer
//!
//! Generates the sections of a document strictly in order, one stream at a time, and owns the
//! `Idle → Running → Paused → Running → … → Idle` state machine. Pause is cooperative: the
//! run's [`CancellationToken`] races the stream-open handshake and every read, so a pause
//! lands before a new section or right after a single delta. Resuming continues the section
//! at the cursor with its current content as prior output. Starting again after a completed
//! pass regenerates the document from empty sections.
//!
//! State sits behind a mutex that is never held across an `.await`, so `pause` can be called
//! from any task while `start` is driving.

use crate::document::DocumentStore;
use crate::error::ApiError;
use crate::transport::{Citation, GenerateRequest, SectionSource, StreamEvent};
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub mod state;

pub use state::{GenerationState, SequencerSnapshot, StartOutcome};

/// Appended to a section whose stream failed.
pub const DEFAULT_FAILURE_MARKER: &str = "\n[内容生成出错，请重试]";

struct Inner {
    state: GenerationState,
    cursor: Option<usize>,
    token: Option<CancellationToken>,
    /// Bumped by `start` and `reset`; a drive loop stops touching state once it is stale.
    run: u64,
    /// The last run finished the final section; the next start from `Idle` is a fresh pass.
    completed: bool,
}

enum SectionOutcome {
    Completed(Option<Citation>),
    Cancelled,
    Failed(ApiError),
}

pub struct DocumentSequencer {
    store: Arc<DocumentStore>,
    source: Arc<dyn SectionSource>,
    failure_marker: String,
    inner: Mutex<Inner>,
    /// Serializes store writes against pause, the staleness check and the prior-content read.
    /// Observers run under it and must not call back into the sequencer.
    write_gate: Mutex<()>,
}

impl DocumentSequencer {
    pub fn new(store: Arc<DocumentStore>, source: Arc<dyn SectionSource>) -> Self {
        Self {
            store,
            source,
            failure_marker: DEFAULT_FAILURE_MARKER.to_string(),
            inner: Mutex::new(Inner {
                state: GenerationState::Idle,
                cursor: None,
                token: None,
                run: 0,
                completed: false,
            }),
            write_gate: Mutex::new(()),
        }
    }

    pub fn with_failure_marker(mut self, marker: impl Into<String>) -> Self {
        self.failure_marker = marker.into();
        self
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn snapshot(&self) -> SequencerSnapshot {
        let inner = self.inner.lock();
        SequencerSnapshot {
            state: inner.state,
            cursor: inner.cursor,
        }
    }

    /// Start or resume generation and drive it until completion, pause, or failure.
    ///
    /// Starting from `Idle` after a completed pass clears the document first, so no section
    /// is sent its finished content as prior output.
    pub async fn start(&self) -> StartOutcome {
        let (token, run, fresh_pass) = {
            let mut inner = self.inner.lock();
            match inner.state {
                GenerationState::Running => {
                    debug!("Start ignored, generation already running");
                    return StartOutcome::AlreadyRunning;
                }
                GenerationState::Idle => inner.cursor = Some(0),
                GenerationState::Paused => {
                    if inner.cursor.is_none() {
                        inner.cursor = Some(0);
                    }
                }
            }
            let fresh_pass = inner.state == GenerationState::Idle && inner.completed;
            let token = CancellationToken::new();
            inner.state = GenerationState::Running;
            inner.token = Some(token.clone());
            inner.completed = false;
            inner.run += 1;
            (token, inner.run, fresh_pass)
        };

        if fresh_pass {
            let _gate = self.write_gate.lock();
            self.store.clear();
            debug!("Cleared completed document for a fresh pass");
        }

        info!(
            source = self.source.source_name(),
            sections = self.store.len(),
            cursor = ?self.snapshot().cursor,
            "Generation started"
        );
        self.drive(token, run).await
    }

    /// Pause the running generation. Only legal while running.
    ///
    /// Once this returns, no further delta from the paused run reaches the store.
    pub fn pause(&self) -> Result<(), ApiError> {
        let _gate = self.write_gate.lock();
        let mut inner = self.inner.lock();
        if inner.state != GenerationState::Running {
            return Err(ApiError::InvalidTransition {
                action: "pause",
                state: inner.state.to_string(),
            });
        }
        inner.state = GenerationState::Paused;
        if let Some(token) = inner.token.take() {
            token.cancel();
        }
        info!(cursor = ?inner.cursor, "Generation paused");
        Ok(())
    }

    /// Clear all content, citations and the cursor. Not allowed while running.
    pub fn reset(&self) -> Result<(), ApiError> {
        {
            let mut inner = self.inner.lock();
            if inner.state == GenerationState::Running {
                return Err(ApiError::InvalidTransition {
                    action: "reset",
                    state: inner.state.to_string(),
                });
            }
            inner.state = GenerationState::Idle;
            inner.cursor = None;
            inner.completed = false;
            inner.run += 1;
            if let Some(token) = inner.token.take() {
                token.cancel();
            }
        }
        let _gate = self.write_gate.lock();
        self.store.clear();
        info!("Document reset");
        Ok(())
    }

    /// Replace a section's content by hand. Not allowed while running.
    pub fn edit_section(&self, index: usize, text: &str) -> Result<(), ApiError> {
        let state = self.inner.lock().state;
        if state == GenerationState::Running {
            return Err(ApiError::InvalidTransition {
                action: "edit a section",
                state: state.to_string(),
            });
        }
        let _gate = self.write_gate.lock();
        self.store.replace_content(index, text)
    }

    fn is_current(&self, run: u64) -> bool {
        self.inner.lock().run == run
    }

    async fn drive(&self, token: CancellationToken, run: u64) -> StartOutcome {
        loop {
            let index = {
                let inner = self.inner.lock();
                let cursor = inner.cursor.unwrap_or(0);
                if inner.run != run || inner.state != GenerationState::Running {
                    return StartOutcome::Paused { section: cursor };
                }
                cursor
            };

            if index >= self.store.len() {
                self.finish(run);
                return StartOutcome::Completed;
            }

            match self.drive_section(index, &token, run).await {
                SectionOutcome::Completed(citation) => {
                    if let Some(citation) = citation {
                        if let Err(e) = self.store.set_citation(index, citation) {
                            warn!(index, error = %e, "Could not store citation");
                        }
                    }
                    let next = index + 1;
                    if next >= self.store.len() {
                        self.finish(run);
                        return StartOutcome::Completed;
                    }
                    let mut inner = self.inner.lock();
                    if inner.run != run {
                        return StartOutcome::Paused { section: index };
                    }
                    inner.cursor = Some(next);
                    debug!(section = index, next, "Section complete");
                }
                SectionOutcome::Cancelled => {
                    debug!(section = index, "Section interrupted by pause");
                    return StartOutcome::Paused { section: index };
                }
                SectionOutcome::Failed(e) => {
                    error!(section = index, error = %e, "Section generation failed");
                    {
                        let _gate = self.write_gate.lock();
                        if !self.is_current(run) {
                            return StartOutcome::Paused { section: index };
                        }
                        if let Err(append_err) = self.store.append(index, &self.failure_marker) {
                            warn!(index, error = %append_err, "Could not append failure marker");
                        }
                    }
                    let mut inner = self.inner.lock();
                    if inner.run == run {
                        inner.state = GenerationState::Paused;
                        inner.token = None;
                    }
                    return StartOutcome::Failed {
                        section: index,
                        message: e.to_string(),
                    };
                }
            }
        }
    }

    fn finish(&self, run: u64) {
        let mut inner = self.inner.lock();
        if inner.run != run {
            return;
        }
        inner.state = GenerationState::Idle;
        inner.cursor = None;
        inner.token = None;
        inner.completed = true;
        info!("Document generation complete");
    }

    async fn drive_section(
        &self,
        index: usize,
        token: &CancellationToken,
        run: u64,
    ) -> SectionOutcome {
        let request = match self.section_request(index) {
            Ok(request) => request,
            Err(e) => return SectionOutcome::Failed(e),
        };
        debug!(
            section = index,
            title = %request.section,
            continuing = request.prior_content().is_some(),
            "Opening section stream"
        );

        let mut stream = tokio::select! {
            biased;
            _ = token.cancelled() => return SectionOutcome::Cancelled,
            opened = self.source.open(&request) => match opened {
                Ok(stream) => stream,
                Err(e) => return SectionOutcome::Failed(e),
            },
        };

        let mut deltas = 0usize;
        loop {
            if token.is_cancelled() {
                return SectionOutcome::Cancelled;
            }
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => return SectionOutcome::Cancelled,
                next = stream.next() => next,
            };
            match next {
                Some(Ok(StreamEvent::Delta { text })) => {
                    let _gate = self.write_gate.lock();
                    if token.is_cancelled() || !self.is_current(run) {
                        return SectionOutcome::Cancelled;
                    }
                    if let Err(e) = self.store.append(index, &text) {
                        return SectionOutcome::Failed(e);
                    }
                    deltas += 1;
                }
                Some(Ok(StreamEvent::Complete { citation })) => {
                    debug!(section = index, deltas, "Section stream complete");
                    return SectionOutcome::Completed(citation);
                }
                Some(Ok(StreamEvent::Error { message })) => {
                    return SectionOutcome::Failed(ApiError::StreamRefused(message));
                }
                Some(Err(e)) => return SectionOutcome::Failed(e),
                None => {
                    return SectionOutcome::Failed(ApiError::TransportError(
                        "stream ended without a terminal event".to_string(),
                    ));
                }
            }
        }
    }

    fn section_request(&self, index: usize) -> Result<GenerateRequest, ApiError> {
        let title = self.store.section_title(index)?;
        let prior = {
            let _gate = self.write_gate.lock();
            self.store.content(index)?
        };
        Ok(GenerateRequest::new(title).continuing_from(prior))
    }
}
