//! Stream Transport
//!
//! Wire format for section streams: `data:`-prefixed frames separated by a blank line,
//! each carrying a JSON record that maps to a [`StreamEvent`]. The decoding side turns a
//! chunked byte stream into a lazy, finite sequence of events and tolerates frames split
//! across reads; the encoding side renders events back into frames for the server.

use crate::error::ApiError;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

pub mod client;
pub mod decode;
pub mod frame;
pub mod wire;

pub use client::HttpSectionSource;
pub use decode::EventStream;
pub use frame::SseFrameBuffer;
pub use wire::{Citation, GenerateRequest, StreamEvent};

/// A single section's event stream. Dropping it closes the underlying connection.
pub type SectionStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ApiError>> + Send>>;

/// Anything that can open a generate stream for one section.
#[async_trait]
pub trait SectionSource: Send + Sync {
    /// Open the stream for `request.section`.
    ///
    /// An `Err` here means nothing was streamed (request-level failure). Failures after
    /// this returns arrive inside the stream.
    async fn open(&self, request: &GenerateRequest) -> Result<SectionStream, ApiError>;

    /// Short label for logs.
    fn source_name(&self) -> &str;
}
