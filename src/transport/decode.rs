//! Byte stream to [`StreamEvent`] decoding.

use crate::error::ApiError;
use crate::transport::frame::SseFrameBuffer;
use crate::transport::wire::StreamEvent;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, warn};

/// Lazy decoder over a chunked byte stream.
///
/// Finite and non-restartable: it ends after the first terminal event, after a read error,
/// or when the byte stream is exhausted. The byte stream is dropped as soon as the decoder
/// finishes, which releases the underlying connection.
pub struct EventStream<S> {
    inner: Option<S>,
    buffer: SseFrameBuffer,
    pending: VecDeque<StreamEvent>,
}

impl<S> EventStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: Some(inner),
            buffer: SseFrameBuffer::new(),
            pending: VecDeque::new(),
        }
    }

    fn finish(&mut self) {
        self.inner = None;
        self.pending.clear();
        let discarded = self.buffer.discard();
        if discarded > 0 {
            debug!(bytes = discarded, "Discarded trailing partial frame");
        }
    }

    fn enqueue_payloads(&mut self, payloads: Vec<String>) {
        for payload in payloads {
            match StreamEvent::from_payload(&payload) {
                Ok(Some(event)) => self.pending.push_back(event),
                Ok(None) => debug!(payload = %payload, "Skipping frame without a known record"),
                Err(e) => warn!(error = %e, "Skipping undecodable frame"),
            }
        }
    }
}

impl<S, B, E> Stream for EventStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    type Item = Result<StreamEvent, ApiError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(event) = this.pending.pop_front() {
                if event.is_terminal() {
                    if !this.pending.is_empty() {
                        debug!(
                            ignored = this.pending.len(),
                            "Ignoring events after terminal event"
                        );
                    }
                    this.finish();
                }
                return Poll::Ready(Some(Ok(event)));
            }

            let inner = match this.inner.as_mut() {
                Some(inner) => inner,
                None => return Poll::Ready(None),
            };

            match inner.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    let payloads = this.buffer.push(chunk.as_ref());
                    this.enqueue_payloads(payloads);
                }
                Poll::Ready(Some(Err(e))) => {
                    this.finish();
                    return Poll::Ready(Some(Err(ApiError::TransportError(format!(
                        "Stream read failed: {}",
                        e
                    )))));
                }
                Poll::Ready(None) => {
                    this.finish();
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
