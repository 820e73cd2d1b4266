//! Frame reassembly for `data:`-framed event streams.
//!
//! Bytes are buffered until a blank-line delimiter is seen, so a frame (or a multibyte
//! character inside it) may arrive split across any number of reads.

/// Reassembly buffer that yields the `data:` payload of every complete frame.
#[derive(Debug, Default)]
pub struct SseFrameBuffer {
    buf: Vec<u8>,
}

impl SseFrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport read; returns payloads of the frames it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some((end, delimiter_len)) = find_delimiter(&self.buf) {
            let frame: Vec<u8> = self.buf.drain(..end + delimiter_len).take(end).collect();
            if let Some(payload) = frame_payload(&frame) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Bytes held for a frame that has not been terminated yet.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    /// Drop any trailing partial frame, returning how many bytes were discarded.
    pub fn discard(&mut self) -> usize {
        let discarded = self.buf.len();
        self.buf = Vec::new();
        discarded
    }
}

/// Earliest frame delimiter: `\n\n` or `\r\n\r\n`. Returns (frame end, delimiter length).
fn find_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|i| (i, 2));
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| (i, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
        (a, b) => a.or(b),
    }
}

/// Join the frame's `data:` lines. Comment lines (`:`) and other fields are ignored.
fn frame_payload(frame: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(frame);
    let mut data_lines: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}
