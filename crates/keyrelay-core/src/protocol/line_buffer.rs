//! Splits the inbound byte stream into complete lines.
//!
//! TCP is a stream protocol: one `read()` may return half a line, or several
//! lines at once.  [`LineSplitter`] accumulates bytes and hands out a line
//! only once its `\n` terminator has arrived.
//!
//! The buffer is bounded.  If the peer sends more than `max_line_len` bytes
//! without a terminator, the first `max_line_len` bytes are surfaced as a line
//! of their own and splitting continues with the rest.

use tracing::warn;

use crate::protocol::codec::decode_line;
use crate::protocol::messages::{InboundLine, DEFAULT_MAX_LINE_LEN};

/// Streaming line splitter for peer log output.
#[derive(Debug, Clone)]
pub struct LineSplitter {
    buf: Vec<u8>,
    max_line_len: usize,
}

impl LineSplitter {
    /// Creates a splitter that surfaces lines of at most `max_line_len` bytes
    /// (terminator excluded).  A limit of zero is raised to one.
    pub fn new(max_line_len: usize) -> Self {
        Self {
            buf: Vec::with_capacity(1024),
            max_line_len: max_line_len.max(1),
        }
    }

    /// Appends freshly received bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Removes and returns the next complete line, if one is available.
    pub fn next_line(&mut self) -> Option<InboundLine> {
        // Room for a full line plus its CR LF.
        let window = self.buf.len().min(self.max_line_len + 2);
        if let Some(end) = self.buf[..window].iter().position(|&b| b == b'\n') {
            let body = if end > 0 && self.buf[end - 1] == b'\r' {
                end - 1
            } else {
                end
            };
            if body <= self.max_line_len {
                let raw: Vec<u8> = self.buf.drain(..=end).collect();
                return Some(decode_line(&raw));
            }
        }

        // A full-length body whose CR has arrived but whose LF has not.
        if self.buf.len() == self.max_line_len + 1 && self.buf.last() == Some(&b'\r') {
            return None;
        }

        if self.buf.len() > self.max_line_len {
            warn!(
                "inbound line exceeds {} bytes without a terminator; splitting",
                self.max_line_len
            );
            let raw: Vec<u8> = self.buf.drain(..self.max_line_len).collect();
            return Some(decode_line(&raw));
        }

        None
    }

    /// Feeds `bytes` and returns every line completed by them, in order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<InboundLine> {
        self.feed(bytes);
        std::iter::from_fn(|| self.next_line()).collect()
    }

    /// Number of buffered bytes still waiting for a terminator.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    /// Drops any partially received line.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// The configured maximum line length.
    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}
