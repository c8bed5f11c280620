//! Newline framing over arbitrary read chunks.

use super::TelemetryFrame;

/// Longest partial line kept between reads. A peer that never sends a
/// newline cannot grow the buffer without bound.
pub const MAX_LINE_LEN: usize = 1 << 20;

/// Splits a byte stream into lines, carrying partial lines across chunks.
#[derive(Debug, Default)]
pub struct LineDecoder {
    pending: Vec<u8>,
    dropped: u64,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed. Invalid UTF-8 is
    /// replaced, never rejected.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            lines.push(String::from_utf8_lossy(&self.pending[start..end]).into_owned());
            start = end + 1;
        }
        self.pending.drain(..start);

        if self.pending.len() > MAX_LINE_LEN {
            self.dropped += 1;
            self.pending.clear();
        }
        lines
    }

    /// Append a chunk and return the frames it completed, skipping lines
    /// that do not parse.
    pub fn push_frames(&mut self, chunk: &[u8]) -> Vec<TelemetryFrame> {
        self.push(chunk).iter().filter_map(|line| TelemetryFrame::parse_line(line)).collect()
    }

    /// Bytes buffered towards the next line.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of oversized partial lines discarded.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Forget any partial line, e.g. after a reconnect.
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}
