//! Streaming extraction of brace-delimited telemetry frames.
//!
//! The device writes JSON objects back to back, sometimes interleaved with
//! boot messages or other noise, and the serial driver hands them over in
//! arbitrarily sized pieces. [`FrameExtractor`] buffers those pieces and
//! yields each complete `{ ... }` object once its outermost closing brace
//! has arrived.

use tracing::{trace, warn};

const OPEN: u8 = b'{';
const CLOSE: u8 = b'}';

/// Default cap on a single unfinished frame before it is thrown away.
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024;

/// Accumulates raw bytes and splits them into frames.
///
/// Bytes that are not part of a frame are dropped. When the buffer holds no
/// opening brace at all it is discarded entirely, so noise never accumulates.
#[derive(Debug)]
pub struct FrameExtractor {
    buffer: Vec<u8>,
    /// Scan position inside an in-progress frame; 0 when no frame has started.
    cursor: usize,
    depth: usize,
    max_frame_len: usize,
    /// Set while the rest of an oversized frame is being thrown away.
    skipping: bool,
}

impl FrameExtractor {
    pub fn new() -> Self {
        Self::with_max_frame_len(DEFAULT_MAX_FRAME_LEN)
    }

    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
            depth: 0,
            max_frame_len,
            skipping: false,
        }
    }

    /// Append freshly read bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Pull every complete frame out of the buffer, keeping a trailing partial one.
    ///
    /// Frames longer than the configured maximum are dropped whole, however
    /// the stream was split into reads.
    pub fn drain(&mut self) -> Vec<String> {
        let mut frames = Vec::new();

        loop {
            if self.skipping {
                match self.scan() {
                    Some(end) => {
                        self.buffer.drain(..=end);
                        self.skipping = false;
                    }
                    None => {
                        self.buffer.clear();
                        self.cursor = 0;
                        break;
                    }
                }
            }

            if self.cursor == 0 && !self.align_to_frame_start() {
                break;
            }

            match self.scan() {
                Some(end) if end >= self.max_frame_len => {
                    warn!(
                        "Discarding frame of {} bytes (limit {})",
                        end + 1,
                        self.max_frame_len
                    );
                    self.buffer.drain(..=end);
                }
                Some(end) => {
                    let frame: Vec<u8> = self.buffer.drain(..=end).collect();
                    frames.push(String::from_utf8_lossy(&frame).into_owned());
                }
                None => {
                    if self.buffer.len() > self.max_frame_len {
                        warn!(
                            "Discarding unterminated frame of {} bytes (limit {})",
                            self.buffer.len(),
                            self.max_frame_len
                        );
                        // Depth is kept so the frame's tail is consumed, not parsed.
                        self.buffer.clear();
                        self.cursor = 0;
                        self.skipping = true;
                    }
                    break;
                }
            }
        }

        frames
    }

    /// Forget everything buffered, e.g. after the link was reopened.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.depth = 0;
        self.skipping = false;
    }

    /// Number of bytes held for the next `drain`.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drop leading noise so the buffer starts at an opening brace.
    /// Returns false (with the buffer emptied) when there is no opening brace.
    fn align_to_frame_start(&mut self) -> bool {
        match self.buffer.iter().position(|&b| b == OPEN) {
            Some(0) => true,
            Some(start) => {
                trace!(noise = %hex::encode(&self.buffer[..start]), "Dropping bytes before frame start");
                self.buffer.drain(..start);
                true
            }
            None => {
                if !self.buffer.is_empty() {
                    trace!(noise = %hex::encode(&self.buffer), "Dropping buffer without frame start");
                    self.buffer.clear();
                }
                false
            }
        }
    }

    /// Continue depth tracking from the cursor; returns the index of the
    /// closing brace that ends the frame, if it has arrived.
    fn scan(&mut self) -> Option<usize> {
        while self.cursor < self.buffer.len() {
            let index = self.cursor;
            self.cursor += 1;

            match self.buffer[index] {
                OPEN => self.depth += 1,
                CLOSE => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        self.cursor = 0;
                        return Some(index);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new()
    }
}
