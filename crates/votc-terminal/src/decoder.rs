// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental decoding of the relay's streamed body.
//!
//! Chunk boundaries may split a multi-byte character. Bytes of an
//! incomplete trailing sequence are held until the next chunk. The
//! end-of-transmission character marks a clean end and is never shown.

use votc_agent::STREAM_TERMINATOR;

#[derive(Debug, Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
    terminated: bool,
}

/// How a decoded stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEnd {
    /// Text flushed from held bytes at end of input.
    pub trailing: String,
    /// The terminator was seen.
    pub terminated: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the terminator has been decoded.
    pub fn terminated(&self) -> bool {
        self.terminated
    }

    /// Feeds one chunk and returns the newly decodable text.
    ///
    /// Anything after the terminator is discarded.
    pub fn push(&mut self, chunk: &[u8]) -> String {
        if self.terminated {
            return String::new();
        }
        self.pending.extend_from_slice(chunk);

        let mut text = String::new();
        let mut consumed = 0;
        loop {
            match std::str::from_utf8(&self.pending[consumed..]) {
                Ok(valid) => {
                    text.push_str(valid);
                    consumed = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid_end = consumed + e.valid_up_to();
                    // valid_up_to guarantees this range is UTF-8.
                    text.push_str(&String::from_utf8_lossy(&self.pending[consumed..valid_end]));
                    match e.error_len() {
                        Some(bad) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            consumed = valid_end + bad;
                        }
                        None => {
                            consumed = valid_end;
                            break;
                        }
                    }
                }
            }
        }
        self.pending.drain(..consumed);
        self.strip_terminator(text)
    }

    /// Ends the input. Held bytes of an incomplete sequence become U+FFFD.
    pub fn finish(mut self) -> StreamEnd {
        let trailing = if self.terminated || self.pending.is_empty() {
            String::new()
        } else {
            let lossy = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            self.strip_terminator(lossy)
        };
        StreamEnd {
            trailing,
            terminated: self.terminated,
        }
    }

    fn strip_terminator(&mut self, mut text: String) -> String {
        if let Some(at) = text.find(STREAM_TERMINATOR) {
            text.truncate(at);
            self.terminated = true;
            self.pending.clear();
        }
        text
    }
}
