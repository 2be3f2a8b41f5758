//! Receive-path deframer.

use tracing::trace;

use crate::protocol::{BUFFER_SIZE, Crc8, MIN_FRAME};

use super::{CHAR_ESCAPE, CHAR_START, CHAR_STOP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxState {
    Idle,
    Frame,
    Escaping,
}

/// Receive state machine: wire bytes in, verified frames out.
///
/// Driven one byte at a time from the receive interrupt. The internal buffer
/// is owned by this path while a frame accumulates; when [`Deframer::push`]
/// reports a completed frame the caller must consume [`Deframer::frame`]
/// before feeding the next byte, which may begin overwriting it.
#[derive(Debug)]
pub struct Deframer {
    state: RxState,
    buffer: [u8; BUFFER_SIZE],
    length: usize,
    crc: Crc8,
}

impl Default for Deframer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deframer {
    /// Create an idle deframer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RxState::Idle,
            buffer: [0; BUFFER_SIZE],
            length: 0,
            crc: Crc8::new(),
        }
    }

    /// Feed one wire byte; returns the payload length when a frame completes.
    ///
    /// A completed frame has already passed the CRC and minimum-length
    /// checks. Malformed input (nested start marker, CRC mismatch, truncated
    /// frame, buffer overflow) drops the frame in progress and resynchronizes
    /// silently; the link self-heals on the next well-formed frame.
    pub fn push(&mut self, byte: u8) -> Option<usize> {
        match self.state {
            RxState::Escaping => {
                self.state = RxState::Frame;
                self.append(!byte);
                None
            }
            RxState::Frame => match byte {
                CHAR_ESCAPE => {
                    self.state = RxState::Escaping;
                    None
                }
                CHAR_START => {
                    // A start marker inside a frame means the frame in
                    // progress is malformed. Drop it and resynchronize.
                    trace!("start marker inside frame, dropping");
                    self.state = RxState::Idle;
                    None
                }
                CHAR_STOP => {
                    self.state = RxState::Idle;
                    if self.crc.is_valid() && self.length >= MIN_FRAME {
                        Some(self.length - MIN_FRAME)
                    } else {
                        trace!(length = self.length, "frame failed validation, dropping");
                        None
                    }
                }
                _ => {
                    self.append(byte);
                    None
                }
            },
            RxState::Idle => {
                if byte == CHAR_START {
                    self.length = 0;
                    self.crc.reset();
                    self.state = RxState::Frame;
                }
                None
            }
        }
    }

    /// Unescaped frame data (header + payload + CRC) of the completed frame.
    #[must_use]
    pub fn frame(&self) -> &[u8] {
        &self.buffer[..self.length]
    }

    fn append(&mut self, byte: u8) {
        if self.length == BUFFER_SIZE {
            // Buffer exhausted; abandon the frame rather than overflow.
            trace!("receive buffer full, dropping frame");
            self.state = RxState::Idle;
            return;
        }
        self.buffer[self.length] = byte;
        self.length += 1;
        self.crc.update(byte);
    }
}
