//! Transmit-path framer and buffer ownership.

use crate::protocol::{BUFFER_SIZE, Crc8, HEADER_SIZE};

use super::{CHAR_ESCAPE, CHAR_START, CHAR_STOP, Wire, needs_escape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TxState {
    /// Buffer free, nothing queued.
    Idle,
    /// Buffer claimed by a producer, not yet queued for send.
    Filling,
    /// Streaming header and payload bytes.
    Frame,
    /// An escape marker went out; the literal byte is still owed.
    Escaping {
        /// The byte whose complement goes out on the next event.
        byte: u8,
        /// Whether that byte is the trailing CRC.
        last: bool,
    },
    /// CRC sent; the stop marker is next.
    Ending,
}

/// Transmit state machine: one frame buffer drained a byte per
/// transmit-complete event.
///
/// Ownership of the buffer moves `Idle -> Filling` on a successful claim,
/// `Filling -> Frame` when the send starts, and back to `Idle` once the stop
/// marker is on the wire or the holder discards. The claim itself must run
/// inside the interrupt mask; everything else is single-owner by
/// construction.
#[derive(Debug)]
pub(crate) struct Framer {
    state: TxState,
    buffer: [u8; BUFFER_SIZE],
    length: usize,
    cursor: usize,
    crc: Crc8,
}

impl Framer {
    pub(crate) fn new() -> Self {
        Self {
            state: TxState::Idle,
            buffer: [0; BUFFER_SIZE],
            length: 0,
            cursor: 0,
            crc: Crc8::new(),
        }
    }

    /// Idle -> Filling test-and-set. Caller holds the interrupt mask.
    pub(crate) fn try_claim(&mut self) -> bool {
        if self.state == TxState::Idle {
            self.state = TxState::Filling;
            true
        } else {
            false
        }
    }

    /// Release a `Filling` buffer without sending. No-op in any other state,
    /// so dropping a slot after `send` never disturbs a frame in flight.
    pub(crate) fn discard(&mut self) {
        if self.state == TxState::Filling {
            self.state = TxState::Idle;
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.state == TxState::Idle
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut [u8; BUFFER_SIZE] {
        &mut self.buffer
    }

    /// Queue the filled buffer and write the start marker.
    ///
    /// This is the only synchronous wire write outside the transmit event;
    /// the transmit line is known idle because the buffer was `Filling`.
    pub(crate) fn begin(&mut self, payload_len: usize, wire: &mut dyn Wire) {
        debug_assert_eq!(self.state, TxState::Filling, "send without a claim");
        self.length = payload_len + HEADER_SIZE;
        self.cursor = 0;
        self.crc.reset();
        wire.write_byte(CHAR_START);
        self.state = TxState::Frame;
    }

    /// Advance the state machine on a transmit-complete event.
    pub(crate) fn on_byte_sent(&mut self, wire: &mut dyn Wire) {
        match self.state {
            TxState::Idle | TxState::Filling => {}
            TxState::Ending => {
                wire.write_byte(CHAR_STOP);
                self.state = TxState::Idle;
            }
            TxState::Escaping { byte, last } => {
                wire.write_byte(!byte);
                self.state = if last { TxState::Ending } else { TxState::Frame };
            }
            TxState::Frame => {
                if self.cursor < self.length {
                    let byte = self.buffer[self.cursor];
                    self.cursor += 1;
                    self.crc.update(byte);
                    if needs_escape(byte) {
                        wire.write_byte(CHAR_ESCAPE);
                        self.state = TxState::Escaping { byte, last: false };
                    } else {
                        wire.write_byte(byte);
                    }
                } else {
                    let crc = self.crc.value();
                    if needs_escape(crc) {
                        wire.write_byte(CHAR_ESCAPE);
                        self.state = TxState::Escaping {
                            byte: crc,
                            last: true,
                        };
                    } else {
                        wire.write_byte(crc);
                        self.state = TxState::Ending;
                    }
                }
            }
        }
    }
}
