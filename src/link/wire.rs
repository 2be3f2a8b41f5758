//! Byte-level wire abstraction below the framer.
//!
//! The transport is an asynchronous serial line (8N1, fixed baud); the link
//! layer only ever sees "write one byte" going out and one interrupt per byte
//! coming in, so that single write is the whole contract.

use bytes::{BufMut, Bytes, BytesMut};

/// Hardware write primitive consumed by the transmit path.
///
/// Called once per byte: synchronously for the start marker when a send
/// begins, then from the transmit-complete event for every following byte.
/// Implementations write to the UART data register (or equivalent) and must
/// not block.
pub trait Wire {
    /// Write one byte to the wire.
    fn write_byte(&mut self, byte: u8);
}

/// In-memory wire capturing everything the framer emits.
///
/// Backs the tests and benches, and doubles as a host-side fixture for
/// embedders exercising their command handlers without hardware.
#[derive(Debug, Default)]
pub struct LoopbackWire {
    sent: BytesMut,
}

impl LoopbackWire {
    /// Create an empty capture wire.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    #[must_use]
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    /// Take the captured bytes, leaving the wire empty.
    pub fn take(&mut self) -> Bytes {
        self.sent.split().freeze()
    }
}

impl Wire for LoopbackWire {
    fn write_byte(&mut self, byte: u8) {
        self.sent.put_u8(byte);
    }
}
