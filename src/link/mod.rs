//! LBP link layer: framing, buffer ownership, and packet dispatch.

mod codec;
mod link;
mod mask;
mod rx;
mod tx;
mod wire;

pub use codec::{decode_frame, encode_frame};
pub use link::{CommandHandler, FlightStatus, Identity, Link, LinkConfig, TxSlot};
pub use mask::{InterruptMask, NoMask};
pub use rx::Deframer;
pub use wire::{LoopbackWire, Wire};

/// Start-of-frame marker byte.
pub const CHAR_START: u8 = 0x55;

/// End-of-frame marker byte.
pub const CHAR_STOP: u8 = 0x5A;

/// Escape marker byte; the following wire byte is the complement of the
/// escaped data byte.
pub const CHAR_ESCAPE: u8 = 0x50;

/// Whether a data or CRC byte collides with a marker and must be escaped.
#[must_use]
pub const fn needs_escape(byte: u8) -> bool {
    byte == CHAR_START || byte == CHAR_STOP || byte == CHAR_ESCAPE
}
