//! LBP error types.

use thiserror::Error;

/// LBP protocol errors.
///
/// Only the host-facing APIs return these. The interrupt-driven receive path
/// drops malformed frames silently and resynchronizes on the next start
/// marker; nothing is surfaced to the application from there.
#[derive(Error, Debug)]
pub enum Error {
    /// Transmit buffer is claimed or a frame is still flushing to the wire.
    #[error("transmit buffer unavailable")]
    LinkBusy,

    /// Payload too large for the fixed frame buffer.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Payload size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Frame data shorter than the fixed header.
    #[error("frame too short: {len} bytes")]
    FrameTooShort {
        /// Frame data length
        len: usize,
    },

    /// No complete, CRC-valid frame in the input.
    #[error("no valid frame in input")]
    InvalidFrame,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
