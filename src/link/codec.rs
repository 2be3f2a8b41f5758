//! Host-side frame codec.
//!
//! Pure encode/decode helpers for peers speaking to a controller from the
//! host side (configuration tools, test fixtures). The controller itself
//! streams frames through the interrupt-driven state machines in
//! [`rx`](super::rx) and [`tx`](super::tx); these functions produce and
//! consume the same wire format in one call.

use crate::protocol::{Crc8, Error, MAX_PAYLOAD, Packet, Result};

use super::rx::Deframer;
use super::{CHAR_ESCAPE, CHAR_START, CHAR_STOP, needs_escape};

fn push_escaped(out: &mut Vec<u8>, byte: u8) {
    if needs_escape(byte) {
        out.push(CHAR_ESCAPE);
        out.push(!byte);
    } else {
        out.push(byte);
    }
}

/// Encode a complete wire frame.
///
/// # Format
///
/// ```text
/// START [route_info] [reply_route] [command] [payload...] [crc] STOP
/// ```
///
/// with every marker collision in the data and CRC escaped.
///
/// # Errors
///
/// Returns [`Error::PayloadTooLarge`] when the payload exceeds the fixed
/// frame capacity.
pub fn encode_frame(
    route_info: u8,
    reply_route: u8,
    command: u8,
    payload: &[u8],
) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD {
        return Err(Error::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let mut crc = Crc8::new();
    // Worst case every byte is escaped.
    let mut out = Vec::with_capacity(2 * (payload.len() + 4) + 2);

    out.push(CHAR_START);
    for byte in [route_info, reply_route, command]
        .into_iter()
        .chain(payload.iter().copied())
    {
        crc.update(byte);
        push_escaped(&mut out, byte);
    }
    push_escaped(&mut out, crc.value());
    out.push(CHAR_STOP);

    Ok(out)
}

/// Decode the first valid frame in a byte slice.
///
/// Runs the receive deframer over the input, so framing semantics (escaping,
/// CRC, abort-on-nested-start) match the controller exactly.
///
/// # Errors
///
/// Returns [`Error::InvalidFrame`] when no complete, CRC-valid frame is
/// present.
pub fn decode_frame(bytes: &[u8]) -> Result<Packet> {
    let mut deframer = Deframer::new();
    for &byte in bytes {
        if let Some(payload_len) = deframer.push(byte) {
            let data_len = crate::protocol::HEADER_SIZE + payload_len;
            return Packet::decode(&deframer.frame()[..data_len]);
        }
    }
    Err(Error::InvalidFrame)
}
