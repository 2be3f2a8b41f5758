//! Decoded LBP packet.
//!
//! A frame's data bytes are decoded into this structured value before
//! dispatch instead of reinterpreting the receive buffer in place.

use bytes::Bytes;

use super::{ADDRESS_MASK, Error, FrameType, HEADER_SIZE, Result, SEQNUM_MASK};

/// Structured header + payload decoded from a frame's data bytes.
///
/// # Wire Format
///
/// ```text
/// [route_info (1)] [reply_route (1)] [command (1)] [payload (0..=29)]
/// ```
///
/// `route_info` packs the 2-bit frame type over the 6-bit source address;
/// `reply_route` packs the 2-bit sequence number over the 6-bit destination
/// address. The CRC byte is a link-layer concern and never appears here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    route_info: u8,
    reply_route: u8,
    command: u8,
    payload: Bytes,
}

impl Packet {
    /// Build a packet from its header fields and payload.
    pub fn new(route_info: u8, reply_route: u8, command: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            route_info,
            reply_route,
            command,
            payload: payload.into(),
        }
    }

    /// Decode a packet from unescaped frame data (header + payload, no CRC).
    ///
    /// The payload is copied out so the underlying receive buffer can be
    /// reused for the next frame immediately.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::FrameTooShort { len: data.len() });
        }

        Ok(Self {
            route_info: data[0],
            reply_route: data[1],
            command: data[2],
            payload: Bytes::copy_from_slice(&data[HEADER_SIZE..]),
        })
    }

    /// Raw `route_info` byte.
    #[must_use]
    pub const fn route_info(&self) -> u8 {
        self.route_info
    }

    /// Raw `reply_route` byte.
    #[must_use]
    pub const fn reply_route(&self) -> u8 {
        self.reply_route
    }

    /// Frame type from the top bits of `route_info`.
    #[must_use]
    pub const fn frame_type(&self) -> FrameType {
        FrameType::from_route(self.route_info)
    }

    /// Sender's 6-bit address from `route_info`.
    #[must_use]
    pub const fn source_address(&self) -> u8 {
        self.route_info & ADDRESS_MASK
    }

    /// Two-bit sequence number from `reply_route`.
    #[must_use]
    pub const fn sequence(&self) -> u8 {
        (self.reply_route & SEQNUM_MASK) >> 6
    }

    /// Destination's 6-bit address from `reply_route`.
    #[must_use]
    pub const fn destination_address(&self) -> u8 {
        self.reply_route & ADDRESS_MASK
    }

    /// Command ID.
    #[must_use]
    pub const fn command(&self) -> u8 {
        self.command
    }

    /// Payload bytes following the header.
    #[must_use]
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fields() {
        let data = [0x05, 0x7F, 0x02, 0xAA, 0xBB];
        let packet = Packet::decode(&data).unwrap();

        assert_eq!(packet.frame_type(), FrameType::Sync);
        assert_eq!(packet.source_address(), 0x05);
        assert_eq!(packet.sequence(), 1);
        assert_eq!(packet.destination_address(), 0x3F);
        assert_eq!(packet.command(), 0x02);
        assert_eq!(packet.payload().as_ref(), &[0xAA, 0xBB]);
    }

    #[test]
    fn test_decode_empty_payload() {
        let packet = Packet::decode(&[0x80 | 0x11, 0x00, 0x06]).unwrap();

        assert_eq!(packet.frame_type(), FrameType::Async);
        assert_eq!(packet.source_address(), 0x11);
        assert!(packet.payload().is_empty());
    }

    #[test]
    fn test_decode_too_short() {
        let result = Packet::decode(&[0x00, 0x01]);
        assert!(matches!(result, Err(Error::FrameTooShort { len: 2 })));
    }
}
