//! LBP protocol core: wire constants, CRC, packet model, reserved commands.

mod crc;
mod error;
mod packet;
mod types;

pub use crc::Crc8;
pub use error::{Error, Result};
pub use packet::Packet;
pub use types::{FrameType, IDENTIFY_ASYNC_REPLY, ReservedCommand, Status};

/// Encoded frame capacity in bytes, including the 3-byte header.
///
/// The receive and transmit buffers each hold exactly one frame of this size;
/// the protocol never has more than one packet in flight per direction.
pub const BUFFER_SIZE: usize = 32;

/// Header size in bytes: route info, reply route, command ID.
pub const HEADER_SIZE: usize = 3;

/// Maximum transmit payload size (buffer capacity minus the header).
pub const MAX_PAYLOAD: usize = BUFFER_SIZE - HEADER_SIZE;

/// Minimum valid frame length: 3-byte header plus the CRC byte.
pub const MIN_FRAME: usize = 4;

/// Mask extracting the frame type bits from `route_info`.
pub const TYPE_MASK: u8 = 0xC0;

/// Mask extracting the sequence number bits from `reply_route`.
pub const SEQNUM_MASK: u8 = 0xC0;

/// Mask extracting a 6-bit node address from either routing byte.
pub const ADDRESS_MASK: u8 = 0x3F;

/// Default source address stamped into outgoing frames.
pub const SOURCE_ADDRESS: u8 = 0x3F;

/// Command IDs below this value are reserved to the protocol layer.
pub const RESERVED_LIMIT: u8 = 0x10;
