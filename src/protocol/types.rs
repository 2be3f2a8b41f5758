//! LBP frame types, reserved commands, and the status report byte.

use std::fmt;

use super::TYPE_MASK;

/// Frame type carried in the top two bits of `route_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    /// Request expecting a synchronous reply
    Sync = 0x00,
    /// Response to a `Sync` request
    Reply = 0x40,
    /// Fire-and-forget notification, no reply expected
    Async = 0x80,
    /// Reserved; not actively produced by this node
    Broadcast = 0xC0,
}

impl FrameType {
    /// Extract the frame type from a `route_info` byte.
    #[must_use]
    pub const fn from_route(route_info: u8) -> Self {
        match route_info & TYPE_MASK {
            0x00 => Self::Sync,
            0x40 => Self::Reply,
            0x80 => Self::Async,
            _ => Self::Broadcast,
        }
    }

    /// Type bits, positioned for OR-ing into a `route_info` byte.
    #[must_use]
    pub const fn as_bits(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sync => "Sync",
            Self::Reply => "Reply",
            Self::Async => "Async",
            Self::Broadcast => "Broadcast",
        };
        write!(f, "{name}")
    }
}

/// Command ID of an asynchronous identify reply.
///
/// Shares the value `0x03` with [`ReservedCommand::ExtendedIdentify`]: in a
/// `Reply` or `Async` frame the byte means "identify reply", in a `Sync`
/// request it means "extended identify". The frame type disambiguates.
pub const IDENTIFY_ASYNC_REPLY: u8 = 0x03;

/// Reserved command IDs (`< 0x10`) implemented by the protocol layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReservedCommand {
    /// Negative acknowledgement / "not supported"
    Nack = 0x01,
    /// Basic identification request
    Identify = 0x02,
    /// Paged identification request (sync only)
    ExtendedIdentify = 0x03,
    /// Discovery probe; this node opts out
    NetworkDiscovery = 0x04,
    /// Asynchronous discovery reply (not produced by this node)
    NetworkDiscoveryAsyncReply = 0x05,
    /// Armed/error status request
    StatusRequest = 0x06,
    /// Asynchronous status reply
    StatusRequestAsyncReply = 0x07,
}

impl ReservedCommand {
    /// Convert from a command byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Nack),
            0x02 => Some(Self::Identify),
            0x03 => Some(Self::ExtendedIdentify),
            0x04 => Some(Self::NetworkDiscovery),
            0x05 => Some(Self::NetworkDiscoveryAsyncReply),
            0x06 => Some(Self::StatusRequest),
            0x07 => Some(Self::StatusRequestAsyncReply),
            _ => None,
        }
    }

    /// Convert to the command byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ReservedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nack => "Nack",
            Self::Identify => "Identify",
            Self::ExtendedIdentify => "ExtendedIdentify",
            Self::NetworkDiscovery => "NetworkDiscovery",
            Self::NetworkDiscoveryAsyncReply => "NetworkDiscoveryAsyncReply",
            Self::StatusRequest => "StatusRequest",
            Self::StatusRequestAsyncReply => "StatusRequestAsyncReply",
        };
        write!(f, "{name}")
    }
}

/// Status report byte answered to [`ReservedCommand::StatusRequest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    /// Protocol marker bit, always set in a status report.
    pub const MARKER: u8 = 1 << 4;
    /// Set when the flight state machine reports an error condition.
    pub const ERROR: u8 = 2 << 1;
    /// Set when the recovery system is armed.
    pub const ARMED: u8 = 1;

    /// Compose a status byte from the collaborator queries.
    #[must_use]
    pub const fn new(error: bool, armed: bool) -> Self {
        let mut byte = Self::MARKER;
        if error {
            byte |= Self::ERROR;
        }
        if armed {
            byte |= Self::ARMED;
        }
        Self(byte)
    }

    /// Convert to the wire byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Check if a status flag is set.
    #[must_use]
    pub const fn has(self, flag: u8) -> bool {
        (self.0 & flag) != 0
    }
}
