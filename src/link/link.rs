//! The link context: interrupt entry points, buffer claiming, and the
//! packet dispatcher with its reserved command table.

use tracing::{debug, trace};

use crate::protocol::{
    ADDRESS_MASK, Error, FrameType, HEADER_SIZE, IDENTIFY_ASYNC_REPLY, MAX_PAYLOAD, Packet,
    RESERVED_LIMIT, ReservedCommand, Result, SOURCE_ADDRESS, Status,
};

use super::rx::Deframer;
use super::tx::Framer;
use super::{InterruptMask, Wire};

/// Identification contents answered to identify requests.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Two identification bytes: device class and major/minor version.
    pub ident: [u8; 2],
    /// Extended identification page 0 contents.
    pub extended_ident: [u8; 2],
    /// Human-readable device name, answered on extended identify page 1.
    pub name: &'static str,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            // identification code 0x000B, major version 0; minor 0, stable
            ident: [0xB0, 0x01],
            extended_ident: [0x0B, 0x00],
            name: "SRP V0.0",
        }
    }
}

/// Link configuration.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// This node's 6-bit source address, stamped into every outgoing frame.
    pub address: u8,
    /// Identification contents.
    pub identity: Identity,
}

impl LinkConfig {
    /// Configuration with the default source address and identity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            address: SOURCE_ADDRESS,
            identity: Identity::default(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Armed/error queries supplied by the flight state machine.
///
/// Polled only while answering a status request; never cached by the link.
pub trait FlightStatus {
    /// Whether the controller is in an error state.
    fn error_state(&self) -> bool;
    /// Whether the recovery system is armed.
    fn armed_state(&self) -> bool;
}

/// Application command callback for IDs outside the reserved range.
///
/// Invoked synchronously from the receive path, still at interrupt priority,
/// for `Sync` frames with `command >= 0x10`. The reply slot arrives with the
/// destination route and the `Reply` frame type already set; the handler
/// fills in the command ID and payload and must [`TxSlot::send`] or
/// [`TxSlot::discard`] it before returning. Handlers must not block: the
/// receive line is effectively deaf while they run.
pub trait CommandHandler {
    /// Handle one application request.
    fn handle(&mut self, request: &Packet, reply: TxSlot<'_>);
}

/// Exclusive write access to the claimed transmit buffer.
///
/// Obtained from [`Link::claim`] or handed to a [`CommandHandler`]. Exactly
/// one slot exists at a time; dropping it without sending releases the buffer,
/// so an abandoned reply never wedges the link.
pub struct TxSlot<'a> {
    framer: &'a mut Framer,
    wire: &'a mut dyn Wire,
}

impl TxSlot<'_> {
    /// Set the destination address and echo the request's sequence number.
    pub fn set_destination(&mut self, address: u8, sequence: u8) {
        self.framer.buffer_mut()[1] = ((sequence & 0x03) << 6) | (address & ADDRESS_MASK);
    }

    /// OR the frame type bits into the route info.
    pub fn set_frame_type(&mut self, frame_type: FrameType) {
        self.framer.buffer_mut()[0] |= frame_type.as_bits();
    }

    /// Set the command ID.
    pub fn set_command(&mut self, command: u8) {
        self.framer.buffer_mut()[2] = command;
    }

    /// Writable payload area of the buffer.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.framer.buffer_mut()[HEADER_SIZE..]
    }

    /// Copy a payload into the buffer.
    ///
    /// # Panics
    ///
    /// Panics when the payload exceeds [`MAX_PAYLOAD`]; outgoing
    /// messages are composed by this node and may not exceed the frame.
    pub fn write_payload(&mut self, payload: &[u8]) {
        assert!(payload.len() <= MAX_PAYLOAD, "payload exceeds frame capacity");
        self.payload_mut()[..payload.len()].copy_from_slice(payload);
    }

    /// Queue the message for transmission and release the slot.
    ///
    /// Writes the start marker to the wire immediately; the remaining bytes
    /// drain from the transmit-complete events.
    ///
    /// # Panics
    ///
    /// Panics when `payload_len` exceeds [`MAX_PAYLOAD`].
    pub fn send(self, payload_len: usize) {
        assert!(payload_len <= MAX_PAYLOAD, "payload exceeds frame capacity");
        let mut slot = self;
        slot.framer.begin(payload_len, &mut *slot.wire);
    }

    /// Release the buffer without transmitting.
    pub fn discard(self) {
        // Drop does the work.
    }
}

impl Drop for TxSlot<'_> {
    fn drop(&mut self) {
        // Releases a still-Filling buffer; a queued frame is left alone.
        self.framer.discard();
    }
}

/// The owned link context.
///
/// Owns both framer state machines, the wire, the interrupt mask, and the
/// configuration. The embedder wires exactly two entry points to its serial
/// interrupts: [`Link::on_byte_received`] and [`Link::on_byte_sent`].
/// Foreground code uses [`Link::claim`] to push unsolicited `Async`
/// notifications.
#[derive(Debug)]
pub struct Link<W, M> {
    wire: W,
    mask: M,
    config: LinkConfig,
    rx: Deframer,
    tx: Framer,
}

impl<W: Wire, M: InterruptMask> Link<W, M> {
    /// Create an idle link over the given wire.
    pub fn new(wire: W, mask: M, config: LinkConfig) -> Self {
        Self {
            wire,
            mask,
            config,
            rx: Deframer::new(),
            tx: Framer::new(),
        }
    }

    /// Receive-interrupt entry point: feed one wire byte.
    ///
    /// When the byte completes a CRC-valid frame the packet is decoded and
    /// dispatched synchronously before this returns, including the reserved
    /// command table and, for application IDs, the handler callback.
    pub fn on_byte_received<S, H>(&mut self, byte: u8, status: &S, handler: &mut H)
    where
        S: FlightStatus,
        H: CommandHandler,
    {
        let Some(payload_len) = self.rx.push(byte) else {
            return;
        };
        let data_len = HEADER_SIZE + payload_len;
        let packet = match Packet::decode(&self.rx.frame()[..data_len]) {
            Ok(packet) => packet,
            Err(_) => return,
        };
        self.dispatch(&packet, status, handler);
    }

    /// Transmit-interrupt entry point: a byte finished sending.
    pub fn on_byte_sent(&mut self) {
        self.tx.on_byte_sent(&mut self.wire);
    }

    /// Claim the transmit buffer for an outgoing message.
    ///
    /// Atomic with respect to the transmit interrupt; fails with
    /// [`Error::LinkBusy`] while the buffer is claimed or a frame is still
    /// flushing. Callers treat that as backpressure and drop or retry their
    /// own request; the link never queues a second packet.
    pub fn claim(&mut self) -> Result<TxSlot<'_>> {
        let claimed = self.mask.with_masked(|| self.tx.try_claim());
        if !claimed {
            return Err(Error::LinkBusy);
        }
        self.tx.buffer_mut()[0] = self.config.address & ADDRESS_MASK;
        Ok(TxSlot {
            framer: &mut self.tx,
            wire: &mut self.wire,
        })
    }

    /// Whether the transmit path is idle (unclaimed and fully flushed).
    #[must_use]
    pub fn transmit_idle(&self) -> bool {
        self.tx.is_idle()
    }

    /// Access the wire, e.g. to drain a loopback capture in tests.
    pub fn wire_mut(&mut self) -> &mut W {
        &mut self.wire
    }

    /// Interpret a verified packet and produce any reply.
    fn dispatch<S, H>(&mut self, packet: &Packet, status: &S, handler: &mut H)
    where
        S: FlightStatus,
        H: CommandHandler,
    {
        let identity = self.config.identity.clone();

        // Acquire the reply buffer up front; without one the request is
        // dropped entirely rather than stalling the receive path.
        let Ok(mut reply) = self.claim() else {
            debug!(command = packet.command(), "transmit busy, dropping request");
            return;
        };
        reply.set_destination(packet.source_address(), packet.sequence());

        let frame_type = packet.frame_type();
        let sync = frame_type == FrameType::Sync;

        // This node issues no requests at this layer, so replies to it are
        // not acted upon.
        if frame_type == FrameType::Reply {
            reply.discard();
            return;
        }

        if packet.command() >= RESERVED_LIMIT {
            if sync {
                reply.set_frame_type(FrameType::Reply);
                trace!(command = packet.command(), "forwarding to application");
                handler.handle(packet, reply);
            } else {
                reply.discard();
            }
            return;
        }

        match ReservedCommand::from_u8(packet.command()) {
            Some(ReservedCommand::Nack) => reply.discard(),

            Some(ReservedCommand::Identify) => {
                if sync {
                    reply.set_frame_type(FrameType::Reply);
                    reply.set_command(ReservedCommand::Identify.as_u8());
                } else {
                    reply.set_frame_type(FrameType::Async);
                    reply.set_command(IDENTIFY_ASYNC_REPLY);
                }
                reply.write_payload(&identity.ident);
                reply.send(identity.ident.len());
            }

            Some(ReservedCommand::ExtendedIdentify) => {
                // Synchronous only; an async frame with this ID would be an
                // identify reply from elsewhere anyway.
                if !sync {
                    reply.discard();
                    return;
                }
                reply.set_frame_type(FrameType::Reply);

                let page = packet.payload().first().copied().unwrap_or(0);
                if page >= RESERVED_LIMIT {
                    reply.set_command(ReservedCommand::Nack.as_u8());
                    reply.send(0);
                    return;
                }

                reply.set_command(ReservedCommand::ExtendedIdentify.as_u8());
                match page {
                    0 => {
                        reply.write_payload(&identity.extended_ident);
                        reply.send(identity.extended_ident.len());
                    }
                    1 => {
                        let name = identity.name.as_bytes();
                        reply.write_payload(name);
                        reply.send(name.len());
                    }
                    // Unassigned pages below the reserved bound answer with
                    // an empty payload, keeping the command ID.
                    _ => reply.send(0),
                }
            }

            Some(ReservedCommand::NetworkDiscovery) => {
                if sync {
                    reply.set_frame_type(FrameType::Reply);
                    reply.set_command(ReservedCommand::Nack.as_u8());
                    reply.send(0);
                } else {
                    reply.discard();
                }
            }

            Some(ReservedCommand::StatusRequest) => {
                if sync {
                    reply.set_frame_type(FrameType::Reply);
                    reply.set_command(ReservedCommand::StatusRequest.as_u8());
                } else {
                    reply.set_frame_type(FrameType::Async);
                    reply.set_command(ReservedCommand::StatusRequestAsyncReply.as_u8());
                }
                let report = Status::new(status.error_state(), status.armed_state());
                reply.payload_mut()[0] = report.as_u8();
                reply.send(1);
            }

            // Remaining reserved IDs are unsupported here.
            _ => {
                if sync {
                    reply.set_frame_type(FrameType::Reply);
                    reply.set_command(ReservedCommand::Nack.as_u8());
                    reply.send(0);
                } else {
                    reply.discard();
                }
            }
        }
    }
}
