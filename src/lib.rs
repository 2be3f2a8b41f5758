//! LBP (Launch Box Protocol) - framed serial link layer for rocket
//! flight-recovery controllers
//!
//! This library implements the communication subsystem of a recovery
//! controller: a byte-oriented framer/deframer with escaping and CRC
//! protection, a single-buffer-per-direction ownership model, and a
//! request/reply packet dispatcher with reserved system commands and an
//! application extension point.
//!
//! # Quick Start
//!
//! ```rust
//! use lbp::{CommandHandler, FlightStatus, Link, LinkConfig, NoMask, Packet, TxSlot};
//! use lbp::link::LoopbackWire;
//!
//! struct Flight;
//! impl FlightStatus for Flight {
//!     fn error_state(&self) -> bool { false }
//!     fn armed_state(&self) -> bool { true }
//! }
//!
//! struct App;
//! impl CommandHandler for App {
//!     fn handle(&mut self, request: &Packet, reply: TxSlot<'_>) {
//!         // Answer application commands here; unanswered requests are
//!         // released by the slot's drop.
//!         let _ = request;
//!         reply.discard();
//!     }
//! }
//!
//! let mut link = Link::new(LoopbackWire::new(), NoMask, LinkConfig::new());
//!
//! // Wire the serial interrupts to the two entry points:
//! link.on_byte_received(0x55, &Flight, &mut App);
//! link.on_byte_sent();
//! ```
//!
//! # Design
//!
//! - **One frame in flight per direction** - single fixed receive and
//!   transmit buffers, no queueing; a busy transmit buffer is backpressure
//!   and the triggering request is dropped.
//! - **Interrupt-driven state machines** - both paths advance one byte per
//!   event and never block; packet dispatch runs synchronously inside the
//!   receive path.
//! - **CRC-8 framing** - start/stop delimited frames with marker escaping
//!   and a rolling CRC; corrupt frames are dropped silently and the link
//!   resynchronizes on the next start marker.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod device;
pub mod link;
pub mod protocol;

pub use link::{
    CommandHandler, FlightStatus, Identity, InterruptMask, Link, LinkConfig, NoMask, TxSlot, Wire,
    decode_frame, encode_frame,
};
pub use protocol::{
    BUFFER_SIZE, Error, FrameType, MAX_PAYLOAD, Packet, ReservedCommand, Result, SOURCE_ADDRESS,
    Status,
};

/// LBP protocol version implemented by this crate.
pub const VERSION: &str = "0.1.0";
