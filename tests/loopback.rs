//! End-to-end link tests: encoded request frames in, decoded replies out.

use lbp::link::LoopbackWire;
use lbp::{
    CommandHandler, Error, FlightStatus, FrameType, Link, LinkConfig, NoMask, Packet,
    ReservedCommand, TxSlot, decode_frame, encode_frame,
};

struct Flight {
    error: bool,
    armed: bool,
}

impl FlightStatus for Flight {
    fn error_state(&self) -> bool {
        self.error
    }

    fn armed_state(&self) -> bool {
        self.armed
    }
}

const CALM: Flight = Flight {
    error: false,
    armed: false,
};

/// Handler that records invocations and echoes the request payload.
#[derive(Default)]
struct EchoHandler {
    calls: Vec<Packet>,
}

impl CommandHandler for EchoHandler {
    fn handle(&mut self, request: &Packet, mut reply: TxSlot<'_>) {
        self.calls.push(request.clone());
        reply.set_command(request.command());
        reply.write_payload(request.payload());
        reply.send(request.payload().len());
    }
}

fn new_link() -> Link<LoopbackWire, NoMask> {
    Link::new(LoopbackWire::new(), NoMask, LinkConfig::new())
}

/// Feed a wire frame into the link, flush any reply, and decode it.
fn exchange(
    link: &mut Link<LoopbackWire, NoMask>,
    flight: &Flight,
    handler: &mut impl CommandHandler,
    wire_frame: &[u8],
) -> Option<Packet> {
    for &byte in wire_frame {
        link.on_byte_received(byte, flight, handler);
    }
    while !link.transmit_idle() {
        link.on_byte_sent();
    }
    let captured = link.wire_mut().take();
    if captured.is_empty() {
        None
    } else {
        Some(decode_frame(&captured).expect("reply frame should decode"))
    }
}

fn request(frame_type: FrameType, source: u8, sequence: u8, command: u8, payload: &[u8]) -> Vec<u8> {
    let route_info = frame_type.as_bits() | source;
    let reply_route = (sequence << 6) | 0x3F;
    encode_frame(route_info, reply_route, command, payload).unwrap()
}

#[test]
fn identify_sync_replies_with_identification() {
    let mut link = new_link();
    let frame = request(FrameType::Sync, 5, 2, 0x02, &[]);

    let reply = exchange(&mut link, &CALM, &mut EchoHandler::default(), &frame).unwrap();
    assert_eq!(reply.frame_type(), FrameType::Reply);
    assert_eq!(reply.command(), 0x02);
    assert_eq!(reply.payload().as_ref(), &[0xB0, 0x01]);
    // Addressed back to the requester, sequence echoed, our address stamped.
    assert_eq!(reply.destination_address(), 5);
    assert_eq!(reply.sequence(), 2);
    assert_eq!(reply.source_address(), 0x3F);
}

#[test]
fn identify_async_uses_async_reply_id() {
    let mut link = new_link();
    let frame = request(FrameType::Async, 9, 0, 0x02, &[]);

    let reply = exchange(&mut link, &CALM, &mut EchoHandler::default(), &frame).unwrap();
    assert_eq!(reply.frame_type(), FrameType::Async);
    assert_eq!(reply.command(), 0x03);
    assert_eq!(reply.payload().as_ref(), &[0xB0, 0x01]);
}

#[test]
fn extended_identify_reserved_page_nacks() {
    let mut link = new_link();
    let frame = request(FrameType::Sync, 5, 0, 0x03, &[0x10]);

    let reply = exchange(&mut link, &CALM, &mut EchoHandler::default(), &frame).unwrap();
    assert_eq!(reply.frame_type(), FrameType::Reply);
    assert_eq!(reply.command(), ReservedCommand::Nack.as_u8());
    assert!(reply.payload().is_empty());
}

#[test]
fn extended_identify_page_zero_and_name() {
    let mut link = new_link();

    let frame = request(FrameType::Sync, 5, 0, 0x03, &[]);
    let reply = exchange(&mut link, &CALM, &mut EchoHandler::default(), &frame).unwrap();
    assert_eq!(reply.command(), 0x03);
    assert_eq!(reply.payload().as_ref(), &[0x0B, 0x00]);

    let frame = request(FrameType::Sync, 5, 0, 0x03, &[0x01]);
    let reply = exchange(&mut link, &CALM, &mut EchoHandler::default(), &frame).unwrap();
    assert_eq!(reply.payload().as_ref(), b"SRP V0.0");
}

#[test]
fn extended_identify_unassigned_page_keeps_command_id() {
    // Pages 2..=0x0F answer an empty payload under the original command ID,
    // unlike pages >= 0x10 which NACK. Deliberately preserved asymmetry.
    let mut link = new_link();
    let frame = request(FrameType::Sync, 5, 0, 0x03, &[0x07]);

    let reply = exchange(&mut link, &CALM, &mut EchoHandler::default(), &frame).unwrap();
    assert_eq!(reply.command(), 0x03);
    assert!(reply.payload().is_empty());
}

#[test]
fn extended_identify_async_is_discarded() {
    let mut link = new_link();
    let frame = request(FrameType::Async, 5, 0, 0x03, &[0x01]);

    let reply = exchange(&mut link, &CALM, &mut EchoHandler::default(), &frame);
    assert!(reply.is_none());
}

#[test]
fn network_discovery_opts_out() {
    let mut link = new_link();

    let frame = request(FrameType::Sync, 5, 0, 0x04, &[]);
    let reply = exchange(&mut link, &CALM, &mut EchoHandler::default(), &frame).unwrap();
    assert_eq!(reply.command(), ReservedCommand::Nack.as_u8());

    let frame = request(FrameType::Async, 5, 0, 0x04, &[]);
    assert!(exchange(&mut link, &CALM, &mut EchoHandler::default(), &frame).is_none());
}

#[test]
fn status_request_packs_flags() {
    let mut link = new_link();
    let armed = Flight {
        error: false,
        armed: true,
    };

    let frame = request(FrameType::Sync, 5, 0, 0x06, &[]);
    let reply = exchange(&mut link, &armed, &mut EchoHandler::default(), &frame).unwrap();
    assert_eq!(reply.frame_type(), FrameType::Reply);
    assert_eq!(reply.command(), 0x06);
    assert_eq!(reply.payload().as_ref(), &[0x11]);

    let failed = Flight {
        error: true,
        armed: false,
    };
    let reply = exchange(&mut link, &failed, &mut EchoHandler::default(), &frame).unwrap();
    assert_eq!(reply.payload().as_ref(), &[0x14]);
}

#[test]
fn status_request_async_mirrors_type() {
    let mut link = new_link();
    let frame = request(FrameType::Async, 5, 1, 0x06, &[]);

    let reply = exchange(&mut link, &CALM, &mut EchoHandler::default(), &frame).unwrap();
    assert_eq!(reply.frame_type(), FrameType::Async);
    assert_eq!(reply.command(), 0x07);
    assert_eq!(reply.payload().as_ref(), &[0x10]);
}

#[test]
fn unsupported_reserved_command_nacks_sync_only() {
    let mut link = new_link();

    let frame = request(FrameType::Sync, 5, 0, 0x08, &[]);
    let reply = exchange(&mut link, &CALM, &mut EchoHandler::default(), &frame).unwrap();
    assert_eq!(reply.command(), ReservedCommand::Nack.as_u8());

    let frame = request(FrameType::Async, 5, 0, 0x08, &[]);
    assert!(exchange(&mut link, &CALM, &mut EchoHandler::default(), &frame).is_none());
}

#[test]
fn inbound_replies_are_not_answered() {
    let mut link = new_link();
    let mut handler = EchoHandler::default();
    let frame = request(FrameType::Reply, 5, 0, 0x02, &[0xB0, 0x01]);

    assert!(exchange(&mut link, &CALM, &mut handler, &frame).is_none());
    assert!(handler.calls.is_empty());
    // The transmit buffer was released by the discard and is claimable.
    assert!(link.claim().is_ok());
}

#[test]
fn application_command_sync_invokes_handler() {
    let mut link = new_link();
    let mut handler = EchoHandler::default();
    let frame = request(FrameType::Sync, 7, 3, 0x42, &[0xDE, 0xAD]);

    let reply = exchange(&mut link, &CALM, &mut handler, &frame).unwrap();
    assert_eq!(handler.calls.len(), 1);
    assert_eq!(handler.calls[0].command(), 0x42);
    // The reply frame type was pre-set before the handler ran.
    assert_eq!(reply.frame_type(), FrameType::Reply);
    assert_eq!(reply.command(), 0x42);
    assert_eq!(reply.payload().as_ref(), &[0xDE, 0xAD]);
    assert_eq!(reply.destination_address(), 7);
    assert_eq!(reply.sequence(), 3);
}

#[test]
fn application_command_async_is_discarded() {
    let mut link = new_link();
    let mut handler = EchoHandler::default();
    let frame = request(FrameType::Async, 7, 0, 0x42, &[0x01]);

    assert!(exchange(&mut link, &CALM, &mut handler, &frame).is_none());
    assert!(handler.calls.is_empty());
}

#[test]
fn handler_may_discard_without_wedging_the_link() {
    struct Mute;
    impl CommandHandler for Mute {
        fn handle(&mut self, _request: &Packet, reply: TxSlot<'_>) {
            reply.discard();
        }
    }

    let mut link = new_link();
    let frame = request(FrameType::Sync, 7, 0, 0x42, &[]);
    assert!(exchange(&mut link, &CALM, &mut Mute, &frame).is_none());
    assert!(link.claim().is_ok());
}

#[test]
fn busy_transmit_drops_the_request() {
    let mut link = new_link();
    let mut handler = EchoHandler::default();

    // Queue an unsolicited notification but do not flush it yet.
    {
        let mut slot = link.claim().unwrap();
        slot.set_frame_type(FrameType::Async);
        slot.set_destination(1, 0);
        slot.set_command(0x42);
        slot.send(0);
    }

    // The identify request arrives while the transmit buffer is draining:
    // no reply buffer, so the request is dropped entirely.
    let frame = request(FrameType::Sync, 5, 0, 0x02, &[]);
    for &byte in &frame {
        link.on_byte_received(byte, &CALM, &mut handler);
    }
    while !link.transmit_idle() {
        link.on_byte_sent();
    }

    // Only the notification made it to the wire.
    let captured = link.wire_mut().take();
    let sent = decode_frame(&captured).unwrap();
    assert_eq!(sent.command(), 0x42);
    assert_eq!(sent.frame_type(), FrameType::Async);
    assert!(decode_frame(&captured[1..]).is_err());
}

#[test]
fn claim_backpressure_lifecycle() {
    let mut link = new_link();

    // Claim released by drop: a fresh claim succeeds.
    link.claim().unwrap().discard();
    let slot = link.claim().unwrap();
    drop(slot);

    // A queued frame blocks further claims until fully flushed.
    let mut slot = link.claim().unwrap();
    slot.set_frame_type(FrameType::Async);
    slot.set_command(0x42);
    slot.send(0);
    assert!(matches!(link.claim(), Err(Error::LinkBusy)));

    while !link.transmit_idle() {
        link.on_byte_sent();
    }
    assert!(link.claim().is_ok());
}

#[test]
fn aborted_frame_does_not_corrupt_next() {
    let mut link = new_link();
    let mut handler = EchoHandler::default();

    // Begin a frame but never finish it.
    let mut partial = request(FrameType::Sync, 5, 0, 0x02, &[]);
    partial.truncate(3);
    for &byte in &partial {
        link.on_byte_received(byte, &CALM, &mut handler);
    }

    // The next frame's start marker is consumed aborting the partial frame,
    // so that frame is lost without a dispatch and without a reply.
    let frame = request(FrameType::Sync, 6, 1, 0x02, &[]);
    assert!(exchange(&mut link, &CALM, &mut handler, &frame).is_none());

    // The link has resynchronized: the following frame is answered.
    let reply = exchange(&mut link, &CALM, &mut handler, &frame).unwrap();
    assert_eq!(reply.command(), 0x02);
    assert_eq!(reply.destination_address(), 6);
    assert_eq!(reply.sequence(), 1);
}

#[test]
fn outbound_notification_roundtrip() {
    let mut link = new_link();
    let payload = [0x55, 0x5A, 0x50, 0x00, 0xFF];

    let mut slot = link.claim().unwrap();
    slot.set_frame_type(FrameType::Async);
    slot.set_destination(0x12, 1);
    slot.set_command(0x30);
    slot.write_payload(&payload);
    slot.send(payload.len());
    while !link.transmit_idle() {
        link.on_byte_sent();
    }

    let sent = decode_frame(&link.wire_mut().take()).unwrap();
    assert_eq!(sent.frame_type(), FrameType::Async);
    assert_eq!(sent.source_address(), 0x3F);
    assert_eq!(sent.destination_address(), 0x12);
    assert_eq!(sent.sequence(), 1);
    assert_eq!(sent.command(), 0x30);
    assert_eq!(sent.payload().as_ref(), &payload);
}
