//! Application command table of the recovery controller.

use crate::link::{CommandHandler, TxSlot};
use crate::protocol::{Packet, ReservedCommand};

use super::SettingsStore;

/// Application command IDs.
///
/// Getters live at `0x10..0x20` and carry no request payload; the matching
/// setters live one nibble up at `0x20..0x30` and echo the written value.
#[allow(missing_docs)]
pub mod command_id {
    pub const GET_MIN_DEPLOY_TIME: u8 = 0x10;
    pub const SET_MIN_DEPLOY_TIME: u8 = 0x20;

    pub const GET_MAX_DEPLOY_TIME: u8 = 0x11;
    pub const SET_MAX_DEPLOY_TIME: u8 = 0x21;

    pub const GET_MEASURED_DEPLOY_TIME: u8 = 0x12;

    pub const GET_BATTERY_VOLTAGE: u8 = 0x13;

    pub const GET_BATTERY_EMPTY_LIMIT: u8 = 0x14;
    pub const SET_BATTERY_EMPTY_LIMIT: u8 = 0x24;

    pub const GET_DEPLOY_MODE: u8 = 0x15;
    pub const SET_DEPLOY_MODE: u8 = 0x25;

    pub const GET_SERVO_CLOSED_POSITION: u8 = 0x16;
    pub const SET_SERVO_CLOSED_POSITION: u8 = 0x26;

    pub const GET_SERVO_OPEN_POSITION: u8 = 0x17;
    pub const SET_SERVO_OPEN_POSITION: u8 = 0x27;

    pub const SET_SERVO_POSITION: u8 = 0x28;

    pub const GET_ADDRESS: u8 = 0x19;
    pub const SET_ADDRESS: u8 = 0x29;
}

/// Hardware touched directly by the command table.
///
/// Battery readings come from the input ADC; the servo override drives the
/// deployment servo to an arbitrary position for ground testing.
pub trait RecoveryIo {
    /// Most recent battery ADC sample.
    fn battery_voltage(&self) -> u8;
    /// Drive the servo to a raw position.
    fn set_servo_position(&mut self, position: u8);
}

/// [`CommandHandler`] answering the recovery-controller command set.
#[derive(Debug)]
pub struct RecoveryHandler<S, I> {
    settings: S,
    io: I,
}

impl<S: SettingsStore, I: RecoveryIo> RecoveryHandler<S, I> {
    /// Build the handler over a settings store and the controller I/O.
    pub fn new(settings: S, io: I) -> Self {
        Self { settings, io }
    }

    /// Access the settings store.
    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// Mutable access to the settings store.
    pub fn settings_mut(&mut self) -> &mut S {
        &mut self.settings
    }

    /// Access the controller I/O.
    pub fn io(&self) -> &I {
        &self.io
    }

    /// Run a setter; returns false when the payload length is wrong.
    fn apply_setter(&mut self, command: u8, payload: &[u8]) -> bool {
        use command_id::{
            SET_ADDRESS, SET_BATTERY_EMPTY_LIMIT, SET_DEPLOY_MODE, SET_MAX_DEPLOY_TIME,
            SET_MIN_DEPLOY_TIME, SET_SERVO_CLOSED_POSITION, SET_SERVO_OPEN_POSITION,
            SET_SERVO_POSITION,
        };

        match command {
            SET_MIN_DEPLOY_TIME => {
                let Some(ticks) = word_arg(payload) else {
                    return false;
                };
                self.settings.set_min_deploy_time(ticks);
            }
            SET_MAX_DEPLOY_TIME => {
                let Some(ticks) = word_arg(payload) else {
                    return false;
                };
                self.settings.set_max_deploy_time(ticks);
            }
            SET_BATTERY_EMPTY_LIMIT => {
                let Some(raw) = byte_arg(payload) else {
                    return false;
                };
                self.settings.set_battery_empty_limit(raw);
            }
            SET_DEPLOY_MODE => {
                let Some(mode) = byte_arg(payload) else {
                    return false;
                };
                self.settings.set_deploy_mode(mode);
            }
            SET_SERVO_CLOSED_POSITION => {
                let Some(position) = byte_arg(payload) else {
                    return false;
                };
                self.settings.set_servo_closed_position(position);
            }
            SET_SERVO_OPEN_POSITION => {
                let Some(position) = byte_arg(payload) else {
                    return false;
                };
                self.settings.set_servo_open_position(position);
            }
            SET_SERVO_POSITION => {
                let Some(position) = byte_arg(payload) else {
                    return false;
                };
                self.io.set_servo_position(position);
            }
            SET_ADDRESS => {
                let Some(address) = byte_arg(payload) else {
                    return false;
                };
                self.settings.set_address(address);
            }
            _ => return false,
        }
        true
    }

    /// Run a getter; returns the reply payload length, or `None` for an
    /// unknown ID.
    fn answer_getter(&self, command: u8, out: &mut [u8]) -> Option<usize> {
        use command_id::{
            GET_ADDRESS, GET_BATTERY_EMPTY_LIMIT, GET_BATTERY_VOLTAGE, GET_DEPLOY_MODE,
            GET_MAX_DEPLOY_TIME, GET_MEASURED_DEPLOY_TIME, GET_MIN_DEPLOY_TIME,
            GET_SERVO_CLOSED_POSITION, GET_SERVO_OPEN_POSITION,
        };

        match command {
            GET_MIN_DEPLOY_TIME => Some(put_word(out, self.settings.min_deploy_time())),
            GET_MAX_DEPLOY_TIME => Some(put_word(out, self.settings.max_deploy_time())),
            GET_MEASURED_DEPLOY_TIME => Some(put_word(out, self.settings.measured_deploy_time())),
            GET_BATTERY_VOLTAGE => Some(put_byte(out, self.io.battery_voltage())),
            GET_BATTERY_EMPTY_LIMIT => Some(put_byte(out, self.settings.battery_empty_limit())),
            GET_DEPLOY_MODE => Some(put_byte(out, self.settings.deploy_mode())),
            GET_SERVO_CLOSED_POSITION => {
                Some(put_byte(out, self.settings.servo_closed_position()))
            }
            GET_SERVO_OPEN_POSITION => Some(put_byte(out, self.settings.servo_open_position())),
            GET_ADDRESS => Some(put_byte(out, self.settings.address())),
            _ => None,
        }
    }
}

impl<S: SettingsStore, I: RecoveryIo> CommandHandler for RecoveryHandler<S, I> {
    fn handle(&mut self, request: &Packet, mut reply: TxSlot<'_>) {
        let command = request.command();
        let payload = request.payload();
        reply.set_command(command);

        if command >= 0x20 {
            if self.apply_setter(command, payload) {
                // Setters echo the value they wrote.
                reply.write_payload(payload);
                reply.send(payload.len());
                return;
            }
        } else if payload.is_empty() {
            let mut out = [0u8; 2];
            if let Some(len) = self.answer_getter(command, &mut out) {
                reply.write_payload(&out[..len]);
                reply.send(len);
                return;
            }
        }

        reply.set_command(ReservedCommand::Nack.as_u8());
        reply.send(0);
    }
}

/// Parse an exactly-two-byte little-endian argument.
fn word_arg(payload: &[u8]) -> Option<u16> {
    match payload {
        [low, high] => Some(u16::from_le_bytes([*low, *high])),
        _ => None,
    }
}

/// Parse an exactly-one-byte argument.
fn byte_arg(payload: &[u8]) -> Option<u8> {
    match payload {
        [value] => Some(*value),
        _ => None,
    }
}

fn put_word(out: &mut [u8], value: u16) -> usize {
    out[..2].copy_from_slice(&value.to_le_bytes());
    2
}

fn put_byte(out: &mut [u8], value: u8) -> usize {
    out[0] = value;
    1
}
