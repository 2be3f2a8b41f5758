//! Recovery-controller application command set.
//!
//! Implements the configuration and telemetry commands of the deployment
//! controller on top of the link layer's application callback. Persistence
//! and hardware access stay behind the [`SettingsStore`] and [`RecoveryIo`]
//! traits; the crate only ships an in-memory store.

mod commands;
mod settings;

pub use commands::{RecoveryHandler, RecoveryIo, command_id};
pub use settings::{RamSettings, SettingsStore};
