//! Persisted recovery parameters.

/// Store for the controller's persisted parameters.
///
/// On the flight hardware this is EEPROM-backed; writes there busy-wait, so
/// implementations are expected to be cheap enough for the command path.
/// Times are in 20 ms increments, servo positions in range/256 increments,
/// the battery limit is a raw 8-bit ADC reading.
pub trait SettingsStore {
    /// Minimum deployment time gate.
    fn min_deploy_time(&self) -> u16;
    /// Set the minimum deployment time gate.
    fn set_min_deploy_time(&mut self, ticks: u16);

    /// Maximum deployment time gate.
    fn max_deploy_time(&self) -> u16;
    /// Set the maximum deployment time gate.
    fn set_max_deploy_time(&mut self, ticks: u16);

    /// Deployment time logged on the last flight.
    fn measured_deploy_time(&self) -> u16;

    /// ADC reading below which the battery counts as empty.
    fn battery_empty_limit(&self) -> u8;
    /// Set the battery-empty ADC limit.
    fn set_battery_empty_limit(&mut self, raw: u8);

    /// Deployment actuator selection; nonzero selects the servo, zero the
    /// pyro channel.
    fn deploy_mode(&self) -> u8;
    /// Set the deployment actuator selection.
    fn set_deploy_mode(&mut self, mode: u8);

    /// Servo position holding the recovery hatch closed.
    fn servo_closed_position(&self) -> u8;
    /// Set the closed servo position.
    fn set_servo_closed_position(&mut self, position: u8);

    /// Servo position releasing the recovery hatch.
    fn servo_open_position(&self) -> u8;
    /// Set the open servo position.
    fn set_servo_open_position(&mut self, position: u8);

    /// Bus address configured for this rocket.
    fn address(&self) -> u8;
    /// Set the bus address.
    fn set_address(&mut self, address: u8);
}

/// In-memory settings store for host-side use and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RamSettings {
    /// Minimum deployment time, 20 ms increments.
    pub min_deploy_time: u16,
    /// Maximum deployment time, 20 ms increments.
    pub max_deploy_time: u16,
    /// Last logged deployment time, 20 ms increments.
    pub measured_deploy_time: u16,
    /// Battery-empty ADC limit.
    pub battery_empty_limit: u8,
    /// Nonzero: servo deployment, zero: pyro deployment.
    pub deploy_mode: u8,
    /// Closed servo position.
    pub servo_closed_position: u8,
    /// Open servo position.
    pub servo_open_position: u8,
    /// Configured bus address.
    pub address: u8,
}

impl SettingsStore for RamSettings {
    fn min_deploy_time(&self) -> u16 {
        self.min_deploy_time
    }

    fn set_min_deploy_time(&mut self, ticks: u16) {
        self.min_deploy_time = ticks;
    }

    fn max_deploy_time(&self) -> u16 {
        self.max_deploy_time
    }

    fn set_max_deploy_time(&mut self, ticks: u16) {
        self.max_deploy_time = ticks;
    }

    fn measured_deploy_time(&self) -> u16 {
        self.measured_deploy_time
    }

    fn battery_empty_limit(&self) -> u8 {
        self.battery_empty_limit
    }

    fn set_battery_empty_limit(&mut self, raw: u8) {
        self.battery_empty_limit = raw;
    }

    fn deploy_mode(&self) -> u8 {
        self.deploy_mode
    }

    fn set_deploy_mode(&mut self, mode: u8) {
        self.deploy_mode = mode;
    }

    fn servo_closed_position(&self) -> u8 {
        self.servo_closed_position
    }

    fn set_servo_closed_position(&mut self, position: u8) {
        self.servo_closed_position = position;
    }

    fn servo_open_position(&self) -> u8 {
        self.servo_open_position
    }

    fn set_servo_open_position(&mut self, position: u8) {
        self.servo_open_position = position;
    }

    fn address(&self) -> u8 {
        self.address
    }

    fn set_address(&mut self, address: u8) {
        self.address = address;
    }
}
