//! Temperature source arbitration
//!
//! Decides whether the unit's own sensor or the external thermometer drives
//! the published current temperature.
//!
//! ```text
//!              user selects External
//!   ┌────────┐ ─────────────────────► ┌──────────┐
//!   │ AcOwn  │                        │ External │
//!   └────────┘ ◄───────────────────── └──────────┘
//!        ▲      timeout / no device     │     ▲
//!        │      (Manual policy)         │     │ fresh reading
//!        │                              ▼     │ (Automatic policy)
//!        │  user selects AcOwn       ┌─────────┐
//!        └────────────────────────── │ AtcFail │
//!                                    └─────────┘
//!            timeout / no device (Automatic policy)
//! ```
//!
//! All checks are polled from the scheduler tick; timestamps are
//! milliseconds of a wrapping monotonic clock.

use sinclair_protocol::MacAddress;

use crate::climate::{validate_temperature, ClimateError};
use crate::config::{BridgeConfig, RecoveryPolicy};
use crate::options::{OptionSet, TemperatureSource};

/// Sensor whose value is authoritative right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveSensor {
    Unit,
    External,
}

/// Why the source changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChangeReason {
    /// Explicit user selection
    User,
    /// External sensor silent for longer than the timeout
    Timeout,
    /// External sensor selected without a device to listen to
    MissingDevice,
    /// Fresh external data after a timeout
    Recovered,
}

/// A source transition to be published and persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SourceChange {
    pub from: TemperatureSource,
    pub to: TemperatureSource,
    pub reason: ChangeReason,
}

/// Result of accepting an external reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExternalUpdate {
    /// Transition triggered by the reading, if any
    pub change: Option<SourceChange>,
    /// The reading is now the current temperature
    pub authoritative: bool,
}

/// Temperature source state machine
#[derive(Debug, Clone)]
pub struct TemperatureSourceArbiter {
    config: BridgeConfig,
    source: TemperatureSource,
    /// Time of the last accepted external reading
    last_update_ms: Option<u32>,
    /// External data is fresh enough to use
    external_valid: bool,
    external_temperature: Option<f32>,
    external_humidity: Option<f32>,
    external_battery: Option<u8>,
    device_address: Option<MacAddress>,
    /// A user selection happened since the last timeout check
    user_selected: bool,
}

impl TemperatureSourceArbiter {
    /// Create an arbiter using the unit's own sensor
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            source: TemperatureSource::AcOwn,
            last_update_ms: None,
            external_valid: false,
            external_temperature: None,
            external_humidity: None,
            external_battery: None,
            device_address: None,
            user_selected: false,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Selected source
    pub fn source(&self) -> TemperatureSource {
        self.source
    }

    /// Sensor currently authoritative
    pub fn active_sensor(&self) -> ActiveSensor {
        match self.source {
            TemperatureSource::External => ActiveSensor::External,
            TemperatureSource::AcOwn | TemperatureSource::AtcFail => ActiveSensor::Unit,
        }
    }

    pub fn is_external_valid(&self) -> bool {
        self.external_valid
    }

    pub fn last_update_ms(&self) -> Option<u32> {
        self.last_update_ms
    }

    pub fn external_temperature(&self) -> Option<f32> {
        self.external_temperature
    }

    pub fn external_humidity(&self) -> Option<f32> {
        self.external_humidity
    }

    pub fn external_battery(&self) -> Option<u8> {
        self.external_battery
    }

    /// Configured external device
    pub fn device_address(&self) -> Option<MacAddress> {
        self.device_address
    }

    /// Current temperature to publish
    ///
    /// The external reading while it is selected and valid, otherwise the
    /// unit's own reading.
    pub fn current_temperature(&self, unit_temperature: Option<f32>) -> Option<f32> {
        match (self.active_sensor(), self.external_valid) {
            (ActiveSensor::External, true) => self.external_temperature.or(unit_temperature),
            _ => unit_temperature,
        }
    }

    /// Restore the persisted selection at boot
    ///
    /// Under the manual policy a persisted failure is restored as the
    /// unit's own sensor, since nothing would ever leave it automatically.
    pub fn restore(&mut self, source: TemperatureSource) -> TemperatureSource {
        self.source = match (source, self.config.recovery) {
            (TemperatureSource::AtcFail, RecoveryPolicy::Manual) => TemperatureSource::AcOwn,
            (source, _) => source,
        };
        self.source
    }

    /// Accept a reading from the external sensor
    ///
    /// Readings above the physical threshold are rejected and change
    /// nothing.
    pub fn on_external_reading(
        &mut self,
        temperature: f32,
        humidity: f32,
        now_ms: u32,
    ) -> Result<ExternalUpdate, ClimateError> {
        let temperature = validate_temperature(temperature)?;

        self.last_update_ms = Some(now_ms);
        self.external_valid = true;
        self.external_temperature = Some(temperature);
        self.external_humidity = Some(humidity);

        let mut change = None;
        if self.source == TemperatureSource::AtcFail
            && self.config.recovery == RecoveryPolicy::Automatic
        {
            info!("External sensor recovered, switching back from ATC Fail");
            change = Some(self.transition(TemperatureSource::External, ChangeReason::Recovered));
        }

        Ok(ExternalUpdate {
            change,
            authoritative: self.source == TemperatureSource::External,
        })
    }

    /// Record the external sensor battery level
    ///
    /// Display only; arbitration ignores it.
    pub fn on_external_battery(&mut self, percent: u8) {
        self.external_battery = Some(percent.min(100));
    }

    /// Fall back from a stale or unusable external sensor
    ///
    /// Called once per scheduler tick. Skipped once after a user selection
    /// so the selection always wins within its tick.
    pub fn check_timeout(&mut self, now_ms: u32) -> Option<SourceChange> {
        if core::mem::take(&mut self.user_selected) {
            return None;
        }
        if self.source != TemperatureSource::External {
            return None;
        }

        if self.config.wireless_sensor && self.device_address.is_none() {
            warn!("External sensor selected but no device address configured");
            return Some(self.fall_back(ChangeReason::MissingDevice));
        }

        // Still stale after a fallback cleared the data
        let last = self.last_update_ms?;
        let elapsed = now_ms.wrapping_sub(last);
        if elapsed > self.config.external_timeout_ms {
            warn!("External sensor silent for {} ms, falling back", elapsed);
            return Some(self.fall_back(ChangeReason::Timeout));
        }

        None
    }

    /// Apply an explicit user selection
    ///
    /// Always honored, even when the selected source has no data. A later
    /// timeout check corrects it if the data stays unavailable.
    pub fn on_user_select(&mut self, source: TemperatureSource) -> Option<SourceChange> {
        self.user_selected = true;
        if source == self.source {
            return None;
        }
        debug!("Temperature source selected: {}", source.label());
        Some(self.transition(source, ChangeReason::User))
    }

    /// Change the external device to listen to
    ///
    /// Data from the previous device no longer counts. Returns `true` if the
    /// address changed.
    pub fn set_device_address(&mut self, address: Option<MacAddress>) -> bool {
        if address == self.device_address {
            return false;
        }
        self.device_address = address;
        self.external_valid = false;
        self.last_update_ms = None;
        self.external_temperature = None;
        self.external_humidity = None;
        self.external_battery = None;
        true
    }

    fn fall_back(&mut self, reason: ChangeReason) -> SourceChange {
        self.external_valid = false;
        let target = match self.config.recovery {
            RecoveryPolicy::Automatic => TemperatureSource::AtcFail,
            RecoveryPolicy::Manual => TemperatureSource::AcOwn,
        };
        self.transition(target, reason)
    }

    fn transition(&mut self, to: TemperatureSource, reason: ChangeReason) -> SourceChange {
        let change = SourceChange {
            from: self.source,
            to,
            reason,
        };
        self.source = to;
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE: MacAddress = MacAddress::new([0xA4, 0xC1, 0x38, 0x0B, 0x2E, 0x1F]);

    fn external_arbiter(config: BridgeConfig) -> TemperatureSourceArbiter {
        let mut arbiter = TemperatureSourceArbiter::new(config);
        arbiter.set_device_address(Some(DEVICE));
        arbiter.on_user_select(TemperatureSource::External);
        // Consume the same-tick skip
        assert_eq!(arbiter.check_timeout(0), None);
        arbiter
    }

    #[test]
    fn test_starts_on_unit_sensor() {
        let arbiter = TemperatureSourceArbiter::new(BridgeConfig::default());
        assert_eq!(arbiter.source(), TemperatureSource::AcOwn);
        assert_eq!(arbiter.active_sensor(), ActiveSensor::Unit);
        assert!(!arbiter.is_external_valid());
        assert_eq!(arbiter.current_temperature(Some(24.0)), Some(24.0));
    }

    #[test]
    fn test_fresh_readings_keep_external() {
        let mut arbiter = external_arbiter(BridgeConfig::default());

        arbiter.on_external_reading(22.0, 40.0, 0).unwrap();
        arbiter.on_external_reading(22.5, 41.0, 890_000).unwrap();
        assert_eq!(arbiter.check_timeout(890_000), None);
        assert_eq!(arbiter.source(), TemperatureSource::External);
        assert_eq!(arbiter.current_temperature(Some(25.0)), Some(22.5));
    }

    #[test]
    fn test_silence_falls_back() {
        let mut arbiter = external_arbiter(BridgeConfig::default());
        arbiter.on_external_reading(22.0, 40.0, 0).unwrap();

        // Exactly at the threshold is still fresh
        assert_eq!(arbiter.check_timeout(900_000), None);

        let change = arbiter.check_timeout(901_000).unwrap();
        assert_eq!(change.from, TemperatureSource::External);
        assert_eq!(change.to, TemperatureSource::AtcFail);
        assert_eq!(change.reason, ChangeReason::Timeout);
        assert_eq!(arbiter.active_sensor(), ActiveSensor::Unit);
        assert!(!arbiter.is_external_valid());
        assert_eq!(arbiter.current_temperature(Some(25.0)), Some(25.0));

        // Nothing further to do while failed
        assert_eq!(arbiter.check_timeout(2_000_000), None);
    }

    #[test]
    fn test_automatic_recovery() {
        let mut arbiter = external_arbiter(BridgeConfig::default());
        arbiter.on_external_reading(22.0, 40.0, 0).unwrap();
        arbiter.check_timeout(901_000).unwrap();

        let update = arbiter.on_external_reading(23.0, 42.0, 950_000).unwrap();
        let change = update.change.unwrap();
        assert_eq!(change.to, TemperatureSource::External);
        assert_eq!(change.reason, ChangeReason::Recovered);
        assert!(update.authoritative);
        assert_eq!(arbiter.current_temperature(Some(25.0)), Some(23.0));
    }

    #[test]
    fn test_manual_policy_stays_on_unit_sensor() {
        let config = BridgeConfig::default().with_recovery(RecoveryPolicy::Manual);
        let mut arbiter = external_arbiter(config);
        arbiter.on_external_reading(22.0, 40.0, 0).unwrap();

        let change = arbiter.check_timeout(901_000).unwrap();
        assert_eq!(change.to, TemperatureSource::AcOwn);

        let update = arbiter.on_external_reading(23.0, 42.0, 950_000).unwrap();
        assert_eq!(update.change, None);
        assert!(!update.authoritative);
        assert_eq!(arbiter.source(), TemperatureSource::AcOwn);
        // Still shown on the external display channels
        assert_eq!(arbiter.external_temperature(), Some(23.0));
    }

    #[test]
    fn test_no_reading_yet_does_not_time_out() {
        let mut arbiter = external_arbiter(BridgeConfig::default());
        assert_eq!(arbiter.check_timeout(5_000_000), None);
        assert_eq!(arbiter.source(), TemperatureSource::External);
        // Nothing valid yet, the unit sensor fills in
        assert_eq!(arbiter.current_temperature(Some(25.0)), Some(25.0));
    }

    #[test]
    fn test_missing_device_falls_back() {
        let mut arbiter = TemperatureSourceArbiter::new(BridgeConfig::default());
        arbiter.on_user_select(TemperatureSource::External);

        // The selection wins its own tick
        assert_eq!(arbiter.check_timeout(10), None);
        assert_eq!(arbiter.source(), TemperatureSource::External);

        let change = arbiter.check_timeout(20).unwrap();
        assert_eq!(change.reason, ChangeReason::MissingDevice);
        assert_eq!(change.to, TemperatureSource::AtcFail);
    }

    #[test]
    fn test_wired_sensor_needs_no_device() {
        let mut arbiter = TemperatureSourceArbiter::new(BridgeConfig::wired());
        arbiter.on_user_select(TemperatureSource::External);
        assert_eq!(arbiter.check_timeout(10), None);
        assert_eq!(arbiter.check_timeout(20), None);
        assert_eq!(arbiter.source(), TemperatureSource::External);
    }

    #[test]
    fn test_out_of_range_reading_is_rejected() {
        let mut arbiter = external_arbiter(BridgeConfig::default());
        arbiter.on_external_reading(22.0, 40.0, 0).unwrap();

        assert_eq!(
            arbiter.on_external_reading(150.0, 40.0, 1_000),
            Err(ClimateError::OutOfRange)
        );
        assert_eq!(arbiter.external_temperature(), Some(22.0));
        assert_eq!(arbiter.last_update_ms(), Some(0));
    }

    #[test]
    fn test_user_select_is_always_honored() {
        let mut arbiter = external_arbiter(BridgeConfig::default());
        arbiter.on_external_reading(22.0, 40.0, 0).unwrap();
        arbiter.check_timeout(901_000).unwrap();

        let change = arbiter.on_user_select(TemperatureSource::External).unwrap();
        assert_eq!(change.from, TemperatureSource::AtcFail);
        assert_eq!(change.reason, ChangeReason::User);
        assert_eq!(arbiter.check_timeout(901_100), None);
        assert_eq!(arbiter.source(), TemperatureSource::External);

        assert_eq!(arbiter.on_user_select(TemperatureSource::External), None);
    }

    #[test]
    fn test_reselected_silent_sensor_falls_back_again() {
        let mut arbiter = external_arbiter(BridgeConfig::default());
        arbiter.on_external_reading(22.0, 40.0, 0).unwrap();
        arbiter.check_timeout(901_000).unwrap();

        arbiter.on_user_select(TemperatureSource::External).unwrap();
        assert_eq!(arbiter.check_timeout(901_100), None);
        assert_eq!(arbiter.source(), TemperatureSource::External);

        let change = arbiter.check_timeout(901_200).unwrap();
        assert_eq!(change.from, TemperatureSource::External);
        assert_eq!(change.to, TemperatureSource::AtcFail);
        assert_eq!(change.reason, ChangeReason::Timeout);
        assert_eq!(arbiter.active_sensor(), ActiveSensor::Unit);
    }

    #[test]
    fn test_reselected_silent_sensor_manual_policy() {
        let config = BridgeConfig::default().with_recovery(RecoveryPolicy::Manual);
        let mut arbiter = external_arbiter(config);
        arbiter.on_external_reading(22.0, 40.0, 0).unwrap();
        arbiter.check_timeout(901_000).unwrap();

        arbiter.on_user_select(TemperatureSource::External).unwrap();
        assert_eq!(arbiter.check_timeout(901_100), None);
        let change = arbiter.check_timeout(2_000_000).unwrap();
        assert_eq!(change.to, TemperatureSource::AcOwn);
        assert_eq!(arbiter.source(), TemperatureSource::AcOwn);
    }

    #[test]
    fn test_clock_wraparound() {
        let mut arbiter = external_arbiter(BridgeConfig::default());
        let start = u32::MAX - 1_000;
        arbiter.on_external_reading(22.0, 40.0, start).unwrap();

        assert_eq!(arbiter.check_timeout(start.wrapping_add(500_000)), None);
        assert!(arbiter.check_timeout(start.wrapping_add(900_001)).is_some());
    }

    #[test]
    fn test_device_change_invalidates_data() {
        let mut arbiter = external_arbiter(BridgeConfig::default());
        arbiter.on_external_reading(22.0, 40.0, 0).unwrap();
        arbiter.on_external_battery(120);
        assert_eq!(arbiter.external_battery(), Some(100));

        assert!(!arbiter.set_device_address(Some(DEVICE)));
        assert!(arbiter.is_external_valid());

        let other = MacAddress::new([1, 2, 3, 4, 5, 6]);
        assert!(arbiter.set_device_address(Some(other)));
        assert!(!arbiter.is_external_valid());
        assert_eq!(arbiter.external_temperature(), None);
        assert_eq!(arbiter.external_battery(), None);
    }

    #[test]
    fn test_restore() {
        let mut arbiter = TemperatureSourceArbiter::new(BridgeConfig::default());
        assert_eq!(arbiter.restore(TemperatureSource::AtcFail), TemperatureSource::AtcFail);

        let config = BridgeConfig::default().with_recovery(RecoveryPolicy::Manual);
        let mut arbiter = TemperatureSourceArbiter::new(config);
        assert_eq!(arbiter.restore(TemperatureSource::AtcFail), TemperatureSource::AcOwn);
        assert_eq!(arbiter.restore(TemperatureSource::External), TemperatureSource::External);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Readings never further apart than the timeout keep the external
        /// sensor selected, however they are spaced.
        #[test]
        fn regular_readings_never_time_out(gaps in proptest::collection::vec(1u32..=900_000, 1..50)) {
            let mut arbiter = TemperatureSourceArbiter::new(BridgeConfig::wired());
            arbiter.on_user_select(TemperatureSource::External);

            let mut now = 0u32;
            arbiter.on_external_reading(21.0, 50.0, now).unwrap();
            for gap in gaps {
                now = now.wrapping_add(gap);
                prop_assert_eq!(arbiter.check_timeout(now), None);
                arbiter.on_external_reading(21.0, 50.0, now).unwrap();
            }
            prop_assert_eq!(arbiter.source(), TemperatureSource::External);
        }

        /// Any gap above the timeout forces a fallback on the next check.
        #[test]
        fn any_long_gap_falls_back(start in any::<u32>(), gap in 900_001u32..=u32::MAX / 2) {
            let mut arbiter = TemperatureSourceArbiter::new(BridgeConfig::wired());
            arbiter.on_user_select(TemperatureSource::External);
            prop_assert_eq!(arbiter.check_timeout(start), None);

            arbiter.on_external_reading(21.0, 50.0, start).unwrap();
            let change = arbiter.check_timeout(start.wrapping_add(gap));
            prop_assert_eq!(change.map(|c| c.reason), Some(ChangeReason::Timeout));
            prop_assert!(!arbiter.is_external_valid());
        }
    }
}
