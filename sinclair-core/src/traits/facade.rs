//! Outward publication of bridge state

use sinclair_protocol::MacAddress;

use crate::climate::ClimateState;
use crate::options::{OptionKind, SwitchKind};

/// Read-only sensor values shown next to the climate entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorChannel {
    /// Indoor temperature measured by the unit itself (°C)
    UnitIndoorTemperature,
    /// Room temperature from the external sensor (°C)
    ExternalTemperature,
    /// Room humidity from the external sensor (%)
    ExternalHumidity,
    /// External sensor battery level (%)
    ExternalBattery,
}

/// Sink for everything the bridge publishes
///
/// Only the climate snapshot is mandatory. The other channels default to
/// no-ops for integrations that do not expose them.
pub trait ClimateFacade {
    /// Publish mode, temperatures and estimated action
    fn publish_climate(&mut self, state: &ClimateState);

    /// Publish a sensor value
    fn publish_sensor(&mut self, _channel: SensorChannel, _value: f32) {}

    /// Publish the selected label of an option set
    fn publish_option(&mut self, _kind: OptionKind, _label: &'static str) {}

    /// Publish a switch state
    fn publish_switch(&mut self, _switch: SwitchKind, _on: bool) {}

    /// Publish the accepted external sensor address
    fn publish_device_address(&mut self, _address: &MacAddress) {}
}
