//! Publication of bridge state over the debug probe
//!
//! The board has no network link, so published state goes to the defmt log
//! where the host integration picks it up.

use defmt::*;

use sinclair_core::climate::ClimateState;
use sinclair_core::options::{OptionKind, SwitchKind};
use sinclair_core::traits::{ClimateFacade, SensorChannel};
use sinclair_protocol::MacAddress;

/// Facade that logs every publication at info level
pub struct LogFacade {
    last_climate: Option<ClimateState>,
}

impl LogFacade {
    pub const fn new() -> Self {
        Self { last_climate: None }
    }
}

impl ClimateFacade for LogFacade {
    fn publish_climate(&mut self, state: &ClimateState) {
        // Unit reports repeat; only log what changed
        if self.last_climate.as_ref() == Some(state) {
            return;
        }
        info!(
            "climate: mode={:?} action={:?} current={:?} target={:?}",
            state.mode, state.action, state.current_temperature, state.target_temperature
        );
        self.last_climate = Some(*state);
    }

    fn publish_sensor(&mut self, channel: SensorChannel, value: f32) {
        info!("sensor {:?}: {}", channel, value);
    }

    fn publish_option(&mut self, kind: OptionKind, label: &'static str) {
        info!("option {:?}: {}", kind, label);
    }

    fn publish_switch(&mut self, switch: SwitchKind, on: bool) {
        info!("switch {:?}: {}", switch, on);
    }

    fn publish_device_address(&mut self, address: &MacAddress) {
        info!("device address: {}", address.to_text().as_str());
    }
}
