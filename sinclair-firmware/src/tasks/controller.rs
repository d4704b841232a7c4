//! Main controller task
//!
//! Owns the bridge. Each tick drains the receive pipe frame by frame and
//! checks the external sensor; inputs from the integration side are
//! applied as they arrive.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use sinclair_core::config::BridgeConfig;
use sinclair_core::options::OptionKind;
use sinclair_core::{Bridge, BridgeError};
use sinclair_drivers::PipeSource;

use crate::channels::{BridgeInput, INPUT_CHANNEL, RX_PIPE, RX_PIPE_SIZE};
use crate::config::DEVICE_ADDRESS;
use crate::publish::LogFacade;
use crate::storage::SharedPreferences;
use crate::tasks::tick::TICK_SIGNAL;
use crate::unit::LogUnit;

type FirmwareBridge = Bridge<SharedPreferences, LogFacade, LogUnit>;
type RxSource = PipeSource<'static, CriticalSectionRawMutex, RX_PIPE_SIZE>;

/// Controller task - main coordination loop
#[embassy_executor::task]
pub async fn controller_task(config: BridgeConfig) {
    info!("Controller task started");

    let mut bridge = Bridge::new(config, SharedPreferences, LogFacade::new(), LogUnit);
    bridge.load_preferences();

    if let (Some(address), None) = (DEVICE_ADDRESS, bridge.arbiter().device_address()) {
        info!("Using configured sensor address");
        if bridge.set_device_address(address).is_err() {
            warn!("Configured sensor address rejected");
        }
    }

    let mut source = PipeSource::new(&RX_PIPE);
    let mut now_ms = 0u32;

    loop {
        match select(TICK_SIGNAL.wait(), INPUT_CHANNEL.receive()).await {
            Either::First(tick_ms) => {
                now_ms = tick_ms;
                drain_frames(&mut bridge, &mut source);
                bridge.tick(now_ms);
            }
            Either::Second(input) => {
                debug!("Input: {:?}", input);
                if let Err(e) = apply_input(&mut bridge, input, now_ms) {
                    warn!("Input rejected: {:?}", e);
                }
            }
        }
    }
}

/// Take every complete frame out of the receive pipe
fn drain_frames(bridge: &mut FirmwareBridge, source: &mut RxSource) {
    while let Some(frame) = bridge.poll_uart(source) {
        trace!(
            "Frame: cmd={:?} len={} checksum {}",
            frame.command(),
            frame.length(),
            if frame.checksum_ok() { "ok" } else { "bad" }
        );
        trace!("{=[u8]:x}", frame.as_bytes());
    }
}

fn apply_input(bridge: &mut FirmwareBridge, input: BridgeInput, now_ms: u32) -> Result<(), BridgeError> {
    match input {
        BridgeInput::Select { kind, label } => match kind {
            OptionKind::Display => bridge.select_display_mode(label),
            OptionKind::DisplayUnit => bridge.select_display_unit(label),
            OptionKind::VerticalSwing => bridge.select_vertical_swing(label),
            OptionKind::HorizontalSwing => bridge.select_horizontal_swing(label),
            OptionKind::TemperatureSource => bridge.select_temperature_source(label),
        },
        BridgeInput::Switch { kind, on } => {
            bridge.set_switch(kind, on);
            Ok(())
        }
        BridgeInput::DeviceAddress(text) => bridge.set_device_address(text.as_str()).map(|_| ()),
        BridgeInput::ExternalReading {
            temperature,
            humidity,
        } => bridge.on_external_reading(temperature, humidity, now_ms),
        BridgeInput::ExternalBattery(percent) => {
            bridge.on_external_battery(percent);
            Ok(())
        }
    }
}
