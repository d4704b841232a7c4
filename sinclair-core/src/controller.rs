//! Bridge controller
//!
//! The bridge is the single owner of all mutable state. Every input
//! (received bytes, unit reports, external readings, user selections) is a
//! method call on it from the scheduler thread, and each call runs to
//! completion:
//!
//! - Frames are reassembled from the UART and handed to the caller
//! - Unit reports update state without echoing a command back
//! - User selections call the matching [`UnitControl`] hook first
//! - Every accepted change is published and persisted

use sinclair_hal::{ByteSource, StorageKey};
use sinclair_protocol::advertisement::{self, Advertisement};
use sinclair_protocol::{Frame, FrameAssembler, FrameEvent, MacAddress};

use crate::climate::{validate_temperature, ClimateMode, ClimateState};
use crate::config::{write_layout_version, BridgeConfig, RestoredPreferences};
use crate::error::{BridgeError, SelectError};
use crate::options::{
    DisplayMode, DisplayUnit, HorizontalSwing, OptionSet, SwitchKind, TemperatureSource,
    VerticalSwing,
};
use crate::source::{ActiveSensor, SourceChange, TemperatureSourceArbiter};
use crate::traits::{ClimateFacade, PreferenceStore, PreferenceStoreExt, SensorChannel, UnitControl};

/// Serial bridge between the indoor unit and the outside world
pub struct Bridge<P, F, U> {
    assembler: FrameAssembler,
    arbiter: TemperatureSourceArbiter,
    display: DisplayMode,
    display_unit: DisplayUnit,
    vertical_swing: VerticalSwing,
    horizontal_swing: HorizontalSwing,
    /// Indexed by [`SwitchKind::index`]
    switches: [bool; 5],
    mode: ClimateMode,
    target_temperature: Option<f32>,
    /// Last indoor temperature reported by the unit
    unit_temperature: Option<f32>,
    store: P,
    facade: F,
    unit: U,
}

impl<P, F, U> Bridge<P, F, U>
where
    P: PreferenceStore,
    F: ClimateFacade,
    U: UnitControl,
{
    /// Create a bridge with default options
    ///
    /// Call [`load_preferences`](Self::load_preferences) before the first
    /// tick to restore persisted state.
    pub fn new(config: BridgeConfig, store: P, facade: F, unit: U) -> Self {
        Self {
            assembler: FrameAssembler::new(),
            arbiter: TemperatureSourceArbiter::new(config),
            display: DisplayMode::DEFAULT,
            display_unit: DisplayUnit::DEFAULT,
            vertical_swing: VerticalSwing::DEFAULT,
            horizontal_swing: HorizontalSwing::DEFAULT,
            switches: [false; 5],
            mode: ClimateMode::Off,
            target_temperature: None,
            unit_temperature: None,
            store,
            facade,
            unit,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        self.arbiter.config()
    }

    pub fn arbiter(&self) -> &TemperatureSourceArbiter {
        &self.arbiter
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display
    }

    pub fn display_unit(&self) -> DisplayUnit {
        self.display_unit
    }

    pub fn vertical_swing(&self) -> VerticalSwing {
        self.vertical_swing
    }

    pub fn horizontal_swing(&self) -> HorizontalSwing {
        self.horizontal_swing
    }

    pub fn temperature_source(&self) -> TemperatureSource {
        self.arbiter.source()
    }

    pub fn switch(&self, kind: SwitchKind) -> bool {
        self.switches[kind.index()]
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut P {
        &mut self.store
    }

    pub fn facade(&self) -> &F {
        &self.facade
    }

    pub fn unit(&self) -> &U {
        &self.unit
    }

    pub fn unit_mut(&mut self) -> &mut U {
        &mut self.unit
    }

    /// Which sensor currently drives the climate state
    pub fn active_sensor(&self) -> ActiveSensor {
        self.arbiter.active_sensor()
    }

    /// Current temperature from the authoritative sensor
    pub fn current_temperature(&self) -> Option<f32> {
        self.arbiter.current_temperature(self.unit_temperature)
    }

    /// Snapshot of the published climate state
    pub fn climate_state(&self) -> ClimateState {
        ClimateState::new(
            self.mode,
            self.current_temperature(),
            self.target_temperature,
            self.config().temperature_tolerance,
        )
    }

    /// Restore persisted preferences and publish them
    pub fn load_preferences(&mut self) {
        let restored = RestoredPreferences::load(&mut self.store);

        if let Some(display) = restored.display {
            self.display = display;
        }
        if let Some(unit) = restored.display_unit {
            self.display_unit = unit;
        }
        if let Some(swing) = restored.vertical_swing {
            self.vertical_swing = swing;
        }
        if let Some(swing) = restored.horizontal_swing {
            self.horizontal_swing = swing;
        }
        for kind in SwitchKind::ALL {
            if let Some(on) = restored.switch(kind) {
                self.switches[kind.index()] = on;
            }
        }
        if let Some(address) = restored.device_address {
            self.arbiter.set_device_address(Some(address));
            self.facade.publish_device_address(&address);
        }
        if let Some(source) = restored.temperature_source {
            let effective = self.arbiter.restore(source);
            if effective != source {
                debug!("Restored temperature source {} as {}", source.label(), effective.label());
                self.persist(StorageKey::TemperatureSource, &effective.index());
            }
        }

        if let Err(e) = write_layout_version(&mut self.store) {
            warn!("Failed to write preference layout version: {:?}", e);
        }

        self.publish_all();

        info!(
            "Preferences loaded - display={} unit={} hswing={} vswing={} temp_source={}",
            self.display.label(),
            self.display_unit.label(),
            self.horizontal_swing.label(),
            self.vertical_swing.label(),
            self.arbiter.source().label()
        );
    }

    /// Publish every option, switch and the climate state
    pub fn publish_all(&mut self) {
        self.facade.publish_option(DisplayMode::KIND, self.display.label());
        self.facade.publish_option(DisplayUnit::KIND, self.display_unit.label());
        self.facade.publish_option(VerticalSwing::KIND, self.vertical_swing.label());
        self.facade.publish_option(HorizontalSwing::KIND, self.horizontal_swing.label());
        self.facade
            .publish_option(TemperatureSource::KIND, self.arbiter.source().label());
        for kind in SwitchKind::ALL {
            self.facade.publish_switch(kind, self.switches[kind.index()]);
        }
        self.publish_climate();
    }

    /// Pull bytes until a frame is complete or the source runs dry
    ///
    /// Returns the completed frame, if any. No byte is read past a complete
    /// frame, so call again until `None` to drain the source.
    pub fn poll_uart<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Option<Frame> {
        while !self.assembler.is_complete() && source.available() {
            match source.read_byte() {
                Some(byte) => {
                    if self.assembler.consume(byte) == FrameEvent::Discarded {
                        debug!("Frame buffer overflow, resynchronizing");
                    }
                }
                None => break,
            }
        }
        self.assembler.take_frame()
    }

    /// Drop a partially received frame
    pub fn reset_uart(&mut self) {
        self.assembler.reset();
    }

    /// Periodic housekeeping, once per scheduler tick
    pub fn tick(&mut self, now_ms: u32) {
        if let Some(change) = self.arbiter.check_timeout(now_ms) {
            self.apply_source_change(change);
        }
    }

    // ---- Unit reports ----
    //
    // State decoded from unit frames. Accepted values are published and
    // persisted but never sent back to the unit.

    /// Operating mode reported by the unit
    pub fn update_mode(&mut self, mode: ClimateMode) {
        if mode != self.mode {
            self.mode = mode;
            self.publish_climate();
        }
    }

    /// Target temperature reported by the unit
    pub fn update_target_temperature(&mut self, temperature: f32) -> Result<(), BridgeError> {
        let temperature = validate_temperature(temperature).inspect_err(|_| {
            warn!("Received out of range target temperature {}", temperature);
        })?;
        self.target_temperature = Some(temperature);
        self.publish_climate();
        Ok(())
    }

    /// Indoor temperature measured by the unit
    pub fn update_unit_temperature(&mut self, temperature: f32) -> Result<(), BridgeError> {
        let temperature = validate_temperature(temperature).inspect_err(|_| {
            warn!("Received out of range inside temperature: {}", temperature);
        })?;
        self.unit_temperature = Some(temperature);
        self.facade
            .publish_sensor(SensorChannel::UnitIndoorTemperature, temperature);
        if self.current_temperature() == Some(temperature) {
            self.publish_climate();
        }
        Ok(())
    }

    pub fn update_display_mode(&mut self, display: DisplayMode) {
        if display != self.display {
            self.display = display;
            self.commit_option(display);
        }
    }

    pub fn update_display_unit(&mut self, unit: DisplayUnit) {
        if unit != self.display_unit {
            self.display_unit = unit;
            self.commit_option(unit);
        }
    }

    pub fn update_vertical_swing(&mut self, swing: VerticalSwing) {
        if swing != self.vertical_swing {
            self.vertical_swing = swing;
            self.commit_option(swing);
        }
    }

    pub fn update_horizontal_swing(&mut self, swing: HorizontalSwing) {
        if swing != self.horizontal_swing {
            self.horizontal_swing = swing;
            self.commit_option(swing);
        }
    }

    pub fn update_switch(&mut self, kind: SwitchKind, on: bool) {
        if on != self.switches[kind.index()] {
            self.switches[kind.index()] = on;
            self.facade.publish_switch(kind, on);
            self.persist(kind.storage_key(), &on);
        }
    }

    // ---- External sensor ----

    /// Reading from the external sensor
    ///
    /// Always shown on the external display channels; drives the climate
    /// state only while the external sensor is authoritative.
    pub fn on_external_reading(
        &mut self,
        temperature: f32,
        humidity: f32,
        now_ms: u32,
    ) -> Result<(), BridgeError> {
        let update = self
            .arbiter
            .on_external_reading(temperature, humidity, now_ms)
            .inspect_err(|_| {
                warn!("Received out of range external temperature: {}", temperature);
            })?;

        self.facade
            .publish_sensor(SensorChannel::ExternalTemperature, temperature);
        self.facade.publish_sensor(SensorChannel::ExternalHumidity, humidity);

        match update.change {
            // Publishes the climate state as well
            Some(change) => self.apply_source_change(change),
            None if update.authoritative => self.publish_climate(),
            None => {}
        }
        Ok(())
    }

    /// Battery level of the external sensor
    pub fn on_external_battery(&mut self, percent: u8) {
        self.arbiter.on_external_battery(percent);
        if let Some(level) = self.arbiter.external_battery() {
            self.facade
                .publish_sensor(SensorChannel::ExternalBattery, f32::from(level));
        }
    }

    /// Advertisement seen by the scanner
    ///
    /// Returns `true` if it carried a reading from the configured device.
    pub fn on_advertisement(&mut self, adv: &Advertisement<'_>, now_ms: u32) -> bool {
        if !self.config().wireless_sensor {
            return false;
        }
        let target = self.arbiter.device_address();
        let Some(reading) = advertisement::decode(adv, target.as_ref()) else {
            return false;
        };

        if self
            .on_external_reading(reading.temperature, reading.humidity, now_ms)
            .is_err()
        {
            return false;
        }
        self.on_external_battery(reading.battery);
        true
    }

    // ---- User inputs ----

    pub fn select_display_mode(&mut self, label: &str) -> Result<(), BridgeError> {
        let display = parse_label::<DisplayMode>(label)?;
        if display != self.display {
            self.unit.set_display_mode(display);
            self.update_display_mode(display);
        }
        Ok(())
    }

    pub fn select_display_unit(&mut self, label: &str) -> Result<(), BridgeError> {
        let unit = parse_label::<DisplayUnit>(label)?;
        if unit != self.display_unit {
            self.unit.set_display_unit(unit);
            self.update_display_unit(unit);
        }
        Ok(())
    }

    pub fn select_vertical_swing(&mut self, label: &str) -> Result<(), BridgeError> {
        let swing = parse_label::<VerticalSwing>(label)?;
        if swing != self.vertical_swing {
            self.unit.set_vertical_swing(swing);
            self.update_vertical_swing(swing);
        }
        Ok(())
    }

    pub fn select_horizontal_swing(&mut self, label: &str) -> Result<(), BridgeError> {
        let swing = parse_label::<HorizontalSwing>(label)?;
        if swing != self.horizontal_swing {
            self.unit.set_horizontal_swing(swing);
            self.update_horizontal_swing(swing);
        }
        Ok(())
    }

    /// User choice of temperature source
    pub fn select_temperature_source(&mut self, label: &str) -> Result<(), BridgeError> {
        let source = parse_label::<TemperatureSource>(label)?;
        if let Some(change) = self.arbiter.on_user_select(source) {
            self.apply_source_change(change);
        }
        Ok(())
    }

    /// User toggled a switch
    pub fn set_switch(&mut self, kind: SwitchKind, on: bool) {
        if on == self.switches[kind.index()] {
            return;
        }
        match kind {
            SwitchKind::Plasma => self.unit.set_plasma(on),
            SwitchKind::Beeper => self.unit.set_beeper(on),
            SwitchKind::Sleep => self.unit.set_sleep(on),
            SwitchKind::XFan => self.unit.set_xfan(on),
            SwitchKind::Save => self.unit.set_save(on),
        }
        self.update_switch(kind, on);
    }

    /// User entered the external sensor address
    ///
    /// Only the strict `HH:HH:HH:HH:HH:HH` form is accepted. Returns the
    /// accepted address, which is also published in canonical form.
    pub fn set_device_address(&mut self, text: &str) -> Result<MacAddress, BridgeError> {
        let address = MacAddress::parse(text).inspect_err(|e| {
            warn!("Rejected device address ({:?})", e);
        })?;

        if self.arbiter.set_device_address(Some(address)) {
            info!("External sensor address set to {}", address.normalize().as_str());
            self.persist(StorageKey::DeviceAddress, address.bytes());
        }
        self.facade.publish_device_address(&address);
        Ok(address)
    }

    // ---- Internals ----

    fn apply_source_change(&mut self, change: SourceChange) {
        debug!(
            "Temperature source {} -> {} ({:?})",
            change.from.label(),
            change.to.label(),
            change.reason
        );
        self.facade
            .publish_option(TemperatureSource::KIND, change.to.label());
        self.persist(StorageKey::TemperatureSource, &change.to.index());
        self.unit.temperature_source_changed(change.to);
        self.publish_climate();
    }

    fn commit_option<T: OptionSet>(&mut self, value: T) {
        self.facade.publish_option(T::KIND, value.label());
        self.persist(T::KIND.storage_key(), &value.index());
        debug!("Saved {:?} preference: {} (index {})", T::KIND, value.label(), value.index());
    }

    fn publish_climate(&mut self) {
        let state = self.climate_state();
        self.facade.publish_climate(&state);
    }

    /// Persistence failures are logged and otherwise ignored; the in-memory
    /// state stays authoritative until the next boot.
    fn persist<T: serde::Serialize>(&mut self, key: StorageKey, value: &T) {
        if let Err(e) = self.store.save(key, value) {
            warn!("Failed to persist {:?}: {:?}", key, e);
        }
    }
}

fn parse_label<T: OptionSet>(label: &str) -> Result<T, SelectError> {
    T::from_label(label).ok_or_else(|| {
        warn!("Unknown {:?} option", T::KIND);
        SelectError::UnknownOption(T::KIND)
    })
}
