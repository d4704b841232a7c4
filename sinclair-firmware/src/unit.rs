//! Unit control hooks
//!
//! Command encoding for the indoor unit is model specific and not known for
//! this board yet; accepted changes are logged so the host side can follow.

use defmt::*;

use sinclair_core::options::{
    DisplayMode, DisplayUnit, HorizontalSwing, OptionSet, TemperatureSource, VerticalSwing,
};
use sinclair_core::traits::UnitControl;

/// Unit control that records each requested change in the log
pub struct LogUnit;

impl UnitControl for LogUnit {
    fn set_vertical_swing(&mut self, swing: VerticalSwing) {
        info!("unit: vertical swing -> {}", swing.label());
    }

    fn set_horizontal_swing(&mut self, swing: HorizontalSwing) {
        info!("unit: horizontal swing -> {}", swing.label());
    }

    fn set_display_mode(&mut self, mode: DisplayMode) {
        info!("unit: display -> {}", mode.label());
    }

    fn set_display_unit(&mut self, unit: DisplayUnit) {
        info!("unit: display unit -> {}", unit.label());
    }

    fn set_plasma(&mut self, on: bool) {
        info!("unit: plasma -> {}", on);
    }

    fn set_beeper(&mut self, on: bool) {
        info!("unit: beeper -> {}", on);
    }

    fn set_sleep(&mut self, on: bool) {
        info!("unit: sleep -> {}", on);
    }

    fn set_xfan(&mut self, on: bool) {
        info!("unit: x-fan -> {}", on);
    }

    fn set_save(&mut self, on: bool) {
        info!("unit: save -> {}", on);
    }

    fn temperature_source_changed(&mut self, source: TemperatureSource) {
        info!("unit: temperature source -> {}", source.label());
    }
}
