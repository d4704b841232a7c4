//! Per-model unit control hooks

use crate::options::{DisplayMode, DisplayUnit, HorizontalSwing, TemperatureSource, VerticalSwing};

/// Commands sent to the indoor unit when the user changes a setting
///
/// The bridge calls exactly one hook per accepted user change, before it
/// updates and persists its own state. Model-specific encoding of the
/// command into frames lives entirely in the implementation.
pub trait UnitControl {
    /// Move the vertical louver
    fn set_vertical_swing(&mut self, swing: VerticalSwing);

    /// Move the horizontal louver
    fn set_horizontal_swing(&mut self, swing: HorizontalSwing);

    /// Change what the front panel shows
    fn set_display_mode(&mut self, mode: DisplayMode);

    /// Change the front panel temperature unit
    fn set_display_unit(&mut self, unit: DisplayUnit);

    fn set_plasma(&mut self, on: bool);

    fn set_beeper(&mut self, on: bool);

    fn set_sleep(&mut self, on: bool);

    fn set_xfan(&mut self, on: bool);

    fn set_save(&mut self, on: bool);

    /// The authoritative temperature source changed
    ///
    /// Called for user selections as well as automatic fallback and
    /// recovery. Models that forward the room temperature to the unit
    /// switch their "follow me" behavior here.
    fn temperature_source_changed(&mut self, _source: TemperatureSource) {}
}
