//! Published climate state
//!
//! The bridge publishes mode, current and target temperature plus an
//! action derived from them. The unit does not report what it is actually
//! doing, so the action is estimated from the mode and a tolerance band
//! around the target.

/// Lowest target temperature offered to the user (°C)
pub const MIN_TEMPERATURE: f32 = 16.0;
/// Highest target temperature offered to the user (°C)
pub const MAX_TEMPERATURE: f32 = 30.0;
/// Target temperature step (°C)
pub const TEMPERATURE_STEP: f32 = 0.5;
/// Default width of the action tolerance band (°C)
pub const TEMPERATURE_TOLERANCE: f32 = 1.0;
/// Reported temperatures above this are treated as corrupt (°C)
pub const TEMPERATURE_THRESHOLD: f32 = 100.0;

/// Operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClimateMode {
    #[default]
    Off,
    Auto,
    Cool,
    Heat,
    HeatCool,
    FanOnly,
    Dry,
}

/// Estimated current activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClimateAction {
    #[default]
    Off,
    Fan,
    Drying,
    Cooling,
    Heating,
    Idle,
}

/// Errors from validating a reported temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClimateError {
    /// Above [`TEMPERATURE_THRESHOLD`]
    OutOfRange,
    /// Not a number
    NotANumber,
}

/// Reject temperatures that cannot be physical
pub fn validate_temperature(temperature: f32) -> Result<f32, ClimateError> {
    if temperature.is_nan() {
        return Err(ClimateError::NotANumber);
    }
    if temperature > TEMPERATURE_THRESHOLD {
        return Err(ClimateError::OutOfRange);
    }
    Ok(temperature)
}

/// Estimate the action for a mode and temperature pair
///
/// Cooling while within `tolerance` below the target or anywhere above it,
/// heating while within `tolerance` above the target or anywhere below it.
/// In `HeatCool` cooling wins.
pub fn determine_action(mode: ClimateMode, current: f32, target: f32, tolerance: f32) -> ClimateAction {
    match mode {
        ClimateMode::Off => ClimateAction::Off,
        ClimateMode::FanOnly => ClimateAction::Fan,
        ClimateMode::Dry => ClimateAction::Drying,
        ClimateMode::Cool | ClimateMode::HeatCool if current + tolerance >= target => {
            ClimateAction::Cooling
        }
        ClimateMode::Heat | ClimateMode::HeatCool if current - tolerance <= target => {
            ClimateAction::Heating
        }
        _ => ClimateAction::Idle,
    }
}

/// Snapshot handed to [`ClimateFacade::publish_climate`](crate::traits::ClimateFacade::publish_climate)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClimateState {
    pub mode: ClimateMode,
    /// Authoritative current temperature, `None` until any sensor reported
    pub current_temperature: Option<f32>,
    pub target_temperature: Option<f32>,
    pub action: ClimateAction,
}

impl ClimateState {
    /// Build a snapshot, computing the action
    ///
    /// Without both temperatures only the mode-derived actions are known;
    /// temperature-dependent modes report `Idle`.
    pub fn new(
        mode: ClimateMode,
        current_temperature: Option<f32>,
        target_temperature: Option<f32>,
        tolerance: f32,
    ) -> Self {
        let action = match (current_temperature, target_temperature) {
            (Some(current), Some(target)) => determine_action(mode, current, target, tolerance),
            _ => match mode {
                ClimateMode::Off => ClimateAction::Off,
                ClimateMode::FanOnly => ClimateAction::Fan,
                ClimateMode::Dry => ClimateAction::Drying,
                _ => ClimateAction::Idle,
            },
        };

        Self {
            mode,
            current_temperature,
            target_temperature,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_only_actions() {
        assert_eq!(determine_action(ClimateMode::Off, 30.0, 20.0, 1.0), ClimateAction::Off);
        assert_eq!(determine_action(ClimateMode::FanOnly, 30.0, 20.0, 1.0), ClimateAction::Fan);
        assert_eq!(determine_action(ClimateMode::Dry, 30.0, 20.0, 1.0), ClimateAction::Drying);
        assert_eq!(determine_action(ClimateMode::Auto, 30.0, 20.0, 1.0), ClimateAction::Idle);
    }

    #[test]
    fn test_cooling_band() {
        // current >= target - tolerance
        assert_eq!(determine_action(ClimateMode::Cool, 25.0, 24.0, 1.0), ClimateAction::Cooling);
        assert_eq!(determine_action(ClimateMode::Cool, 23.0, 24.0, 1.0), ClimateAction::Cooling);
        assert_eq!(determine_action(ClimateMode::Cool, 22.5, 24.0, 1.0), ClimateAction::Idle);
    }

    #[test]
    fn test_heating_band() {
        // current <= target + tolerance
        assert_eq!(determine_action(ClimateMode::Heat, 20.0, 22.0, 1.0), ClimateAction::Heating);
        assert_eq!(determine_action(ClimateMode::Heat, 23.0, 22.0, 1.0), ClimateAction::Heating);
        assert_eq!(determine_action(ClimateMode::Heat, 23.5, 22.0, 1.0), ClimateAction::Idle);
    }

    #[test]
    fn test_heat_cool_prefers_cooling() {
        assert_eq!(determine_action(ClimateMode::HeatCool, 22.0, 22.0, 1.0), ClimateAction::Cooling);
        assert_eq!(determine_action(ClimateMode::HeatCool, 18.0, 22.0, 1.0), ClimateAction::Heating);
    }

    #[test]
    fn test_validate_temperature() {
        assert_eq!(validate_temperature(25.5), Ok(25.5));
        assert_eq!(validate_temperature(100.0), Ok(100.0));
        assert_eq!(validate_temperature(100.5), Err(ClimateError::OutOfRange));
        assert_eq!(validate_temperature(f32::NAN), Err(ClimateError::NotANumber));
        assert_eq!(validate_temperature(-10.0), Ok(-10.0));
    }

    #[test]
    fn test_state_without_temperatures() {
        let state = ClimateState::new(ClimateMode::Cool, None, Some(24.0), 1.0);
        assert_eq!(state.action, ClimateAction::Idle);

        let state = ClimateState::new(ClimateMode::Dry, None, None, 1.0);
        assert_eq!(state.action, ClimateAction::Drying);

        let state = ClimateState::new(ClimateMode::Cool, Some(26.0), Some(24.0), 1.0);
        assert_eq!(state.action, ClimateAction::Cooling);
    }
}
