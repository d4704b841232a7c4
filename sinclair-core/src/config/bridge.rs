//! Runtime bridge configuration

use serde::{Deserialize, Serialize};

use crate::climate::TEMPERATURE_TOLERANCE;

/// Timeout after which a silent external sensor is abandoned (15 minutes)
pub const EXTERNAL_TIMEOUT_MS: u32 = 900_000;

/// What happens after the external sensor timed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecoveryPolicy {
    /// Park in "ATC Fail" and return to the external sensor as soon as it
    /// reports again
    #[default]
    Automatic,
    /// Fall back to the unit's own sensor and stay there until the user
    /// selects the external sensor again
    Manual,
}

/// Bridge configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeConfig {
    /// A wireless advertisement source is present
    ///
    /// When set, selecting the external sensor without a configured device
    /// address falls back immediately.
    pub wireless_sensor: bool,
    /// Behavior after an external sensor timeout
    pub recovery: RecoveryPolicy,
    /// Staleness threshold for external readings (ms)
    pub external_timeout_ms: u32,
    /// Width of the band used to estimate the climate action (°C)
    pub temperature_tolerance: f32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            wireless_sensor: true,
            recovery: RecoveryPolicy::Automatic,
            external_timeout_ms: EXTERNAL_TIMEOUT_MS,
            temperature_tolerance: TEMPERATURE_TOLERANCE,
        }
    }
}

impl BridgeConfig {
    /// Configuration for an external sensor fed by something other than
    /// wireless advertisements
    pub fn wired() -> Self {
        Self {
            wireless_sensor: false,
            ..Self::default()
        }
    }

    pub fn with_recovery(mut self, recovery: RecoveryPolicy) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.external_timeout_ms = timeout_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert!(config.wireless_sensor);
        assert_eq!(config.recovery, RecoveryPolicy::Automatic);
        assert_eq!(config.external_timeout_ms, 900_000);
        assert_eq!(config.temperature_tolerance, 1.0);
    }

    #[test]
    fn test_builders() {
        let config = BridgeConfig::wired()
            .with_recovery(RecoveryPolicy::Manual)
            .with_timeout_ms(60_000);
        assert!(!config.wireless_sensor);
        assert_eq!(config.recovery, RecoveryPolicy::Manual);
        assert_eq!(config.external_timeout_ms, 60_000);
    }
}
