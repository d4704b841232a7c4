//! Build-time configuration
//!
//! Constants are generated from bridge.toml by build.rs.

use sinclair_core::config::{BridgeConfig, RecoveryPolicy};

include!(concat!(env!("OUT_DIR"), "/bridge_config.rs"));

/// Runtime bridge configuration built from bridge.toml
pub fn bridge_config() -> BridgeConfig {
    BridgeConfig {
        wireless_sensor: WIRELESS_SENSOR,
        recovery: RECOVERY,
        external_timeout_ms: EXTERNAL_TIMEOUT_MS,
        temperature_tolerance: TEMPERATURE_TOLERANCE,
    }
}
