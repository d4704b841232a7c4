//! Build script for sinclair-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates bridge.toml and turns it into Rust constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    let settings = validate_config();
    generate_config(&settings);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Values taken from bridge.toml, defaults filled in
struct Settings {
    wireless_sensor: bool,
    manual_recovery: bool,
    external_timeout_ms: u32,
    temperature_tolerance: f64,
    device_address: Option<String>,
    tick_interval_ms: u32,
    flush_delay_ms: u32,
}

/// Validate bridge.toml at compile time
fn validate_config() -> Settings {
    println!("cargo:rerun-if-changed=bridge.toml");

    let config_path = Path::new("bridge.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: bridge.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a bridge.toml configuration file.         ║\n\
            ║  Please create one in the sinclair-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read bridge.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in bridge.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let settings = read_settings(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid bridge configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=bridge.toml validated successfully");
    settings
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn read_settings(config: &toml::Value, errors: &mut Vec<String>) -> Settings {
    let mut settings = Settings {
        wireless_sensor: true,
        manual_recovery: false,
        external_timeout_ms: 900_000,
        temperature_tolerance: 1.0,
        device_address: None,
        tick_interval_ms: 100,
        flush_delay_ms: 2_000,
    };

    for section in config.as_table().into_iter().flat_map(|t| t.keys()) {
        if !["bridge", "sensor", "firmware"].contains(&section.as_str()) {
            errors.push(format!("Unknown section [{}]", section));
        }
    }

    if let Some(bridge) = section(config, "bridge", errors) {
        if let Some(value) = bridge.get("recovery") {
            match value.as_str() {
                Some("automatic") => settings.manual_recovery = false,
                Some("manual") => settings.manual_recovery = true,
                _ => errors.push("[bridge] recovery must be 'automatic' or 'manual'".into()),
            }
        }

        if let Some(value) = bridge.get("external_timeout_s") {
            match value.as_integer() {
                Some(secs @ 10..=86_400) => settings.external_timeout_ms = secs as u32 * 1000,
                _ => errors.push("[bridge] external_timeout_s must be 10-86400".into()),
            }
        }

        if let Some(value) = bridge.get("temperature_tolerance") {
            let tolerance = value.as_float().or(value.as_integer().map(|i| i as f64));
            match tolerance {
                Some(t) if (0.0..=5.0).contains(&t) => settings.temperature_tolerance = t,
                _ => errors.push("[bridge] temperature_tolerance must be 0.0-5.0".into()),
            }
        }
    }

    if let Some(sensor) = section(config, "sensor", errors) {
        if let Some(value) = sensor.get("wireless") {
            match value.as_bool() {
                Some(wireless) => settings.wireless_sensor = wireless,
                None => errors.push("[sensor] wireless must be true or false".into()),
            }
        }

        if let Some(value) = sensor.get("address") {
            match value.as_str() {
                Some(address) if is_device_address(address) => {
                    settings.device_address = Some(address.to_uppercase());
                }
                _ => errors.push("[sensor] address must look like A4:C1:38:0B:2E:1F".into()),
            }
        }
    }

    if let Some(firmware) = section(config, "firmware", errors) {
        if let Some(value) = firmware.get("tick_interval_ms") {
            match value.as_integer() {
                Some(ms @ 10..=1_000) => settings.tick_interval_ms = ms as u32,
                _ => errors.push("[firmware] tick_interval_ms must be 10-1000".into()),
            }
        }

        if let Some(value) = firmware.get("flush_delay_ms") {
            match value.as_integer() {
                Some(ms @ 0..=60_000) => settings.flush_delay_ms = ms as u32,
                _ => errors.push("[firmware] flush_delay_ms must be 0-60000".into()),
            }
        }
    }

    settings
}

/// Look up an optional table section
fn section<'a>(
    config: &'a toml::Value,
    name: &str,
    errors: &mut Vec<String>,
) -> Option<&'a toml::map::Map<String, toml::Value>> {
    match config.get(name) {
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
        None => None,
    }
}

/// Six colon-separated hex octets
fn is_device_address(text: &str) -> bool {
    let octets: Vec<&str> = text.split(':').collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Write the validated settings as constants for `src/config.rs`
fn generate_config(settings: &Settings) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let recovery = if settings.manual_recovery {
        "RecoveryPolicy::Manual"
    } else {
        "RecoveryPolicy::Automatic"
    };
    let address = match &settings.device_address {
        Some(address) => format!("Some({:?})", address),
        None => "None".to_string(),
    };

    let generated = format!(
        "// Generated from bridge.toml by build.rs\n\
         pub const WIRELESS_SENSOR: bool = {};\n\
         pub const RECOVERY: RecoveryPolicy = {};\n\
         pub const EXTERNAL_TIMEOUT_MS: u32 = {};\n\
         pub const TEMPERATURE_TOLERANCE: f32 = {:?};\n\
         pub const DEVICE_ADDRESS: Option<&str> = {};\n\
         pub const TICK_INTERVAL_MS: u32 = {};\n\
         pub const FLUSH_DELAY_MS: u32 = {};\n",
        settings.wireless_sensor,
        recovery,
        settings.external_timeout_ms,
        settings.temperature_tolerance as f32,
        address,
        settings.tick_interval_ms,
        settings.flush_delay_ms,
    );

    fs::write(out_dir.join("bridge_config.rs"), generated).unwrap();
}
