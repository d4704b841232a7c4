//! Wireless thermometer advertisements
//!
//! Thermometers running the ATC firmware broadcast their readings as
//! environmental-sensing service data. Payload layout (at least 11 bytes):
//!
//! ```text
//! ┌───────────────────┬─────────────┬──────────────┬─────────┐
//! │ ADDRESS (LSB 1st) │ TEMP i16 BE │ HUMID u16 BE │ BATTERY │
//! │ 6B                │ 2B (0.01°C) │ 2B (0.01 %)  │ 1B (%)  │
//! └───────────────────┴─────────────┴──────────────┴─────────┘
//! ```
//!
//! Advertisements that do not match are ignored, never reported as errors.

use crate::address::MacAddress;

/// 16-bit service identifier for environmental sensing
pub const ENVIRONMENTAL_SENSING_UUID: u16 = 0x181A;

/// Shortest payload that carries address, temperature, humidity and battery
pub const MIN_PAYLOAD_LEN: usize = 11;

/// One service-data entry of an advertisement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceData<'a> {
    /// 16-bit service identifier
    pub uuid: u16,
    /// Raw service data
    pub data: &'a [u8],
}

/// Pre-filtered advertisement as delivered by the scanner
#[derive(Debug, Clone, Copy)]
pub struct Advertisement<'a> {
    /// Transport-level source address
    pub address: MacAddress,
    /// Service-data entries in the order they were advertised
    pub service_data: &'a [ServiceData<'a>],
}

/// Measurement decoded from a matching advertisement
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AtcReading {
    /// Temperature in °C
    pub temperature: f32,
    /// Relative humidity in %
    pub humidity: f32,
    /// Battery level in %
    pub battery: u8,
}

/// Decode the reading of the configured thermometer, if this advertisement
/// carries one
///
/// The device matches on either the transport address or the address
/// embedded in the payload, since some firmware broadcasts from a random
/// address. Only the first environmental-sensing entry long enough to hold a
/// reading is considered.
pub fn decode(adv: &Advertisement<'_>, configured: Option<&MacAddress>) -> Option<AtcReading> {
    let configured = configured?;
    let transport_match = adv.address == *configured;

    let entry = adv
        .service_data
        .iter()
        .find(|entry| entry.uuid == ENVIRONMENTAL_SENSING_UUID && entry.data.len() >= MIN_PAYLOAD_LEN)?;
    let data = entry.data;

    let embedded: [u8; 6] = data[0..6].try_into().ok()?;
    if !transport_match && MacAddress::from_reversed(&embedded) != *configured {
        return None;
    }

    let temperature = i16::from_be_bytes([data[6], data[7]]);
    let humidity = u16::from_be_bytes([data[8], data[9]]);

    Some(AtcReading {
        temperature: f32::from(temperature) * 0.01,
        humidity: f32::from(humidity) * 0.01,
        battery: data[10],
    })
}
