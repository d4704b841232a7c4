//! Hardware addresses of wireless sensors

use core::fmt;

use heapless::String;

/// Errors from parsing a textual hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressError {
    /// Not exactly 17 characters
    WrongLength,
    /// A `:` is missing between two octets
    MissingSeparator,
    /// A character that is not a hex digit
    InvalidHex,
}

/// Six-byte hardware address, most significant octet first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddress(pub [u8; 6]);

/// Length of the `HH:HH:HH:HH:HH:HH` form
pub const ADDRESS_TEXT_LEN: usize = 17;

impl MacAddress {
    /// Wrap raw address bytes
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Build from bytes transmitted least significant octet first
    pub fn from_reversed(bytes: &[u8; 6]) -> Self {
        let mut out = *bytes;
        out.reverse();
        Self(out)
    }

    /// Raw address bytes
    pub const fn bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Parse the strict `HH:HH:HH:HH:HH:HH` form
    ///
    /// Exactly 17 characters, a `:` at every third position and hex digits
    /// (either case) everywhere else.
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        let raw = text.as_bytes();
        if raw.len() != ADDRESS_TEXT_LEN {
            return Err(AddressError::WrongLength);
        }

        let mut bytes = [0u8; 6];
        for (i, octet) in bytes.iter_mut().enumerate() {
            let at = i * 3;
            if i > 0 && raw[at - 1] != b':' {
                return Err(AddressError::MissingSeparator);
            }
            let hi = hex_value(raw[at]).ok_or(AddressError::InvalidHex)?;
            let lo = hex_value(raw[at + 1]).ok_or(AddressError::InvalidHex)?;
            *octet = (hi << 4) | lo;
        }

        Ok(Self(bytes))
    }

    /// Separator-free upper-case form, e.g. `AABBCCDDEEFF`
    pub fn normalize(&self) -> String<12> {
        let mut out = String::new();
        for byte in self.0 {
            // 12 characters always fit
            let _ = out.push(hex_digit(byte >> 4));
            let _ = out.push(hex_digit(byte & 0x0F));
        }
        out
    }

    /// Canonical `AA:BB:CC:DD:EE:FF` form
    pub fn to_text(&self) -> String<ADDRESS_TEXT_LEN> {
        let mut out = String::new();
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                let _ = out.push(':');
            }
            let _ = out.push(hex_digit(byte >> 4));
            let _ = out.push(hex_digit(byte & 0x0F));
        }
        out
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn hex_digit(nibble: u8) -> char {
    match nibble {
        0..=9 => (b'0' + nibble) as char,
        _ => (b'A' + nibble - 10) as char,
    }
}
