//! UART serial communication abstractions
//!
//! The AC link is consumed one byte at a time by the framing state machine,
//! so the receive side is modelled as a pull-based byte source rather than a
//! buffer-filling reader.

/// Pull-based source of received bytes
///
/// Implementations wrap whatever receive buffering the platform provides
/// (interrupt-fed ring buffer, DMA buffer, test slice). The bridge only asks
/// whether a byte is ready and then takes exactly one.
pub trait ByteSource {
    /// Check if at least one byte can be read without waiting
    fn available(&mut self) -> bool;

    /// Read a single byte
    ///
    /// Returns `None` if no byte is available or the read failed.
    fn read_byte(&mut self) -> Option<u8>;
}

/// Byte slices act as a source that drains from the front
impl ByteSource for &[u8] {
    fn available(&mut self) -> bool {
        !self.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        let (&byte, rest) = self.split_first()?;
        *self = rest;
        Some(byte)
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::ac_link()
    }
}

impl UartConfig {
    /// Line settings of the indoor unit's serial port (4800 8E1)
    pub const fn ac_link() -> Self {
        Self {
            baudrate: 4800,
            data_bits: DataBits::Eight,
            parity: Parity::Even,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_drains_in_order() {
        let data = [0x7E, 0x7E, 0x03];
        let mut source: &[u8] = &data;

        assert!(source.available());
        assert_eq!(source.read_byte(), Some(0x7E));
        assert_eq!(source.read_byte(), Some(0x7E));
        assert_eq!(source.read_byte(), Some(0x03));
        assert!(!source.available());
        assert_eq!(source.read_byte(), None);
    }

    #[test]
    fn test_ac_link_settings() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 4800);
        assert_eq!(config.parity, Parity::Even);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.stop_bits, StopBits::One);
    }
}
