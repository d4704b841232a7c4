//! RP2040-specific HAL for the bridge firmware
//!
//! Implements the shared `sinclair-hal` traits on RP2040 peripherals:
//!
//! - Flash storage driver (implements `sinclair_hal::FlashStorage`)
//! - UART line settings and pin mapping for the AC link

#![no_std]

pub mod flash;
pub mod uart;

// Re-export shared traits from sinclair-hal for convenience
pub use sinclair_hal::{FlashStorage as FlashStorageTrait, StorageKey};
