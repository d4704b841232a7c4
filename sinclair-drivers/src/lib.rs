//! Concrete implementations of the bridge's collaborator traits
//!
//! - [`RamPreferences`]: write-back preference cache in front of flash
//! - [`PipeSource`]: byte source over an interrupt-fed `embassy-sync` pipe

#![no_std]
#![deny(unsafe_code)]

mod fmt;

pub mod storage;
pub mod uart;

pub use storage::RamPreferences;
pub use uart::PipeSource;
