//! Board-agnostic logic for the Sinclair/Gree AC bridge
//!
//! This crate contains everything between the raw UART bytes and the
//! published climate entity that does not depend on specific hardware:
//!
//! - Select option sets and their persisted indices
//! - Temperature source arbitration with staleness fallback
//! - Climate action estimation and range validation
//! - Collaborator traits (unit control hooks, publication, preferences)
//! - Preference layout versioning
//! - The [`Bridge`](controller::Bridge) that ties them together per tick

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible to later modules
mod fmt;

pub mod climate;
pub mod config;
pub mod controller;
pub mod error;
pub mod options;
pub mod source;
pub mod traits;

pub use controller::Bridge;
pub use error::{BridgeError, SelectError};
