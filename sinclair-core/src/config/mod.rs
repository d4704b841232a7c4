//! Configuration and persisted preferences
//!
//! Runtime configuration is plain data handed to the bridge at
//! construction. User preferences are stored one value per key as postcard
//! binary data, under a layout version tag.

pub mod bridge;
pub mod preferences;

pub use bridge::*;
pub use preferences::*;
