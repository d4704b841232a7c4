//! Preference storage

pub mod ram;

pub use ram::{PreferenceValue, RamPreferences};
