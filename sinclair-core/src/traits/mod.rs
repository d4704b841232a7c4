//! Collaborator interfaces
//!
//! The bridge owns no hardware and no framework objects. Everything it
//! talks to is injected through these traits at construction time.

pub mod control;
pub mod facade;
pub mod store;

pub use control::UnitControl;
pub use facade::{ClimateFacade, SensorChannel};
pub use store::{PreferenceError, PreferenceStore, PreferenceStoreExt, MAX_PREFERENCE_SIZE};
