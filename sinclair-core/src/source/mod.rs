//! Temperature source selection

pub mod arbiter;

pub use arbiter::{
    ActiveSensor, ChangeReason, ExternalUpdate, SourceChange, TemperatureSourceArbiter,
};
