//! Bridge error types

use sinclair_protocol::AddressError;

use crate::climate::ClimateError;
use crate::options::OptionKind;

/// A select input carried a label outside its option set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SelectError {
    UnknownOption(OptionKind),
}

/// Errors returned by bridge inputs
///
/// Every error leaves the previous state in place. Storage failures are
/// not reported here; the bridge logs them and keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    Select(SelectError),
    Address(AddressError),
    Climate(ClimateError),
}

impl From<SelectError> for BridgeError {
    fn from(e: SelectError) -> Self {
        BridgeError::Select(e)
    }
}

impl From<AddressError> for BridgeError {
    fn from(e: AddressError) -> Self {
        BridgeError::Address(e)
    }
}

impl From<ClimateError> for BridgeError {
    fn from(e: ClimateError) -> Self {
        BridgeError::Climate(e)
    }
}
