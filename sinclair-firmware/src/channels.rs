//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.
//!
//! [`INPUT_CHANNEL`] is the entry point for the integration side: the host
//! link or radio coprocessor that carries user selections and external
//! sensor readings. This board has no radio of its own, so wireless
//! advertisements arrive already decoded as [`BridgeInput::ExternalReading`]
//! and [`BridgeInput::ExternalBattery`]. The controller task is the only
//! receiver; nothing on this board sends.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::pipe::Pipe;
use embassy_sync::signal::Signal;
use heapless::String;

use sinclair_core::options::{OptionKind, SwitchKind};

/// Bytes buffered between the UART receive task and the controller
///
/// Holds a little more than one maximum-size frame.
pub const RX_PIPE_SIZE: usize = 256;

/// Channel capacity for inputs from the integration side
const INPUT_CHANNEL_SIZE: usize = 8;

/// Longest address text accepted from the integration side
///
/// Longer than a valid address so malformed input still reaches validation.
pub const ADDRESS_INPUT_LEN: usize = 24;

/// Something the integration side asks the bridge to do
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeInput {
    /// The user picked an option from one of the select lists
    Select {
        kind: OptionKind,
        label: &'static str,
    },
    /// The user flipped a switch
    Switch { kind: SwitchKind, on: bool },
    /// The user entered an external sensor address
    DeviceAddress(String<ADDRESS_INPUT_LEN>),
    /// An external sensor reported over a non-wireless path
    ExternalReading { temperature: f32, humidity: f32 },
    /// External sensor battery level (%)
    ExternalBattery(u8),
}

/// Raw bytes received from the indoor unit
pub static RX_PIPE: Pipe<CriticalSectionRawMutex, RX_PIPE_SIZE> = Pipe::new();

/// Inputs for the controller task, sent by the integration side
pub static INPUT_CHANNEL: Channel<CriticalSectionRawMutex, BridgeInput, INPUT_CHANNEL_SIZE> =
    Channel::new();

/// Signal that preferences changed and should be written to flash
pub static PERSIST_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();
