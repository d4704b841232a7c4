//! Wire formats spoken by the Sinclair AC bridge
//!
//! Two independent byte formats arrive at the bridge:
//!
//! - The indoor unit's serial link. Frames are self-delimited by a doubled
//!   synchronization byte and an explicit length:
//!
//! ```text
//! ┌──────┬──────┬────────┬──────┬─────────────┬──────────┐
//! │ 0x7E │ 0x7E │ LENGTH │ CMD  │ PAYLOAD     │ CHECKSUM │
//! │ 1B   │ 1B   │ 1B     │ 1B   │ LENGTH - 2  │ 1B       │
//! └──────┴──────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//!   LENGTH counts every byte after itself. The [`FrameAssembler`] finds
//!   frame boundaries in the raw stream; payload semantics belong to the
//!   unit protocol decoder.
//!
//! - Environmental-sensing (0x181A) service data broadcast by wireless
//!   thermometers, decoded by [`advertisement::decode`].

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod address;
pub mod advertisement;
pub mod frame;

pub use address::{AddressError, MacAddress};
pub use advertisement::{Advertisement, AtcReading, ServiceData};
pub use frame::{
    Frame, FrameAssembler, FrameError, FrameEvent, SyncState, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
    SYNC_BYTE,
};
