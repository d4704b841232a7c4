//! Persisted preference layout
//!
//! Option selections are stored as indices into their option sets, so a
//! stored index is only meaningful against the ordering it was written
//! with. The layout version tag records that ordering:
//!
//! - no tag: legacy layout, temperature source had two entries
//! - [`PREFERENCE_LAYOUT_VERSION`]: current option sets
//! - anything else: written by unknown firmware, option indices are ignored
//!
//! Switches and the device address do not depend on option ordering and
//! are restored under every layout.

use sinclair_hal::StorageKey;
use sinclair_protocol::MacAddress;

use crate::options::{
    DisplayMode, DisplayUnit, HorizontalSwing, OptionKind, OptionSet, SwitchKind,
    TemperatureSource, VerticalSwing, LEGACY_TEMPERATURE_SOURCE_COUNT,
};
use crate::traits::{PreferenceError, PreferenceStore, PreferenceStoreExt};

/// Current preference layout version
pub const PREFERENCE_LAYOUT_VERSION: u8 = 2;

/// Layout the stored preferences were written with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutVersion {
    /// No tag stored
    Legacy,
    /// Matches [`PREFERENCE_LAYOUT_VERSION`]
    Current,
    /// Tag from a layout this firmware does not know
    Unknown(u8),
}

impl LayoutVersion {
    /// Classify a stored tag
    pub fn from_tag(tag: Option<u8>) -> Self {
        match tag {
            None => LayoutVersion::Legacy,
            Some(PREFERENCE_LAYOUT_VERSION) => LayoutVersion::Current,
            Some(other) => LayoutVersion::Unknown(other),
        }
    }

    /// Read the tag from the store
    ///
    /// An unreadable tag counts as unknown so no index is misread.
    pub fn load<S: PreferenceStore + ?Sized>(store: &mut S) -> Self {
        match store.load::<u8>(StorageKey::LayoutVersion) {
            Ok(tag) => Self::from_tag(tag),
            Err(e) => {
                warn!("Unreadable preference layout tag: {:?}", e);
                LayoutVersion::Unknown(u8::MAX)
            }
        }
    }

    /// Number of valid stored indices for an option set under this layout
    ///
    /// `None` if indices from this layout must not be used at all.
    pub fn index_limit(self, kind: OptionKind) -> Option<u8> {
        match (self, kind) {
            (LayoutVersion::Unknown(_), _) => None,
            (LayoutVersion::Legacy, OptionKind::TemperatureSource) => {
                Some(LEGACY_TEMPERATURE_SOURCE_COUNT)
            }
            _ => Some(kind.len()),
        }
    }
}

/// Write the current layout tag
pub fn write_layout_version<S: PreferenceStore + ?Sized>(store: &mut S) -> Result<(), PreferenceError> {
    store.save(StorageKey::LayoutVersion, &PREFERENCE_LAYOUT_VERSION)
}

/// Everything found in the store at boot
///
/// `None` fields were absent or rejected; the bridge keeps its defaults for
/// those.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoredPreferences {
    pub display: Option<DisplayMode>,
    pub display_unit: Option<DisplayUnit>,
    pub vertical_swing: Option<VerticalSwing>,
    pub horizontal_swing: Option<HorizontalSwing>,
    pub temperature_source: Option<TemperatureSource>,
    /// Indexed by [`SwitchKind::index`]
    pub switches: [Option<bool>; 5],
    pub device_address: Option<MacAddress>,
}

impl RestoredPreferences {
    /// Read every preference from the store
    pub fn load<S: PreferenceStore + ?Sized>(store: &mut S) -> Self {
        let layout = LayoutVersion::load(store);
        if let LayoutVersion::Unknown(tag) = layout {
            warn!("Unknown preference layout {}, keeping default options", tag);
        }

        let mut restored = Self {
            display: load_option(store, layout),
            display_unit: load_option(store, layout),
            vertical_swing: load_option(store, layout),
            horizontal_swing: load_option(store, layout),
            temperature_source: load_option(store, layout),
            ..Self::default()
        };

        for kind in SwitchKind::ALL {
            restored.switches[kind.index()] = match store.load::<bool>(kind.storage_key()) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Unreadable {:?} switch preference: {:?}", kind, e);
                    None
                }
            };
        }

        restored.device_address = match store.load::<[u8; 6]>(StorageKey::DeviceAddress) {
            Ok(bytes) => bytes.map(MacAddress::new),
            Err(e) => {
                warn!("Unreadable device address preference: {:?}", e);
                None
            }
        };

        restored
    }

    /// Restored state of one switch
    pub fn switch(&self, kind: SwitchKind) -> Option<bool> {
        self.switches[kind.index()]
    }
}

fn load_option<T: OptionSet, S: PreferenceStore + ?Sized>(store: &mut S, layout: LayoutVersion) -> Option<T> {
    let limit = layout.index_limit(T::KIND)?;

    let index = match store.load::<u8>(T::KIND.storage_key()) {
        Ok(Some(index)) => index,
        Ok(None) => return None,
        Err(e) => {
            warn!("Unreadable {:?} preference: {:?}", T::KIND, e);
            return None;
        }
    };

    if index >= limit {
        warn!("Invalid {:?} index loaded: {}", T::KIND, index);
        return None;
    }

    let value = T::from_index(index)?;
    debug!("Restored {:?}: {} (index {})", T::KIND, value.label(), index);
    Some(value)
}
