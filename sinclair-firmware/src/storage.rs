//! Preference cache shared between the controller and the flash writer

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use sinclair_core::traits::{PreferenceError, PreferenceStore};
use sinclair_drivers::storage::PreferenceValue;
use sinclair_drivers::RamPreferences;
use sinclair_hal::StorageKey;

use crate::channels::PERSIST_REQUEST;

/// Preferences loaded at boot, written back by the persistence task
pub static PREFERENCES: Mutex<CriticalSectionRawMutex, RefCell<RamPreferences>> =
    Mutex::new(RefCell::new(RamPreferences::new()));

/// Handle the bridge uses as its preference store
///
/// Every change wakes the persistence task.
pub struct SharedPreferences;

impl PreferenceStore for SharedPreferences {
    fn load_raw(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<Option<usize>, PreferenceError> {
        PREFERENCES.lock(|prefs| prefs.borrow_mut().load_raw(key, buffer))
    }

    fn save_raw(&mut self, key: StorageKey, data: &[u8]) -> Result<(), PreferenceError> {
        let dirty = PREFERENCES.lock(|prefs| {
            let mut prefs = prefs.borrow_mut();
            prefs.save_raw(key, data).map(|()| prefs.is_dirty())
        })?;
        if dirty {
            PERSIST_REQUEST.signal(());
        }
        Ok(())
    }
}

/// Take the next changed value, if any
pub fn take_dirty() -> Option<(StorageKey, PreferenceValue)> {
    PREFERENCES.lock(|prefs| prefs.borrow_mut().take_dirty())
}

/// Put a key back after a failed write
pub fn mark_dirty(key: StorageKey) {
    PREFERENCES.lock(|prefs| prefs.borrow_mut().mark_dirty(key));
}
