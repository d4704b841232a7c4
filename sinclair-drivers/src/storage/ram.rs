//! RAM preference cache
//!
//! The bridge saves preferences synchronously from its tick. This cache
//! takes those saves, remembers which keys changed and hands them out for
//! a background task to write to flash.

use heapless::Vec;
use sinclair_core::traits::{PreferenceError, PreferenceStore, MAX_PREFERENCE_SIZE};
use sinclair_hal::{FlashError, FlashStorage, StorageKey};

/// Number of keys the cache can hold
const SLOTS: usize = StorageKey::ALL.len();

/// Serialized preference value
pub type PreferenceValue = Vec<u8, MAX_PREFERENCE_SIZE>;

/// Write-back preference cache
#[derive(Debug, Clone)]
pub struct RamPreferences {
    slots: [Option<PreferenceValue>; SLOTS],
    /// Bit per key, set when the value changed since it was last flushed
    dirty: u16,
}

impl Default for RamPreferences {
    fn default() -> Self {
        Self::new()
    }
}

impl RamPreferences {
    /// Create an empty cache
    pub const fn new() -> Self {
        const EMPTY: Option<PreferenceValue> = None;
        Self {
            slots: [EMPTY; SLOTS],
            dirty: 0,
        }
    }

    /// Populate from flash at boot
    ///
    /// Values loaded here are not dirty. Unreadable keys are skipped.
    /// Returns the number of keys found.
    pub async fn load_from<F: FlashStorage>(&mut self, flash: &mut F) -> usize {
        let mut found = 0;
        for key in StorageKey::ALL {
            let mut buffer = [0u8; MAX_PREFERENCE_SIZE];
            match flash.read(key, &mut buffer).await {
                Ok(len) => {
                    if let Some(value) = buffer.get(..len).and_then(|b| Vec::from_slice(b).ok()) {
                        self.slots[key.as_u8() as usize] = Some(value);
                        found += 1;
                    }
                }
                Err(FlashError::NotFound) => {}
                Err(e) => {
                    warn!("Failed to load preference {:?}: {:?}", key, e);
                }
            }
        }
        debug!("Loaded {} preferences from flash", found);
        found
    }

    /// Value stored under `key`
    pub fn get(&self, key: StorageKey) -> Option<&[u8]> {
        self.slots[key.as_u8() as usize].as_deref()
    }

    /// Check if any key awaits flushing
    pub fn is_dirty(&self) -> bool {
        self.dirty != 0
    }

    /// Number of keys awaiting flushing
    pub fn dirty_count(&self) -> u32 {
        self.dirty.count_ones()
    }

    /// Take the next changed value for writing to flash
    ///
    /// The key is marked clean; if the write fails, [`mark_dirty`](Self::mark_dirty)
    /// puts it back.
    pub fn take_dirty(&mut self) -> Option<(StorageKey, PreferenceValue)> {
        while self.dirty != 0 {
            let bit = self.dirty.trailing_zeros() as u8;
            self.dirty &= !(1 << bit);

            let Some(key) = StorageKey::from_u8(bit) else {
                continue;
            };
            if let Some(value) = &self.slots[bit as usize] {
                return Some((key, value.clone()));
            }
        }
        None
    }

    /// Mark a key for writing again
    pub fn mark_dirty(&mut self, key: StorageKey) {
        self.dirty |= 1 << key.as_u8();
    }

    /// Write every changed value to flash
    ///
    /// Stops at the first failure, leaving that key and the rest dirty.
    pub async fn flush_to<F: FlashStorage>(&mut self, flash: &mut F) -> Result<usize, FlashError> {
        let mut written = 0;
        while let Some((key, value)) = self.take_dirty() {
            if let Err(e) = flash.write(key, &value).await {
                self.mark_dirty(key);
                return Err(e);
            }
            written += 1;
        }
        Ok(written)
    }
}

impl PreferenceStore for RamPreferences {
    fn load_raw(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<Option<usize>, PreferenceError> {
        match self.get(key) {
            Some(value) => {
                let target = buffer
                    .get_mut(..value.len())
                    .ok_or(PreferenceError::Storage)?;
                target.copy_from_slice(value);
                Ok(Some(value.len()))
            }
            None => Ok(None),
        }
    }

    fn save_raw(&mut self, key: StorageKey, data: &[u8]) -> Result<(), PreferenceError> {
        if self.get(key) == Some(data) {
            // Unchanged, spare the flash
            return Ok(());
        }
        let value = Vec::from_slice(data).map_err(|_| PreferenceError::Serialize)?;
        self.slots[key.as_u8() as usize] = Some(value);
        self.mark_dirty(key);
        Ok(())
    }
}
