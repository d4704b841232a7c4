//! Preference persistence port

use serde::de::DeserializeOwned;
use serde::Serialize;
use sinclair_hal::{FlashError, StorageKey};

/// Largest serialized preference value in bytes
pub const MAX_PREFERENCE_SIZE: usize = 16;

/// Errors from preference storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PreferenceError {
    /// Backing storage failed or is full
    Storage,
    /// Value does not fit the serialization buffer
    Serialize,
    /// Stored bytes do not decode as the requested type
    Deserialize,
}

impl From<FlashError> for PreferenceError {
    fn from(_: FlashError) -> Self {
        PreferenceError::Storage
    }
}

/// Key-value storage for small preference values
///
/// Implementations are RAM-backed caches persisted in the background; no
/// method waits on flash.
pub trait PreferenceStore {
    /// Copy the value stored under `key` into `buffer`
    ///
    /// Returns the value length, or `None` if nothing is stored.
    fn load_raw(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<Option<usize>, PreferenceError>;

    /// Store `data` under `key`, replacing any previous value
    fn save_raw(&mut self, key: StorageKey, data: &[u8]) -> Result<(), PreferenceError>;
}

/// Typed access on top of [`PreferenceStore`] using postcard encoding
pub trait PreferenceStoreExt: PreferenceStore {
    /// Load and decode the value stored under `key`
    fn load<T: DeserializeOwned>(&mut self, key: StorageKey) -> Result<Option<T>, PreferenceError> {
        let mut buffer = [0u8; MAX_PREFERENCE_SIZE];
        match self.load_raw(key, &mut buffer)? {
            Some(len) => {
                let bytes = buffer.get(..len).ok_or(PreferenceError::Deserialize)?;
                postcard::from_bytes(bytes)
                    .map(Some)
                    .map_err(|_| PreferenceError::Deserialize)
            }
            None => Ok(None),
        }
    }

    /// Encode and store `value` under `key`
    fn save<T: Serialize>(&mut self, key: StorageKey, value: &T) -> Result<(), PreferenceError> {
        let mut buffer = [0u8; MAX_PREFERENCE_SIZE];
        let used = postcard::to_slice(value, &mut buffer).map_err(|_| PreferenceError::Serialize)?;
        self.save_raw(key, used)
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;

    /// One slot per key
    #[derive(Default)]
    struct SlotStore {
        slots: [Option<([u8; MAX_PREFERENCE_SIZE], usize)>; 12],
    }

    impl PreferenceStore for SlotStore {
        fn load_raw(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<Option<usize>, PreferenceError> {
            match &self.slots[key.as_u8() as usize] {
                Some((data, len)) => {
                    buffer[..*len].copy_from_slice(&data[..*len]);
                    Ok(Some(*len))
                }
                None => Ok(None),
            }
        }

        fn save_raw(&mut self, key: StorageKey, data: &[u8]) -> Result<(), PreferenceError> {
            let mut slot = [0u8; MAX_PREFERENCE_SIZE];
            slot[..data.len()].copy_from_slice(data);
            self.slots[key.as_u8() as usize] = Some((slot, data.len()));
            Ok(())
        }
    }

    #[test]
    fn test_typed_values() {
        let mut store = SlotStore::default();
        assert_eq!(store.load::<u8>(StorageKey::Display), Ok(None));

        store.save(StorageKey::Display, &3u8).unwrap();
        store.save(StorageKey::Plasma, &true).unwrap();
        store
            .save(StorageKey::DeviceAddress, &[0xA4u8, 0xC1, 0x38, 0x0B, 0x2E, 0x1F])
            .unwrap();

        assert_eq!(store.load::<u8>(StorageKey::Display), Ok(Some(3)));
        assert_eq!(store.load::<bool>(StorageKey::Plasma), Ok(Some(true)));
        assert_eq!(
            store.load::<[u8; 6]>(StorageKey::DeviceAddress),
            Ok(Some([0xA4, 0xC1, 0x38, 0x0B, 0x2E, 0x1F]))
        );
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let mut store = SlotStore::default();
        store.save(StorageKey::Beeper, &7u8).unwrap();
        assert_eq!(
            store.load::<bool>(StorageKey::Beeper),
            Err(PreferenceError::Deserialize)
        );
        assert_eq!(
            store.load::<[u8; 6]>(StorageKey::Beeper),
            Err(PreferenceError::Deserialize)
        );
    }
}
