//! Flash storage driver for RP2040
//!
//! Preferences live in the last 64KB of flash as a sequential-storage map,
//! which spreads writes over the partition's sectors.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use sinclair_hal::flash::{FlashError, StorageKey};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on the Pico
pub const PREFERENCE_PARTITION_SIZE: usize = 64 * 1024;
pub const PREFERENCE_PARTITION_START: usize = FLASH_SIZE - PREFERENCE_PARTITION_SIZE;

/// Flash erase size for RP2040
pub const FLASH_ERASE_SIZE: usize = ERASE_SIZE;

/// Flash range for the preference partition
pub const PREFERENCE_RANGE: core::ops::Range<u32> =
    (PREFERENCE_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch space for one serialized map item (key, value and header)
const ITEM_BUFFER_SIZE: usize = 64;

/// RP2040 flash storage implementation
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    async fn fetch<'b>(
        &mut self,
        key: StorageKey,
        data_buffer: &'b mut [u8],
    ) -> Result<Option<&'b [u8]>, FlashError> {
        map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            PREFERENCE_RANGE,
            &mut NoCache::new(),
            data_buffer,
            &key,
        )
        .await
        .map_err(map_error)
    }
}

impl<'d> sinclair_hal::FlashStorage for Rp2040FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        let data = self.fetch(key, &mut data_buffer).await?.ok_or(FlashError::NotFound)?;
        let target = buffer
            .get_mut(..data.len())
            .ok_or(FlashError::BufferTooSmall)?;
        target.copy_from_slice(data);
        Ok(data.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        map::store_item(
            &mut self.flash,
            PREFERENCE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(map_error)
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];
        matches!(self.fetch(key, &mut data_buffer).await, Ok(Some(_)))
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        self.flash
            .erase(PREFERENCE_RANGE.start, PREFERENCE_RANGE.end)
            .await
            .map_err(|_| FlashError::Flash)
    }
}

fn map_error<E>(error: sequential_storage::Error<E>) -> FlashError {
    match error {
        sequential_storage::Error::FullStorage => FlashError::Full,
        _ => FlashError::Storage,
    }
}
