//! Flash persistence task
//!
//! Writes changed preferences to flash in the background. Requests are
//! coalesced for a short delay so a burst of changes costs one pass.

use defmt::*;
use embassy_time::Timer;

use sinclair_hal::FlashStorage;
use sinclair_hal_rp2040::flash::Rp2040FlashStorage;

use crate::channels::PERSIST_REQUEST;
use crate::config::FLUSH_DELAY_MS;
use crate::storage;

/// Delay before retrying after a failed write
const RETRY_DELAY_MS: u64 = 5_000;

/// Persistence task - flushes dirty preferences to flash
#[embassy_executor::task]
pub async fn persistence_task(mut flash: Rp2040FlashStorage<'static>) {
    info!("Persistence task started");

    loop {
        PERSIST_REQUEST.wait().await;
        Timer::after_millis(FLUSH_DELAY_MS as u64).await;

        let mut written = 0u32;
        while let Some((key, value)) = storage::take_dirty() {
            match flash.write(key, &value).await {
                Ok(()) => written += 1,
                Err(e) => {
                    warn!("Failed to write preference {:?}: {:?}", key, e);
                    storage::mark_dirty(key);
                    // Retry later instead of spinning on a failing flash
                    Timer::after_millis(RETRY_DELAY_MS).await;
                    PERSIST_REQUEST.signal(());
                    break;
                }
            }
        }

        if written > 0 {
            debug!("Wrote {} preferences to flash", written);
        }
    }
}
