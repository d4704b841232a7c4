//! Sinclair - serial bridge firmware for Sinclair/Gree air conditioners
//!
//! Main firmware binary for an RP2040 wired to the indoor unit's UART.
//! Reassembles the unit's frames, keeps user options persistent in flash
//! and arbitrates between the unit's sensor and an external one.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUartRx};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use sinclair_drivers::RamPreferences;
use sinclair_hal::UartConfig;
use sinclair_hal_rp2040::flash::Rp2040FlashStorage;
use sinclair_hal_rp2040::uart::rp_config;

use crate::storage::PREFERENCES;

mod channels;
mod config;
mod publish;
mod storage;
mod tasks;
mod unit;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// UART receive ring buffer (must live forever)
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Sinclair bridge firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Restore preferences before the controller starts
    let mut flash = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let mut prefs = RamPreferences::new();
    let found = prefs.load_from(&mut flash).await;
    PREFERENCES.lock(|cell| cell.replace(prefs));
    info!("{} preferences restored from flash", found);

    // AC link: 4800 8E1 on GPIO1 (RX)
    let uart_config = rp_config(&UartConfig::ac_link());
    let rx_buf = RX_BUF.init([0u8; 256]);
    let rx = BufferedUartRx::new(p.UART0, Irqs, p.PIN_1, rx_buf, uart_config);
    info!("UART initialized for the AC link");

    let bridge_config = config::bridge_config();
    info!(
        "Bridge config: wireless={} recovery={:?} timeout={}ms",
        bridge_config.wireless_sensor, bridge_config.recovery, bridge_config.external_timeout_ms
    );

    spawner.spawn(tasks::tick_task()).unwrap();
    spawner.spawn(tasks::uart_rx_task(rx)).unwrap();
    spawner.spawn(tasks::persistence_task(flash)).unwrap();
    spawner.spawn(tasks::controller_task(bridge_config)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
