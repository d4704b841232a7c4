//! AC link receive task
//!
//! Moves bytes from the buffered UART into the receive pipe. Framing
//! happens on the controller's tick, so this task never interprets data.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use crate::channels::RX_PIPE;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// UART RX task - forwards received bytes to the controller
#[embassy_executor::task]
pub async fn uart_rx_task(mut rx: BufferedUartRx) {
    info!("UART RX task started");

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                // Waits while the pipe is full, which leaves the rest in the
                // UART ring buffer
                let mut pending = &buf[..n];
                while !pending.is_empty() {
                    let written = RX_PIPE.write(pending).await;
                    pending = &pending[written..];
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                // Parity and framing errors; the assembler resynchronizes
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
