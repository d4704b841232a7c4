//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod controller;
pub mod persistence;
pub mod tick;
pub mod uart_rx;

pub use controller::controller_task;
pub use persistence::persistence_task;
pub use tick::tick_task;
pub use uart_rx::uart_rx_task;
