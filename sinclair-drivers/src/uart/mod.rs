//! UART receive adapters

pub mod pipe;

pub use pipe::PipeSource;
