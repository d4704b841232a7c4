//! Byte source over an `embassy-sync` pipe
//!
//! The receive task writes whatever the UART delivers into a [`Pipe`]; the
//! bridge drains it from its tick through this adapter without waiting.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::pipe::Pipe;
use sinclair_hal::ByteSource;

/// Non-blocking reader half of a receive pipe
pub struct PipeSource<'a, M: RawMutex, const N: usize> {
    pipe: &'a Pipe<M, N>,
}

impl<'a, M: RawMutex, const N: usize> PipeSource<'a, M, N> {
    pub fn new(pipe: &'a Pipe<M, N>) -> Self {
        Self { pipe }
    }

    /// Bytes waiting in the pipe
    pub fn pending(&self) -> usize {
        self.pipe.len()
    }

    /// Drop everything buffered
    pub fn clear(&mut self) {
        self.pipe.clear();
    }
}

impl<M: RawMutex, const N: usize> ByteSource for PipeSource<'_, M, N> {
    fn available(&mut self) -> bool {
        !self.pipe.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.pipe.try_read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_reads_in_order() {
        let pipe: Pipe<NoopRawMutex, 8> = Pipe::new();
        pipe.try_write(&[0x7E, 0x7E, 0x02]).unwrap();

        let mut source = PipeSource::new(&pipe);
        assert_eq!(source.pending(), 3);
        assert!(source.available());
        assert_eq!(source.read_byte(), Some(0x7E));
        assert_eq!(source.read_byte(), Some(0x7E));
        assert_eq!(source.read_byte(), Some(0x02));
        assert!(!source.available());
        assert_eq!(source.read_byte(), None);
    }

    #[test]
    fn test_clear() {
        let pipe: Pipe<NoopRawMutex, 8> = Pipe::new();
        pipe.try_write(&[1, 2, 3]).unwrap();

        let mut source = PipeSource::new(&pipe);
        source.clear();
        assert!(!source.available());
        assert_eq!(source.pending(), 0);
    }

    #[test]
    fn test_feeds_frame_assembler() {
        use sinclair_protocol::{FrameAssembler, FrameEvent};

        let pipe: Pipe<NoopRawMutex, 16> = Pipe::new();
        // LEN 3: command, one payload byte, checksum
        pipe.try_write(&[0x7E, 0x7E, 0x03, 0x31, 0x05, 0x39]).unwrap();

        let mut source = PipeSource::new(&pipe);
        let mut assembler = FrameAssembler::new();
        let mut event = FrameEvent::Accumulating;
        while let Some(byte) = source.read_byte() {
            event = assembler.consume(byte);
        }
        assert_eq!(event, FrameEvent::FrameReady);
        let frame = assembler.take_frame().unwrap();
        assert_eq!(frame.command(), Some(0x31));
        assert!(frame.checksum_ok());
    }
}
