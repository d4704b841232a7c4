//! Frame assembly for the indoor unit's serial link.
//!
//! Frame format:
//! - SYNC (2 bytes): 0x7E 0x7E
//! - LENGTH (1 byte): number of bytes that follow the length byte
//! - CMD (1 byte): command identifier
//! - PAYLOAD (LENGTH - 2 bytes): command-specific data
//! - CHECKSUM (1 byte): low byte of the sum of LENGTH, CMD and PAYLOAD
//!
//! The assembler only finds boundaries. It never rejects a frame for its
//! content, so a frame it reports may still fail [`Frame::checksum_ok`].

use heapless::Vec;

/// Frame synchronization byte (sent twice)
pub const SYNC_BYTE: u8 = 0x7E;

/// Receive buffer capacity
///
/// A buffer that reaches this size is dropped, so the longest frame that can
/// be delivered is one byte shorter.
pub const MAX_FRAME_SIZE: usize = 200;

/// SYNC + SYNC + LENGTH
pub const HEADER_SIZE: usize = 3;

/// Smallest frame with a command and a checksum (LENGTH = 2)
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + 2;

/// Maximum payload size in bytes for an encoded frame
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_SIZE - 1 - MIN_FRAME_SIZE;

/// Errors that can occur when building or inspecting a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Fewer bytes than a frame header
    TooShort,
    /// Frame does not start with two sync bytes
    MissingSync,
    /// Length byte disagrees with the number of bytes present
    LengthMismatch,
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
}

/// A complete frame as delivered by the assembler or built for sending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8, MAX_FRAME_SIZE>,
}

impl Frame {
    /// Wrap raw frame bytes, checking the header against the byte count
    pub fn from_bytes(raw: &[u8]) -> Result<Self, FrameError> {
        if raw.len() < HEADER_SIZE {
            return Err(FrameError::TooShort);
        }
        if raw[0] != SYNC_BYTE || raw[1] != SYNC_BYTE {
            return Err(FrameError::MissingSync);
        }
        if raw[2] as usize != raw.len() - HEADER_SIZE {
            return Err(FrameError::LengthMismatch);
        }

        let mut bytes = Vec::new();
        bytes
            .extend_from_slice(raw)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { bytes })
    }

    /// Build a frame for the given command and payload
    pub fn encode(command: u8, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        // CMD + PAYLOAD + CHECKSUM
        let length = (payload.len() + 2) as u8;

        let mut bytes = Vec::new();
        bytes
            .extend_from_slice(&[SYNC_BYTE, SYNC_BYTE, length, command])
            .map_err(|_| FrameError::PayloadTooLarge)?;
        bytes
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        let checksum = Self::calculate_checksum(&bytes[2..]);
        bytes
            .push(checksum)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self { bytes })
    }

    /// Low byte of the sum of everything after the sync bytes
    fn calculate_checksum(data: &[u8]) -> u8 {
        data.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
    }

    /// The whole frame, sync bytes included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total frame size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// A frame always holds at least its header
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Value of the length byte
    pub fn length(&self) -> u8 {
        self.bytes.get(2).copied().unwrap_or(0)
    }

    /// Command identifier, if the frame carries one
    pub fn command(&self) -> Option<u8> {
        self.bytes.get(HEADER_SIZE).copied()
    }

    /// Bytes between the command and the checksum
    pub fn payload(&self) -> &[u8] {
        if self.bytes.len() < MIN_FRAME_SIZE {
            return &[];
        }
        &self.bytes[HEADER_SIZE + 1..self.bytes.len() - 1]
    }

    /// Trailing checksum byte, if the frame is long enough to carry one
    pub fn checksum(&self) -> Option<u8> {
        if self.bytes.len() < MIN_FRAME_SIZE {
            return None;
        }
        self.bytes.last().copied()
    }

    /// Verify the trailing checksum
    pub fn checksum_ok(&self) -> bool {
        match self.checksum() {
            Some(checksum) => {
                Self::calculate_checksum(&self.bytes[2..self.bytes.len() - 1]) == checksum
            }
            None => false,
        }
    }
}

/// Synchronization state of the assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncState {
    /// Searching the stream for `0x7E 0x7E LEN`
    AwaitingSync,
    /// Counting down the bytes announced by the length byte
    Receiving,
    /// A full frame is buffered; no byte is absorbed until it is taken
    Complete,
    /// Frame taken; the buffer is cleared on the next byte
    Restarting,
}

/// Outcome of feeding one byte to the assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameEvent {
    /// Byte buffered, no frame yet
    Accumulating,
    /// A complete frame is waiting in the buffer
    FrameReady,
    /// Buffer overflowed and was dropped; searching for sync again
    Discarded,
}

/// Byte-at-a-time frame assembler
///
/// Holds at most one frame. Once a frame is complete the caller drains it
/// with [`take_frame`](Self::take_frame) (or drops it with
/// [`reset`](Self::reset)) before more bytes are absorbed, which is the only
/// backpressure on the byte source.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    buffer: Vec<u8, MAX_FRAME_SIZE>,
    remaining: u8,
    state: SyncState,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Create a new assembler waiting for sync
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            remaining: 0,
            state: SyncState::AwaitingSync,
        }
    }

    /// Current synchronization state
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Number of bytes currently buffered
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Check if a complete frame is waiting to be taken
    pub fn is_complete(&self) -> bool {
        self.state == SyncState::Complete
    }

    /// Feed a single byte
    ///
    /// While a frame is complete the byte is not absorbed and
    /// `FrameReady` is returned again; callers stop reading at that point.
    pub fn consume(&mut self, byte: u8) -> FrameEvent {
        match self.state {
            SyncState::Complete => return FrameEvent::FrameReady,
            SyncState::Restarting => {
                self.buffer.clear();
                self.state = SyncState::AwaitingSync;
            }
            SyncState::AwaitingSync | SyncState::Receiving => {}
        }

        if self.buffer.push(byte).is_err() || self.buffer.len() >= MAX_FRAME_SIZE {
            self.buffer.clear();
            self.remaining = 0;
            self.state = SyncState::AwaitingSync;
            return FrameEvent::Discarded;
        }

        match self.state {
            SyncState::AwaitingSync => self.search_sync(byte),
            SyncState::Receiving => self.count_down(),
            // Both were normalized above
            SyncState::Complete | SyncState::Restarting => FrameEvent::Accumulating,
        }
    }

    /// Feed bytes until a frame completes
    ///
    /// Returns the number of bytes absorbed. Bytes after a completed frame
    /// are left for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        for (i, &byte) in bytes.iter().enumerate() {
            if self.is_complete() {
                return i;
            }
            self.consume(byte);
        }
        bytes.len()
    }

    /// Take the completed frame, if any, and restart the search
    pub fn take_frame(&mut self) -> Option<Frame> {
        if self.state != SyncState::Complete {
            return None;
        }

        let frame = Frame {
            bytes: self.buffer.clone(),
        };
        self.state = SyncState::Restarting;
        Some(frame)
    }

    /// Peek at the completed frame without draining it
    pub fn frame(&self) -> Option<&[u8]> {
        match self.state {
            SyncState::Complete => Some(&self.buffer),
            _ => None,
        }
    }

    /// Drop whatever is buffered and search for sync again
    pub fn reset(&mut self) {
        self.remaining = 0;
        self.state = SyncState::Restarting;
    }

    /// `0x7E 0x7E LEN` just completed with `byte` as LEN
    fn search_sync(&mut self, byte: u8) -> FrameEvent {
        let len = self.buffer.len();
        let synced = byte != SYNC_BYTE
            && len >= HEADER_SIZE
            && self.buffer[len - 2] == SYNC_BYTE
            && self.buffer[len - 3] == SYNC_BYTE;

        if !synced {
            return FrameEvent::Accumulating;
        }

        self.buffer.clear();
        // Capacity is far above the header size
        let _ = self.buffer.extend_from_slice(&[SYNC_BYTE, SYNC_BYTE, byte]);
        self.remaining = byte;

        if byte == 0 {
            self.state = SyncState::Complete;
            return FrameEvent::FrameReady;
        }

        self.state = SyncState::Receiving;
        FrameEvent::Accumulating
    }

    fn count_down(&mut self) -> FrameEvent {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = SyncState::Complete;
            FrameEvent::FrameReady
        } else {
            FrameEvent::Accumulating
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(assembler: &mut FrameAssembler, bytes: &[u8]) -> usize {
        bytes
            .iter()
            .filter(|&&b| assembler.consume(b) == FrameEvent::FrameReady)
            .count()
    }

    #[test]
    fn test_frame_from_clean_stream() {
        let data = [0x7E, 0x7E, 0x05, 0x01, 0xAA, 0xBB, 0xCC, 0xDD];
        let mut assembler = FrameAssembler::new();

        for &byte in &data[..data.len() - 1] {
            assert_eq!(assembler.consume(byte), FrameEvent::Accumulating);
        }
        assert_eq!(assembler.consume(0xDD), FrameEvent::FrameReady);
        assert_eq!(assembler.frame(), Some(&data[..]));
    }

    #[test]
    fn test_countdown_starts_after_length_byte() {
        // Three of the five announced bytes: still receiving
        let mut assembler = FrameAssembler::new();
        assert_eq!(feed_all(&mut assembler, &[0x7E, 0x7E, 0x05, 0x01, 0xAA, 0xBB]), 0);
        assert_eq!(assembler.state(), SyncState::Receiving);
        assert_eq!(assembler.buffered(), 6);
    }

    #[test]
    fn test_garbage_prefix_is_dropped() {
        let data = [0x00, 0x11, 0x7E, 0x7E, 0x03, 0xFF, 0x01, 0x02];
        let mut assembler = FrameAssembler::new();

        assert_eq!(feed_all(&mut assembler, &data), 1);
        let frame = assembler.take_frame().unwrap();
        assert_eq!(frame.as_bytes(), &[0x7E, 0x7E, 0x03, 0xFF, 0x01, 0x02]);
    }

    #[test]
    fn test_zero_length_completes_immediately() {
        let mut assembler = FrameAssembler::new();
        assert_eq!(assembler.consume(0x7E), FrameEvent::Accumulating);
        assert_eq!(assembler.consume(0x7E), FrameEvent::Accumulating);
        assert_eq!(assembler.consume(0x00), FrameEvent::FrameReady);
        assert_eq!(assembler.frame(), Some(&[0x7E, 0x7E, 0x00][..]));
    }

    #[test]
    fn test_extra_sync_bytes_before_length() {
        let data = [0x7E, 0x7E, 0x7E, 0x02, 0x31, 0x33];
        let mut assembler = FrameAssembler::new();

        assert_eq!(feed_all(&mut assembler, &data), 1);
        assert_eq!(assembler.frame(), Some(&[0x7E, 0x7E, 0x02, 0x31, 0x33][..]));
    }

    #[test]
    fn test_sync_bytes_inside_frame_do_not_resync() {
        let data = [0x7E, 0x7E, 0x06, 0x01, 0x7E, 0x7E, 0x02, 0x03, 0x04];
        let mut assembler = FrameAssembler::new();

        assert_eq!(feed_all(&mut assembler, &data), 1);
        assert_eq!(assembler.frame(), Some(&data[..]));
    }

    #[test]
    fn test_no_bytes_absorbed_while_complete() {
        let mut assembler = FrameAssembler::new();
        feed_all(&mut assembler, &[0x7E, 0x7E, 0x01, 0x55]);
        assert!(assembler.is_complete());

        assert_eq!(assembler.consume(0x99), FrameEvent::FrameReady);
        assert_eq!(assembler.buffered(), 4);
        assert_eq!(assembler.frame(), Some(&[0x7E, 0x7E, 0x01, 0x55][..]));
    }

    #[test]
    fn test_feed_stops_at_complete_frame() {
        let data = [0x7E, 0x7E, 0x01, 0x55, 0x7E, 0x7E, 0x01, 0x66];
        let mut assembler = FrameAssembler::new();

        assert_eq!(assembler.feed(&data), 4);
        assert_eq!(assembler.take_frame().unwrap().as_bytes(), &data[..4]);

        assert_eq!(assembler.feed(&data[4..]), 4);
        assert_eq!(assembler.take_frame().unwrap().as_bytes(), &data[4..]);
    }

    #[test]
    fn test_take_frame_restarts() {
        let mut assembler = FrameAssembler::new();
        assert!(assembler.take_frame().is_none());

        feed_all(&mut assembler, &[0x7E, 0x7E, 0x01, 0x55]);
        assert!(assembler.take_frame().is_some());
        assert_eq!(assembler.state(), SyncState::Restarting);
        assert!(assembler.take_frame().is_none());

        // Buffer is cleared lazily by the next byte
        assert_eq!(assembler.consume(0x00), FrameEvent::Accumulating);
        assert_eq!(assembler.state(), SyncState::AwaitingSync);
        assert_eq!(assembler.buffered(), 1);
    }

    #[test]
    fn test_reset_drops_pending_frame() {
        let mut assembler = FrameAssembler::new();
        feed_all(&mut assembler, &[0x7E, 0x7E, 0x01, 0x55]);
        assembler.reset();
        assert!(assembler.frame().is_none());

        assert_eq!(feed_all(&mut assembler, &[0x7E, 0x7E, 0x01, 0x66]), 1);
        assert_eq!(assembler.frame(), Some(&[0x7E, 0x7E, 0x01, 0x66][..]));
    }

    #[test]
    fn test_overflow_in_sync_search() {
        let mut assembler = FrameAssembler::new();

        for _ in 0..MAX_FRAME_SIZE - 1 {
            assert_eq!(assembler.consume(0x00), FrameEvent::Accumulating);
        }
        assert_eq!(assembler.consume(0x00), FrameEvent::Discarded);
        assert_eq!(assembler.buffered(), 0);
        assert_eq!(assembler.state(), SyncState::AwaitingSync);
    }

    #[test]
    fn test_oversized_frame_is_discarded() {
        let mut assembler = FrameAssembler::new();
        feed_all(&mut assembler, &[0x7E, 0x7E, 0xFF]);
        assert_eq!(assembler.state(), SyncState::Receiving);

        let mut discarded = false;
        for _ in 0..MAX_FRAME_SIZE {
            if assembler.consume(0x11) == FrameEvent::Discarded {
                discarded = true;
                break;
            }
        }
        assert!(discarded);
        assert_eq!(assembler.state(), SyncState::AwaitingSync);

        // The next frame is found normally
        assert_eq!(feed_all(&mut assembler, &[0x7E, 0x7E, 0x01, 0x22]), 1);
    }

    #[test]
    fn test_encode_and_checksum() {
        let frame = Frame::encode(0x31, &[0x01, 0x02, 0x03]).unwrap();

        assert_eq!(
            frame.as_bytes(),
            &[0x7E, 0x7E, 0x05, 0x31, 0x01, 0x02, 0x03, 0x3C]
        );
        assert_eq!(frame.length(), 5);
        assert_eq!(frame.command(), Some(0x31));
        assert_eq!(frame.payload(), &[0x01, 0x02, 0x03]);
        assert_eq!(frame.checksum(), Some(0x3C));
        assert!(frame.checksum_ok());
    }

    #[test]
    fn test_assembled_frame_checksum() {
        let encoded = Frame::encode(0x01, &[0x10; 45]).unwrap();

        let mut assembler = FrameAssembler::new();
        assert_eq!(feed_all(&mut assembler, encoded.as_bytes()), 1);
        let frame = assembler.take_frame().unwrap();
        assert_eq!(frame, encoded);
        assert!(frame.checksum_ok());
    }

    #[test]
    fn test_corrupted_checksum() {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(Frame::encode(0x31, &[1, 2, 3]).unwrap().as_bytes());
        raw[5] ^= 0xFF;

        let frame = Frame::from_bytes(&raw).unwrap();
        assert!(!frame.checksum_ok());
    }

    #[test]
    fn test_short_frames_have_no_checksum() {
        let frame = Frame::from_bytes(&[0x7E, 0x7E, 0x01, 0x55]).unwrap();
        assert_eq!(frame.command(), Some(0x55));
        assert_eq!(frame.checksum(), None);
        assert!(frame.payload().is_empty());
        assert!(!frame.checksum_ok());
    }

    #[test]
    fn test_from_bytes_validation() {
        assert_eq!(Frame::from_bytes(&[0x7E, 0x7E]), Err(FrameError::TooShort));
        assert_eq!(
            Frame::from_bytes(&[0x7E, 0x00, 0x00]),
            Err(FrameError::MissingSync)
        );
        assert_eq!(
            Frame::from_bytes(&[0x7E, 0x7E, 0x03, 0x01]),
            Err(FrameError::LengthMismatch)
        );
    }

    #[test]
    fn test_payload_too_large() {
        let payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(
            Frame::encode(0x01, &payload),
            Err(FrameError::PayloadTooLarge)
        );

        // The largest encodable frame still fits through the assembler
        let frame = Frame::encode(0x01, &payload[..MAX_PAYLOAD_SIZE]).unwrap();
        let mut assembler = FrameAssembler::new();
        assert_eq!(feed_all(&mut assembler, frame.as_bytes()), 1);
    }
}
