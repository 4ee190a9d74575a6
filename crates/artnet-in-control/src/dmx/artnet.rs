//! Art-Net protocol implementation (ArtDmx input)
//!
//! Art-Net is a UDP-based protocol for transmitting DMX512 over Ethernet.
//! Only the `OpDmx` packet is understood here; everything else arriving on
//! the port is rejected as foreign traffic.
//!
//! ```text
//! offset  len  field
//!      0    8  "Art-Net\0"
//!      8    2  OpCode 0x5000 (little-endian)
//!     10    2  protocol version 14 (big-endian)
//!     12    2  sequence / physical (ignored)
//!     14    2  universe (low byte, high byte)
//!     16    2  0x02 0x00
//!     18  ...  channel data
//! ```

use thiserror::Error;

/// Null-terminated packet identifier
pub const ARTNET_ID: &[u8; 8] = b"Art-Net\0";

/// OpCode of a DMX data packet
pub const OP_DMX: u16 = 0x5000;

/// Art-Net protocol revision
pub const PROTOCOL_VERSION: u16 = 14;

/// Length of the fixed protocol header
pub const HEADER_LEN: usize = 12;

/// Length of the universe sub-header
pub const UNIVERSE_HEADER_LEN: usize = 4;

/// Offset of the first channel byte
pub const DATA_OFFSET: usize = 18;

/// Highest universe addressable by the 15-bit Port-Address
pub const MAX_UNIVERSE: u16 = 0x7FFF;

/// Receive buffer size for a single datagram
pub const MAX_DATAGRAM_SIZE: usize = 1024;

const PHYSICAL_PORT_MARKER: u8 = 0x02;
const RESERVED: u8 = 0x00;

/// Reasons an inbound datagram is not accepted
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame too short or not an Art-Net DMX packet
    #[error("Art-Net header mismatch")]
    HeaderMismatch,

    /// Art-Net DMX packet addressed to another universe
    #[error("Art-Net universe mismatch")]
    UniverseMismatch,
}

/// Build the constant 12-byte header every accepted frame starts with
pub fn build_protocol_header() -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];

    header[0..8].copy_from_slice(ARTNET_ID);

    // OpCode (little-endian)
    header[8..10].copy_from_slice(&OP_DMX.to_le_bytes());

    // Protocol version (big-endian)
    header[10..12].copy_from_slice(&PROTOCOL_VERSION.to_be_bytes());

    header
}

/// Build the 4-byte universe sub-header expected at offset 14
pub fn build_universe_header(universe: u16) -> [u8; UNIVERSE_HEADER_LEN] {
    let [low, high] = universe.to_le_bytes();
    [low, high, PHYSICAL_PORT_MARKER, RESERVED]
}

/// Validate a raw datagram and return its channel payload.
///
/// Bytes 12..14 (sequence and physical port) are not compared. The payload
/// borrows from `frame` and may be anywhere from empty to the full remainder
/// of the datagram.
pub fn validate_and_extract<'a>(
    frame: &'a [u8],
    expected_header: &[u8; HEADER_LEN],
    expected_universe_header: &[u8; UNIVERSE_HEADER_LEN],
) -> Result<&'a [u8], ProtocolError> {
    if frame.len() < DATA_OFFSET || &frame[..HEADER_LEN] != expected_header {
        return Err(ProtocolError::HeaderMismatch);
    }

    if &frame[14..DATA_OFFSET] != expected_universe_header {
        return Err(ProtocolError::UniverseMismatch);
    }

    Ok(&frame[DATA_OFFSET..])
}

/// Expected headers for one universe.
///
/// Built once per receiver session; opening a new session rebuilds it so a
/// changed universe takes effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTemplate {
    universe: u16,
    header: [u8; HEADER_LEN],
    universe_header: [u8; UNIVERSE_HEADER_LEN],
}

impl FrameTemplate {
    pub fn new(universe: u16) -> Self {
        Self {
            universe,
            header: build_protocol_header(),
            universe_header: build_universe_header(universe),
        }
    }

    /// Get the universe this template matches
    pub fn universe(&self) -> u16 {
        self.universe
    }

    /// Validate `frame` against this template
    pub fn extract<'a>(&self, frame: &'a [u8]) -> Result<&'a [u8], ProtocolError> {
        validate_and_extract(frame, &self.header, &self.universe_header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame(universe: u16, payload: &[u8]) -> Vec<u8> {
        let mut frame = build_protocol_header().to_vec();
        frame.extend_from_slice(&[0x07, 0x00]); // sequence, physical
        frame.extend_from_slice(&build_universe_header(universe));
        frame.extend_from_slice(payload);
        frame
    }

    #[test]
    fn test_protocol_header_structure() {
        let header = build_protocol_header();

        assert_eq!(&header[0..8], b"Art-Net\0");

        // OpCode (little-endian)
        assert_eq!(header[8], 0x00);
        assert_eq!(header[9], 0x50);

        // Protocol version (big-endian)
        assert_eq!(header[10], 0);
        assert_eq!(header[11], 14);
    }

    #[test]
    fn test_universe_header() {
        assert_eq!(build_universe_header(0), [0x00, 0x00, 0x02, 0x00]);
        assert_eq!(build_universe_header(3), [0x03, 0x00, 0x02, 0x00]);
        assert_eq!(build_universe_header(0x1234), [0x34, 0x12, 0x02, 0x00]);
    }

    #[test]
    fn test_extract_payload() {
        let data = frame(3, &[10, 20, 30]);
        let template = FrameTemplate::new(3);

        assert_eq!(template.extract(&data), Ok(&[10u8, 20, 30][..]));
    }

    #[test]
    fn test_empty_payload_is_accepted() {
        let data = frame(1, &[]);
        assert_eq!(data.len(), DATA_OFFSET);

        let payload = FrameTemplate::new(1).extract(&data).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_sequence_bytes_ignored() {
        let mut data = frame(5, &[1, 2, 3]);
        data[12] = 0xFF;
        data[13] = 0xAA;

        assert!(FrameTemplate::new(5).extract(&data).is_ok());
    }

    #[test]
    fn test_truncated_frame() {
        let data = frame(0, &[]);
        let template = FrameTemplate::new(0);

        assert_eq!(
            template.extract(&data[..DATA_OFFSET - 1]),
            Err(ProtocolError::HeaderMismatch)
        );
        assert_eq!(template.extract(&[]), Err(ProtocolError::HeaderMismatch));
    }

    #[test]
    fn test_foreign_opcode() {
        let mut data = frame(0, &[0; 16]);
        // OpPoll
        data[8..10].copy_from_slice(&0x2000u16.to_le_bytes());

        assert_eq!(
            FrameTemplate::new(0).extract(&data),
            Err(ProtocolError::HeaderMismatch)
        );
    }

    #[test]
    fn test_universe_mismatch() {
        let data = frame(7, &[10, 20, 30]);

        assert_eq!(
            FrameTemplate::new(3).extract(&data),
            Err(ProtocolError::UniverseMismatch)
        );
    }

    #[test]
    fn test_template_universe() {
        assert_eq!(FrameTemplate::new(42).universe(), 42);
    }

    proptest! {
        #[test]
        fn prop_valid_frame_returns_payload(
            universe in 0..=MAX_UNIVERSE,
            payload in proptest::collection::vec(any::<u8>(), 0..=512),
        ) {
            let data = frame(universe, &payload);
            let extracted = FrameTemplate::new(universe).extract(&data).unwrap();
            prop_assert_eq!(extracted, &payload[..]);
        }

        #[test]
        fn prop_corrupted_header_rejected(
            index in 0..HEADER_LEN,
            flip in 1..=u8::MAX,
            rest in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let mut data = frame(0, &rest);
            data[index] ^= flip;
            prop_assert_eq!(
                FrameTemplate::new(0).extract(&data),
                Err(ProtocolError::HeaderMismatch)
            );
        }

        #[test]
        fn prop_other_universe_rejected(
            configured in 0..=MAX_UNIVERSE,
            sent in 0..=MAX_UNIVERSE,
            payload in proptest::collection::vec(any::<u8>(), 0..=512),
        ) {
            prop_assume!(configured != sent);
            let data = frame(sent, &payload);
            prop_assert_eq!(
                FrameTemplate::new(configured).extract(&data),
                Err(ProtocolError::UniverseMismatch)
            );
        }
    }
}
