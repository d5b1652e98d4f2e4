//! Frame encoding and decoding for the pump host protocol.
//!
//! Frame format:
//! - START (1 byte): 0x0C for requests, 0x0D for responses
//! - LENGTH (1 byte): opcode + payload byte count (1-7)
//! - OPCODE (1 byte): command or response identifier
//! - PAYLOAD (0-6 bytes): opcode-specific data
//! - END (1 byte): 0x0F
//!
//! The END byte is checked at the position implied by LENGTH. Payload bytes
//! may legitimately equal 0x0F, so the receiver never scans for it.

use heapless::Vec;

use crate::opcode::{ResponseCode, StatusCode, Token};

/// Receive buffer size; no accepted frame is longer than this
pub const MAX_FRAME_SIZE: usize = 10;

/// Largest LENGTH value that still fits the receive buffer
pub const MAX_BODY_SIZE: usize = MAX_FRAME_SIZE - 3;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = MAX_BODY_SIZE - 1;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// First byte is not the request start token
    InvalidStart,
    /// LENGTH is zero or larger than the receive buffer allows
    InvalidLength(u8),
    /// Byte at the declared end position is not the end token
    MissingEnd,
    /// Buffer ends before the declared frame does
    Incomplete,
    /// Partial frame went stale before completing
    Timeout,
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A decoded request frame
///
/// The opcode is kept raw so unknown opcodes survive decoding and can be
/// rejected by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Opcode byte
    pub opcode: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given opcode and payload
    pub fn new(opcode: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            opcode,
            payload: payload_vec,
        })
    }

    /// Create a frame with no payload
    pub fn empty(opcode: u8) -> Self {
        Self {
            opcode,
            payload: Vec::new(),
        }
    }

    /// Value of the LENGTH byte for this frame
    pub fn length(&self) -> u8 {
        1 + self.payload.len() as u8
    }

    /// Encode this frame as a host request
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        write_frame(
            buffer,
            Token::MessageStart,
            self.opcode,
            &self.payload,
            Token::MessageEnd,
        )
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }
}

/// Write `[start, 1+len, opcode, payload…, end]` into `buffer`
fn write_frame(
    buffer: &mut [u8],
    start: Token,
    opcode: u8,
    payload: &[u8],
    end: Token,
) -> Result<usize, FrameError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }
    let frame_len = 4 + payload.len();
    if buffer.len() < frame_len {
        return Err(FrameError::BufferTooSmall);
    }

    buffer[0] = start.byte();
    buffer[1] = 1 + payload.len() as u8;
    buffer[2] = opcode;
    buffer[3..3 + payload.len()].copy_from_slice(payload);
    buffer[3 + payload.len()] = end.byte();

    Ok(frame_len)
}

/// Decode one complete request frame
///
/// Bytes after the END token are ignored.
pub fn decode(bytes: &[u8]) -> Result<Frame, FrameError> {
    let start = *bytes.first().ok_or(FrameError::Incomplete)?;
    if start != Token::MessageStart.byte() {
        return Err(FrameError::InvalidStart);
    }

    let length = *bytes.get(1).ok_or(FrameError::Incomplete)?;
    if length == 0 || length as usize > MAX_BODY_SIZE {
        return Err(FrameError::InvalidLength(length));
    }

    let end_index = 2 + length as usize;
    let end = *bytes.get(end_index).ok_or(FrameError::Incomplete)?;
    if end != Token::MessageEnd.byte() {
        return Err(FrameError::MissingEnd);
    }

    Frame::new(bytes[2], &bytes[3..end_index])
}

/// Encode a STATUS response: `[0x0D, 0x02, 0x06, code, 0x0F]`
pub fn encode_status(code: StatusCode) -> Vec<u8, MAX_FRAME_SIZE> {
    let mut buffer = [0u8; MAX_FRAME_SIZE];
    // A one-byte payload always fits
    let len = write_frame(
        &mut buffer,
        Token::ResponseStart,
        ResponseCode::Status.to_byte(),
        &[code.to_byte()],
        Token::ResponseEnd,
    )
    .unwrap_or(0);
    Vec::from_slice(&buffer[..len]).unwrap_or_default()
}

/// Encode a data response with the given response opcode
pub fn encode_response(
    code: ResponseCode,
    payload: &[u8],
) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    let mut buffer = [0u8; MAX_FRAME_SIZE];
    let len = write_frame(
        &mut buffer,
        Token::ResponseStart,
        code.to_byte(),
        payload,
        Token::ResponseEnd,
    )?;
    Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
}

/// Byte-at-a-time request frame assembler
///
/// Length-driven: after START and LENGTH it collects exactly LENGTH body
/// bytes and then expects END. On any framing error the partial frame is
/// discarded and the assembler waits for the next START byte.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    state: AssembleState,
    buffer: Vec<u8, MAX_FRAME_SIZE>,
    expected_length: u8,
    /// Inter-byte timeout in microseconds (None = never expire)
    timeout_us: Option<u32>,
    last_byte_us: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssembleState {
    /// Waiting for START byte
    WaitingForStart,
    /// Got START, waiting for LENGTH
    WaitingForLength,
    /// Reading opcode and payload bytes
    ReadingBody,
    /// Waiting for END
    WaitingForEnd,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Create an assembler that never expires partial frames
    pub fn new() -> Self {
        Self {
            state: AssembleState::WaitingForStart,
            buffer: Vec::new(),
            expected_length: 0,
            timeout_us: None,
            last_byte_us: 0,
        }
    }

    /// Create an assembler that drops partial frames after `timeout_us`
    /// without a new byte
    pub fn with_timeout(timeout_us: u32) -> Self {
        Self {
            timeout_us: Some(timeout_us),
            ..Self::new()
        }
    }

    /// Reset the assembler state
    pub fn reset(&mut self) {
        self.state = AssembleState::WaitingForStart;
        self.buffer.clear();
        self.expected_length = 0;
    }

    /// Returns true if a frame is partially received
    pub fn in_frame(&self) -> bool {
        self.state != AssembleState::WaitingForStart
    }

    /// Drop a partial frame if no byte arrived within the timeout
    ///
    /// `now_us` is a wrapping microsecond timestamp.
    pub fn expire(&mut self, now_us: u32) -> Result<(), FrameError> {
        match self.timeout_us {
            Some(timeout) if self.in_frame() => {
                if now_us.wrapping_sub(self.last_byte_us) > timeout {
                    self.reset();
                    return Err(FrameError::Timeout);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Feed a single byte to the assembler
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is assembled,
    /// `Ok(None)` when more bytes are needed, or `Err` on a framing error.
    pub fn feed(&mut self, byte: u8, now_us: u32) -> Result<Option<Frame>, FrameError> {
        self.last_byte_us = now_us;

        match self.state {
            AssembleState::WaitingForStart => {
                if byte == Token::MessageStart.byte() {
                    self.begin();
                }
                // Silently ignore non-START bytes while waiting
                Ok(None)
            }
            AssembleState::WaitingForLength => {
                if byte == 0 || byte as usize > MAX_BODY_SIZE {
                    self.resync(byte);
                    return Err(FrameError::InvalidLength(byte));
                }
                self.push(byte);
                self.expected_length = byte;
                self.state = AssembleState::ReadingBody;
                Ok(None)
            }
            AssembleState::ReadingBody => {
                self.push(byte);
                if self.buffer.len() == 2 + self.expected_length as usize {
                    self.state = AssembleState::WaitingForEnd;
                }
                Ok(None)
            }
            AssembleState::WaitingForEnd => {
                if byte != Token::MessageEnd.byte() {
                    self.resync(byte);
                    return Err(FrameError::MissingEnd);
                }
                self.push(byte);
                let frame = decode(&self.buffer);
                self.reset();
                frame.map(Some)
            }
        }
    }

    /// Feed multiple bytes to the assembler
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8], now_us: u32) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte, now_us)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    fn begin(&mut self) {
        self.buffer.clear();
        self.push(Token::MessageStart.byte());
        self.state = AssembleState::WaitingForLength;
    }

    /// Discard the partial frame; a START byte opens the next one
    fn resync(&mut self, byte: u8) {
        self.reset();
        if byte == Token::MessageStart.byte() {
            self.begin();
        }
    }

    fn push(&mut self, byte: u8) {
        // Length is bounded by MAX_BODY_SIZE, so this never overflows
        let _ = self.buffer.push(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_get_device_number() {
        let frame = decode(&[0x0C, 0x01, 0x05, 0x0F]).unwrap();
        assert_eq!(frame.opcode, 0x05);
        assert!(frame.payload.is_empty());
        assert_eq!(frame.length(), 1);
    }

    #[test]
    fn test_decode_checks_end_at_declared_position() {
        // Declared length 2 puts END at index 4, not at the first 0x0F
        let frame = decode(&[0x0C, 0x02, 0x04, 0x0F, 0x0F]).unwrap();
        assert_eq!(frame.opcode, 0x04);
        assert_eq!(&frame.payload[..], &[0x0F]);

        assert_eq!(
            decode(&[0x0C, 0x02, 0x04, 0x00, 0x0E]),
            Err(FrameError::MissingEnd)
        );
    }

    #[test]
    fn test_decode_rejects_bad_start() {
        assert_eq!(
            decode(&[0x0D, 0x01, 0x05, 0x0F]),
            Err(FrameError::InvalidStart)
        );
        assert_eq!(decode(&[]), Err(FrameError::Incomplete));
        assert_eq!(decode(&[0x0C, 0x05, 0x03]), Err(FrameError::Incomplete));
    }

    #[test]
    fn test_decode_rejects_oversized_length() {
        assert_eq!(
            decode(&[0x0C, 0x08, 0x03, 0, 0, 0, 0, 0, 0, 0, 0x0F]),
            Err(FrameError::InvalidLength(8))
        );
        assert_eq!(
            decode(&[0x0C, 0x00, 0x0F]),
            Err(FrameError::InvalidLength(0))
        );
    }

    #[test]
    fn test_encode_status_frames() {
        assert_eq!(&encode_status(StatusCode::Ok)[..], &[0x0D, 0x02, 0x06, 0x00, 0x0F]);
        assert_eq!(
            &encode_status(StatusCode::InvalidNumOfBytes)[..],
            &[0x0D, 0x02, 0x06, 0x63, 0x0F]
        );
        assert_eq!(&encode_status(StatusCode::Error)[..], &[0x0D, 0x02, 0x06, 0x01, 0x0F]);
    }

    #[test]
    fn test_encode_response() {
        let bytes = encode_response(ResponseCode::DeviceNumber, &[0x01]).unwrap();
        assert_eq!(&bytes[..], &[0x0D, 0x02, 0x07, 0x01, 0x0F]);

        let too_big = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(
            encode_response(ResponseCode::DeviceNumber, &too_big),
            Err(FrameError::PayloadTooLarge)
        );
    }

    #[test]
    fn test_request_encode_layout() {
        let frame = Frame::new(0x03, &[1, 2, 3, 4]).unwrap();
        let mut buffer = [0u8; 4];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));

        let encoded = frame.encode_to_vec().unwrap();
        assert_eq!(&encoded[..], &[0x0C, 0x05, 0x03, 1, 2, 3, 4, 0x0F]);
    }

    #[test]
    fn test_assembler_whole_frame() {
        let mut asm = FrameAssembler::new();
        let frame = asm
            .feed_bytes(&[0x0C, 0x02, 0x04, 0x00, 0x0F], 0)
            .unwrap()
            .unwrap();
        assert_eq!(frame.opcode, 0x04);
        assert_eq!(&frame.payload[..], &[0x00]);
        assert!(!asm.in_frame());
    }

    #[test]
    fn test_assembler_payload_containing_end_token() {
        // 0x0F inside a float payload must not terminate the frame
        let rate = f32::from_le_bytes([0x0F, 0x0F, 0x0F, 0x3F]);
        let mut bytes = [0x0C, 0x05, 0x03, 0, 0, 0, 0, 0x0F];
        bytes[3..7].copy_from_slice(&rate.to_le_bytes());

        let mut asm = FrameAssembler::new();
        let frame = asm.feed_bytes(&bytes, 0).unwrap().unwrap();
        assert_eq!(&frame.payload[..], &rate.to_le_bytes());
    }

    #[test]
    fn test_assembler_resync_after_garbage() {
        let mut data = Vec::<u8, 16>::new();
        data.extend_from_slice(&[0x00, 0xFF, 0x0F, 0x34]).unwrap();
        data.extend_from_slice(&[0x0C, 0x01, 0x05, 0x0F]).unwrap();

        let mut asm = FrameAssembler::new();
        let frame = asm.feed_bytes(&data, 0).unwrap().unwrap();
        assert_eq!(frame.opcode, 0x05);
    }

    #[test]
    fn test_assembler_wrong_end_then_next_frame() {
        let mut asm = FrameAssembler::new();
        assert_eq!(
            asm.feed_bytes(&[0x0C, 0x01, 0x05, 0xAA], 0),
            Err(FrameError::MissingEnd)
        );
        assert!(!asm.in_frame());

        let frame = asm.feed_bytes(&[0x0C, 0x01, 0x05, 0x0F], 0).unwrap().unwrap();
        assert_eq!(frame.opcode, 0x05);
    }

    #[test]
    fn test_assembler_start_in_end_slot_opens_next_frame() {
        let mut asm = FrameAssembler::new();
        // Truncated frame followed immediately by a full one
        assert_eq!(
            asm.feed_bytes(&[0x0C, 0x01, 0x05, 0x0C], 0),
            Err(FrameError::MissingEnd)
        );
        assert!(asm.in_frame());
        let frame = asm.feed_bytes(&[0x01, 0x05, 0x0F], 0).unwrap().unwrap();
        assert_eq!(frame.opcode, 0x05);
    }

    #[test]
    fn test_assembler_overflow_rejected() {
        let mut asm = FrameAssembler::new();
        assert_eq!(
            asm.feed_bytes(&[0x0C, 0x09], 0),
            Err(FrameError::InvalidLength(9))
        );
        assert!(!asm.in_frame());

        // The oversized body bytes that follow are ignored until a START
        assert_eq!(asm.feed_bytes(&[0x03, 1, 2, 3, 4, 5, 6, 7, 0x0F], 0), Ok(None));
        assert!(!asm.in_frame());
    }

    #[test]
    fn test_assembler_timeout() {
        let mut asm = FrameAssembler::with_timeout(1_000);
        asm.feed_bytes(&[0x0C, 0x05, 0x03], 100).unwrap();
        assert!(asm.in_frame());

        assert_eq!(asm.expire(1_100), Ok(()));
        assert!(asm.in_frame());

        assert_eq!(asm.expire(1_101), Err(FrameError::Timeout));
        assert!(!asm.in_frame());
    }

    #[test]
    fn test_assembler_timeout_wraps() {
        let mut asm = FrameAssembler::with_timeout(1_000);
        asm.feed(0x0C, u32::MAX - 10).unwrap();
        assert_eq!(asm.expire(500), Ok(()));
        assert_eq!(asm.expire(990), Err(FrameError::Timeout));
    }

    #[test]
    fn test_assembler_without_timeout_never_expires() {
        let mut asm = FrameAssembler::new();
        asm.feed(0x0C, 0).unwrap();
        assert_eq!(asm.expire(u32::MAX / 2), Ok(()));
        assert!(asm.in_frame());
    }
}
