//! Message types for the pump host protocol
//!
//! Message types are divided into two categories:
//! - Host → Pump: geometry/rate setters, run state, direction, device query
//! - Pump → Host: status replies and the device number

use heapless::Vec;

use crate::frame::{encode_response, encode_status, Frame, FrameError, MAX_FRAME_SIZE};
use crate::opcode::{Opcode, ResponseCode, StatusCode};

/// Requested pump run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// Issuing step pulses
    Running,
    /// Idle
    #[default]
    Stopped,
}

impl RunState {
    /// Wire byte 0 selects Running, anything else Stopped
    pub fn from_byte(byte: u8) -> Self {
        if byte == 0 {
            RunState::Running
        } else {
            RunState::Stopped
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            RunState::Running => 0,
            RunState::Stopped => 1,
        }
    }
}

/// Plunger travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Dispense (direction output low)
    #[default]
    Forward,
    /// Withdraw (direction output high)
    Reverse,
}

impl Direction {
    /// Wire byte 0 selects Forward, anything else Reverse
    pub fn from_byte(byte: u8) -> Self {
        if byte == 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Direction::Forward => 0,
            Direction::Reverse => 1,
        }
    }

    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// Reasons a well-formed frame does not yield a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Opcode byte is not in the command table
    UnknownOpcode(u8),
    /// LENGTH does not match the opcode's fixed schema
    InvalidLength { opcode: Opcode, length: u8 },
}

/// Commands sent by the host
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Syringe barrel length in mm
    SetSyringeLength(f32),
    /// Syringe volume in ml
    SetSyringeVolume(f32),
    /// Flow rate
    SetRate(f32),
    SetState(RunState),
    GetDeviceNumber,
    SetDirection(Direction),
}

impl Command {
    /// Parse a command from a frame
    ///
    /// The LENGTH check happens before any payload byte is read.
    pub fn from_frame(frame: &Frame) -> Result<Self, CommandError> {
        let opcode =
            Opcode::from_byte(frame.opcode).ok_or(CommandError::UnknownOpcode(frame.opcode))?;

        let length = frame.length();
        if length != opcode.expected_length() {
            return Err(CommandError::InvalidLength { opcode, length });
        }

        let payload = &frame.payload;
        let command = match opcode {
            Opcode::SetSyringeLength => Command::SetSyringeLength(read_f32(payload)),
            Opcode::SetSyringeVolume => Command::SetSyringeVolume(read_f32(payload)),
            Opcode::SetRate => Command::SetRate(read_f32(payload)),
            Opcode::SetState => Command::SetState(RunState::from_byte(payload[0])),
            Opcode::GetDeviceNumber => Command::GetDeviceNumber,
            Opcode::SetDirection => Command::SetDirection(Direction::from_byte(payload[0])),
        };
        Ok(command)
    }

    /// Opcode of this command
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::SetSyringeLength(_) => Opcode::SetSyringeLength,
            Command::SetSyringeVolume(_) => Opcode::SetSyringeVolume,
            Command::SetRate(_) => Opcode::SetRate,
            Command::SetState(_) => Opcode::SetState,
            Command::GetDeviceNumber => Opcode::GetDeviceNumber,
            Command::SetDirection(_) => Opcode::SetDirection,
        }
    }

    /// Encode this command into a frame (for host tooling and tests)
    pub fn to_frame(&self) -> Frame {
        let op = self.opcode().to_byte();
        let frame = match self {
            Command::SetSyringeLength(v) | Command::SetSyringeVolume(v) | Command::SetRate(v) => {
                Frame::new(op, &v.to_le_bytes())
            }
            Command::SetState(state) => Frame::new(op, &[state.to_byte()]),
            Command::SetDirection(dir) => Frame::new(op, &[dir.to_byte()]),
            Command::GetDeviceNumber => Ok(Frame::empty(op)),
        };
        // Every command payload is at most four bytes
        frame.unwrap_or_else(|_| Frame::empty(op))
    }

    /// Encode this command as request bytes
    pub fn encode(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        self.to_frame().encode_to_vec()
    }
}

/// Caller guarantees four payload bytes via the LENGTH check
fn read_f32(payload: &[u8]) -> f32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&payload[..4]);
    f32::from_le_bytes(bytes)
}

/// Responses sent by the pump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    Status(StatusCode),
    DeviceNumber(u8),
}

impl Response {
    pub const OK: Response = Response::Status(StatusCode::Ok);

    /// Encode this response as wire bytes
    pub fn encode(&self) -> Vec<u8, MAX_FRAME_SIZE> {
        match self {
            Response::Status(code) => encode_status(*code),
            Response::DeviceNumber(id) => {
                // One byte payload always fits
                encode_response(ResponseCode::DeviceNumber, &[*id]).unwrap_or_default()
            }
        }
    }
}
