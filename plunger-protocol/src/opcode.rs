//! Wire-level byte tables
//!
//! Every byte value that means something on the wire lives here, as a
//! closed enum with an exhaustive mapping in both directions.

/// Frame delimiter bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Token {
    /// Opens a host request
    MessageStart,
    /// Closes a host request
    MessageEnd,
    /// Opens a pump response
    ResponseStart,
    /// Closes a pump response
    ResponseEnd,
}

impl Token {
    /// Wire value of this delimiter
    ///
    /// Request and response frames share the same terminator.
    pub const fn byte(self) -> u8 {
        match self {
            Token::MessageStart => 0x0C,
            Token::MessageEnd => 0x0F,
            Token::ResponseStart => 0x0D,
            Token::ResponseEnd => 0x0F,
        }
    }
}

/// Request opcodes accepted by the pump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    SetSyringeLength,
    SetSyringeVolume,
    SetRate,
    SetState,
    GetDeviceNumber,
    /// Only honoured by pumps with direction control
    SetDirection,
}

// Wire format values
const OP_SET_SYRINGE_LENGTH: u8 = 0x01;
const OP_SET_SYRINGE_VOLUME: u8 = 0x02;
const OP_SET_RATE: u8 = 0x03;
const OP_SET_STATE: u8 = 0x04;
const OP_GET_DEVICE_NUMBER: u8 = 0x05;
const OP_SET_DIRECTION: u8 = 0x08;

impl Opcode {
    /// All request opcodes, in wire order
    pub const ALL: [Opcode; 6] = [
        Opcode::SetSyringeLength,
        Opcode::SetSyringeVolume,
        Opcode::SetRate,
        Opcode::SetState,
        Opcode::GetDeviceNumber,
        Opcode::SetDirection,
    ];

    /// Parse an opcode from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            OP_SET_SYRINGE_LENGTH => Some(Opcode::SetSyringeLength),
            OP_SET_SYRINGE_VOLUME => Some(Opcode::SetSyringeVolume),
            OP_SET_RATE => Some(Opcode::SetRate),
            OP_SET_STATE => Some(Opcode::SetState),
            OP_GET_DEVICE_NUMBER => Some(Opcode::GetDeviceNumber),
            OP_SET_DIRECTION => Some(Opcode::SetDirection),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            Opcode::SetSyringeLength => OP_SET_SYRINGE_LENGTH,
            Opcode::SetSyringeVolume => OP_SET_SYRINGE_VOLUME,
            Opcode::SetRate => OP_SET_RATE,
            Opcode::SetState => OP_SET_STATE,
            Opcode::GetDeviceNumber => OP_GET_DEVICE_NUMBER,
            Opcode::SetDirection => OP_SET_DIRECTION,
        }
    }

    /// Required value of the LENGTH byte (opcode + payload)
    pub fn expected_length(self) -> u8 {
        match self {
            Opcode::SetSyringeLength | Opcode::SetSyringeVolume | Opcode::SetRate => 5,
            Opcode::SetState | Opcode::SetDirection => 2,
            Opcode::GetDeviceNumber => 1,
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Opcode::from_byte(byte).ok_or(byte)
    }
}

/// Opcode slot of a response frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseCode {
    /// Payload is a single [`StatusCode`] byte
    Status,
    /// Payload is the device number
    DeviceNumber,
}

const RSP_STATUS: u8 = 0x06;
const RSP_DEVICE_NUMBER: u8 = 0x07;

impl ResponseCode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            RSP_STATUS => Some(ResponseCode::Status),
            RSP_DEVICE_NUMBER => Some(ResponseCode::DeviceNumber),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            ResponseCode::Status => RSP_STATUS,
            ResponseCode::DeviceNumber => RSP_DEVICE_NUMBER,
        }
    }
}

/// Status byte carried by a STATUS response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusCode {
    /// Command applied
    Ok,
    /// Command understood but refused
    Error,
    /// LENGTH did not match the opcode's schema
    InvalidNumOfBytes,
}

const STATUS_OK: u8 = 0;
const STATUS_ERROR: u8 = 1;
const STATUS_INVALID_NUM_OF_BYTES: u8 = 99;

impl StatusCode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            STATUS_OK => Some(StatusCode::Ok),
            STATUS_ERROR => Some(StatusCode::Error),
            STATUS_INVALID_NUM_OF_BYTES => Some(StatusCode::InvalidNumOfBytes),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            StatusCode::Ok => STATUS_OK,
            StatusCode::Error => STATUS_ERROR,
            StatusCode::InvalidNumOfBytes => STATUS_INVALID_NUM_OF_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_values() {
        assert_eq!(Token::MessageStart.byte(), 0x0C);
        assert_eq!(Token::MessageEnd.byte(), 0x0F);
        assert_eq!(Token::ResponseStart.byte(), 0x0D);
        assert_eq!(Token::ResponseEnd.byte(), 0x0F);
    }

    #[test]
    fn test_opcode_table() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_byte(op.to_byte()), Some(op));
        }
        assert_eq!(Opcode::SetDirection.to_byte(), 0x08);
        assert_eq!(Opcode::try_from(0x06), Err(0x06));
        assert_eq!(Opcode::try_from(0x07), Err(0x07));
        assert!(Opcode::from_byte(0x00).is_none());
    }

    #[test]
    fn test_expected_lengths() {
        assert_eq!(Opcode::SetSyringeLength.expected_length(), 5);
        assert_eq!(Opcode::SetSyringeVolume.expected_length(), 5);
        assert_eq!(Opcode::SetRate.expected_length(), 5);
        assert_eq!(Opcode::SetState.expected_length(), 2);
        assert_eq!(Opcode::GetDeviceNumber.expected_length(), 1);
        assert_eq!(Opcode::SetDirection.expected_length(), 2);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(StatusCode::Ok.to_byte(), 0x00);
        assert_eq!(StatusCode::Error.to_byte(), 0x01);
        assert_eq!(StatusCode::InvalidNumOfBytes.to_byte(), 0x63);
        assert_eq!(StatusCode::from_byte(0x63), Some(StatusCode::InvalidNumOfBytes));
        assert!(StatusCode::from_byte(0x02).is_none());
    }

    #[test]
    fn test_response_codes() {
        assert_eq!(ResponseCode::Status.to_byte(), 0x06);
        assert_eq!(ResponseCode::DeviceNumber.to_byte(), 0x07);
        assert_eq!(ResponseCode::from_byte(0x07), Some(ResponseCode::DeviceNumber));
    }
}
