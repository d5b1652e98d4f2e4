//! Syringe Pump Host Protocol
//!
//! This crate defines the UART protocol between a host controller (PC, lab
//! automation rig) and the pump firmware. The host sends one command per
//! frame and the pump answers with a status or data frame.
//!
//! # Protocol Overview
//!
//! Requests and responses share one frame layout:
//! ```text
//! ┌───────┬────────┬────────┬─────────────┬─────┐
//! │ START │ LENGTH │ OPCODE │ PAYLOAD     │ END │
//! │ 1B    │ 1B     │ 1B     │ 0–6B        │ 1B  │
//! └───────┴────────┴────────┴─────────────┴─────┘
//! ```
//!
//! `LENGTH` counts the opcode plus payload bytes. Requests are delimited by
//! `0x0C … 0x0F`, responses by `0x0D … 0x0F`. Floats travel as little-endian
//! IEEE-754 singles.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod opcode;

pub use frame::{
    decode, encode_response, encode_status, Frame, FrameAssembler, FrameError, MAX_FRAME_SIZE,
    MAX_PAYLOAD_SIZE,
};
pub use messages::{Command, CommandError, Direction, Response, RunState};
pub use opcode::{Opcode, ResponseCode, StatusCode, Token};
