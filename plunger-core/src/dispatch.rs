//! Command dispatcher
//!
//! Turns a decoded frame into a state change and a reply. Every failure is
//! local to the frame that caused it; [`DispatchError::reply`] says what, if
//! anything, goes back to the host.

use plunger_protocol::{Command, CommandError, Frame, FrameError, Opcode, Response, StatusCode};

use crate::config::{Capabilities, InvalidPeriodPolicy, PumpConfig, StepperSettings};
use crate::pump::{PeriodError, PumpState};
use crate::traits::RunState;

/// Why a frame was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// Byte stream did not form a valid frame
    Frame(FrameError),
    /// Frame is well formed but not a valid command
    Command(CommandError),
    /// Opcode exists but this pump does not support it
    Unsupported(Opcode),
    /// SET_STATE(RUNNING) refused because no period could be computed
    Period(PeriodError),
}

impl From<FrameError> for DispatchError {
    fn from(err: FrameError) -> Self {
        DispatchError::Frame(err)
    }
}

impl From<CommandError> for DispatchError {
    fn from(err: CommandError) -> Self {
        DispatchError::Command(err)
    }
}

impl From<PeriodError> for DispatchError {
    fn from(err: PeriodError) -> Self {
        DispatchError::Period(err)
    }
}

impl DispatchError {
    /// Response owed to the host, if any
    ///
    /// Malformed frames and unknown opcodes are dropped silently.
    pub fn reply(&self) -> Option<Response> {
        match self {
            DispatchError::Frame(_) => None,
            DispatchError::Command(CommandError::UnknownOpcode(_)) => None,
            DispatchError::Command(CommandError::InvalidLength { .. }) => {
                Some(Response::Status(StatusCode::InvalidNumOfBytes))
            }
            DispatchError::Unsupported(_) => None,
            DispatchError::Period(_) => Some(Response::Status(StatusCode::Error)),
        }
    }
}

/// Applies commands to a [`PumpState`]
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    device_id: u8,
    stepper: StepperSettings,
    capabilities: Capabilities,
    period_policy: InvalidPeriodPolicy,
}

impl Dispatcher {
    pub fn new(config: &PumpConfig) -> Self {
        Self {
            device_id: config.device_id,
            stepper: config.stepper,
            capabilities: config.capabilities,
            period_policy: config.period_policy,
        }
    }

    /// Validate and apply one frame
    ///
    /// State is only mutated when the frame is valid for this pump.
    pub fn dispatch(&self, frame: &Frame, pump: &mut PumpState) -> Result<Response, DispatchError> {
        if frame.opcode == Opcode::SetDirection.to_byte() && !self.capabilities.direction_control {
            return Err(DispatchError::Unsupported(Opcode::SetDirection));
        }

        let command = Command::from_frame(frame)?;
        self.apply(command, pump)
    }

    /// Apply an already parsed command
    pub fn apply(&self, command: Command, pump: &mut PumpState) -> Result<Response, DispatchError> {
        match command {
            Command::SetSyringeLength(mm) => pump.syringe.length_mm = mm,
            Command::SetSyringeVolume(ml) => pump.syringe.volume_ml = ml,
            Command::SetRate(rate) => pump.rate = rate,
            Command::SetState(state) => self.set_state(state, pump)?,
            Command::GetDeviceNumber => return Ok(Response::DeviceNumber(self.device_id)),
            Command::SetDirection(direction) => {
                if !self.capabilities.direction_control {
                    return Err(DispatchError::Unsupported(Opcode::SetDirection));
                }
                pump.direction = direction;
            }
        }
        Ok(Response::OK)
    }

    fn set_state(&self, state: RunState, pump: &mut PumpState) -> Result<(), PeriodError> {
        if state == RunState::Running && self.capabilities.recompute_period_on_start {
            if let Err(err) = pump.recompute_period(&self.stepper) {
                match self.period_policy {
                    InvalidPeriodPolicy::Reject => {
                        pump.run_state = RunState::Stopped;
                        return Err(err);
                    }
                    // Running with no period: the step clock stays idle
                    InvalidPeriodPolicy::Hold => {}
                }
            }
        }
        pump.run_state = state;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pump::{Period, Syringe};
    use crate::traits::Direction;

    fn frame(opcode: u8, payload: &[u8]) -> Frame {
        Frame::new(opcode, payload).unwrap()
    }

    fn ready_pump() -> PumpState {
        let mut pump = PumpState::default();
        pump.syringe = Syringe {
            volume_ml: 10.0,
            length_mm: 50.0,
        };
        pump.rate = 1.0;
        pump
    }

    #[test]
    fn test_setters_apply_value() {
        let dispatcher = Dispatcher::new(&PumpConfig::default());
        let mut pump = PumpState::default();

        let reply = dispatcher.dispatch(&frame(0x01, &60.0f32.to_le_bytes()), &mut pump);
        assert_eq!(reply, Ok(Response::OK));
        assert_eq!(pump.syringe.length_mm, 60.0);

        dispatcher
            .dispatch(&frame(0x02, &20.0f32.to_le_bytes()), &mut pump)
            .unwrap();
        assert_eq!(pump.syringe.volume_ml, 20.0);

        dispatcher
            .dispatch(&frame(0x03, &0.25f32.to_le_bytes()), &mut pump)
            .unwrap();
        assert_eq!(pump.rate, 0.25);
    }

    #[test]
    fn test_setters_accept_nonpositive_values() {
        let dispatcher = Dispatcher::new(&PumpConfig::default());
        let mut pump = PumpState::default();

        let reply = dispatcher.dispatch(&frame(0x02, &(-3.0f32).to_le_bytes()), &mut pump);
        assert_eq!(reply, Ok(Response::OK));
        assert_eq!(pump.syringe.volume_ml, -3.0);
    }

    #[test]
    fn test_wrong_length_does_not_mutate() {
        let dispatcher = Dispatcher::new(&PumpConfig::default());
        let mut pump = ready_pump();
        let before = pump;

        let err = dispatcher
            .dispatch(&frame(0x03, &[0x00, 0x00, 0x80]), &mut pump)
            .unwrap_err();
        assert_eq!(err.reply(), Some(Response::Status(StatusCode::InvalidNumOfBytes)));
        assert_eq!(pump, before);

        let err = dispatcher.dispatch(&frame(0x04, &[0x00, 0x00]), &mut pump).unwrap_err();
        assert_eq!(err.reply(), Some(Response::Status(StatusCode::InvalidNumOfBytes)));
        assert_eq!(pump.run_state, RunState::Stopped);
    }

    #[test]
    fn test_device_number() {
        let mut config = PumpConfig::default();
        config.device_id = 0x2A;
        let dispatcher = Dispatcher::new(&config);
        let mut pump = PumpState::default();

        let reply = dispatcher.dispatch(&Frame::empty(0x05), &mut pump);
        assert_eq!(reply, Ok(Response::DeviceNumber(0x2A)));
    }

    #[test]
    fn test_unknown_opcode_is_silent() {
        let dispatcher = Dispatcher::new(&PumpConfig::default());
        let mut pump = PumpState::default();

        let err = dispatcher.dispatch(&frame(0x09, &[0x00]), &mut pump).unwrap_err();
        assert_eq!(err, DispatchError::Command(CommandError::UnknownOpcode(0x09)));
        assert_eq!(err.reply(), None);
    }

    #[test]
    fn test_start_computes_period() {
        let dispatcher = Dispatcher::new(&PumpConfig::revision2());
        let mut pump = ready_pump();

        assert_eq!(dispatcher.dispatch(&frame(0x04, &[0x00]), &mut pump), Ok(Response::OK));
        assert!(pump.is_running());
        let period = pump.period.unwrap().as_us();
        assert!(period.abs_diff(21_000) <= 1);

        assert_eq!(dispatcher.dispatch(&frame(0x04, &[0x01]), &mut pump), Ok(Response::OK));
        assert_eq!(pump.run_state, RunState::Stopped);
    }

    #[test]
    fn test_start_twice_keeps_running() {
        let dispatcher = Dispatcher::new(&PumpConfig::default());
        let mut pump = ready_pump();

        dispatcher.dispatch(&frame(0x04, &[0x00]), &mut pump).unwrap();
        let first = pump;
        dispatcher.dispatch(&frame(0x04, &[0x00]), &mut pump).unwrap();
        assert_eq!(pump, first);
    }

    #[test]
    fn test_reject_policy() {
        let dispatcher = Dispatcher::new(&PumpConfig::default());
        let mut pump = PumpState::default();

        let err = dispatcher.dispatch(&frame(0x04, &[0x00]), &mut pump).unwrap_err();
        assert_eq!(err, DispatchError::Period(PeriodError::InvalidRate));
        assert_eq!(err.reply(), Some(Response::Status(StatusCode::Error)));
        assert_eq!(pump.run_state, RunState::Stopped);
        assert_eq!(pump.period, None);
    }

    #[test]
    fn test_reject_stops_running_pump() {
        let dispatcher = Dispatcher::new(&PumpConfig::default());
        let mut pump = ready_pump();
        dispatcher.dispatch(&frame(0x04, &[0x00]), &mut pump).unwrap();

        pump.syringe.volume_ml = 0.0;
        let err = dispatcher.dispatch(&frame(0x04, &[0x00]), &mut pump).unwrap_err();
        assert_eq!(err, DispatchError::Period(PeriodError::InvalidVolume));
        assert!(!pump.is_running());
    }

    #[test]
    fn test_hold_policy() {
        let mut config = PumpConfig::default();
        config.period_policy = InvalidPeriodPolicy::Hold;
        let dispatcher = Dispatcher::new(&config);
        let mut pump = PumpState::default();

        assert_eq!(dispatcher.dispatch(&frame(0x04, &[0x00]), &mut pump), Ok(Response::OK));
        assert!(pump.is_running());
        assert_eq!(pump.period, None);
    }

    #[test]
    fn test_revision1_keeps_fixed_period() {
        let config = PumpConfig::revision1();
        let dispatcher = Dispatcher::new(&config);
        let mut pump = PumpState::new(Period::from_us(1000));

        // Zero rate is fine: the period is never recomputed
        assert_eq!(dispatcher.dispatch(&frame(0x04, &[0x00]), &mut pump), Ok(Response::OK));
        assert!(pump.is_running());
        assert_eq!(pump.period, Period::from_us(1000));
    }

    #[test]
    fn test_set_direction() {
        let dispatcher = Dispatcher::new(&PumpConfig::revision2());
        let mut pump = PumpState::default();

        assert_eq!(dispatcher.dispatch(&frame(0x08, &[0x01]), &mut pump), Ok(Response::OK));
        assert_eq!(pump.direction, Direction::Reverse);

        dispatcher.dispatch(&frame(0x08, &[0x00]), &mut pump).unwrap();
        assert_eq!(pump.direction, Direction::Forward);
    }

    #[test]
    fn test_set_direction_unsupported() {
        let dispatcher = Dispatcher::new(&PumpConfig::revision1());
        let mut pump = PumpState::default();

        let err = dispatcher.dispatch(&frame(0x08, &[0x01]), &mut pump).unwrap_err();
        assert_eq!(err, DispatchError::Unsupported(Opcode::SetDirection));
        assert_eq!(err.reply(), None);
        assert_eq!(pump.direction, Direction::Forward);

        // Treated as unknown, so a bad length is silent too
        let err = dispatcher.dispatch(&Frame::empty(0x08), &mut pump).unwrap_err();
        assert_eq!(err.reply(), None);

        let err = dispatcher
            .apply(Command::SetDirection(Direction::Reverse), &mut pump)
            .unwrap_err();
        assert_eq!(err, DispatchError::Unsupported(Opcode::SetDirection));
    }

    #[test]
    fn test_frame_errors_are_silent() {
        let err: DispatchError = FrameError::MissingEnd.into();
        assert_eq!(err.reply(), None);
    }
}
