//! Control loop
//!
//! Owns the frame assembler, dispatcher, pump state and step clock. The
//! firmware task feeds it serial bytes and calls [`ControlLoop::tick`] on
//! every iteration; nothing here blocks except the pulse high phase.

use plunger_protocol::{FrameAssembler, Response};

use crate::config::PumpConfig;
use crate::dispatch::{DispatchError, Dispatcher};
use crate::pump::{Period, PumpState};
use crate::step_clock::StepClock;
use crate::traits::{Direction, StepOutput};

/// Single-threaded pump controller
#[derive(Debug, Clone)]
pub struct ControlLoop {
    assembler: FrameAssembler,
    dispatcher: Dispatcher,
    pump: PumpState,
    clock: StepClock,
    /// Level last written to the direction output
    applied_direction: Option<Direction>,
}

impl ControlLoop {
    /// Create the controller; `now_us` is the step clock's reference point
    pub fn new(config: &PumpConfig, now_us: u32) -> Self {
        let assembler = match config.serial.frame_timeout_us() {
            Some(timeout) => FrameAssembler::with_timeout(timeout),
            None => FrameAssembler::new(),
        };
        let initial_period = config.initial_period_us.and_then(Period::from_us);

        Self {
            assembler,
            dispatcher: Dispatcher::new(config),
            pump: PumpState::new(initial_period),
            clock: StepClock::new(config.stepper.pulse_width_us, now_us),
            applied_direction: None,
        }
    }

    /// Enable the driver and drive the initial direction
    pub fn begin<O: StepOutput>(&mut self, out: &mut O) {
        out.set_enabled(true);
        self.sync_direction(out);
    }

    /// Current pump state
    pub fn pump(&self) -> &PumpState {
        &self.pump
    }

    pub fn step_clock(&self) -> &StepClock {
        &self.clock
    }

    /// Feed one received byte
    ///
    /// Returns `None` while a frame is incomplete, otherwise the outcome of
    /// the frame. Errors carry their own reply via [`DispatchError::reply`].
    pub fn feed_byte(&mut self, byte: u8, now_us: u32) -> Option<Result<Response, DispatchError>> {
        match self.assembler.feed(byte, now_us) {
            Ok(None) => None,
            Ok(Some(frame)) => Some(self.dispatcher.dispatch(&frame, &mut self.pump)),
            Err(err) => Some(Err(err.into())),
        }
    }

    /// Drop a partial frame that has gone quiet
    ///
    /// Returns the error for logging when a frame was discarded.
    pub fn expire_stale_frame(&mut self, now_us: u32) -> Option<DispatchError> {
        self.assembler.expire(now_us).err().map(DispatchError::from)
    }

    /// Update outputs and pulse if due
    ///
    /// Returns true when a step pulse was emitted.
    pub fn tick<O: StepOutput>(&mut self, now_us: u32, out: &mut O) -> bool {
        self.sync_direction(out);
        self.clock.tick(now_us, &self.pump, out)
    }

    fn sync_direction<O: StepOutput>(&mut self, out: &mut O) {
        if self.applied_direction != Some(self.pump.direction) {
            out.set_direction(self.pump.direction);
            self.applied_direction = Some(self.pump.direction);
        }
    }
}
