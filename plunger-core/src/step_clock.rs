//! Non-blocking step pulse scheduler
//!
//! Called once per control loop iteration with the current time. Fires at
//! most one pulse per call, so a restart after a long stop yields one
//! immediate pulse and then settles into the period instead of catching up.

use crate::pump::PumpState;
use crate::traits::StepOutput;

/// Decides when the next step pulse is due
#[derive(Debug, Clone)]
pub struct StepClock {
    /// Timestamp of the last pulse (wrapping microseconds)
    last_pulse_us: u32,
    pulse_width_us: u32,
    /// Total pulses issued (wrapping)
    pulses: u32,
}

impl StepClock {
    /// Create a clock whose reference point is `now_us`
    pub fn new(pulse_width_us: u32, now_us: u32) -> Self {
        Self {
            last_pulse_us: now_us,
            pulse_width_us,
            pulses: 0,
        }
    }

    /// Pulse if the pump is running and a period has elapsed
    ///
    /// Returns true when a pulse was emitted. The reference timestamp only
    /// moves when a pulse fires.
    pub fn tick<O: StepOutput>(&mut self, now_us: u32, pump: &PumpState, out: &mut O) -> bool {
        if !pump.is_running() {
            return false;
        }
        let Some(period) = pump.period else {
            return false;
        };
        if now_us.wrapping_sub(self.last_pulse_us) < period.as_us() {
            return false;
        }

        out.pulse(self.pulse_width_us);
        self.last_pulse_us = now_us;
        self.pulses = self.pulses.wrapping_add(1);
        true
    }

    /// Pulses emitted since creation
    pub fn pulses(&self) -> u32 {
        self.pulses
    }

    pub fn pulse_width_us(&self) -> u32 {
        self.pulse_width_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pump::Period;
    use crate::traits::mock::RecordingOutput;
    use crate::traits::RunState;

    fn running(period_us: u32) -> PumpState {
        let mut pump = PumpState::new(Period::from_us(period_us));
        pump.run_state = RunState::Running;
        pump
    }

    #[test]
    fn test_no_pulse_when_stopped() {
        let mut clock = StepClock::new(5, 0);
        let mut out = RecordingOutput::default();
        let mut pump = running(100);
        pump.run_state = RunState::Stopped;

        for now in (0..10_000).step_by(50) {
            assert!(!clock.tick(now, &pump, &mut out));
        }
        assert!(out.pulses.is_empty());
    }

    #[test]
    fn test_no_pulse_without_period() {
        let mut clock = StepClock::new(5, 0);
        let mut out = RecordingOutput::default();
        let mut pump = running(100);
        pump.period = None;

        assert!(!clock.tick(1_000_000, &pump, &mut out));
        assert!(out.pulses.is_empty());
    }

    #[test]
    fn test_pulses_at_period() {
        let mut clock = StepClock::new(5, 0);
        let mut out = RecordingOutput::default();
        let pump = running(1000);

        assert!(!clock.tick(999, &pump, &mut out));
        assert!(clock.tick(1000, &pump, &mut out));
        assert!(!clock.tick(1500, &pump, &mut out));
        assert!(clock.tick(2003, &pump, &mut out));
        // Reference is the actual fire time, not the nominal one
        assert!(!clock.tick(3002, &pump, &mut out));
        assert!(clock.tick(3003, &pump, &mut out));

        assert_eq!(clock.pulses(), 3);
        assert_eq!(&out.pulses[..], &[5, 5, 5]);
    }

    #[test]
    fn test_no_burst_after_long_stop() {
        let mut clock = StepClock::new(8, 0);
        let mut out = RecordingOutput::default();
        let pump = running(1000);

        // Ten periods late: one pulse, then wait a full period again
        assert!(clock.tick(10_000, &pump, &mut out));
        assert!(!clock.tick(10_001, &pump, &mut out));
        assert!(!clock.tick(10_999, &pump, &mut out));
        assert!(clock.tick(11_000, &pump, &mut out));
        assert_eq!(out.pulses.len(), 2);
    }

    #[test]
    fn test_wraparound() {
        let start = u32::MAX - 400;
        let mut clock = StepClock::new(5, start);
        let mut out = RecordingOutput::default();
        let pump = running(1000);

        assert!(!clock.tick(start.wrapping_add(999), &pump, &mut out));
        assert!(clock.tick(start.wrapping_add(1000), &pump, &mut out));
    }
}
