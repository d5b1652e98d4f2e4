//! Time sources for step pulse scheduling
//!
//! Timestamps are wrapping 32-bit microsecond counters. At 1 MHz a u32
//! wraps roughly every 71 minutes; callers compare with `wrapping_sub` so a
//! wrap between two samples is harmless.

/// Something which records elapsed real time in microseconds.
pub trait MonotonicClock {
    /// Microseconds since a clock-specific reference point, wrapping
    fn now_us(&self) -> u32;

    /// Microseconds elapsed since `earlier`
    fn elapsed_since(&self, earlier: u32) -> u32 {
        self.now_us().wrapping_sub(earlier)
    }
}

impl<F> MonotonicClock for F
where
    F: Fn() -> u32,
{
    fn now_us(&self) -> u32 {
        self()
    }
}

/// Blocking short delay
///
/// Used only for the step pulse high phase, which must be exact and is a
/// few microseconds long.
pub trait BusyWait {
    /// Spin for at least `us` microseconds
    fn delay_us(&mut self, us: u32);
}

impl<B: BusyWait + ?Sized> BusyWait for &mut B {
    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn test_closure_clock() {
        let now = Cell::new(1_000u32);
        let clock = || now.get();
        assert_eq!(clock.now_us(), 1_000);

        now.set(1_250);
        assert_eq!(clock.elapsed_since(1_000), 250);
    }

    #[test]
    fn test_elapsed_across_wrap() {
        let clock = || 5u32;
        assert_eq!(clock.elapsed_since(u32::MAX - 4), 10);
    }
}
