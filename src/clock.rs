//! # Monotonic Clock and Wrap-Safe Timer
//!
//! Everything in the crate that measures time goes through the [`Clock`]
//! trait: a free-running monotonic counter in milliseconds and microseconds,
//! wrapping at 2^32 like a microcontroller tick register. [`SystemClock`]
//! implements it on std; tests drive the state machines with the mock clock
//! in this module instead of sleeping.
//!
//! [`Timer`] measures elapsed time against a `Clock` and stays correct
//! across exactly one wraparound of the counter between resets — game
//! sessions are minutes long, but the installation itself runs for weeks,
//! so the counter *will* wrap mid-session eventually.

use std::time::Instant;

/// Monotonic time source, wrapping at 2^32.
///
/// Both counters are free-running and independent; neither is required to be
/// zero at any particular moment, only to advance monotonically (modulo the
/// wrap).
pub trait Clock {
    /// Milliseconds since an arbitrary origin, modulo 2^32.
    fn now_millis(&self) -> u32;
    /// Microseconds since an arbitrary origin, modulo 2^32 (wraps every
    /// ~71.6 minutes).
    fn now_micros(&self) -> u32;
}

/// Std implementation of [`Clock`] over [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u32 {
        // Truncation to u32 is the wrap
        self.origin.elapsed().as_millis() as u32
    }

    fn now_micros(&self) -> u32 {
        self.origin.elapsed().as_micros() as u32
    }
}

/// Elapsed-time measurement that survives one wrap of the millisecond
/// counter.
///
/// Invariant: `offset_time == 2^32 - start_time` (mod 2^32). When the
/// counter has wrapped (`now < start_time`), elapsed time is
/// `offset_time + now`; otherwise it is plain `now - start_time`.
#[derive(Clone, Copy, Debug)]
pub struct Timer {
    start_time: u32,
    offset_time: u32,
}

impl Timer {
    /// Start a timer at the clock's current millisecond reading.
    pub fn new(clock: &impl Clock) -> Self {
        let mut timer = Timer {
            start_time: 0,
            offset_time: 0,
        };
        timer.reset(clock);
        timer
    }

    /// Re-capture the current time as the new start point.
    pub fn reset(&mut self, clock: &impl Clock) {
        self.start_time = clock.now_millis();
        self.offset_time = (u32::MAX - self.start_time).wrapping_add(1);
    }

    /// Milliseconds since the last reset, correct across one counter wrap.
    pub fn elapsed_ms(&self, clock: &impl Clock) -> u32 {
        let now = clock.now_millis();
        if now >= self.start_time {
            now - self.start_time
        } else {
            self.offset_time.wrapping_add(now)
        }
    }

    /// Whole seconds since the last reset (floored, never rounded).
    pub fn elapsed_secs(&self, clock: &impl Clock) -> u32 {
        self.elapsed_ms(clock) / 1000
    }

    pub fn start_time(&self) -> u32 {
        self.start_time
    }

    pub fn offset_time(&self) -> u32 {
        self.offset_time
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockClock;
    use super::*;

    #[test]
    fn elapsed_without_wrap() {
        let clock = MockClock::at_millis(1_000);
        let timer = Timer::new(&clock);
        clock.advance_ms(250);
        assert_eq!(timer.elapsed_ms(&clock), 250);
    }

    #[test]
    fn elapsed_across_wrap() {
        // Counter wraps between reset and read: start near the top, now small.
        let start = u32::MAX - 99;
        let clock = MockClock::at_millis(start);
        let timer = Timer::new(&clock);
        clock.set_millis(400);
        // (MAX - start + 1) + now = 100 + 400
        assert_eq!(timer.elapsed_ms(&clock), 500);
    }

    #[test]
    fn wrap_at_exact_boundary() {
        let clock = MockClock::at_millis(u32::MAX);
        let timer = Timer::new(&clock);
        clock.set_millis(0);
        assert_eq!(timer.elapsed_ms(&clock), 1);
    }

    #[test]
    fn seconds_floor_not_round() {
        let clock = MockClock::at_millis(0);
        let timer = Timer::new(&clock);
        clock.set_millis(1_999);
        assert_eq!(timer.elapsed_secs(&clock), 1);
        clock.set_millis(999);
        assert_eq!(timer.elapsed_secs(&clock), 0);
    }

    #[test]
    fn reset_recomputes_offset() {
        let clock = MockClock::at_millis(7);
        let mut timer = Timer::new(&clock);
        assert_eq!(timer.offset_time(), (u32::MAX - 7).wrapping_add(1));
        clock.set_millis(123);
        timer.reset(&clock);
        assert_eq!(timer.start_time(), 123);
        assert_eq!(timer.elapsed_ms(&clock), 0);
    }

    #[test]
    fn zero_start_offset_wraps_to_zero() {
        // start_time == 0 makes the offset wrap to 0; elapsed stays exact.
        let clock = MockClock::at_millis(0);
        let timer = Timer::new(&clock);
        clock.set_millis(42);
        assert_eq!(timer.elapsed_ms(&clock), 42);
    }
}
