//! # Per-Sensor Cooldowns
//!
//! A ball that drops through a hoop keeps reflecting the ultrasonic beam for
//! a while — without debouncing, one made shot would be counted on every
//! polling cycle until the ball clears the net. A cooldown opens a window
//! after each counted shot during which that sensor's readings are ignored.
//!
//! [`Cooldown`] serves a standalone [`crate::sensor::BasketSensor`];
//! [`CooldownBank`] folds the three MVP hoops' cooldown flags into a single
//! [`Pattern`] so the shot filter can mask a whole reading with one AND.

use crate::clock::{Clock, Timer};
use crate::{Pattern, NUM_HOOPS};
use tracing::trace;

/// Debounce window for a single sensor.
#[derive(Clone, Copy, Debug)]
pub struct Cooldown {
    timer: Timer,
    active: bool,
    duration_ms: u32,
}

impl Cooldown {
    pub fn new(clock: &impl Clock) -> Self {
        Self {
            timer: Timer::new(clock),
            active: false,
            duration_ms: 0,
        }
    }

    /// Open a cooldown window of `duration_ms` starting now.
    pub fn start(&mut self, duration_ms: u32, clock: &impl Clock) {
        self.timer.reset(clock);
        self.duration_ms = duration_ms;
        self.active = true;
    }

    /// Clear the flag once elapsed time exceeds the window.
    pub fn update(&mut self, clock: &impl Clock) {
        if self.active && self.timer.elapsed_ms(clock) > self.duration_ms {
            self.active = false;
        }
    }

    /// Whether the sensor is currently inside its cooldown window.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Cancel any open window unconditionally.
    pub fn reset(&mut self, clock: &impl Clock) {
        self.active = false;
        self.timer.reset(clock);
    }
}

/// Cooldown state for all three MVP hoops, packed as one [`Pattern`].
///
/// Each hoop gets its own timer, but the "on cooldown" flags live in a
/// single bitmap so callers can mask a detection reading in one operation.
#[derive(Clone, Copy, Debug)]
pub struct CooldownBank {
    on_cooldown: Pattern,
    timers: [Timer; NUM_HOOPS],
    duration_ms: u32,
}

impl CooldownBank {
    /// Bank with every hoop off cooldown, sharing one window duration.
    pub fn new(duration_ms: u32, clock: &impl Clock) -> Self {
        Self {
            on_cooldown: Pattern::NONE,
            timers: [Timer::new(clock); NUM_HOOPS],
            duration_ms,
        }
    }

    /// Open hoop `index`'s cooldown window starting now.
    ///
    /// # Panics
    /// Panics if `index >= NUM_HOOPS`.
    pub fn start(&mut self, index: usize, clock: &impl Clock) {
        self.on_cooldown |= Pattern::single(index);
        self.timers[index].reset(clock);
        trace!(hoop = index, "cooldown started");
    }

    /// Expire finished windows.
    ///
    /// Expired bits are collected during the scan and masked off together at
    /// the end; the pattern is never mutated while it is being evaluated.
    pub fn update(&mut self, clock: &impl Clock) {
        let mut expired = Pattern::NONE;
        for (i, timer) in self.timers.iter().enumerate() {
            if self.on_cooldown.contains(i) && timer.elapsed_ms(clock) > self.duration_ms {
                expired |= Pattern::single(i);
            }
        }
        if !expired.is_empty() {
            self.on_cooldown &= !expired;
            trace!(expired = %expired, "cooldowns expired");
        }
    }

    /// Bitmap of hoops currently on cooldown.
    pub fn pattern(&self) -> Pattern {
        self.on_cooldown
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Clear every window unconditionally.
    pub fn reset(&mut self, clock: &impl Clock) {
        self.on_cooldown = Pattern::NONE;
        for timer in &mut self.timers {
            timer.reset(clock);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::mock::MockClock;

    #[test]
    fn single_cooldown_expires_after_duration() {
        let clock = MockClock::new();
        let mut cd = Cooldown::new(&clock);
        cd.start(500, &clock);
        assert!(cd.is_active());

        clock.advance_ms(500);
        cd.update(&clock);
        // Exactly at the boundary the window is still open
        assert!(cd.is_active());

        clock.advance_ms(1);
        cd.update(&clock);
        assert!(!cd.is_active());
    }

    #[test]
    fn single_cooldown_reset_clears_immediately() {
        let clock = MockClock::new();
        let mut cd = Cooldown::new(&clock);
        cd.start(10_000, &clock);
        cd.reset(&clock);
        assert!(!cd.is_active());
    }

    #[test]
    fn bank_tracks_hoops_independently() {
        let clock = MockClock::new();
        let mut bank = CooldownBank::new(1_000, &clock);

        bank.start(0, &clock);
        clock.advance_ms(600);
        bank.start(2, &clock);
        assert_eq!(bank.pattern().bits(), 0b101);

        // Hoop 0's window (started 600 ms ago + 401) expires; hoop 2's holds.
        clock.advance_ms(401);
        bank.update(&clock);
        assert_eq!(bank.pattern().bits(), 0b100);

        clock.advance_ms(600);
        bank.update(&clock);
        assert!(bank.pattern().is_empty());
    }

    #[test]
    fn bank_update_is_single_pass() {
        // Both windows expire in the same update call.
        let clock = MockClock::new();
        let mut bank = CooldownBank::new(100, &clock);
        bank.start(0, &clock);
        bank.start(1, &clock);
        clock.advance_ms(101);
        bank.update(&clock);
        assert!(bank.pattern().is_empty());
    }

    #[test]
    fn bank_reset_clears_all() {
        let clock = MockClock::new();
        let mut bank = CooldownBank::new(100, &clock);
        bank.start(0, &clock);
        bank.start(1, &clock);
        bank.start(2, &clock);
        bank.reset(&clock);
        assert!(bank.pattern().is_empty());
    }
}
