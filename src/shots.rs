//! # Shot Filter
//!
//! Turns a raw sensor reading into "shots made this cycle". A hoop counts
//! only when it is live in the script *and* its sensor fired *and* it is
//! not still on cooldown from a previous count; every hoop that counts gets
//! a fresh cooldown so a ball settling in the net is scored once, not once
//! per polling cycle.

use crate::clock::Clock;
use crate::cooldown::CooldownBank;
use crate::{Pattern, NUM_HOOPS};
use tracing::debug;

/// Debounced scoring over the three MVP hoops.
#[derive(Debug)]
pub struct ShotFilter {
    cooldowns: CooldownBank,
}

impl ShotFilter {
    /// `cooldown_ms` is the re-count suppression window per hoop.
    pub fn new(cooldown_ms: u32, clock: &impl Clock) -> Self {
        Self {
            cooldowns: CooldownBank::new(cooldown_ms, clock),
        }
    }

    /// Count the shots converted on this check.
    ///
    /// `active` is the script's live pattern, `reading` the simultaneous
    /// sensor detection bitmap. Returns 0..=3; cooldowns start on exactly
    /// the hoops that counted.
    pub fn filter(&mut self, active: Pattern, reading: Pattern, clock: &impl Clock) -> u32 {
        let mut valid = active & reading;
        self.cooldowns.update(clock);
        valid &= !self.cooldowns.pattern();

        let shots = valid.count();
        for i in 0..NUM_HOOPS {
            if valid.contains(i) {
                self.cooldowns.start(i, clock);
            }
        }
        if shots > 0 {
            debug!(active = %active, reading = %reading, counted = %valid, shots, "shots scored");
        }
        shots
    }

    /// Bitmap of hoops currently suppressed.
    pub fn on_cooldown(&self) -> Pattern {
        self.cooldowns.pattern()
    }

    /// Drop all suppression windows (new game).
    pub fn reset(&mut self, clock: &impl Clock) {
        self.cooldowns.reset(clock);
    }
}
