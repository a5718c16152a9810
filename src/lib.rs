//! # Hoopsense Core Library
//!
//! This library provides the control logic for an interactive basketball
//! installation: three wall-mounted hoops, each fitted with an ultrasonic
//! sensor that detects a made shot, sequenced by a time-scripted mini-game
//! ("MVP mode") and reporting events to show-control software over OSC
//! (Open Sound Control). It targets small embedded Linux boards like the
//! Raspberry Pi Zero 2 W.
//!
//! ## Design Philosophy
//!
//! ### Hardware at arm's length
//! The library never touches pins directly. Trigger/echo pins and the
//! monotonic clock are traits ([`sensor::GpioPin`], [`sensor::InputPin`],
//! [`clock::Clock`]) supplied by the embedding application; the optional
//! `hardware` feature ships `rppal`-backed implementations for the Pi.
//! Every state machine in the crate runs deterministically against a mock
//! clock in tests.
//!
//! ### Single control loop
//! Everything is synchronous and single-threaded. Sensor reads busy-wait for
//! a bounded echo window (a few milliseconds); nothing else competes for the
//! processor on the target, so this is the simplest correct design.
//!
//! ### Degrade, never crash
//! A timed-out echo is "no ball this cycle", not an error. An unknown OSC
//! type tag parses as an address-only message. Invalid game scripts are
//! rejected at construction, before the show starts.
//!
//! ## Core Types
//!
//! - [`Pattern`]: a bitmap over the three hoops — which are active in the
//!   script, which sensors fired, which are on cooldown. One type serves all
//!   three roles.
//! - [`sequencer::Sequencer`]: steps through a [`layout::GameScript`] by
//!   wall-clock time.
//! - [`osc::OscMessage`]: the wire codec shared with the show-control rig.
//!
//! ## Data Flow
//! 1. [`sensor::HoopArray::check_sensors`] → detection [`Pattern`]
//! 2. [`shots::ShotFilter::filter`] masks it against the script's active
//!    pattern and per-hoop cooldowns → shots made this cycle
//! 3. The application packs the result into an [`osc::OscMessage`] and writes
//!    it to its transport.

use serde::{Deserialize, Serialize};

// Module declarations
pub mod clock;
pub mod config;
pub mod cooldown;
pub mod layout;
pub mod osc;
#[cfg(all(target_os = "linux", feature = "hardware"))]
pub mod rpi;
pub mod sensor;
pub mod sequencer;
pub mod shots;

/// Number of hoops (and ultrasonic sensors) on the wall.
pub const NUM_HOOPS: usize = 3;

/// A bitmap over the installation's hoops: bit *i* set means hoop *i* is
/// active (in a script entry), detected (in a sensor reading), or on
/// cooldown (in a debounce mask) depending on context.
///
/// Only the low [`NUM_HOOPS`] bits are ever set; [`Pattern::from_bits`]
/// rejects anything else, so a `Pattern` in hand is always in range.
///
/// # Example
/// ```
/// use hoopsense::Pattern;
///
/// let active = Pattern::from_bits(0b011).unwrap();
/// let reading = Pattern::ALL;
/// assert_eq!((active & reading).count(), 2);
/// assert!(active.contains(0));
/// assert!(!active.contains(2));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Pattern(u8);

impl Pattern {
    /// No hoops set.
    pub const NONE: Pattern = Pattern(0);
    /// All three hoops set.
    pub const ALL: Pattern = Pattern((1 << NUM_HOOPS as u8) - 1);

    /// Build a pattern from raw bits. Returns `None` if any bit outside the
    /// three hoop positions is set.
    pub fn from_bits(bits: u8) -> Option<Pattern> {
        if bits & !Self::ALL.0 == 0 {
            Some(Pattern(bits))
        } else {
            None
        }
    }

    /// Pattern with exactly hoop `index` set.
    ///
    /// # Panics
    /// Panics if `index >= NUM_HOOPS`.
    pub fn single(index: usize) -> Pattern {
        assert!(index < NUM_HOOPS, "hoop index {index} out of range");
        Pattern(1 << index)
    }

    /// Raw bitmap value.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether hoop `index` is set. Out-of-range indices are never set.
    pub fn contains(self, index: usize) -> bool {
        index < NUM_HOOPS && self.0 & (1 << index) != 0
    }

    /// Number of hoops set (0..=3).
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Whether no hoop is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Boolean-per-hoop view of the bitmap.
    pub fn hoops(self) -> [bool; NUM_HOOPS] {
        let mut out = [false; NUM_HOOPS];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.contains(i);
        }
        out
    }
}

impl std::ops::BitAnd for Pattern {
    type Output = Pattern;
    fn bitand(self, rhs: Pattern) -> Pattern {
        Pattern(self.0 & rhs.0)
    }
}

impl std::ops::BitAndAssign for Pattern {
    fn bitand_assign(&mut self, rhs: Pattern) {
        self.0 &= rhs.0;
    }
}

impl std::ops::BitOr for Pattern {
    type Output = Pattern;
    fn bitor(self, rhs: Pattern) -> Pattern {
        Pattern(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Pattern {
    fn bitor_assign(&mut self, rhs: Pattern) {
        self.0 |= rhs.0;
    }
}

impl std::ops::Not for Pattern {
    type Output = Pattern;
    /// Complement within the three hoop bits; never sets bits past the wall.
    fn not(self) -> Pattern {
        Pattern(!self.0 & Self::ALL.0)
    }
}

impl From<Pattern> for u8 {
    fn from(p: Pattern) -> u8 {
        p.0
    }
}

impl TryFrom<u8> for Pattern {
    type Error = String;
    fn try_from(bits: u8) -> Result<Pattern, Self::Error> {
        Pattern::from_bits(bits).ok_or_else(|| format!("pattern bits {bits:#04x} out of range"))
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03b}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bits_rejects_out_of_range() {
        assert!(Pattern::from_bits(0b111).is_some());
        assert!(Pattern::from_bits(0b1000).is_none());
        assert!(Pattern::from_bits(0xFF).is_none());
    }

    #[test]
    fn complement_stays_within_hoop_bits() {
        let p = Pattern::from_bits(0b001).unwrap();
        assert_eq!((!p).bits(), 0b110);
        assert_eq!((!Pattern::ALL).bits(), 0);
    }

    #[test]
    fn hoops_unpacks_bitmap() {
        let p = Pattern::from_bits(0b101).unwrap();
        assert_eq!(p.hoops(), [true, false, true]);
        assert_eq!(p.count(), 2);
    }

    #[test]
    fn single_sets_one_bit() {
        assert_eq!(Pattern::single(0).bits(), 0b001);
        assert_eq!(Pattern::single(2).bits(), 0b100);
    }
}
