//! # Game Scripts
//!
//! An MVP game is scripted ahead of time as an ordered list of
//! [`LayoutEntry`] values: at `time_ms` into the game, the hoops named by
//! `pattern` become the live targets. The script carries an explicit
//! `duration_ms`; when the game clock reaches it, the game is over. The
//! script is validated once, at construction — the sequencer can then trust
//! it unconditionally.

use crate::{Pattern, NUM_HOOPS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One step of a game script: from `time_ms` onward (until the next entry
/// takes over), `pattern` names the live hoops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    /// Game time at which this layout becomes active (milliseconds)
    pub time_ms: u32,
    /// Which hoops are live while this entry is active
    pub pattern: Pattern,
}

impl LayoutEntry {
    pub fn new(time_ms: u32, pattern: Pattern) -> Self {
        Self { time_ms, pattern }
    }
}

/// Ways a script can fail validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScriptError {
    /// A script needs at least one layout to sequence
    #[error("script has no entries")]
    Empty,

    /// Zero-length games cannot run
    #[error("script duration must be greater than zero")]
    ZeroDuration,

    /// Entries must be ordered by time (non-decreasing)
    #[error("entry {index} at {time_ms} ms precedes the previous entry at {prev_ms} ms")]
    OutOfOrder {
        index: usize,
        time_ms: u32,
        prev_ms: u32,
    },

    /// An entry scheduled at or past the end would never run
    #[error("entry {index} at {time_ms} ms is at or past the script end ({duration_ms} ms)")]
    PastEnd {
        index: usize,
        time_ms: u32,
        duration_ms: u32,
    },
}

/// A validated MVP game script.
///
/// Construction enforces every invariant the [`crate::sequencer::Sequencer`]
/// relies on: at least one entry, non-decreasing times, every entry strictly
/// inside the game window. Pattern range is enforced by the [`Pattern`] type
/// itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameScript {
    entries: Vec<LayoutEntry>,
    duration_ms: u32,
}

impl GameScript {
    /// Validate and build a script.
    pub fn new(entries: Vec<LayoutEntry>, duration_ms: u32) -> Result<Self, ScriptError> {
        if entries.is_empty() {
            return Err(ScriptError::Empty);
        }
        if duration_ms == 0 {
            return Err(ScriptError::ZeroDuration);
        }
        for (index, entry) in entries.iter().enumerate() {
            if index > 0 {
                let prev_ms = entries[index - 1].time_ms;
                if entry.time_ms < prev_ms {
                    return Err(ScriptError::OutOfOrder {
                        index,
                        time_ms: entry.time_ms,
                        prev_ms,
                    });
                }
            }
            if entry.time_ms >= duration_ms {
                return Err(ScriptError::PastEnd {
                    index,
                    time_ms: entry.time_ms,
                    duration_ms,
                });
            }
        }
        Ok(Self {
            entries,
            duration_ms,
        })
    }

    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Boolean-per-hoop view of every real pattern, indexed by bitmap value.
///
/// The bitmap *is* the layout id — this table is the unpacked form for code
/// that drives per-hoop outputs (lighting relays) from a pattern.
pub const HOOP_LAYOUTS: [[bool; NUM_HOOPS]; 1 << NUM_HOOPS] = [
    [false, false, false],
    [true, false, false],
    [false, true, false],
    [true, true, false],
    [false, false, true],
    [true, false, true],
    [false, true, true],
    [true, true, true],
];

/// Unpacked view of `pattern` from the static table.
pub fn hoop_layout(pattern: Pattern) -> [bool; NUM_HOOPS] {
    HOOP_LAYOUTS[pattern.bits() as usize]
}
