//! # MVP Sequencer
//!
//! Walks a [`GameScript`] by game time: which hoops are live right now, and
//! whether the game is still going. The script is borrowed for the
//! sequencer's whole lifetime — the borrow checker enforces the "script must
//! outlive the sequencer" contract that the installation's show files rely
//! on.

use crate::layout::GameScript;
use crate::Pattern;
use tracing::debug;

/// Where the MVP game stands after an [`Sequencer::update`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MvpState {
    /// The script is exhausted (or was just reset); no hoops are in play
    GameOver,
    /// The cached pattern is live and trustworthy
    Running,
    /// Game time precedes the first entry's start; wait before trusting the
    /// active pattern
    Hold,
}

/// Time-indexed walk over a borrowed [`GameScript`].
///
/// `curr` and `next` only ever move forward between resets, and the active
/// pattern is cached so queries between updates never re-index the script.
#[derive(Debug)]
pub struct Sequencer<'a> {
    script: &'a GameScript,
    curr: usize,
    next: usize,
    current_pattern: Pattern,
}

impl<'a> Sequencer<'a> {
    /// Start at the script's first entry. The pre-game state is `GameOver`
    /// until the first `update` lands inside the game window.
    pub fn new(script: &'a GameScript) -> Self {
        Self {
            script,
            curr: 0,
            next: 1,
            current_pattern: script.entries()[0].pattern,
        }
    }

    /// Advance to `now_ms` of game time and report the game state.
    ///
    /// An entry becomes active *at or after* its declared time (`>=`
    /// tie-break), never before. Reaching the script's duration ends the
    /// game and rewinds to entry 0, ready for the next session.
    pub fn update(&mut self, now_ms: u32) -> MvpState {
        if now_ms >= self.script.duration_ms() {
            debug!(now_ms, "script exhausted, game over");
            self.reset();
            return MvpState::GameOver;
        }

        let entries = self.script.entries();
        while self.next < entries.len() && now_ms >= entries[self.next].time_ms {
            self.curr = self.next;
            self.current_pattern = entries[self.curr].pattern;
            self.next += 1;
            debug!(
                now_ms,
                entry = self.curr,
                pattern = %self.current_pattern,
                "advanced to next layout"
            );
        }

        if now_ms < entries[self.curr].time_ms {
            MvpState::Hold
        } else {
            MvpState::Running
        }
    }

    /// Rewind to entry 0. By convention the post-reset state is `GameOver`
    /// until the next `update`; end-of-script handling goes through here too.
    pub fn reset(&mut self) {
        self.curr = 0;
        self.next = 1;
        self.current_pattern = self.script.entries()[0].pattern;
    }

    /// The cached active pattern. Only meaningful while the last `update`
    /// returned [`MvpState::Running`].
    pub fn current_pattern(&self) -> Pattern {
        self.current_pattern
    }

    pub fn current_index(&self) -> usize {
        self.curr
    }
}
