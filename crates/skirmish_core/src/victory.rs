//! Win conditions for the battle phase.
//!
//! Evaluation is a pure function of elapsed display ticks and the roster.
//! Timeout is checked before elimination.

use serde::{Deserialize, Serialize};

use crate::components::Owner;
use crate::roster::Roster;

/// Speed at which the timeout base is used unscaled.
const TIMEOUT_SPEED_UNIT: u32 = 16;

/// How the match was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryReason {
    /// The battle ran past the timeout; the larger live army won.
    Timeout,
    /// The other side had no live units left.
    Elimination,
}

/// Final result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome {
    /// Winning side.
    pub winner: Owner,
    /// Why it won.
    pub reason: VictoryReason,
}

/// Timeout in display ticks for a match at `speed`.
///
/// Speeds up to 31 keep the base; faster matches scale it by `speed / 16`,
/// so the default speed of 32 doubles it. The scale keeps growing past 32
/// (3x at 48, 4x at 64) rather than stopping at 2x.
#[must_use]
pub fn timeout_ticks(base_ticks: u64, speed: u32) -> u64 {
    base_ticks * u64::from((speed / TIMEOUT_SPEED_UNIT).max(1))
}

/// Decides when a battle is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinConditionEvaluator {
    timeout_ticks: u64,
}

impl WinConditionEvaluator {
    /// Create an evaluator with the given timeout.
    #[must_use]
    pub const fn new(timeout_ticks: u64) -> Self {
        Self { timeout_ticks }
    }

    /// Timeout in display ticks.
    #[must_use]
    pub const fn timeout_ticks(&self) -> u64 {
        self.timeout_ticks
    }

    /// Evaluate the win conditions.
    ///
    /// - Past the timeout, the side with more live units wins and BLUE wins
    ///   ties.
    /// - Otherwise, a side with live units wins once the other has none.
    /// - Two empty sides before the timeout decide nothing.
    #[must_use]
    pub fn evaluate(&self, elapsed_ticks: u64, roster: &Roster) -> Option<Outcome> {
        let blue = roster.alive_count(Owner::Blue);
        let red = roster.alive_count(Owner::Red);

        if elapsed_ticks > self.timeout_ticks {
            let winner = if blue >= red { Owner::Blue } else { Owner::Red };
            return Some(Outcome {
                winner,
                reason: VictoryReason::Timeout,
            });
        }

        let winner = match (blue, red) {
            (b, 0) if b > 0 => Owner::Blue,
            (0, r) if r > 0 => Owner::Red,
            _ => return None,
        };
        Some(Outcome {
            winner,
            reason: VictoryReason::Elimination,
        })
    }
}
