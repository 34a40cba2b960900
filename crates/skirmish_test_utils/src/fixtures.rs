//! Test fixtures and helpers.
//!
//! Pre-built matches, unit builders and a manual frame clock so tests can
//! drive [`Game::update`] without sleeping.

use std::time::Duration;

use skirmish_core::components::{Owner, Unit, UnitId, UnitKind};
use skirmish_core::config::MatchConfig;
use skirmish_core::game::{Game, TickEvents};
use skirmish_core::math::Position;
use skirmish_core::roster::Roster;
use skirmish_core::victory::Outcome;

/// A fresh soldier at `(x, y)`.
///
/// # Panics
///
/// Never for [`UnitKind::Soldier`].
#[must_use]
pub fn soldier_at(id: UnitId, owner: Owner, x: i32, y: i32) -> Unit {
    Unit::new(id, UnitKind::Soldier, owner, Position::new(x, y))
        .expect("soldiers always have stats")
}

/// A roster of soldiers, ids assigned in listed order.
#[must_use]
pub fn roster_of(units: &[(Owner, i32, i32)]) -> Roster {
    units
        .iter()
        .enumerate()
        .map(|(i, &(owner, x, y))| soldier_at(i as UnitId + 1, owner, x, y))
        .collect()
}

/// Default config with a fixed seed.
#[must_use]
pub fn test_config() -> MatchConfig {
    MatchConfig {
        seed: 0x5eed,
        ..MatchConfig::default()
    }
}

/// One BLUE soldier at (190, 20) against one RED soldier at (190, 380),
/// already in the battle phase.
///
/// # Panics
///
/// Never for the default field size.
#[must_use]
pub fn duel(config: MatchConfig) -> Game {
    let mut game = Game::new(config);
    game.spawn_unit(Owner::Blue, UnitKind::Soldier, Position::new(190, 20))
        .expect("blue spawn is on the field");
    game.spawn_unit(Owner::Red, UnitKind::Soldier, Position::new(190, 380))
        .expect("red spawn is on the field");
    game.start_battle();
    game
}

/// Stage a battle with soldiers at the given positions.
///
/// # Panics
///
/// Panics if a position is off the field.
#[must_use]
pub fn battle_with(config: MatchConfig, units: &[(Owner, i32, i32)]) -> Game {
    let mut game = Game::new(config);
    for &(owner, x, y) in units {
        game.spawn_unit(owner, UnitKind::Soldier, Position::new(x, y))
            .expect("fixture positions are on the field");
    }
    game.start_battle();
    game
}

/// Manual wall clock that produces one tick per frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameDriver {
    now: Duration,
    step: Duration,
}

impl FrameDriver {
    /// Driver whose frames are just over one tick interval apart.
    #[must_use]
    pub fn for_game(game: &Game) -> Self {
        Self {
            now: game.clock().last_tick_at(),
            step: game.clock().interval() + Duration::from_millis(1),
        }
    }

    /// Current wall-clock reading.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Advance one frame and update the game.
    pub fn frame(&mut self, game: &mut Game) -> TickEvents {
        self.now += self.step;
        game.update(self.now)
    }

    /// Run `ticks` frames, collecting the events of each.
    pub fn drive_ticks(&mut self, game: &mut Game, ticks: u64) -> Vec<TickEvents> {
        (0..ticks).map(|_| self.frame(game)).collect()
    }

    /// Run until the match is decided or `max_ticks` frames have passed.
    pub fn drive_until_finished(&mut self, game: &mut Game, max_ticks: u64) -> Option<Outcome> {
        for _ in 0..max_ticks {
            if let Some(outcome) = self.frame(game).outcome {
                return Some(outcome);
            }
        }
        game.outcome()
    }
}
