//! End-of-match summary.

use serde::{Deserialize, Serialize};

use skirmish_core::components::Owner;
use skirmish_core::game::Game;
use skirmish_core::protocol::MatchId;
use skirmish_core::victory::VictoryReason;

use crate::error::ServerResult;

/// Final state of one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideReport {
    /// Units still alive.
    pub alive_units: usize,
    /// Units ever spawned.
    pub total_units: usize,
    /// Coins left.
    pub coins: u32,
    /// Tech level reached.
    pub tech_level: u8,
    /// Mining level reached.
    pub mining_level: u8,
}

impl SideReport {
    fn from_game(game: &Game, owner: Owner) -> Self {
        let player = game.player(owner);
        Self {
            alive_units: game.alive_units_of(owner).count(),
            total_units: game.units_of(owner).count(),
            coins: player.coins,
            tech_level: player.tech_level,
            mining_level: player.mining_level,
        }
    }
}

/// Summary printed when a hosted match stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Match id.
    pub match_id: MatchId,
    /// Winning side, if decided.
    pub winner: Option<Owner>,
    /// How it was decided.
    pub reason: Option<VictoryReason>,
    /// Display ticks played.
    pub ticks: u64,
    /// BLUE's final state.
    pub blue: SideReport,
    /// RED's final state.
    pub red: SideReport,
}

impl MatchReport {
    /// Summarize a game in its current state.
    #[must_use]
    pub fn from_game(game: &Game) -> Self {
        let outcome = game.outcome();
        Self {
            match_id: game.id(),
            winner: outcome.map(|o| o.winner),
            reason: outcome.map(|o| o.reason),
            ticks: game.display_time(),
            blue: SideReport::from_game(game, Owner::Blue),
            red: SideReport::from_game(game, Owner::Red),
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ServerError::Report`] if encoding fails.
    pub fn to_json(&self) -> ServerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::components::UnitKind;
    use skirmish_core::config::MatchConfig;

    #[test]
    fn test_report_counts_dead_and_alive() {
        let mut game = Game::new(MatchConfig::default());
        game.purchase_unit(Owner::Blue, UnitKind::Soldier).unwrap();
        game.purchase_unit(Owner::Blue, UnitKind::Soldier).unwrap();

        let report = MatchReport::from_game(&game);
        assert_eq!(report.blue.total_units, 2);
        assert_eq!(report.blue.alive_units, 2);
        assert_eq!(report.blue.coins, 80);
        assert_eq!(report.red.total_units, 0);
        assert_eq!(report.winner, None);
    }

    #[test]
    fn test_report_json_shape() {
        let game = Game::new(MatchConfig::default());
        let json = MatchReport::from_game(&game).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["winner"], serde_json::Value::Null);
        assert_eq!(value["blue"]["coins"], 100);
        assert_eq!(value["match_id"], game.id().to_string());
    }
}
