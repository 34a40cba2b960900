//! Messages exchanged with decision agents.
//!
//! The core publishes a [`Snapshot`] per player on every setup-phase tick
//! and accepts [`PlayerCommand`]s while the setup phase lasts. Agents never
//! touch game state directly.
//!
//! # Wire shape
//!
//! ```text
//! snapshot: {"match_id":"…","owner":"BLUE","tick":12,"coins":112,
//!            "tech_level":1,"tech_upgrade_cost":50,"mining_level":1,
//!            "mining_upgrade_cost":50,"own_unit_count":0,
//!            "enemy_unit_count":0,"next_unit_cost":10}
//! command:  {"owner":"RED","command":"BUY_UNIT"}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::components::Owner;

/// Unique identifier of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub Uuid);

impl MatchId {
    /// Fresh random match id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Per-player view of the economy, published once per setup-phase tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Match this snapshot belongs to.
    pub match_id: MatchId,
    /// Player the snapshot is addressed to.
    pub owner: Owner,
    /// Display tick.
    pub tick: u64,
    /// Current balance.
    pub coins: u32,
    /// Tech level.
    pub tech_level: u8,
    /// Price of the next tech upgrade.
    pub tech_upgrade_cost: u32,
    /// Mining level.
    pub mining_level: u8,
    /// Price of the next mining upgrade.
    pub mining_upgrade_cost: u32,
    /// Units this player has spawned.
    pub own_unit_count: usize,
    /// Units the opponent has spawned.
    pub enemy_unit_count: usize,
    /// Current soldier price.
    pub next_unit_cost: u32,
}

/// An economic action an agent can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Buy one soldier at the current price.
    BuyUnit,
    /// Upgrade tech by one tier.
    InvestTech,
    /// Upgrade mining by one tier.
    InvestMining,
    /// Do nothing this tick.
    #[default]
    NoOp,
}

/// A command tagged with the player issuing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerCommand {
    /// Issuing player.
    pub owner: Owner,
    /// Requested action.
    pub command: Command,
}

impl PlayerCommand {
    /// Tag a command with its issuer.
    #[must_use]
    pub const fn new(owner: Owner, command: Command) -> Self {
        Self { owner, command }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_names() {
        let json = serde_json::to_string(&PlayerCommand::new(Owner::Red, Command::BuyUnit)).unwrap();
        assert_eq!(json, r#"{"owner":"RED","command":"BUY_UNIT"}"#);

        let parsed: PlayerCommand =
            serde_json::from_str(r#"{"owner":"BLUE","command":"INVEST_MINING"}"#).unwrap();
        assert_eq!(parsed, PlayerCommand::new(Owner::Blue, Command::InvestMining));
    }

    #[test]
    fn test_snapshot_fields() {
        let snapshot = Snapshot {
            match_id: MatchId(Uuid::nil()),
            owner: Owner::Blue,
            tick: 12,
            coins: 112,
            tech_level: 1,
            tech_upgrade_cost: 50,
            mining_level: 1,
            mining_upgrade_cost: 50,
            own_unit_count: 0,
            enemy_unit_count: 0,
            next_unit_cost: 10,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""match_id":"00000000-0000-0000-0000-000000000000""#));
        assert!(json.contains(r#""owner":"BLUE""#));
        assert!(json.contains(r#""next_unit_cost":10"#));
    }
}
