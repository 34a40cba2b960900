//! # Skirmish Core
//!
//! Deterministic simulation core for a two-player skirmish.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO beyond loading a config file
//! - No threads or async
//! - No system randomness (spawn placement uses a seeded PRNG)
//!
//! The driver passes wall-clock readings in as a `Duration` since match
//! start, so a match can be replayed exactly from its seed, its command
//! script and its frame timestamps.
//!
//! ## Crate Structure
//!
//! - [`game`] - Match orchestrator and tick loop
//! - [`economy`] - Coins, upgrades and income
//! - [`combat`] - Battle-phase unit state machine
//! - [`victory`] - Timeout and elimination
//! - [`clock`] - Fixed-rate tick gate
//! - [`protocol`] - Snapshot and command messages for agents
//! - [`components`] - Units and towers
//! - [`roster`] - Append-only unit arena
//! - [`math`] - Positions, bounds and collision boxes

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod clock;
pub mod combat;
pub mod components;
pub mod config;
pub mod economy;
pub mod error;
pub mod game;
pub mod math;
pub mod protocol;
pub mod roster;
pub mod victory;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::clock::TickClock;
    pub use crate::combat::CombatEvent;
    pub use crate::components::*;
    pub use crate::config::MatchConfig;
    pub use crate::economy::{EconomyLedger, Investment, Player};
    pub use crate::error::{GameError, Result};
    pub use crate::game::{Game, Phase, TickEvents};
    pub use crate::math::{Bounds, CollisionBox, Fixed, Position};
    pub use crate::protocol::{Command, MatchId, PlayerCommand, Snapshot};
    pub use crate::roster::Roster;
    pub use crate::victory::{Outcome, VictoryReason, WinConditionEvaluator};
}
