//! Match orchestrator.
//!
//! [`Game`] owns every piece of match state and is the only thing that
//! mutates it. A driver calls [`Game::update`] once per frame with the
//! wall-clock time since match start and feeds agent commands through
//! [`Game::apply_command`] in between.
//!
//! # Tick order
//!
//! When the clock fires:
//!
//! 1. The display time advances by one.
//! 2. Past the setup threshold, the setup phase ends.
//! 3. Setup phase: income is credited and one snapshot per player is
//!    produced, BLUE first.
//! 4. Battle phase: win conditions are evaluated. If nobody has won, every
//!    live unit takes one combat step.
//!
//! Once a winner is set, `update` does nothing.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use skirmish_core::config::MatchConfig;
//! use skirmish_core::game::Game;
//! use skirmish_core::protocol::{Command, PlayerCommand};
//! use skirmish_core::components::Owner;
//!
//! let mut game = Game::new(MatchConfig::default());
//! game.apply_command(PlayerCommand::new(Owner::Blue, Command::BuyUnit)).unwrap();
//! assert_eq!(game.player(Owner::Blue).coins, 90);
//!
//! let events = game.update(Duration::from_secs(1));
//! assert!(events.ticked);
//! assert_eq!(events.snapshots.len(), 2);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::clock::TickClock;
use crate::combat::{battle_step, CombatEvent};
use crate::components::{collision_box_at, Owner, Tower, TowerId, Unit, UnitId, UnitKind};
use crate::config::MatchConfig;
use crate::economy::{unit_cost, upgrade_cost, EconomyLedger, Investment, Player};
use crate::error::{GameError, Result};
use crate::math::{Bounds, Position};
use crate::protocol::{Command, MatchId, PlayerCommand, Snapshot};
use crate::roster::Roster;
use crate::victory::{Outcome, WinConditionEvaluator};

/// Draws before spawn placement settles for an overlapping candidate.
const MAX_SPAWN_ATTEMPTS: usize = 64;

/// Range of each random spawn offset.
const SPAWN_SPREAD: i32 = 100;

/// Match phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Economy runs and commands are accepted.
    #[default]
    Setup,
    /// Units fight; economy is frozen.
    Battle,
}

/// What happened during one call to [`Game::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Whether the clock fired.
    pub ticked: bool,
    /// Display time after this update.
    pub tick: u64,
    /// Snapshots published this tick, BLUE first.
    pub snapshots: Vec<Snapshot>,
    /// Whether the battle phase began on this tick.
    pub battle_started: bool,
    /// Engagements, attacks and deaths from the combat step.
    pub combat: Vec<CombatEvent>,
    /// Set on the tick the match was decided.
    pub outcome: Option<Outcome>,
}

impl TickEvents {
    /// Deaths recorded this tick as `(unit, killer)` pairs.
    pub fn deaths(&self) -> impl Iterator<Item = (UnitId, UnitId)> + '_ {
        self.combat.iter().filter_map(|e| match *e {
            CombatEvent::Died { unit, killer } => Some((unit, killer)),
            _ => None,
        })
    }
}

/// One match between BLUE and RED.
#[derive(Debug, Clone)]
pub struct Game {
    id: MatchId,
    config: MatchConfig,
    bounds: Bounds,
    phase: Phase,
    display_time: u64,
    clock: TickClock,
    ledger: EconomyLedger,
    roster: Roster,
    towers: Vec<Tower>,
    outcome: Option<Outcome>,
    evaluator: WinConditionEvaluator,
    rng: ChaCha8Rng,
}

impl Game {
    /// Create a match with a fresh id. Towers are placed immediately.
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        Self::with_id(MatchId::new(), config)
    }

    /// Create a match with a known id.
    #[must_use]
    pub fn with_id(id: MatchId, config: MatchConfig) -> Self {
        let config = config.normalized();
        let mut game = Self {
            id,
            bounds: Bounds::square(config.field_size),
            phase: Phase::Setup,
            display_time: 0,
            clock: TickClock::new(config.speed),
            ledger: EconomyLedger::new(config.starting_coins),
            roster: Roster::new(),
            towers: Vec::new(),
            outcome: None,
            evaluator: WinConditionEvaluator::new(config.timeout_ticks()),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        };
        game.init();
        game
    }

    /// Place the base towers. Does nothing if they are already placed.
    pub fn init(&mut self) {
        if !self.towers.is_empty() {
            return;
        }
        let size = self.config.field_size;
        let x = size / 2 - 10;
        self.towers = vec![
            Tower::base(1, Owner::Blue, self.bounds.clamp(Position::new(x, 20))),
            Tower::base(2, Owner::Red, self.bounds.clamp(Position::new(x, size - 20))),
        ];
        tracing::debug!(match_id = %self.id, "Placed base towers");
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Offer a frame timestamp and run a tick if the clock fires.
    pub fn update(&mut self, now: Duration) -> TickEvents {
        let mut events = TickEvents {
            tick: self.display_time,
            ..TickEvents::default()
        };
        if self.outcome.is_some() || !self.clock.advance(now) {
            return events;
        }

        self.display_time += 1;
        events.ticked = true;
        events.tick = self.display_time;

        if self.phase == Phase::Setup && self.display_time > self.config.setup_phase_ticks {
            events.battle_started = self.start_battle();
        }

        match self.phase {
            Phase::Setup => {
                self.ledger.credit_income();
                events.snapshots = Owner::ALL.iter().map(|&o| self.snapshot(o)).collect();
            }
            Phase::Battle => {
                if let Some(outcome) = self.evaluator.evaluate(self.display_time, &self.roster) {
                    tracing::info!(
                        match_id = %self.id,
                        tick = self.display_time,
                        winner = %outcome.winner,
                        reason = ?outcome.reason,
                        "Match decided"
                    );
                    self.outcome = Some(outcome);
                    events.outcome = Some(outcome);
                } else {
                    events.combat = battle_step(&mut self.roster, &self.bounds, now);
                }
            }
        }

        #[cfg(feature = "debug-validation")]
        {
            debug_assert!(self.roster.iter().all(|u| self.bounds.contains(u.position)));
            let hash = self.state_hash();
            tracing::debug!(tick = self.display_time, state_hash = hash, "Match state hash");
        }

        events
    }

    /// End the setup phase. Returns `false` if it had already ended.
    pub fn start_battle(&mut self) -> bool {
        if self.phase == Phase::Battle {
            return false;
        }
        self.phase = Phase::Battle;
        tracing::info!(
            match_id = %self.id,
            tick = self.display_time,
            blue_units = self.roster.count(Owner::Blue),
            red_units = self.roster.count(Owner::Red),
            "Battle phase started"
        );
        true
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Apply an agent command.
    ///
    /// Commands outside the setup phase are dropped and return `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientFunds`] when the player cannot pay.
    pub fn apply_command(&mut self, command: PlayerCommand) -> Result<()> {
        if !self.accepts_commands() {
            tracing::debug!(
                match_id = %self.id,
                owner = %command.owner,
                command = ?command.command,
                "Dropped command outside setup phase"
            );
            return Ok(());
        }

        match command.command {
            Command::BuyUnit => self.purchase_unit(command.owner, UnitKind::Soldier).map(|_| ()),
            Command::InvestTech => self.invest_tech(command.owner).map(|_| ()),
            Command::InvestMining => self.invest_mining(command.owner).map(|_| ()),
            Command::NoOp => Ok(()),
        }
    }

    /// Buy a unit at the current price and place it near the owner's base.
    ///
    /// # Errors
    ///
    /// - [`GameError::InvalidState`] outside the setup phase.
    /// - [`GameError::UnknownUnitType`] for kinds without stats.
    /// - [`GameError::InsufficientFunds`] when the player cannot pay.
    ///
    /// State is unchanged on error.
    pub fn purchase_unit(&mut self, owner: Owner, kind: UnitKind) -> Result<UnitId> {
        if !self.accepts_commands() {
            return Err(GameError::InvalidState(
                "units can only be bought during the setup phase".to_string(),
            ));
        }
        kind.stats()?;
        let cost = self.ledger.charge_unit(owner, kind, self.display_time)?;
        let position = self.spawn_position(owner, kind);
        let id = self.roster.spawn(kind, owner, position)?;
        tracing::debug!(
            match_id = %self.id,
            %owner,
            unit = id,
            cost,
            x = position.x,
            y = position.y,
            "Unit purchased"
        );
        Ok(id)
    }

    /// Upgrade a player's mining level.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidState`] outside the setup phase, or
    /// [`GameError::InsufficientFunds`].
    pub fn invest_mining(&mut self, owner: Owner) -> Result<Investment> {
        self.ensure_setup()?;
        let result = self.ledger.invest_mining(owner)?;
        self.log_investment(owner, "mining", result);
        Ok(result)
    }

    /// Upgrade a player's tech level.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidState`] outside the setup phase, or
    /// [`GameError::InsufficientFunds`].
    pub fn invest_tech(&mut self, owner: Owner) -> Result<Investment> {
        self.ensure_setup()?;
        let result = self.ledger.invest_tech(owner)?;
        self.log_investment(owner, "tech", result);
        Ok(result)
    }

    /// Place a unit directly, without payment. Used to stage scenarios.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidState`] if `position` is off the field or the match
    /// is decided, or [`GameError::UnknownUnitType`].
    pub fn spawn_unit(&mut self, owner: Owner, kind: UnitKind, position: Position) -> Result<UnitId> {
        if self.outcome.is_some() {
            return Err(GameError::InvalidState(
                "the match already has a winner".to_string(),
            ));
        }
        if !self.bounds.contains(position) {
            return Err(GameError::InvalidState(format!(
                "spawn position ({}, {}) is off the field",
                position.x, position.y
            )));
        }
        self.roster.spawn(kind, owner, position)
    }

    fn accepts_commands(&self) -> bool {
        self.phase == Phase::Setup && self.outcome.is_none()
    }

    fn ensure_setup(&self) -> Result<()> {
        if self.accepts_commands() {
            Ok(())
        } else {
            Err(GameError::InvalidState(
                "investments are only accepted during the setup phase".to_string(),
            ))
        }
    }

    fn log_investment(&self, owner: Owner, track: &str, result: Investment) {
        match result {
            Investment::Upgraded { level, cost } => {
                tracing::debug!(match_id = %self.id, %owner, track, level, cost, "Upgrade bought");
            }
            Investment::MaxLevelReached => {
                tracing::debug!(match_id = %self.id, %owner, track, "Already at max level");
            }
        }
    }

    /// Pick an on-field spawn point near the owner's base, avoiding friendly
    /// units. Draws past the field edge are clamped onto it.
    fn spawn_position(&mut self, owner: Owner, kind: UnitKind) -> Position {
        let base = self.base_position(owner);
        let mut candidate = base;
        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let x = base.x - self.rng.gen_range(0..SPAWN_SPREAD) + self.rng.gen_range(0..SPAWN_SPREAD);
            let depth = self.rng.gen_range(0..SPAWN_SPREAD);
            let y = match owner {
                Owner::Blue => base.y + 10 + depth + 20,
                Owner::Red => base.y - 10 - depth - 20,
            };
            candidate = self.bounds.clamp(Position::new(x, y));

            let footprint = collision_box_at(kind, candidate);
            let blocked = self
                .roster
                .owned_by(owner)
                .any(|u| u.collision_box().overlaps(&footprint));
            if !blocked {
                break;
            }
        }
        candidate
    }

    fn base_position(&self, owner: Owner) -> Position {
        self.towers
            .iter()
            .find(|t| t.owner == owner)
            .map_or_else(|| Position::new(self.config.field_size / 2, 0), |t| t.position)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Economy snapshot addressed to `owner`.
    #[must_use]
    pub fn snapshot(&self, owner: Owner) -> Snapshot {
        let player = self.ledger.player(owner);
        Snapshot {
            match_id: self.id,
            owner,
            tick: self.display_time,
            coins: player.coins,
            tech_level: player.tech_level,
            tech_upgrade_cost: upgrade_cost(player.tech_level),
            mining_level: player.mining_level,
            mining_upgrade_cost: upgrade_cost(player.mining_level),
            own_unit_count: self.roster.count(owner),
            enemy_unit_count: self.roster.count(owner.opponent()),
            next_unit_cost: unit_cost(UnitKind::Soldier, self.display_time).unwrap_or_default(),
        }
    }

    /// Match id.
    #[must_use]
    pub const fn id(&self) -> MatchId {
        self.id
    }

    /// Settings this match runs with.
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Field bounds.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the setup phase is still running.
    #[must_use]
    pub fn is_setup_phase(&self) -> bool {
        self.phase == Phase::Setup
    }

    /// Display ticks since match start.
    #[must_use]
    pub const fn display_time(&self) -> u64 {
        self.display_time
    }

    /// The tick clock.
    #[must_use]
    pub const fn clock(&self) -> &TickClock {
        &self.clock
    }

    /// Result of the match, once decided.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Winning side, once decided.
    #[must_use]
    pub fn winner(&self) -> Option<Owner> {
        self.outcome.map(|o| o.winner)
    }

    /// Whether the match is over.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Both players' economies.
    #[must_use]
    pub const fn ledger(&self) -> &EconomyLedger {
        &self.ledger
    }

    /// One player's economy.
    #[must_use]
    pub const fn player(&self, owner: Owner) -> &Player {
        self.ledger.player(owner)
    }

    /// All units in spawn order.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.roster.get(id)
    }

    /// Units spawned by `owner`, dead ones included.
    pub fn units_of(&self, owner: Owner) -> impl Iterator<Item = &Unit> {
        self.roster.owned_by(owner)
    }

    /// Live units of `owner`.
    pub fn alive_units_of(&self, owner: Owner) -> impl Iterator<Item = &Unit> {
        self.roster.owned_by(owner).filter(|u| u.is_alive())
    }

    /// Live unit standing exactly on `position`.
    #[must_use]
    pub fn unit_at(&self, position: Position) -> Option<&Unit> {
        self.roster.unit_at(position)
    }

    /// Base towers.
    #[must_use]
    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    /// Look up a tower.
    #[must_use]
    pub fn tower(&self, id: TowerId) -> Option<&Tower> {
        self.towers.iter().find(|t| t.id == id)
    }

    /// Hash of the simulation state.
    ///
    /// Two games with the same config, command script and clock readings
    /// hash the same. The match id is not part of the hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.display_time.hash(&mut hasher);
        self.phase.hash(&mut hasher);
        self.ledger.hash(&mut hasher);
        self.outcome.hash(&mut hasher);

        self.roster.len().hash(&mut hasher);
        for unit in self.roster.iter() {
            unit.id.hash(&mut hasher);
            unit.owner.hash(&mut hasher);
            unit.position.hash(&mut hasher);
            unit.hp.hash(&mut hasher);
            unit.state.hash(&mut hasher);
            unit.target.hash(&mut hasher);
            unit.target_position.hash(&mut hasher);
            unit.last_attack_at.hash(&mut hasher);
        }

        hasher.finish()
    }
}
