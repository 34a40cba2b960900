//! Coin economy: balances, upgrade tiers and passive income.
//!
//! Income is opponent-driven. Each tick a player is credited the income
//! value of the *opponent's* mining level, so investing in mining feeds the
//! other side. All amounts are integers.

use serde::{Deserialize, Serialize};

use crate::components::{Owner, UnitKind};
use crate::error::{GameError, Result};

/// Highest tech and mining level.
pub const MAX_LEVEL: u8 = 3;

/// Coins a player starts the match with.
pub const STARTING_COINS: u32 = 100;

/// Display ticks per elapsed minute, used by unit pricing.
pub const TICKS_PER_MINUTE: u64 = 60;

/// Cost of upgrading away from `level` (tech and mining share the table).
#[must_use]
pub const fn upgrade_cost(level: u8) -> u32 {
    match level {
        0 | 1 => 50,
        2 => 100,
        _ => 200,
    }
}

/// Coins per tick yielded by a mining level.
#[must_use]
pub const fn mining_income(level: u8) -> u32 {
    match level {
        2 => 3,
        3 => 7,
        _ => 1,
    }
}

/// Current price of a unit after `elapsed_ticks` display ticks:
/// `(floor(minutes) + 1) * base_cost`.
///
/// # Errors
///
/// Returns [`GameError::UnknownUnitType`] for kinds without stats.
pub fn unit_cost(kind: UnitKind, elapsed_ticks: u64) -> Result<u32> {
    let base = kind.stats()?.base_cost;
    let multiplier = (elapsed_ticks / TICKS_PER_MINUTE) as u32 + 1;
    Ok(base.saturating_mul(multiplier))
}

/// Outcome of a successful investment call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Investment {
    /// Coins were debited and the level went up.
    Upgraded {
        /// New level.
        level: u8,
        /// Coins paid.
        cost: u32,
    },
    /// Already at [`MAX_LEVEL`]; nothing changed.
    MaxLevelReached,
}

/// Per-player economy state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Which side this is.
    pub owner: Owner,
    /// Current balance.
    pub coins: u32,
    /// Tech level, 1 to 3.
    pub tech_level: u8,
    /// Mining level, 1 to 3.
    pub mining_level: u8,
    /// Starting balance plus every income credit.
    pub total_credited: u64,
    /// Every successful debit.
    pub total_spent: u64,
}

impl Player {
    /// Create a level-1 player with a starting balance.
    #[must_use]
    pub const fn new(owner: Owner, starting_coins: u32) -> Self {
        Self {
            owner,
            coins: starting_coins,
            tech_level: 1,
            mining_level: 1,
            total_credited: starting_coins as u64,
            total_spent: 0,
        }
    }

    /// Check if the player can afford a cost.
    #[must_use]
    pub const fn can_afford(&self, cost: u32) -> bool {
        self.coins >= cost
    }

    /// Add income to the balance.
    pub fn credit(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
        self.total_credited += u64::from(amount);
    }

    /// Debit `amount`, or fail leaving the balance untouched.
    pub fn spend(&mut self, amount: u32) -> Result<()> {
        if !self.can_afford(amount) {
            return Err(GameError::InsufficientFunds {
                required: amount,
                available: self.coins,
            });
        }
        self.coins -= amount;
        self.total_spent += u64::from(amount);
        Ok(())
    }

    /// Upgrade mining by one tier.
    pub fn invest_mining(&mut self) -> Result<Investment> {
        let level = self.mining_level;
        let investment = self.upgrade(level)?;
        if let Investment::Upgraded { level, .. } = investment {
            self.mining_level = level;
        }
        Ok(investment)
    }

    /// Upgrade tech by one tier.
    pub fn invest_tech(&mut self) -> Result<Investment> {
        let level = self.tech_level;
        let investment = self.upgrade(level)?;
        if let Investment::Upgraded { level, .. } = investment {
            self.tech_level = level;
        }
        Ok(investment)
    }

    fn upgrade(&mut self, level: u8) -> Result<Investment> {
        if level >= MAX_LEVEL {
            return Ok(Investment::MaxLevelReached);
        }
        let cost = upgrade_cost(level);
        self.spend(cost)?;
        Ok(Investment::Upgraded {
            level: level + 1,
            cost,
        })
    }
}

/// Both players' economies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EconomyLedger {
    red: Player,
    blue: Player,
}

impl EconomyLedger {
    /// Create a ledger where both sides start with `starting_coins`.
    #[must_use]
    pub const fn new(starting_coins: u32) -> Self {
        Self {
            red: Player::new(Owner::Red, starting_coins),
            blue: Player::new(Owner::Blue, starting_coins),
        }
    }

    /// Economy of one side.
    #[must_use]
    pub const fn player(&self, owner: Owner) -> &Player {
        match owner {
            Owner::Red => &self.red,
            Owner::Blue => &self.blue,
        }
    }

    /// Mutable economy of one side.
    pub fn player_mut(&mut self, owner: Owner) -> &mut Player {
        match owner {
            Owner::Red => &mut self.red,
            Owner::Blue => &mut self.blue,
        }
    }

    /// Credit one tick of income. Each side receives the yield of the
    /// opponent's mining level.
    pub fn credit_income(&mut self) {
        let to_blue = mining_income(self.red.mining_level);
        let to_red = mining_income(self.blue.mining_level);
        self.blue.credit(to_blue);
        self.red.credit(to_red);
    }

    /// Debit the current price of a unit.
    ///
    /// Returns the price paid.
    pub fn charge_unit(&mut self, owner: Owner, kind: UnitKind, elapsed_ticks: u64) -> Result<u32> {
        let cost = unit_cost(kind, elapsed_ticks)?;
        self.player_mut(owner).spend(cost)?;
        Ok(cost)
    }

    /// Upgrade a side's mining level.
    pub fn invest_mining(&mut self, owner: Owner) -> Result<Investment> {
        self.player_mut(owner).invest_mining()
    }

    /// Upgrade a side's tech level.
    pub fn invest_tech(&mut self, owner: Owner) -> Result<Investment> {
        self.player_mut(owner).invest_tech()
    }
}

impl Default for EconomyLedger {
    fn default() -> Self {
        Self::new(STARTING_COINS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_table() {
        assert_eq!(mining_income(1), 1);
        assert_eq!(mining_income(2), 3);
        assert_eq!(mining_income(3), 7);
    }

    #[test]
    fn test_income_follows_opponent_mining() {
        let mut ledger = EconomyLedger::new(0);
        ledger.player_mut(Owner::Red).mining_level = 3;

        ledger.credit_income();

        assert_eq!(ledger.player(Owner::Blue).coins, 7);
        assert_eq!(ledger.player(Owner::Red).coins, 1);
    }

    #[test]
    fn test_unit_cost_scales_with_minutes() {
        assert_eq!(unit_cost(UnitKind::Soldier, 0).unwrap(), 10);
        assert_eq!(unit_cost(UnitKind::Soldier, 59).unwrap(), 10);
        assert_eq!(unit_cost(UnitKind::Soldier, 60).unwrap(), 20);
        assert_eq!(unit_cost(UnitKind::Soldier, 299).unwrap(), 50);
        assert!(unit_cost(UnitKind::Bomber, 0).is_err());
    }

    #[test]
    fn test_spend_insufficient_funds() {
        let mut player = Player::new(Owner::Blue, 5);
        let err = player.spend(10).unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientFunds {
                required: 10,
                available: 5
            }
        ));
        assert_eq!(player.coins, 5);
        assert_eq!(player.total_spent, 0);
    }

    #[test]
    fn test_invest_mining_tiers() {
        let mut player = Player::new(Owner::Red, 350);

        assert_eq!(
            player.invest_mining().unwrap(),
            Investment::Upgraded { level: 2, cost: 50 }
        );
        assert_eq!(
            player.invest_mining().unwrap(),
            Investment::Upgraded { level: 3, cost: 100 }
        );
        assert_eq!(player.coins, 200);
        assert_eq!(player.mining_level, 3);
    }

    #[test]
    fn test_invest_at_max_level_is_noop() {
        let mut player = Player::new(Owner::Red, 1000);
        player.mining_level = 3;
        let before = player;

        assert_eq!(player.invest_mining().unwrap(), Investment::MaxLevelReached);
        assert_eq!(player, before);
        assert_eq!(player.invest_mining().unwrap(), Investment::MaxLevelReached);
        assert_eq!(player, before);
    }

    #[test]
    fn test_invest_tech_insufficient_funds() {
        let mut player = Player::new(Owner::Blue, 49);
        assert!(player.invest_tech().is_err());
        assert_eq!(player.tech_level, 1);
        assert_eq!(player.coins, 49);
    }

    #[test]
    fn test_charge_unit() {
        let mut ledger = EconomyLedger::new(15);
        assert_eq!(ledger.charge_unit(Owner::Blue, UnitKind::Soldier, 0).unwrap(), 10);
        assert!(ledger.charge_unit(Owner::Blue, UnitKind::Soldier, 0).is_err());
        assert_eq!(ledger.player(Owner::Blue).coins, 5);
        assert_eq!(ledger.player(Owner::Red).coins, 15);
    }
}
