//! Spatial entity definitions: units, towers and their stat tables.
//!
//! Entities are plain data. Only the combat step and the game orchestrator
//! mutate them.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{CollisionBox, Position};

/// Unique identifier for units within a match. Starts at 1.
pub type UnitId = u32;

/// Unique identifier for towers within a match.
pub type TowerId = u32;

// ============================================================================
// Ownership
// ============================================================================

/// The two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Owner {
    /// Red side, bottom of the field.
    Red,
    /// Blue side, top of the field.
    Blue,
}

impl Owner {
    /// Both sides, in snapshot publication order.
    pub const ALL: [Owner; 2] = [Owner::Blue, Owner::Red];

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Owner::Red => Owner::Blue,
            Owner::Blue => Owner::Red,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Red => f.write_str("RED"),
            Owner::Blue => f.write_str("BLUE"),
        }
    }
}

// ============================================================================
// Units
// ============================================================================

/// Unit classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitKind {
    /// Melee infantry. The only kind with combat stats.
    #[default]
    Soldier,
    /// Declared for rendering only. Has no stats and cannot be bought.
    Bomber,
}

impl UnitKind {
    /// Stat table for this kind.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnitType`] for kinds without stats.
    pub fn stats(self) -> Result<UnitStats> {
        match self {
            UnitKind::Soldier => Ok(UnitStats::SOLDIER),
            UnitKind::Bomber => Err(GameError::UnknownUnitType(self)),
        }
    }
}

/// Base combat and economy numbers for a unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStats {
    /// Starting hit points.
    pub hp: i32,
    /// Damage before defense.
    pub power: i32,
    /// Subtracted from incoming power.
    pub defense: i32,
    /// Field units moved per axis per tick.
    pub speed: i32,
    /// Wall-clock time between attacks.
    pub attack_cooldown: Duration,
    /// Side length of the square collision footprint.
    pub footprint: i32,
    /// Purchase price before the elapsed-minute multiplier.
    pub base_cost: u32,
}

impl UnitStats {
    /// Soldier stat table.
    pub const SOLDIER: Self = Self {
        hp: 10,
        power: 7,
        defense: 2,
        speed: 1,
        attack_cooldown: Duration::from_secs(1),
        footprint: 5,
        base_cost: 10,
    };
}

/// Unit behaviour state.
///
/// ```text
/// Idle ──acquire──▶ Moving ──touch target──▶ Combat
///   ▲                                          │
///   └──────────── target gone or dead ─────────┘
/// any state ──hp <= 0──▶ Dead
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitState {
    /// Waiting to acquire a target.
    #[default]
    Idle,
    /// Walking toward a target.
    Moving,
    /// Locked in melee with a target.
    Combat,
    /// Reserved. No transition enters this state.
    CombatFinished,
    /// Terminal. The unit stays in the roster but takes no further part.
    Dead,
}

/// A mobile combat entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Roster-unique id.
    pub id: UnitId,
    /// Unit kind.
    pub kind: UnitKind,
    /// Owning side.
    pub owner: Owner,
    /// Current field position.
    pub position: Position,
    /// Remaining hit points.
    pub hp: i32,
    /// Damage before defense.
    pub power: i32,
    /// Damage reduction.
    pub defense: i32,
    /// Movement per axis per tick.
    pub speed: i32,
    /// Behaviour state.
    pub state: UnitState,
    /// Unit being chased or fought.
    pub target: Option<UnitId>,
    /// Where the unit is heading.
    pub target_position: Position,
    /// Minimum wall-clock gap between attacks.
    pub attack_cooldown: Duration,
    /// Wall-clock reading of the last attack, if any.
    pub last_attack_at: Option<Duration>,
}

impl Unit {
    /// Create a fresh idle unit of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnitType`] if the kind has no stats.
    pub fn new(id: UnitId, kind: UnitKind, owner: Owner, position: Position) -> Result<Self> {
        let stats = kind.stats()?;
        Ok(Self {
            id,
            kind,
            owner,
            position,
            hp: stats.hp,
            power: stats.power,
            defense: stats.defense,
            speed: stats.speed,
            state: UnitState::Idle,
            target: None,
            target_position: position,
            attack_cooldown: stats.attack_cooldown,
            last_attack_at: None,
        })
    }

    /// Whether the unit still takes part in the simulation.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state != UnitState::Dead
    }

    /// Collision footprint at the current position.
    #[must_use]
    pub fn collision_box(&self) -> CollisionBox {
        collision_box_at(self.kind, self.position)
    }

    /// Whether the attack cooldown has elapsed at wall-clock time `now`.
    ///
    /// A unit that has never attacked is always ready.
    #[must_use]
    pub fn attack_ready(&self, now: Duration) -> bool {
        match self.last_attack_at {
            None => true,
            Some(at) => now.saturating_sub(at) > self.attack_cooldown,
        }
    }

    /// Subtract `damage` from hit points, entering [`UnitState::Dead`] at
    /// zero or below. Dead units are left untouched.
    ///
    /// Returns `true` if this hit killed the unit.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.hp -= damage;
        if self.hp <= 0 {
            self.state = UnitState::Dead;
            self.target = None;
            return true;
        }
        false
    }
}

/// Collision footprint a unit of `kind` would have at `position`.
///
/// Kinds without stats get a zero-size box.
#[must_use]
pub fn collision_box_at(kind: UnitKind, position: Position) -> CollisionBox {
    let footprint = kind.stats().map_or(0, |s| s.footprint);
    CollisionBox::centered(position, footprint)
}

// ============================================================================
// Towers
// ============================================================================

/// Tower classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TowerKind {
    /// Player headquarters.
    #[default]
    Base,
}

/// Side length of a base tower.
pub const BASE_THICKNESS: i32 = 20;

/// Starting hit points of a base tower.
pub const BASE_HP: i32 = 100;

/// A static structure placed at game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tower {
    /// Tower id.
    pub id: TowerId,
    /// Tower kind.
    pub kind: TowerKind,
    /// Owning side.
    pub owner: Owner,
    /// Top-left corner.
    pub position: Position,
    /// Side length.
    pub thickness: i32,
    /// Hit points. Nothing reduces these yet.
    pub hp: i32,
}

impl Tower {
    /// Create a base tower.
    #[must_use]
    pub const fn base(id: TowerId, owner: Owner, position: Position) -> Self {
        Self {
            id,
            kind: TowerKind::Base,
            owner,
            position,
            thickness: BASE_THICKNESS,
            hp: BASE_HP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soldier() -> Unit {
        Unit::new(1, UnitKind::Soldier, Owner::Blue, Position::new(10, 10)).unwrap()
    }

    #[test]
    fn test_soldier_stats() {
        let u = soldier();
        assert_eq!((u.hp, u.power, u.defense, u.speed), (10, 7, 2, 1));
        assert_eq!(u.state, UnitState::Idle);
        assert_eq!(u.target, None);
    }

    #[test]
    fn test_bomber_has_no_stats() {
        let err = Unit::new(1, UnitKind::Bomber, Owner::Red, Position::default()).unwrap_err();
        assert!(matches!(err, GameError::UnknownUnitType(UnitKind::Bomber)));
    }

    #[test]
    fn test_damage_kills_at_zero() {
        let mut u = soldier();
        assert!(!u.take_damage(5));
        assert_eq!(u.hp, 5);
        assert!(u.take_damage(5));
        assert_eq!(u.hp, 0);
        assert_eq!(u.state, UnitState::Dead);
    }

    #[test]
    fn test_dead_unit_ignores_damage() {
        let mut u = soldier();
        u.take_damage(20);
        let hp = u.hp;
        assert!(!u.take_damage(5));
        assert!(!u.take_damage(-5));
        assert_eq!(u.hp, hp);
        assert_eq!(u.state, UnitState::Dead);
    }

    #[test]
    fn test_attack_cooldown_is_strict() {
        let mut u = soldier();
        assert!(u.attack_ready(Duration::ZERO));

        u.last_attack_at = Some(Duration::from_secs(2));
        assert!(!u.attack_ready(Duration::from_millis(2500)));
        assert!(!u.attack_ready(Duration::from_secs(3)));
        assert!(u.attack_ready(Duration::from_millis(3001)));
    }

    #[test]
    fn test_owner_opponent() {
        assert_eq!(Owner::Red.opponent(), Owner::Blue);
        assert_eq!(Owner::Blue.opponent(), Owner::Red);
        assert_eq!(Owner::Blue.to_string(), "BLUE");
    }
}
