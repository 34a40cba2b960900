//! Battle-phase unit state machine.
//!
//! One call to [`battle_step`] advances every live unit once, in roster slot
//! order. Each unit reads the roster as left by the units before it in the
//! same step: a unit pulled into combat by an earlier unit acts as a
//! combatant on its own turn, and a unit killed earlier in the step is
//! skipped. Reordering the roster changes outcomes.
//!
//! Movement and target acquisition advance once per tick. Attack cooldowns
//! are measured against the wall-clock time passed in as `now`, so match
//! speed changes how many movement ticks fit between two attacks.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::components::{Unit, UnitId, UnitState};
use crate::error::{GameError, Result};
use crate::math::{Bounds, Position};
use crate::roster::Roster;

/// Something that happened to a unit during a battle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Two units locked into melee.
    Engaged {
        /// Unit whose move triggered the lock.
        unit: UnitId,
        /// Its target.
        target: UnitId,
    },
    /// An attack landed.
    Attack {
        /// Attacking unit.
        attacker: UnitId,
        /// Unit hit.
        target: UnitId,
        /// Damage applied.
        damage: i32,
        /// Target hit points after the hit.
        remaining_hp: i32,
    },
    /// A unit reached zero hit points.
    Died {
        /// Dead unit.
        unit: UnitId,
        /// Unit that landed the final hit.
        killer: UnitId,
    },
}

/// Damage `attacker` deals to `target`: power minus defense, floored at 0.
#[must_use]
pub fn calculate_damage(attacker: &Unit, target: &Unit) -> i32 {
    (attacker.power - target.defense).max(0)
}

/// Nearest live enemy of the unit in slot `index`.
///
/// Distance is planar Euclidean. Ties go to the enemy earliest in the roster.
///
/// # Errors
///
/// Returns [`GameError::NoEnemyFound`] if the other side has no live unit.
pub fn acquire_target(units: &[Unit], index: usize) -> Result<(UnitId, Position)> {
    let me = &units[index];
    let mut best: Option<(i64, &Unit)> = None;

    for enemy in units.iter().filter(|u| u.is_alive() && u.owner != me.owner) {
        let d = me.position.distance_squared(enemy.position);
        if best.map_or(true, |(best_d, _)| d < best_d) {
            best = Some((d, enemy));
        }
    }

    best.map(|(_, enemy)| (enemy.id, enemy.position))
        .ok_or(GameError::NoEnemyFound)
}

/// First free cell next to `target`, tried front, back, right, left.
///
/// A cell is free when it lies on the field and no live unit stands on it.
#[must_use]
pub fn surround_slot(roster: &Roster, target: &Unit, bounds: &Bounds) -> Option<Position> {
    let p = target.position;
    [p.offset(0, 1), p.offset(0, -1), p.offset(1, 0), p.offset(-1, 0)]
        .into_iter()
        .find(|slot| bounds.contains(*slot) && roster.unit_at(*slot).is_none())
}

/// Advance every live unit by one battle tick.
pub fn battle_step(roster: &mut Roster, bounds: &Bounds, now: Duration) -> Vec<CombatEvent> {
    let mut events = Vec::new();

    for index in 0..roster.len() {
        let current = roster.units()[index];
        match current.state {
            UnitState::Dead | UnitState::CombatFinished => {}
            UnitState::Idle => idle_step(roster, index),
            UnitState::Moving => moving_step(roster, bounds, index, &mut events),
            UnitState::Combat => combat_step(roster, index, now, &mut events),
        }
    }

    events
}

fn idle_step(roster: &mut Roster, index: usize) {
    let units = roster.units_mut();
    match acquire_target(units, index) {
        Ok((target, position)) => {
            let unit = &mut units[index];
            unit.target = Some(target);
            unit.target_position = position;
            unit.state = UnitState::Moving;
            tracing::trace!(unit = unit.id, enemy = target, "Target acquired");
        }
        Err(_) => {
            tracing::trace!(unit = units[index].id, "No enemy to acquire");
        }
    }
}

fn moving_step(roster: &mut Roster, bounds: &Bounds, index: usize, events: &mut Vec<CombatEvent>) {
    let current = roster.units()[index];
    let footprint = current.collision_box();

    let blocker = roster
        .iter()
        .enumerate()
        .find(|(i, u)| *i != index && u.is_alive() && footprint.overlaps(&u.collision_box()))
        .map(|(i, u)| (i, *u));

    if let Some((other_index, other)) = blocker {
        // Any contact ends this unit's turn.
        if other.owner == current.owner {
            redirect_around_target(roster, bounds, index, &other);
        } else if Some(other.id) == current.target {
            let units = roster.units_mut();
            units[index].state = UnitState::Combat;
            units[index].target = Some(other.id);
            units[other_index].state = UnitState::Combat;
            units[other_index].target = Some(current.id);

            tracing::debug!(unit = current.id, enemy = other.id, "Units engaged");
            events.push(CombatEvent::Engaged {
                unit: current.id,
                target: other.id,
            });
        }
        return;
    }

    let units = roster.units_mut();
    step_toward_target(&mut units[index], bounds);

    if let Ok((target, position)) = acquire_target(units, index) {
        units[index].target = Some(target);
        units[index].target_position = position;
    }
}

/// Handle contact with an ally. Allies converging on the same target spread
/// out to a free cell around it.
fn redirect_around_target(roster: &mut Roster, bounds: &Bounds, index: usize, ally: &Unit) {
    let current = roster.units()[index];
    let target = current.target.and_then(|id| roster.get(id).copied());

    let Some(target) = target else {
        roster.units_mut()[index].state = UnitState::Idle;
        return;
    };

    if ally.target == Some(target.id) {
        if let Some(slot) = surround_slot(roster, &target, bounds) {
            roster.units_mut()[index].target_position = slot;
        }
    }
}

/// Step `speed` along X, then along Y, toward the target position. Each
/// axis step that would leave the field is dropped.
fn step_toward_target(unit: &mut Unit, bounds: &Bounds) {
    let dx = (unit.target_position.x - unit.position.x).signum();
    if dx != 0 {
        let next = unit.position.offset(dx * unit.speed, 0);
        if bounds.contains(next) {
            unit.position = next;
        }
    }

    let dy = (unit.target_position.y - unit.position.y).signum();
    if dy != 0 {
        let next = unit.position.offset(0, dy * unit.speed);
        if bounds.contains(next) {
            unit.position = next;
        }
    }
}

fn combat_step(roster: &mut Roster, index: usize, now: Duration, events: &mut Vec<CombatEvent>) {
    let current = roster.units()[index];
    let target_index = match combat_target(roster, &current) {
        Ok(i) => i,
        Err(e) => {
            roster.units_mut()[index].state = UnitState::Idle;
            tracing::trace!(unit = current.id, error = %e, "Combat target gone, going idle");
            return;
        }
    };

    if !current.attack_ready(now) {
        return;
    }

    let units = roster.units_mut();
    let damage = calculate_damage(&current, &units[target_index]);
    let target = &mut units[target_index];
    let killed = target.take_damage(damage);
    let target_id = target.id;

    events.push(CombatEvent::Attack {
        attacker: current.id,
        target: target_id,
        damage,
        remaining_hp: target.hp,
    });
    if killed {
        tracing::debug!(unit = target_id, killer = current.id, "Unit died");
        events.push(CombatEvent::Died {
            unit: target_id,
            killer: current.id,
        });
    }

    units[index].last_attack_at = Some(now);
}

/// Slot of the live unit `unit` is fighting.
fn combat_target(roster: &Roster, unit: &Unit) -> Result<usize> {
    let id = unit.target.ok_or(GameError::NoEnemyFound)?;
    if !roster.find(id)?.is_alive() {
        return Err(GameError::TargetNotFound(id));
    }
    roster.index_of(id).ok_or(GameError::TargetNotFound(id))
}
