//! Append-only unit storage.
//!
//! Units are stored in spawn order and never removed. Unit ids are assigned
//! sequentially from 1, so a unit's id is its slot index plus one. Every
//! per-tick scan walks the roster by increasing slot index; the combat step
//! depends on that order.

use serde::{Deserialize, Serialize};

use crate::components::{Owner, Unit, UnitId, UnitKind};
use crate::error::{GameError, Result};
use crate::math::Position;

/// Arena of all units spawned in a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    units: Vec<Unit>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self { units: Vec::new() }
    }

    /// Id the next spawned unit will receive.
    #[must_use]
    pub fn next_id(&self) -> UnitId {
        self.units.len() as UnitId + 1
    }

    /// Spawn a new idle unit and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnitType`] if the kind has no stats.
    pub fn spawn(&mut self, kind: UnitKind, owner: Owner, position: Position) -> Result<UnitId> {
        let id = self.next_id();
        let unit = Unit::new(id, kind, owner, position)?;
        self.units.push(unit);
        Ok(id)
    }

    /// Slot index of a unit id.
    #[must_use]
    pub fn index_of(&self, id: UnitId) -> Option<usize> {
        let index = (id as usize).checked_sub(1)?;
        self.units
            .get(index)
            .filter(|u| u.id == id)
            .map(|_| index)
    }

    /// Get a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.index_of(id).map(|i| &self.units[i])
    }

    /// Get a unit by id, or [`GameError::TargetNotFound`].
    pub fn find(&self, id: UnitId) -> Result<&Unit> {
        self.get(id).ok_or(GameError::TargetNotFound(id))
    }

    /// Get a mutable unit by id.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.index_of(id).map(move |i| &mut self.units[i])
    }

    /// First live unit standing exactly on `position`.
    #[must_use]
    pub fn unit_at(&self, position: Position) -> Option<&Unit> {
        self.units
            .iter()
            .find(|u| u.is_alive() && u.position == position)
    }

    /// All units in slot order.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// All units in slot order, mutably.
    pub fn units_mut(&mut self) -> &mut [Unit] {
        &mut self.units
    }

    /// Iterate over all units in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Units owned by `owner`, dead ones included.
    pub fn owned_by(&self, owner: Owner) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(move |u| u.owner == owner)
    }

    /// Number of units ever spawned by `owner`.
    #[must_use]
    pub fn count(&self, owner: Owner) -> usize {
        self.owned_by(owner).count()
    }

    /// Number of live units owned by `owner`.
    #[must_use]
    pub fn alive_count(&self, owner: Owner) -> usize {
        self.owned_by(owner).filter(|u| u.is_alive()).count()
    }

    /// Number of units in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether no unit was ever spawned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl FromIterator<Unit> for Roster {
    /// Build a roster from prepared units. Ids are reassigned by slot.
    fn from_iter<I: IntoIterator<Item = Unit>>(iter: I) -> Self {
        let units = iter
            .into_iter()
            .enumerate()
            .map(|(i, mut u)| {
                u.id = i as UnitId + 1;
                u
            })
            .collect();
        Self { units }
    }
}
