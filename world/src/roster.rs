//! Mutable combat units grouped into per-faction rosters.

use tactics_arena_core::{Archetype, Faction, GridPos, UnitId, UnitSnapshot, UnitStats};

const RED_DEPLOYMENT: [(Archetype, (i32, i32)); 4] = [
    (Archetype::Soldier, (0, 0)),
    (Archetype::Sniper, (0, 7)),
    (Archetype::Heavy, (1, 3)),
    (Archetype::Scout, (1, 5)),
];

const BLUE_DEPLOYMENT: [(Archetype, (i32, i32)); 4] = [
    (Archetype::Soldier, (7, 0)),
    (Archetype::Sniper, (7, 7)),
    (Archetype::Heavy, (6, 4)),
    (Archetype::Scout, (6, 2)),
];

/// Combat unit stored inside a roster.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    id: UnitId,
    faction: Faction,
    archetype: Archetype,
    stats: UnitStats,
    health: i32,
    position: GridPos,
}

impl Unit {
    pub(crate) fn new(
        id: UnitId,
        faction: Faction,
        archetype: Archetype,
        stats: UnitStats,
        position: GridPos,
    ) -> Self {
        Self {
            id,
            faction,
            archetype,
            stats,
            health: stats.max_health,
            position,
        }
    }

    /// Unique identifier of the unit.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Faction the unit fights for.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Combat class of the unit.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Combat statistics of the unit.
    #[must_use]
    pub const fn stats(&self) -> &UnitStats {
        &self.stats
    }

    /// Remaining health; zero or below means the unit is dead.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Tile currently occupied by the unit.
    #[must_use]
    pub const fn position(&self) -> GridPos {
        self.position
    }

    /// Reports whether the unit still has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Captures an immutable snapshot of the unit.
    #[must_use]
    pub fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            faction: self.faction,
            archetype: self.archetype,
            position: self.position,
            health: self.health,
            max_health: self.stats.max_health,
        }
    }

    pub(crate) fn set_position(&mut self, position: GridPos) {
        self.position = position;
    }

    pub(crate) fn set_health(&mut self, health: i32) {
        self.health = health;
    }
}

/// Ordered collection of the units fighting for one faction.
#[derive(Clone, Debug, PartialEq)]
pub struct Roster {
    faction: Faction,
    units: Vec<Unit>,
}

impl Roster {
    #[cfg(any(test, feature = "scenario_scaffolding"))]
    pub(crate) fn empty(faction: Faction) -> Self {
        Self {
            faction,
            units: Vec::new(),
        }
    }

    /// Builds the standard four-unit squad for the faction.
    ///
    /// Red receives identifiers `0..4` and Blue `4..8`, in deployment order.
    pub(crate) fn standard(faction: Faction) -> Self {
        let (deployment, first_id) = match faction {
            Faction::Red => (&RED_DEPLOYMENT, 0),
            Faction::Blue => (&BLUE_DEPLOYMENT, 4),
        };
        let units = deployment
            .iter()
            .zip(first_id..)
            .map(|(&(archetype, (x, z)), id)| {
                Unit::new(
                    UnitId::new(id),
                    faction,
                    archetype,
                    archetype.stats(),
                    GridPos::new(x, z),
                )
            })
            .collect();
        Self { faction, units }
    }

    /// Faction owning the roster.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Iterator over every unit in roster order, including units pending removal.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Iterator over the living units in roster order.
    pub fn living(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|unit| unit.is_alive())
    }

    /// Number of units in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Reports whether the roster holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Finds the unit carrying the identifier.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|unit| unit.id == id)
    }

    #[cfg(any(test, feature = "scenario_scaffolding"))]
    pub(crate) fn push(&mut self, unit: Unit) {
        debug_assert_eq!(unit.faction, self.faction);
        self.units.push(unit);
    }

    pub(crate) fn remove(&mut self, id: UnitId) -> Option<Unit> {
        let index = self.units.iter().position(|unit| unit.id == id)?;
        Some(self.units.remove(index))
    }
}
