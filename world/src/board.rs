//! Terrain and both rosters combined into the state decision systems reason about.

use tactics_arena_core::{Faction, GridPos, RosterView, UnitId};

use crate::{
    roster::{Roster, Unit},
    terrain::Terrain,
};

#[cfg(any(test, feature = "scenario_scaffolding"))]
use tactics_arena_core::{Archetype, UnitStats};

/// Arena terrain together with the Red and Blue rosters.
///
/// The world owns the authoritative board. Decision systems receive a shared
/// reference and may clone it into a scratch copy for reversible exploration.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    terrain: Terrain,
    red: Roster,
    blue: Roster,
}

impl Board {
    /// Builds the standard arena with both squads deployed.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            terrain: Terrain::standard(),
            red: Roster::standard(Faction::Red),
            blue: Roster::standard(Faction::Blue),
        }
    }

    /// Arena terrain.
    #[must_use]
    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Roster of the provided faction.
    #[must_use]
    pub fn roster(&self, faction: Faction) -> &Roster {
        match faction {
            Faction::Red => &self.red,
            Faction::Blue => &self.blue,
        }
    }

    /// Iterator over every unit, Red roster first.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.red.iter().chain(self.blue.iter())
    }

    /// Iterator over the living units of a faction in roster order.
    pub fn living_units(&self, faction: Faction) -> impl Iterator<Item = &Unit> {
        self.roster(faction).living()
    }

    /// Number of living units fielded by a faction.
    #[must_use]
    pub fn living_count(&self, faction: Faction) -> usize {
        self.living_units(faction).count()
    }

    /// Reports whether either faction has no living units left.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        Faction::ALL
            .iter()
            .any(|&faction| self.living_count(faction) == 0)
    }

    /// Finds a unit by identifier in either roster.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.red.get(id).or_else(|| self.blue.get(id))
    }

    /// Reports whether any living unit of either faction stands on the tile.
    #[must_use]
    pub fn is_occupied(&self, position: GridPos) -> bool {
        self.units()
            .any(|unit| unit.is_alive() && unit.position() == position)
    }

    /// Cover protecting the unit from its orthogonal neighbours.
    #[must_use]
    pub fn cover_bonus(&self, unit: &Unit) -> u32 {
        self.terrain.cover_at(unit.position())
    }

    /// Chebyshev distance from `from` to the closest living unit opposing `faction`.
    #[must_use]
    pub fn nearest_enemy_distance(&self, faction: Faction, from: GridPos) -> Option<u32> {
        self.living_units(faction.opponent())
            .map(|enemy| from.chebyshev_distance(enemy.position()))
            .min()
    }

    /// Captures a read-only view of every unit on the board.
    #[must_use]
    pub fn roster_view(&self) -> RosterView {
        RosterView::from_snapshots(self.units().map(Unit::snapshot).collect())
    }

    pub(crate) fn terrain_mut(&mut self) -> &mut Terrain {
        &mut self.terrain
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        if let Some(unit) = self.red.get_mut(id) {
            return Some(unit);
        }
        self.blue.get_mut(id)
    }

    pub(crate) fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        self.red.remove(id).or_else(|| self.blue.remove(id))
    }
}

/// Scenario construction helpers for tests and tooling.
#[cfg(any(test, feature = "scenario_scaffolding"))]
impl Board {
    /// Creates a board with the provided terrain and empty rosters.
    #[must_use]
    pub fn empty(terrain: Terrain) -> Self {
        Self {
            terrain,
            red: Roster::empty(Faction::Red),
            blue: Roster::empty(Faction::Blue),
        }
    }

    /// Deploys a unit with its archetype's base statistics.
    pub fn deploy(&mut self, faction: Faction, archetype: Archetype, position: GridPos) -> UnitId {
        self.deploy_with_stats(faction, archetype, archetype.stats(), position)
    }

    /// Deploys a unit with custom statistics.
    pub fn deploy_with_stats(
        &mut self,
        faction: Faction,
        archetype: Archetype,
        stats: UnitStats,
        position: GridPos,
    ) -> UnitId {
        debug_assert!(!self.is_occupied(position), "tile {position} already occupied");
        let next = self
            .units()
            .map(|unit| unit.id().get() + 1)
            .max()
            .unwrap_or(0);
        let id = UnitId::new(next);
        let unit = Unit::new(id, faction, archetype, stats, position);
        match faction {
            Faction::Red => self.red.push(unit),
            Faction::Blue => self.blue.push(unit),
        }
        id
    }

    /// Overrides the current health of a unit.
    pub fn set_health(&mut self, id: UnitId, health: i32) {
        if let Some(unit) = self.unit_mut(id) {
            unit.set_health(health);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_arena_core::TileKind;

    #[test]
    fn occupancy_ignores_dead_units() {
        let mut board = Board::empty(Terrain::open());
        let red = board.deploy(Faction::Red, Archetype::Soldier, GridPos::new(2, 2));
        assert!(board.is_occupied(GridPos::new(2, 2)));

        board.set_health(red, 0);
        assert!(!board.is_occupied(GridPos::new(2, 2)));
        assert!(board.is_game_over());
    }

    #[test]
    fn nearest_enemy_distance_uses_living_opponents() {
        let mut board = Board::empty(Terrain::open());
        let _ = board.deploy(Faction::Red, Archetype::Soldier, GridPos::new(0, 0));
        let near = board.deploy(Faction::Blue, Archetype::Heavy, GridPos::new(2, 1));
        let _ = board.deploy(Faction::Blue, Archetype::Scout, GridPos::new(5, 5));

        let origin = GridPos::new(0, 0);
        assert_eq!(board.nearest_enemy_distance(Faction::Red, origin), Some(2));

        board.set_health(near, -3);
        assert_eq!(board.nearest_enemy_distance(Faction::Red, origin), Some(5));
        assert_eq!(board.nearest_enemy_distance(Faction::Blue, origin), Some(0));
    }

    #[test]
    fn cover_bonus_reads_adjacent_terrain() {
        let terrain = Terrain::open().with_tile(GridPos::new(3, 2), TileKind::Crate);
        let mut board = Board::empty(terrain);
        let unit = board.deploy(Faction::Blue, Archetype::Sniper, GridPos::new(3, 3));
        let unit = board.unit(unit).expect("deployed");
        assert_eq!(board.cover_bonus(unit), 20);
    }

    #[test]
    fn standard_board_is_not_over() {
        let board = Board::standard();
        assert_eq!(board.living_count(Faction::Red), 4);
        assert_eq!(board.living_count(Faction::Blue), 4);
        assert!(!board.is_game_over());
        assert_eq!(board.roster_view().iter().count(), 8);
    }

    #[test]
    fn scaffolding_assigns_sequential_identifiers() {
        let mut board = Board::empty(Terrain::open());
        let first = board.deploy(Faction::Red, Archetype::Soldier, GridPos::new(0, 0));
        let second = board.deploy(Faction::Blue, Archetype::Soldier, GridPos::new(1, 0));
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }
}
