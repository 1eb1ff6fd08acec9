//! Static arena layout and terrain-only spatial queries.

use tactics_arena_core::{GridPos, TerrainView, TileKind, GRID_SIZE, GRID_TILES};

const WALLS: [(i32, i32); 12] = [
    (3, 0),
    (4, 0),
    (3, 7),
    (4, 7),
    (0, 3),
    (0, 4),
    (7, 3),
    (7, 4),
    // Center structure.
    (3, 3),
    (4, 3),
    (3, 4),
    (4, 4),
];
const DOORS: [(i32, i32); 4] = [(3, 2), (4, 5), (2, 3), (5, 4)];
const WINDOWS: [(i32, i32); 8] = [
    (2, 0),
    (5, 0),
    (2, 7),
    (5, 7),
    (0, 2),
    (0, 5),
    (7, 2),
    (7, 5),
];
const TREES: [(i32, i32); 4] = [(1, 1), (6, 1), (1, 6), (6, 6)];
const CRATES: [(i32, i32); 4] = [(2, 2), (5, 2), (2, 5), (5, 5)];
const POWERUPS: [(i32, i32); 4] = [(3, 1), (4, 6), (1, 4), (6, 3)];

const ORTHOGONAL_NEIGHBOURS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Square grid holding exactly one tile kind per coordinate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terrain {
    tiles: [TileKind; GRID_TILES],
}

impl Terrain {
    /// Builds the hand-authored arena layout.
    #[must_use]
    pub fn standard() -> Self {
        let mut terrain = Self::open();
        let features: [(&[(i32, i32)], TileKind); 6] = [
            (&WALLS, TileKind::Wall),
            (&DOORS, TileKind::Door),
            (&WINDOWS, TileKind::Window),
            (&TREES, TileKind::Tree),
            (&CRATES, TileKind::Crate),
            (&POWERUPS, TileKind::Powerup),
        ];
        for (cells, kind) in features {
            for &(x, z) in cells {
                terrain.set_kind(GridPos::new(x, z), kind);
            }
        }
        terrain
    }

    /// Builds an arena with no obstacles.
    #[must_use]
    pub fn open() -> Self {
        Self {
            tiles: [TileKind::Empty; GRID_TILES],
        }
    }

    /// Replaces the tile at the provided position, returning the updated terrain.
    #[cfg(any(test, feature = "scenario_scaffolding"))]
    #[must_use]
    pub fn with_tile(mut self, position: GridPos, kind: TileKind) -> Self {
        self.set_kind(position, kind);
        self
    }

    /// Kind of the tile at the provided position, if it lies in the arena.
    #[must_use]
    pub fn kind(&self, position: GridPos) -> Option<TileKind> {
        index(position).map(|index| self.tiles[index])
    }

    /// Reports whether the position lies within the arena bounds.
    #[must_use]
    pub fn is_valid_position(&self, position: GridPos) -> bool {
        position.in_bounds()
    }

    /// Reports whether a unit may stand on the tile. Out-of-bounds tiles are impassable.
    #[must_use]
    pub fn is_passable(&self, position: GridPos) -> bool {
        self.kind(position)
            .is_some_and(|kind| kind.properties().passable)
    }

    /// Reports whether an attack may travel through the tile.
    #[must_use]
    pub fn can_see_through(&self, position: GridPos) -> bool {
        self.kind(position).is_some_and(|kind| {
            let properties = kind.properties();
            properties.passable || properties.shoot_through
        })
    }

    /// Walks from just past `from` towards `to` and reports whether any
    /// intermediate tile blocks sight.
    ///
    /// Each step advances every axis that has not yet reached the target, so
    /// unequal offsets trace a diagonal run followed by a straight run rather
    /// than a true line. The destination tile never blocks.
    #[must_use]
    pub fn has_line_of_sight(&self, from: GridPos, to: GridPos) -> bool {
        let dx = (to.x() - from.x()).signum();
        let dz = (to.z() - from.z()).signum();
        let mut x = from.x() + dx;
        let mut z = from.z() + dz;

        while x != to.x() || z != to.z() {
            if !self.can_see_through(GridPos::new(x, z)) {
                return false;
            }
            if x != to.x() {
                x += dx;
            }
            if z != to.z() {
                z += dz;
            }
        }
        true
    }

    /// Highest cover value among the four orthogonal neighbours of a tile.
    #[must_use]
    pub fn cover_at(&self, position: GridPos) -> u32 {
        ORTHOGONAL_NEIGHBOURS
            .iter()
            .filter_map(|&(dx, dz)| self.kind(position.offset(dx, dz)))
            .map(|kind| kind.properties().cover)
            .max()
            .unwrap_or(0)
    }

    /// Captures a read-only view of every tile kind.
    #[must_use]
    pub fn view(&self) -> TerrainView {
        TerrainView::from_tiles(self.tiles)
    }

    pub(crate) fn set_kind(&mut self, position: GridPos, kind: TileKind) {
        if let Some(index) = index(position) {
            self.tiles[index] = kind;
        }
    }
}

fn index(position: GridPos) -> Option<usize> {
    if !position.in_bounds() {
        return None;
    }
    usize::try_from(position.z() * GRID_SIZE + position.x()).ok()
}
