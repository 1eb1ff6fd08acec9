#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tactics Arena engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure decision systems. Adapters and the turn
//! orchestrator submit [`Command`] values describing desired mutations, the
//! world executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values in the order the state changed. Decision
//! systems read immutable board state and respond with a [`Decision`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the Tactics Arena: Minimax (Red) vs Greedy (Blue).";

/// Number of tiles along each edge of the square arena.
pub const GRID_SIZE: i32 = 8;

/// Number of tiles in the arena.
pub const GRID_TILES: usize = (GRID_SIZE * GRID_SIZE) as usize;

/// Number of units each faction fields at the start of a standard match.
pub const SQUAD_SIZE: usize = 4;

/// Point values awarded by the combat resolver and match conclusion.
pub mod points {
    /// Points awarded per point of damage dealt.
    pub const DAMAGE_MULTIPLIER: u64 = 2;
    /// Flat bonus for eliminating an enemy unit.
    pub const ELIMINATION: u64 = 500;
    /// Flat bonus for landing a critical hit.
    pub const CRITICAL: u64 = 100;
    /// One-shot bonus for the first elimination of the match.
    pub const FIRST_BLOOD: u64 = 300;
    /// Bonus for stepping onto a power-up tile.
    pub const POWERUP: u64 = 50;
    /// Bonus for moving onto a door tile.
    pub const DOOR_USE: u64 = 20;
    /// Bonus for winning the match.
    pub const VICTORY: u64 = 1_000;
    /// Bonus for winning with the whole squad alive.
    pub const FLAWLESS: u64 = 500;
    /// Bonus for winning with at least [`DOMINATION_SURVIVORS`] units alive.
    pub const DOMINATION: u64 = 300;
    /// Surviving units required for the domination bonus.
    pub const DOMINATION_SURVIVORS: usize = 3;
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Moves an idle match into the running phase.
    StartMatch,
    /// Suspends a running match at the next turn boundary.
    PauseMatch,
    /// Resumes a paused match.
    ResumeMatch,
    /// Rebuilds the arena, rosters and score tallies and returns to idle.
    ResetMatch {
        /// Seed for the random source used by critical-hit rolls.
        seed: u64,
    },
    /// Executes a single unit action on behalf of the acting faction.
    ExecuteAction {
        /// Unit performing the action.
        unit: UnitId,
        /// Action to perform.
        action: Action,
    },
    /// Records that the acting faction had no action to perform this turn.
    SkipTurn,
    /// Hands control to the opposing faction, advancing the round after Blue.
    EndTurn,
    /// Resolves the winner and end-of-match bonuses once a roster is empty.
    ConcludeMatch,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Announces that the match entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: MatchPhase,
    },
    /// Confirms that a unit moved between two tiles.
    UnitMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Tile occupied before the move.
        from: GridPos,
        /// Tile occupied after the move.
        to: GridPos,
    },
    /// Reports a resolved attack.
    UnitAttacked {
        /// Unit that attacked.
        attacker: UnitId,
        /// Unit that received the damage.
        target: UnitId,
        /// Damage applied after cover and critical modifiers.
        damage: i32,
        /// Whether the attack rolled a critical hit.
        critical: bool,
        /// Cover value protecting the target when the attack landed.
        cover: u32,
    },
    /// Reports that a unit's health dropped to zero or below.
    UnitEliminated {
        /// Unit removed from its roster.
        unit: UnitId,
    },
    /// Reports that a unit collected a power-up.
    PowerupCollected {
        /// Unit that collected the power-up.
        unit: UnitId,
        /// Tile that held the power-up and is now empty.
        tile: GridPos,
    },
    /// Reports that a unit moved onto a door tile.
    DoorUsed {
        /// Unit that used the door.
        unit: UnitId,
        /// Door tile.
        tile: GridPos,
    },
    /// Reports points awarded to a faction.
    ScoreAwarded {
        /// Faction receiving the points.
        faction: Faction,
        /// Number of points awarded.
        amount: u64,
        /// Reason the points were awarded.
        reason: ScoreReason,
    },
    /// Announces that both factions completed their turns.
    RoundAdvanced {
        /// Round that is now in progress.
        round: u32,
    },
    /// Reports that the acting faction had no legal action this turn.
    TurnSkipped {
        /// Faction whose turn was skipped.
        faction: Faction,
    },
    /// Reports that an action request was rejected.
    ActionRejected {
        /// Unit named in the request.
        unit: UnitId,
        /// Requested action.
        action: Action,
        /// Specific reason the action failed.
        reason: ActionError,
    },
    /// Announces the end of the match.
    GameOver {
        /// Winning faction, or `None` when both rosters were wiped out.
        winner: Option<Faction>,
        /// Number of living units remaining in the winning roster.
        alive_count: usize,
    },
}

/// Lifecycle phase of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Arena prepared; no turns have been played.
    Idle,
    /// Turns are being played.
    Running,
    /// Turn loop suspended between turns.
    Paused,
    /// A terminal state was reached.
    GameOver,
}

/// One of the two competing sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    /// Search-driven side that acts first each round.
    Red,
    /// Greedy-driven side that closes each round.
    Blue,
}

impl Faction {
    /// Both factions in turn order.
    pub const ALL: [Faction; 2] = [Faction::Red, Faction::Blue];

    /// Returns the opposing faction.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => f.write_str("Red"),
            Self::Blue => f.write_str("Blue"),
        }
    }
}

/// Location of a tile expressed as `x` and `z` grid coordinates.
///
/// Coordinates are signed so that neighbour offsets may step outside the
/// arena; such positions simply fail bounds checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    x: i32,
    z: i32,
}

impl GridPos {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Column of the position.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the position.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Returns the position displaced by the provided offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// Reports whether the position lies inside the arena.
    #[must_use]
    pub const fn in_bounds(&self) -> bool {
        self.x >= 0 && self.x < GRID_SIZE && self.z >= 0 && self.z < GRID_SIZE
    }

    /// Computes the Chebyshev distance between two positions.
    #[must_use]
    pub fn chebyshev_distance(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.z)
    }
}

/// Kinds of terrain that may occupy a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Open floor.
    Empty,
    /// Solid wall that blocks movement and sight.
    Wall,
    /// Passable doorway.
    Door,
    /// Glass that blocks movement but not sight.
    Window,
    /// Tree trunk providing light cover.
    Tree,
    /// Crate providing medium cover.
    Crate,
    /// Collectible power-up that turns into floor once entered.
    Powerup,
}

impl TileKind {
    /// Static properties associated with the tile kind.
    #[must_use]
    pub const fn properties(self) -> TileProperties {
        match self {
            Self::Empty | Self::Powerup => TileProperties::floor(),
            Self::Wall => TileProperties::obstacle(100, false),
            Self::Door => TileProperties {
                move_cost: 2,
                ..TileProperties::floor()
            },
            Self::Window => TileProperties::obstacle(15, true),
            Self::Tree => TileProperties::obstacle(10, false),
            Self::Crate => TileProperties {
                destructible_health: Some(50),
                ..TileProperties::obstacle(20, false)
            },
        }
    }

    /// Human-readable tile name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Empty => "Floor",
            Self::Wall => "Wall",
            Self::Door => "Door",
            Self::Window => "Window",
            Self::Tree => "Tree",
            Self::Crate => "Crate",
            Self::Powerup => "Power-up",
        }
    }
}

/// Derived static properties of a tile kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileProperties {
    /// Whether units may stand on the tile.
    pub passable: bool,
    /// Cover granted to orthogonally adjacent units, from 0 to 100.
    pub cover: u32,
    /// Whether attacks may pass through an otherwise impassable tile.
    pub shoot_through: bool,
    /// Movement cost of entering the tile. Carried as data only.
    pub move_cost: u32,
    /// Structural health of destructible tiles.
    pub destructible_health: Option<u32>,
}

impl TileProperties {
    const fn floor() -> Self {
        Self {
            passable: true,
            cover: 0,
            shoot_through: false,
            move_cost: 1,
            destructible_health: None,
        }
    }

    const fn obstacle(cover: u32, shoot_through: bool) -> Self {
        Self {
            passable: false,
            cover,
            shoot_through,
            move_cost: 1,
            destructible_health: None,
        }
    }

    /// Whether the tile can be destroyed.
    #[must_use]
    pub const fn destructible(&self) -> bool {
        self.destructible_health.is_some()
    }
}

/// Fixed combat classes instantiated into concrete units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Balanced rifleman.
    Soldier,
    /// Fragile long-range marksman.
    Sniper,
    /// Durable short-range bruiser.
    Heavy,
    /// Fast skirmisher that moves two tiles.
    Scout,
}

impl Archetype {
    /// Archetypes in squad deployment order.
    pub const ALL: [Archetype; 4] = [Self::Soldier, Self::Sniper, Self::Heavy, Self::Scout];

    /// Base statistics of the archetype.
    #[must_use]
    pub const fn stats(self) -> UnitStats {
        match self {
            Self::Soldier => UnitStats::new(100, 25, 2, 0.15, 1),
            Self::Sniper => UnitStats::new(60, 45, 4, 0.30, 1),
            Self::Heavy => UnitStats::new(180, 20, 1, 0.05, 1),
            Self::Scout => UnitStats::new(70, 20, 2, 0.20, 2),
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Soldier => "Soldier",
            Self::Sniper => "Sniper",
            Self::Heavy => "Heavy",
            Self::Scout => "Scout",
        };
        f.write_str(name)
    }
}

/// Combat statistics carried by a unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Health a unit spawns with.
    pub max_health: i32,
    /// Raw damage dealt by an attack.
    pub attack_power: i32,
    /// Maximum Chebyshev distance of an attack.
    pub range: u32,
    /// Probability in `[0, 1]` that an attack is critical.
    pub crit_chance: f64,
    /// Half-width of the square movement envelope.
    pub move_speed: i32,
}

impl UnitStats {
    /// Creates a new statistics block.
    #[must_use]
    pub const fn new(
        max_health: i32,
        attack_power: i32,
        range: u32,
        crit_chance: f64,
        move_speed: i32,
    ) -> Self {
        Self {
            max_health,
            attack_power,
            range,
            crit_chance,
            move_speed,
        }
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Action a single unit may take during its faction's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Relocates the acting unit to the destination tile.
    Move {
        /// Destination tile.
        to: GridPos,
    },
    /// Attacks an enemy unit.
    Attack {
        /// Unit receiving the attack.
        target: UnitId,
    },
}

/// Unit and action selected by a decision system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decision {
    /// Unit chosen to act.
    pub unit: UnitId,
    /// Action the unit performs.
    pub action: Action,
}

impl Decision {
    /// Creates a new decision.
    #[must_use]
    pub const fn new(unit: UnitId, action: Action) -> Self {
        Self { unit, action }
    }
}

/// Reasons points may be awarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreReason {
    /// Damage dealt by an attack.
    Damage,
    /// Critical hit landed.
    Critical,
    /// Enemy unit eliminated.
    Elimination,
    /// First elimination of the match.
    FirstBlood,
    /// Power-up collected.
    Powerup,
    /// Door used.
    DoorUse,
    /// Match won.
    Victory,
    /// Match won with the whole squad alive.
    Flawless,
    /// Match won with most of the squad alive.
    Domination,
}

impl fmt::Display for ScoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Damage => "Damage",
            Self::Critical => "CRITICAL HIT!",
            Self::Elimination => "ELIMINATION!",
            Self::FirstBlood => "FIRST BLOOD!",
            Self::Powerup => "Power-up!",
            Self::DoorUse => "Used door",
            Self::Victory => "VICTORY!",
            Self::Flawless => "FLAWLESS!",
            Self::Domination => "DOMINATION!",
        };
        f.write_str(label)
    }
}

/// Reasons an action request may be rejected by the world.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum ActionError {
    /// The match is not in the running phase.
    #[error("match is not running")]
    MatchNotRunning,
    /// No living unit carries the identifier.
    #[error("unit is not present in any roster")]
    UnknownUnit,
    /// The unit belongs to the faction that is not acting.
    #[error("unit belongs to {0}, which is not the acting faction")]
    OutOfTurn(Faction),
    /// The action is not among the unit's legal actions.
    #[error("action is not legal for the unit in its current position")]
    IllegalAction,
}

/// Final result of a concluded match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Winning faction, or `None` when both rosters were wiped out.
    pub winner: Option<Faction>,
    /// Number of living units remaining in the winning roster.
    pub alive_count: usize,
}

/// Points accumulated by both factions over a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    red: u64,
    blue: u64,
    total: u64,
}

impl Scoreboard {
    /// Adds points to a faction and to the global total.
    pub fn award(&mut self, faction: Faction, amount: u64) {
        match faction {
            Faction::Red => self.red = self.red.saturating_add(amount),
            Faction::Blue => self.blue = self.blue.saturating_add(amount),
        }
        self.total = self.total.saturating_add(amount);
    }

    /// Points accumulated by the faction.
    #[must_use]
    pub const fn score(&self, faction: Faction) -> u64 {
        match faction {
            Faction::Red => self.red,
            Faction::Blue => self.blue,
        }
    }

    /// Points accumulated by both factions.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }
}

/// Global tallies accumulated over a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    /// Total damage dealt by both factions.
    pub damage: u64,
    /// Units eliminated.
    pub kills: u32,
    /// Critical hits landed.
    pub crits: u32,
    /// Power-ups collected.
    pub powerups: u32,
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Faction the unit fights for.
    pub faction: Faction,
    /// Combat class of the unit.
    pub archetype: Archetype,
    /// Tile currently occupied by the unit.
    pub position: GridPos,
    /// Remaining health.
    pub health: i32,
    /// Health the unit spawned with.
    pub max_health: i32,
}

/// Read-only snapshot describing every unit in both rosters.
#[derive(Clone, Debug, Default)]
pub struct RosterView {
    snapshots: Vec<UnitSnapshot>,
}

impl RosterView {
    /// Creates a new roster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the units of a single faction.
    pub fn faction(&self, faction: Faction) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.faction == faction)
    }

    /// Finds the snapshot of the unit standing on the provided tile.
    #[must_use]
    pub fn at(&self, position: GridPos) -> Option<&UnitSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.position == position)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot of every tile kind in the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainView {
    kinds: Vec<TileKind>,
}

impl TerrainView {
    /// Creates a view from tiles laid out in row-major `z * GRID_SIZE + x` order.
    #[must_use]
    pub fn from_tiles(tiles: [TileKind; GRID_TILES]) -> Self {
        Self {
            kinds: tiles.to_vec(),
        }
    }

    /// Kind of the tile at the provided position, if it lies in the arena.
    #[must_use]
    pub fn kind(&self, position: GridPos) -> Option<TileKind> {
        if !position.in_bounds() {
            return None;
        }
        let index = usize::try_from(position.z() * GRID_SIZE + position.x()).ok()?;
        self.kinds.get(index).copied()
    }

    /// Iterator over every tile position with its kind, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, TileKind)> + '_ {
        self.kinds.iter().enumerate().map(|(index, kind)| {
            let index = index as i32;
            (GridPos::new(index % GRID_SIZE, index / GRID_SIZE), *kind)
        })
    }
}
