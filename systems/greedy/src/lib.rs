#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! One-ply greedy policy that rates every legal action with a fixed heuristic.

use rand::Rng;
use tactics_arena_core::{Action, Decision, Faction, TileKind, UnitId};
use tactics_arena_world::{Board, Unit};
use tracing::{debug, trace};

/// Exclusive upper bound of the uniform noise added to every rating.
pub const NOISE_CEILING: f64 = 30.0;

const ATTACK_WEIGHT: f64 = 3.0;
const LETHAL_BONUS: f64 = 500.0;
const WOUNDED_WEIGHT: f64 = 100.0;
const APPROACH_WEIGHT: f64 = 20.0;
const COVER_WEIGHT: f64 = 2.0;
const POWERUP_BONUS: f64 = 100.0;

/// Greedy decision system drawing tie-breaking noise from `R`.
#[derive(Debug)]
pub struct Greedy<R> {
    faction: Faction,
    rng: R,
}

impl<R: Rng> Greedy<R> {
    /// Creates a greedy policy for the faction using the provided random source.
    #[must_use]
    pub fn new(faction: Faction, rng: R) -> Self {
        Self { faction, rng }
    }

    /// Faction the policy acts for.
    #[must_use]
    pub fn faction(&self) -> Faction {
        self.faction
    }

    /// Picks the action with the strictly highest noisy rating.
    ///
    /// Noise is drawn once per candidate in unit-then-action enumeration
    /// order, so a seeded random source reproduces the same choice.
    pub fn choose(&mut self, board: &Board) -> Option<Decision> {
        let mut best_value = f64::NEG_INFINITY;
        let mut best = None;

        for unit in board.living_units(self.faction) {
            for action in board.legal_actions(unit.id()) {
                let value = rate(board, unit, action) + self.rng.gen_range(0.0..NOISE_CEILING);
                trace!(unit = unit.id().get(), ?action, value, "candidate rated");
                if value > best_value {
                    best_value = value;
                    best = Some(Decision::new(unit.id(), action));
                }
            }
        }

        debug!(faction = %self.faction, ?best, value = best_value, "greedy choice");
        best
    }
}

/// Noise-free rating of an action for the unit.
///
/// Returns `None` when the unit is not on the board.
#[must_use]
pub fn action_value(board: &Board, unit: UnitId, action: Action) -> Option<f64> {
    board.unit(unit).map(|unit| rate(board, unit, action))
}

fn rate(board: &Board, unit: &Unit, action: Action) -> f64 {
    match action {
        Action::Attack { target } => board
            .unit(target)
            .map_or(0.0, |target| attack_value(unit, target)),
        Action::Move { to } => {
            let mut value = 0.0;
            if let (Some(before), Some(after)) = (
                board.nearest_enemy_distance(unit.faction(), unit.position()),
                board.nearest_enemy_distance(unit.faction(), to),
            ) {
                value += (f64::from(before) - f64::from(after)) * APPROACH_WEIGHT;
                value += f64::from(board.terrain().cover_at(to)) * COVER_WEIGHT;
            }
            if board.terrain().kind(to) == Some(TileKind::Powerup) {
                value += POWERUP_BONUS;
            }
            value
        }
    }
}

/// Lethality compares current health with raw attack power, ignoring cover.
fn attack_value(attacker: &Unit, target: &Unit) -> f64 {
    let power = f64::from(attacker.stats().attack_power);
    let health = f64::from(target.health());
    let max_health = f64::from(target.stats().max_health);

    let mut value = (max_health - health) + power * ATTACK_WEIGHT;
    if target.health() <= attacker.stats().attack_power {
        value += LETHAL_BONUS;
    }
    value + (1.0 - health / max_health) * WOUNDED_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tactics_arena_core::{Archetype, GridPos};
    use tactics_arena_world::Terrain;

    fn greedy(faction: Faction) -> Greedy<ChaCha8Rng> {
        Greedy::new(faction, ChaCha8Rng::seed_from_u64(5))
    }

    #[test]
    fn attack_value_rewards_wounded_and_lethal_targets() {
        let mut board = Board::empty(Terrain::open());
        let blue = board.deploy(Faction::Blue, Archetype::Soldier, GridPos::new(0, 0));
        let red = board.deploy(Faction::Red, Archetype::Soldier, GridPos::new(1, 0));
        let attack = Action::Attack { target: red };

        // Untouched target: 0 + 75 + 0.
        assert_eq!(action_value(&board, blue, attack), Some(75.0));

        // 75 missing + 75 + 500 lethal + 75 wounded.
        board.set_health(red, 25);
        assert_eq!(action_value(&board, blue, attack), Some(725.0));
    }

    #[test]
    fn move_value_tracks_approach_cover_and_powerups() {
        let terrain = Terrain::open()
            .with_tile(GridPos::new(2, 1), TileKind::Crate)
            .with_tile(GridPos::new(0, 1), TileKind::Powerup);
        let mut board = Board::empty(terrain);
        let blue = board.deploy(Faction::Blue, Archetype::Soldier, GridPos::new(1, 0));
        let _ = board.deploy(Faction::Red, Archetype::Soldier, GridPos::new(6, 0));

        // One step closer and 20 cover from the crate: 20 + 40.
        let closer = Action::Move {
            to: GridPos::new(2, 0),
        };
        assert_eq!(action_value(&board, blue, closer), Some(60.0));

        // One step away onto a power-up: -20 + 100.
        let powerup = Action::Move {
            to: GridPos::new(0, 1),
        };
        assert_eq!(action_value(&board, blue, powerup), Some(80.0));
    }

    #[test]
    fn moves_score_only_powerups_without_living_enemies() {
        let terrain = Terrain::open().with_tile(GridPos::new(1, 1), TileKind::Powerup);
        let mut board = Board::empty(terrain);
        let blue = board.deploy(Faction::Blue, Archetype::Scout, GridPos::new(0, 0));
        let red = board.deploy(Faction::Red, Archetype::Soldier, GridPos::new(5, 5));
        board.set_health(red, 0);

        let plain = Action::Move {
            to: GridPos::new(2, 2),
        };
        assert_eq!(action_value(&board, blue, plain), Some(0.0));
        assert_eq!(
            greedy(Faction::Blue).choose(&board),
            Some(Decision::new(
                blue,
                Action::Move {
                    to: GridPos::new(1, 1)
                }
            ))
        );
    }

    #[test]
    fn lethal_attack_beats_every_move() {
        let mut board = Board::empty(Terrain::open());
        let blue = board.deploy(Faction::Blue, Archetype::Soldier, GridPos::new(3, 3));
        let red = board.deploy(Faction::Red, Archetype::Sniper, GridPos::new(4, 4));
        board.set_health(red, 10);
        assert_eq!(
            greedy(Faction::Blue).choose(&board),
            Some(Decision::new(blue, Action::Attack { target: red }))
        );
    }

    #[test]
    fn boxed_in_faction_has_no_decision() {
        let terrain = Terrain::open()
            .with_tile(GridPos::new(6, 7), TileKind::Window)
            .with_tile(GridPos::new(7, 6), TileKind::Window)
            .with_tile(GridPos::new(6, 6), TileKind::Tree);
        let mut board = Board::empty(terrain);
        let _ = board.deploy(Faction::Blue, Archetype::Heavy, GridPos::new(7, 7));
        let _ = board.deploy(Faction::Red, Archetype::Soldier, GridPos::new(0, 0));
        assert_eq!(greedy(Faction::Blue).choose(&board), None);
    }

    #[test]
    fn seeded_choices_repeat() {
        let board = Board::standard();
        let first = greedy(Faction::Blue).choose(&board);
        let second = greedy(Faction::Blue).choose(&board);
        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
