#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Depth-limited minimax search with alpha-beta pruning.
//!
//! The engine plays one faction (the maximizer) against its opponent. Every
//! candidate is explored on a scratch copy of the board using the world's
//! reversible transient mutation, so scores, tallies and tiles are never
//! touched by the search.

use tactics_arena_core::{Decision, Faction, UnitId};
use tactics_arena_world::{Board, Unit};
use tracing::{debug, trace};

/// Plies searched below each root action.
pub const SEARCH_DEPTH: u32 = 2;

const HEALTH_WEIGHT: f64 = 2.0;
const ATTACK_WEIGHT: f64 = 1.5;
const PRESENCE_BONUS: f64 = 80.0;
const COVER_WEIGHT: f64 = 2.0;
const IN_RANGE_BONUS: f64 = 40.0;

/// Adversarial search engine choosing actions for a single faction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Minimax {
    faction: Faction,
    depth: u32,
}

impl Minimax {
    /// Creates an engine maximizing the evaluation for `faction` at [`SEARCH_DEPTH`].
    #[must_use]
    pub const fn new(faction: Faction) -> Self {
        Self::with_depth(faction, SEARCH_DEPTH)
    }

    /// Creates an engine searching the provided number of plies below the root.
    #[must_use]
    pub const fn with_depth(faction: Faction, depth: u32) -> Self {
        Self { faction, depth }
    }

    /// Faction whose evaluation the engine maximizes.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Plies searched below each root action.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Picks the action with the strictly highest search score.
    ///
    /// Ties keep the earliest candidate in unit-then-action enumeration order.
    /// Returns `None` when the faction has no legal action or every candidate
    /// scores negative infinity.
    #[must_use]
    pub fn choose(&self, board: &Board) -> Option<Decision> {
        let mut scratch = board.clone();
        let mut best_score = f64::NEG_INFINITY;
        let mut best = None;

        for unit in actors(&scratch, self.faction) {
            for action in scratch.legal_actions(unit) {
                let Some(undo) = scratch.apply_transient(unit, action) else {
                    continue;
                };
                let score = self.search(
                    &mut scratch,
                    self.depth,
                    false,
                    f64::NEG_INFINITY,
                    f64::INFINITY,
                );
                scratch.undo(undo);
                trace!(unit = unit.get(), ?action, score, "root candidate scored");

                if score > best_score {
                    best_score = score;
                    best = Some(Decision::new(unit, action));
                }
            }
        }

        debug!(faction = %self.faction, ?best, score = best_score, "search complete");
        best
    }

    /// Scores the board by exploring `depth` further plies with alpha-beta pruning.
    ///
    /// `maximizing` selects which side moves next. The board is restored
    /// before returning. A side that still has units but no legal action
    /// scores negative infinity when maximizing and positive infinity when
    /// minimizing.
    pub fn search(
        &self,
        board: &mut Board,
        depth: u32,
        maximizing: bool,
        mut alpha: f64,
        mut beta: f64,
    ) -> f64 {
        if depth == 0 || board.is_game_over() {
            return self.evaluate(board);
        }

        let side = if maximizing {
            self.faction
        } else {
            self.faction.opponent()
        };
        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        'units: for unit in actors(board, side) {
            for action in board.legal_actions(unit) {
                let Some(undo) = board.apply_transient(unit, action) else {
                    continue;
                };
                let score = self.search(board, depth - 1, !maximizing, alpha, beta);
                board.undo(undo);

                if maximizing {
                    best = best.max(score);
                    alpha = alpha.max(score);
                } else {
                    best = best.min(score);
                    beta = beta.min(score);
                }
                if beta <= alpha {
                    break 'units;
                }
            }
        }
        best
    }

    /// Static evaluation from the maximizer's point of view.
    ///
    /// Only living units contribute. Maximizer units within range of their
    /// nearest living enemy earn an extra bonus.
    #[must_use]
    pub fn evaluate(&self, board: &Board) -> f64 {
        let own: f64 = board
            .living_units(self.faction)
            .map(|unit| {
                let engaged = board
                    .nearest_enemy_distance(self.faction, unit.position())
                    .is_some_and(|distance| distance <= unit.stats().range);
                unit_value(board, unit) + if engaged { IN_RANGE_BONUS } else { 0.0 }
            })
            .sum();
        let theirs: f64 = board
            .living_units(self.faction.opponent())
            .map(|unit| unit_value(board, unit))
            .sum();
        own - theirs
    }
}

fn unit_value(board: &Board, unit: &Unit) -> f64 {
    f64::from(unit.health()) * HEALTH_WEIGHT
        + f64::from(unit.stats().attack_power) * ATTACK_WEIGHT
        + PRESENCE_BONUS
        + f64::from(board.cover_bonus(unit)) * COVER_WEIGHT
}

fn actors(board: &Board, faction: Faction) -> Vec<UnitId> {
    board.living_units(faction).map(Unit::id).collect()
}
