//! Legal-action generation and reversible action application.

use tactics_arena_core::{Action, GridPos, UnitId};

use crate::{board::Board, roster::Unit};

/// Fields overwritten by [`Board::apply_transient`], restored by [`Board::undo`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "an applied action must be undone to restore the board"]
pub enum Undo {
    /// A unit was relocated.
    Move {
        /// Unit that moved.
        unit: UnitId,
        /// Position held before the move.
        from: GridPos,
    },
    /// A unit lost health to an attack.
    Attack {
        /// Unit that was hit.
        target: UnitId,
        /// Health held before the hit.
        health: i32,
    },
}

impl Board {
    /// Enumerates every legal action for the unit, moves before attacks.
    ///
    /// Unknown or dead units have no actions.
    #[must_use]
    pub fn legal_actions(&self, id: UnitId) -> Vec<Action> {
        let Some(unit) = self.unit(id).filter(|unit| unit.is_alive()) else {
            return Vec::new();
        };
        let mut actions = self.legal_moves(unit);
        actions.extend(self.legal_attacks(unit));
        actions
    }

    /// Tiles inside the unit's square movement envelope that it may step onto.
    ///
    /// Obstacles between the unit and the destination are ignored.
    #[must_use]
    pub fn legal_moves(&self, unit: &Unit) -> Vec<Action> {
        let reach = unit.stats().move_speed;
        let origin = unit.position();
        let mut moves = Vec::new();
        for dx in -reach..=reach {
            for dz in -reach..=reach {
                if dx == 0 && dz == 0 {
                    continue;
                }
                let to = origin.offset(dx, dz);
                if self.terrain().is_passable(to) && !self.is_occupied(to) {
                    moves.push(Action::Move { to });
                }
            }
        }
        moves
    }

    /// Living enemies within range and line of sight, in roster order.
    #[must_use]
    pub fn legal_attacks(&self, unit: &Unit) -> Vec<Action> {
        let origin = unit.position();
        self.living_units(unit.faction().opponent())
            .filter(|enemy| origin.chebyshev_distance(enemy.position()) <= unit.stats().range)
            .filter(|enemy| self.terrain().has_line_of_sight(origin, enemy.position()))
            .map(|enemy| Action::Attack { target: enemy.id() })
            .collect()
    }

    /// Applies an action without any execution-time modifiers.
    ///
    /// Moves overwrite the acting unit's position; attacks subtract the raw
    /// attack power from the target. Scores, tallies and tiles are untouched.
    /// Returns `None` when the acting unit or the target is unknown.
    pub fn apply_transient(&mut self, unit: UnitId, action: Action) -> Option<Undo> {
        match action {
            Action::Move { to } => {
                let mover = self.unit_mut(unit)?;
                let from = mover.position();
                mover.set_position(to);
                Some(Undo::Move { unit, from })
            }
            Action::Attack { target } => {
                let power = self.unit(unit)?.stats().attack_power;
                let victim = self.unit_mut(target)?;
                let health = victim.health();
                victim.set_health(health - power);
                Some(Undo::Attack { target, health })
            }
        }
    }

    /// Restores the fields captured by a previous [`Board::apply_transient`].
    pub fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::Move { unit, from } => {
                if let Some(mover) = self.unit_mut(unit) {
                    mover.set_position(from);
                }
            }
            Undo::Attack { target, health } => {
                if let Some(victim) = self.unit_mut(target) {
                    victim.set_health(health);
                }
            }
        }
    }
}
