#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Tactics Arena.

mod actions;
mod board;
mod combat;
mod roster;
mod terrain;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tactics_arena_core::{
    points, Action, ActionError, Command, Event, Faction, MatchOutcome, MatchPhase, ScoreReason,
    UnitId, SQUAD_SIZE, WELCOME_BANNER,
};
use tracing::{debug, info, trace};

pub use actions::Undo;
pub use board::Board;
pub use roster::{Roster, Unit};
pub use terrain::Terrain;

use combat::Ledger;

/// Seed used for critical-hit rolls when none is supplied.
pub const DEFAULT_SEED: u64 = 0x7ac7_1c5a_2e4a_0001;

/// Represents the authoritative Tactics Arena world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    board: Board,
    ledger: Ledger,
    phase: MatchPhase,
    active: Faction,
    round: u32,
    outcome: Option<MatchOutcome>,
    seed: u64,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a new world with the standard arena and the default seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Creates a new world with the standard arena whose critical-hit rolls
    /// derive from the provided seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::assemble(Board::standard(), seed)
    }

    /// Creates a world around a custom board.
    #[cfg(any(test, feature = "scenario_scaffolding"))]
    #[must_use]
    pub fn from_board(board: Board, seed: u64) -> Self {
        Self::assemble(board, seed)
    }

    fn assemble(board: Board, seed: u64) -> Self {
        Self {
            banner: WELCOME_BANNER,
            board,
            ledger: Ledger::default(),
            phase: MatchPhase::Idle,
            active: Faction::Red,
            round: 1,
            outcome: None,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn transition(&mut self, from: MatchPhase, to: MatchPhase, out_events: &mut Vec<Event>) {
        if self.phase != from {
            trace!(current = ?self.phase, requested = ?to, "phase transition ignored");
            return;
        }
        self.phase = to;
        debug!(phase = ?to, "phase changed");
        out_events.push(Event::PhaseChanged { phase: to });
    }

    fn validate(&self, unit: UnitId, action: Action) -> Result<(), ActionError> {
        if self.phase != MatchPhase::Running {
            return Err(ActionError::MatchNotRunning);
        }
        let actor = self
            .board
            .unit(unit)
            .filter(|actor| actor.is_alive())
            .ok_or(ActionError::UnknownUnit)?;
        if actor.faction() != self.active {
            return Err(ActionError::OutOfTurn(actor.faction()));
        }
        if !self.board.legal_actions(unit).contains(&action) {
            return Err(ActionError::IllegalAction);
        }
        Ok(())
    }

    fn conclude(&mut self, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() || !self.board.is_game_over() {
            return;
        }
        if !matches!(self.phase, MatchPhase::Running | MatchPhase::Paused) {
            return;
        }

        let red = self.board.living_count(Faction::Red);
        let blue = self.board.living_count(Faction::Blue);
        let winner = match (red, blue) {
            (0, 0) => None,
            (_, 0) => Some(Faction::Red),
            _ => Some(Faction::Blue),
        };
        let alive_count = winner.map_or(0, |faction| self.board.living_count(faction));

        if let Some(faction) = winner {
            self.ledger
                .award(faction, points::VICTORY, ScoreReason::Victory, out_events);
            if alive_count == SQUAD_SIZE {
                self.ledger
                    .award(faction, points::FLAWLESS, ScoreReason::Flawless, out_events);
            }
            if alive_count >= points::DOMINATION_SURVIVORS {
                self.ledger.award(
                    faction,
                    points::DOMINATION,
                    ScoreReason::Domination,
                    out_events,
                );
            }
        }

        let outcome = MatchOutcome {
            winner,
            alive_count,
        };
        self.outcome = Some(outcome);
        self.phase = MatchPhase::GameOver;
        info!(?winner, alive_count, round = self.round, "match concluded");
        out_events.push(Event::PhaseChanged {
            phase: MatchPhase::GameOver,
        });
        out_events.push(Event::GameOver {
            winner,
            alive_count,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartMatch => {
            world.transition(MatchPhase::Idle, MatchPhase::Running, out_events);
        }
        Command::PauseMatch => {
            world.transition(MatchPhase::Running, MatchPhase::Paused, out_events);
        }
        Command::ResumeMatch => {
            world.transition(MatchPhase::Paused, MatchPhase::Running, out_events);
        }
        Command::ResetMatch { seed } => {
            *world = World::with_seed(seed);
            debug!(seed, "match reset");
            out_events.push(Event::PhaseChanged {
                phase: MatchPhase::Idle,
            });
        }
        Command::ExecuteAction { unit, action } => match world.validate(unit, action) {
            Ok(()) => combat::resolve(
                &mut world.board,
                &mut world.ledger,
                &mut world.rng,
                unit,
                action,
                out_events,
            ),
            Err(reason) => {
                debug!(unit = unit.get(), ?action, %reason, "action rejected");
                out_events.push(Event::ActionRejected {
                    unit,
                    action,
                    reason,
                });
            }
        },
        Command::SkipTurn => {
            if world.phase == MatchPhase::Running {
                debug!(faction = %world.active, "turn skipped");
                out_events.push(Event::TurnSkipped {
                    faction: world.active,
                });
            }
        }
        Command::EndTurn => {
            if world.phase != MatchPhase::Running {
                return;
            }
            if world.active == Faction::Blue {
                world.round = world.round.saturating_add(1);
                out_events.push(Event::RoundAdvanced { round: world.round });
            }
            world.active = world.active.opponent();
        }
        Command::ConcludeMatch => world.conclude(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Board, World};
    use tactics_arena_core::{
        Action, Faction, MatchOutcome, MatchPhase, MatchStats, RosterView, Scoreboard,
        TerrainView, UnitId,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the board for decision systems.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Captures the kind of every tile in the arena.
    #[must_use]
    pub fn terrain_view(world: &World) -> TerrainView {
        world.board.terrain().view()
    }

    /// Captures every unit still present in either roster.
    #[must_use]
    pub fn roster_view(world: &World) -> RosterView {
        world.board.roster_view()
    }

    /// Points accumulated by both factions.
    #[must_use]
    pub fn scoreboard(world: &World) -> Scoreboard {
        world.ledger.scores
    }

    /// Damage, elimination, critical and power-up tallies.
    #[must_use]
    pub fn stats(world: &World) -> MatchStats {
        world.ledger.stats
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(world: &World) -> MatchPhase {
        world.phase
    }

    /// Faction whose turn is in progress.
    #[must_use]
    pub fn active_faction(world: &World) -> Faction {
        world.active
    }

    /// Round in progress, starting at one.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Reports whether an elimination has already claimed first blood.
    #[must_use]
    pub fn first_blood_claimed(world: &World) -> bool {
        world.ledger.first_blood
    }

    /// Result of the match once it has been concluded.
    #[must_use]
    pub fn outcome(world: &World) -> Option<MatchOutcome> {
        world.outcome
    }

    /// Reports whether either faction has run out of living units.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.board.is_game_over()
    }

    /// Seed driving the critical-hit rolls of the current match.
    #[must_use]
    pub fn seed(world: &World) -> u64 {
        world.seed
    }

    /// Legal actions available to the unit on the current board.
    #[must_use]
    pub fn legal_actions(world: &World, unit: UnitId) -> Vec<Action> {
        world.board.legal_actions(unit)
    }
}
