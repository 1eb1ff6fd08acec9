#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn orchestration: alternates Red search decisions with Blue greedy
//! decisions, submitting each as a command to the authoritative world.

use std::{fmt, str::FromStr, thread, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tactics_arena_core::{Command, Decision, Event, Faction, MatchOutcome, MatchPhase};
use tactics_arena_system_greedy::Greedy;
use tactics_arena_system_minimax::Minimax;
use tactics_arena_world::{self as world, query, World};
use tracing::{debug, info};

/// Share of the turn delay spent before the acting faction decides, in percent.
const THINK_SHARE: u32 = 40;

/// Preset turn delays matching the speed toggle of the arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameSpeed {
    /// 1200 ms per turn.
    Slow,
    /// 700 ms per turn.
    #[default]
    Normal,
    /// 350 ms per turn.
    Fast,
    /// 150 ms per turn.
    Ultra,
}

impl GameSpeed {
    /// Every preset from slowest to fastest.
    pub const ALL: [GameSpeed; 4] = [Self::Slow, Self::Normal, Self::Fast, Self::Ultra];

    /// Total delay of a single turn at this speed.
    #[must_use]
    pub const fn turn_delay(self) -> Duration {
        let millis = match self {
            Self::Slow => 1_200,
            Self::Normal => 700,
            Self::Fast => 350,
            Self::Ultra => 150,
        };
        Duration::from_millis(millis)
    }

    /// Lowercase name of the preset.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Normal => "normal",
            Self::Fast => "fast",
            Self::Ultra => "ultra",
        }
    }
}

impl fmt::Display for GameSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error raised when a speed preset name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown game speed `{0}`, expected one of slow, normal, fast, ultra")]
pub struct UnknownSpeed(String);

impl FromStr for GameSpeed {
    type Err = UnknownSpeed;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|speed| speed.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownSpeed(value.to_owned()))
    }
}

/// Sleeps inserted around each turn so observers can follow the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacing {
    think: Duration,
    settle: Duration,
}

impl Pacing {
    /// Pacing that never sleeps.
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            think: Duration::ZERO,
            settle: Duration::ZERO,
        }
    }

    /// Splits a turn delay into 40 % before deciding and 60 % after executing.
    #[must_use]
    pub fn from_turn_delay(delay: Duration) -> Self {
        let think = delay * THINK_SHARE / 100;
        Self {
            think,
            settle: delay.saturating_sub(think),
        }
    }

    /// Delay observed before the acting faction decides.
    #[must_use]
    pub const fn think(&self) -> Duration {
        self.think
    }

    /// Delay observed after the action executes.
    #[must_use]
    pub const fn settle(&self) -> Duration {
        self.settle
    }
}

impl From<GameSpeed> for Pacing {
    fn from(speed: GameSpeed) -> Self {
        Self::from_turn_delay(speed.turn_delay())
    }
}

/// Result of asking the orchestrator to play a single turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurnReport {
    /// The faction decided and its action, or a skip, was submitted.
    Played {
        /// Faction that acted.
        faction: Faction,
        /// Decision taken, or `None` when the faction had no legal action.
        decision: Option<Decision>,
        /// Round in progress once the turn ended.
        round: u32,
    },
    /// A roster was empty at the start of the turn and the match concluded.
    Concluded(MatchOutcome),
    /// The match is not running, so no turn was played.
    Halted(MatchPhase),
}

/// Drives Red's search engine and Blue's greedy policy against the world.
#[derive(Debug)]
pub struct Orchestrator<R> {
    red: Minimax,
    blue: Greedy<R>,
    pacing: Pacing,
}

impl Orchestrator<ChaCha8Rng> {
    /// Creates an orchestrator whose greedy noise derives from `seed`.
    #[must_use]
    pub fn seeded(seed: u64, pacing: Pacing) -> Self {
        Self::new(Greedy::new(Faction::Blue, ChaCha8Rng::seed_from_u64(seed)), pacing)
    }
}

impl<R: Rng> Orchestrator<R> {
    /// Creates an orchestrator around the provided Blue policy.
    #[must_use]
    pub fn new(blue: Greedy<R>, pacing: Pacing) -> Self {
        Self {
            red: Minimax::new(Faction::Red),
            blue,
            pacing,
        }
    }

    /// Pacing applied around each turn.
    #[must_use]
    pub const fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Plays one faction's turn.
    ///
    /// Concludes the match instead of acting when either roster is empty.
    /// Does nothing unless the match is running, so a pause only takes effect
    /// between turns.
    pub fn play_turn(&mut self, world: &mut World, out_events: &mut Vec<Event>) -> TurnReport {
        let phase = query::phase(world);
        if phase != MatchPhase::Running {
            return TurnReport::Halted(phase);
        }

        if query::is_game_over(world) {
            world::apply(world, Command::ConcludeMatch, out_events);
            return match query::outcome(world) {
                Some(outcome) => TurnReport::Concluded(outcome),
                None => TurnReport::Halted(query::phase(world)),
            };
        }

        pause(self.pacing.think);

        let faction = query::active_faction(world);
        let board = query::board(world);
        let decision = match faction {
            Faction::Red => self.red.choose(board),
            Faction::Blue => self.blue.choose(board),
        };

        let command = match decision {
            Some(Decision { unit, action }) => Command::ExecuteAction { unit, action },
            None => Command::SkipTurn,
        };
        world::apply(world, command, out_events);
        world::apply(world, Command::EndTurn, out_events);

        let round = query::round(world);
        match decision {
            Some(decision) => info!(%faction, round, ?decision, "turn played"),
            None => info!(%faction, round, "no legal action, turn skipped"),
        }

        pause(self.pacing.settle);

        TurnReport::Played {
            faction,
            decision,
            round,
        }
    }

    /// Starts the match if idle and plays turns until it concludes, halts, or
    /// the round counter exceeds `max_rounds`.
    ///
    /// Returns the outcome when the match concluded.
    pub fn run(
        &mut self,
        world: &mut World,
        max_rounds: Option<u32>,
        out_events: &mut Vec<Event>,
    ) -> Option<MatchOutcome> {
        if query::phase(world) == MatchPhase::Idle {
            world::apply(world, Command::StartMatch, out_events);
        }

        loop {
            match self.play_turn(world, out_events) {
                TurnReport::Concluded(outcome) => return Some(outcome),
                TurnReport::Halted(phase) => {
                    debug!(?phase, "turn loop halted");
                    return None;
                }
                TurnReport::Played { round, .. } => {
                    if max_rounds.is_some_and(|limit| round > limit) {
                        info!(round, "round limit reached");
                        return None;
                    }
                }
            }
        }
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_arena_core::{Archetype, GridPos, TileKind, UnitStats};
    use tactics_arena_world::{Board, Terrain};

    fn instant() -> Orchestrator<ChaCha8Rng> {
        Orchestrator::seeded(1, Pacing::instant())
    }

    #[test]
    fn speed_presets_split_forty_sixty() {
        let pacing = Pacing::from(GameSpeed::Normal);
        assert_eq!(pacing.think(), Duration::from_millis(280));
        assert_eq!(pacing.settle(), Duration::from_millis(420));
        assert_eq!(
            Pacing::from(GameSpeed::Slow).think() + Pacing::from(GameSpeed::Slow).settle(),
            Duration::from_millis(1_200)
        );
        assert_eq!(GameSpeed::Ultra.turn_delay(), Duration::from_millis(150));
    }

    #[test]
    fn speeds_parse_case_insensitively() {
        assert_eq!("FAST".parse::<GameSpeed>(), Ok(GameSpeed::Fast));
        assert_eq!(" ultra ".parse::<GameSpeed>(), Ok(GameSpeed::Ultra));
        assert!("ludicrous".parse::<GameSpeed>().is_err());
    }

    #[test]
    fn idle_and_paused_worlds_are_not_advanced() {
        let mut world = World::new();
        let mut events = Vec::new();
        let mut orchestrator = instant();
        assert_eq!(
            orchestrator.play_turn(&mut world, &mut events),
            TurnReport::Halted(MatchPhase::Idle)
        );

        world::apply(&mut world, Command::StartMatch, &mut events);
        world::apply(&mut world, Command::PauseMatch, &mut events);
        events.clear();
        assert_eq!(
            orchestrator.play_turn(&mut world, &mut events),
            TurnReport::Halted(MatchPhase::Paused)
        );
        assert!(events.is_empty());
        assert_eq!(query::active_faction(&world), Faction::Red);
    }

    #[test]
    fn turns_alternate_and_advance_rounds() {
        let mut world = World::new();
        let mut events = Vec::new();
        let mut orchestrator = instant();
        world::apply(&mut world, Command::StartMatch, &mut events);

        let red = orchestrator.play_turn(&mut world, &mut events);
        assert!(matches!(
            red,
            TurnReport::Played {
                faction: Faction::Red,
                decision: Some(_),
                round: 1,
            }
        ));
        let blue = orchestrator.play_turn(&mut world, &mut events);
        assert!(matches!(
            blue,
            TurnReport::Played {
                faction: Faction::Blue,
                decision: Some(_),
                round: 2,
            }
        ));
        assert!(events.contains(&Event::RoundAdvanced { round: 2 }));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::ActionRejected { .. })));
    }

    #[test]
    fn stuck_faction_passes_control() {
        let terrain = Terrain::open()
            .with_tile(GridPos::new(1, 0), TileKind::Wall)
            .with_tile(GridPos::new(0, 1), TileKind::Wall)
            .with_tile(GridPos::new(1, 1), TileKind::Wall);
        let mut board = Board::empty(terrain);
        let _ = board.deploy(Faction::Red, Archetype::Heavy, GridPos::new(0, 0));
        let _ = board.deploy(Faction::Blue, Archetype::Heavy, GridPos::new(6, 6));
        let mut world = World::from_board(board, 2);
        let mut events = Vec::new();
        world::apply(&mut world, Command::StartMatch, &mut events);

        let report = instant().play_turn(&mut world, &mut events);
        assert_eq!(
            report,
            TurnReport::Played {
                faction: Faction::Red,
                decision: None,
                round: 1,
            }
        );
        assert!(events.contains(&Event::TurnSkipped {
            faction: Faction::Red
        }));
        assert_eq!(query::active_faction(&world), Faction::Blue);
    }

    #[test]
    fn decisive_strike_then_conclusion() {
        let mut board = Board::empty(Terrain::open());
        let red = board.deploy_with_stats(
            Faction::Red,
            Archetype::Soldier,
            UnitStats::new(100, 25, 2, 0.0, 1),
            GridPos::new(0, 0),
        );
        let blue = board.deploy(Faction::Blue, Archetype::Soldier, GridPos::new(1, 0));
        board.set_health(blue, 20);
        let mut world = World::from_board(board, 4);
        let mut events = Vec::new();

        let outcome = instant().run(&mut world, Some(10), &mut events);
        assert_eq!(
            outcome,
            Some(MatchOutcome {
                winner: Some(Faction::Red),
                alive_count: 1,
            })
        );
        assert!(events.contains(&Event::UnitAttacked {
            attacker: red,
            target: blue,
            damage: 25,
            critical: false,
            cover: 0,
        }));
        let moves_after_strike = events
            .iter()
            .skip_while(|event| !matches!(event, Event::UnitAttacked { .. }))
            .filter(|event| matches!(event, Event::UnitMoved { .. }))
            .count();
        assert_eq!(moves_after_strike, 0);
        assert_eq!(query::phase(&world), MatchPhase::GameOver);
        assert!(matches!(events.last(), Some(Event::GameOver { .. })));
    }
}
