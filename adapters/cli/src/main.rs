#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Tactics Arena match.

mod config;
mod render;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tactics_arena_core::{Command, Event, MatchPhase};
use tactics_arena_system_orchestrator::{GameSpeed, Orchestrator, TurnReport};
use tactics_arena_world::{self as world, query, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{FileConfig, FlagOverrides, MatchSettings},
    render::UnitDirectory,
};

/// Mixed into the match seed so greedy noise and critical rolls use distinct streams.
const GREEDY_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Headless Minimax (Red) versus Greedy (Blue) skirmish.
#[derive(Debug, Parser)]
#[command(name = "tactics-arena", version, about)]
struct CliArgs {
    /// Seed for critical-hit rolls and greedy noise.
    #[arg(long)]
    seed: Option<u64>,
    /// Turn delay preset: slow, normal, fast or ultra.
    #[arg(long)]
    speed: Option<GameSpeed>,
    /// Explicit turn delay in milliseconds; overrides `--speed`.
    #[arg(long, value_name = "MS")]
    turn_delay_ms: Option<u64>,
    /// Abandon the match once this many rounds have been played.
    #[arg(long)]
    max_rounds: Option<u32>,
    /// Event output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Print the board after every round.
    #[arg(long)]
    show_board: bool,
    /// TOML file providing seed, speed, turn_delay_ms and max_rounds.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log decision details at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Entry point for the Tactics Arena command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let flags = FlagOverrides {
        seed: args.seed,
        speed: args.speed,
        turn_delay_ms: args.turn_delay_ms,
        max_rounds: args.max_rounds,
    };
    let settings = MatchSettings::resolve(&flags, &file);
    info!(
        seed = settings.seed,
        think_ms = settings.pacing.think().as_millis(),
        settle_ms = settings.pacing.settle().as_millis(),
        max_rounds = settings.max_rounds,
        "match configured"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    play(&args, settings, &mut out)?;
    out.flush().context("failed to flush stdout")
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn play(args: &CliArgs, settings: MatchSettings, out: &mut impl Write) -> Result<()> {
    let mut world = World::with_seed(settings.seed);
    let mut orchestrator =
        Orchestrator::seeded(settings.seed ^ GREEDY_SEED_SALT, settings.pacing);
    let directory = UnitDirectory::from_roster(&query::roster_view(&world));
    let mut events = Vec::new();

    if args.format == OutputFormat::Text {
        writeln!(out, "{}", query::welcome_banner(&world)).context("failed to write banner")?;
        if args.show_board {
            write_board(out, &world)?;
        }
    }

    world::apply(&mut world, Command::StartMatch, &mut events);
    emit(args.format, &directory, &mut events, out)?;

    let outcome = loop {
        let report = orchestrator.play_turn(&mut world, &mut events);
        let round_ended = events
            .iter()
            .any(|event| matches!(event, Event::RoundAdvanced { .. }));
        emit(args.format, &directory, &mut events, out)?;

        match report {
            TurnReport::Concluded(outcome) => break Some(outcome),
            TurnReport::Halted(phase) => {
                info!(?phase, "match halted");
                break None;
            }
            TurnReport::Played { round, .. } => {
                if round_ended && args.show_board && args.format == OutputFormat::Text {
                    write_board(out, &world)?;
                }
                if round > settings.max_rounds {
                    info!(round, "round limit reached, stopping match");
                    break None;
                }
            }
        }
    };

    if args.format == OutputFormat::Text {
        if args.show_board && query::phase(&world) == MatchPhase::GameOver {
            write_board(out, &world)?;
        }
        let summary = render::rewards(
            outcome,
            query::round(&world),
            &query::scoreboard(&world),
            &query::stats(&world),
        );
        write!(out, "{summary}").context("failed to write match summary")?;
    }
    Ok(())
}

fn emit(
    format: OutputFormat,
    directory: &UnitDirectory,
    events: &mut Vec<Event>,
    out: &mut impl Write,
) -> Result<()> {
    for event in events.drain(..) {
        match format {
            OutputFormat::Text => {
                if let Some(line) = render::event_line(directory, &event) {
                    writeln!(out, "{line}").context("failed to write event log line")?;
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, &event)
                    .context("failed to serialize event as json")?;
                writeln!(out).context("failed to terminate json event line")?;
            }
        }
    }
    Ok(())
}

fn write_board(out: &mut impl Write, world: &World) -> Result<()> {
    let drawing = render::board(&query::terrain_view(world), &query::roster_view(world));
    write!(out, "{drawing}").context("failed to write board")
}
