//! Plain-text presentation of events, the board and the end-of-match rewards.

use std::{collections::HashMap, fmt::Write as _};

use tactics_arena_core::{
    points, Archetype, Event, Faction, GridPos, MatchOutcome, MatchPhase, MatchStats, RosterView,
    Scoreboard, TerrainView, TileKind, UnitId, UnitSnapshot, GRID_SIZE, SQUAD_SIZE,
};

/// Faction and archetype of every unit that took part in the match.
///
/// Eliminated units leave the roster, so identities are captured up front.
#[derive(Debug, Default)]
pub(crate) struct UnitDirectory {
    units: HashMap<UnitId, (Faction, Archetype)>,
}

impl UnitDirectory {
    pub(crate) fn from_roster(roster: &RosterView) -> Self {
        Self {
            units: roster
                .iter()
                .map(|unit| (unit.id, (unit.faction, unit.archetype)))
                .collect(),
        }
    }

    fn label(&self, unit: UnitId) -> String {
        match self.units.get(&unit) {
            Some((faction, archetype)) => format!("{faction} {archetype}"),
            None => format!("unit #{}", unit.get()),
        }
    }
}

/// Renders an event as a single log line, or `None` for events with no log entry.
pub(crate) fn event_line(directory: &UnitDirectory, event: &Event) -> Option<String> {
    let line = match event {
        Event::PhaseChanged { phase } => match phase {
            MatchPhase::Idle => "Arena ready".to_owned(),
            MatchPhase::Running => "Battle started".to_owned(),
            MatchPhase::Paused => "Battle paused".to_owned(),
            MatchPhase::GameOver => return None,
        },
        Event::UnitMoved { unit, to, .. } => format!("{} moved to {to}", directory.label(*unit)),
        Event::DoorUsed { unit, tile } => {
            format!("{} moved through the door at {tile}", directory.label(*unit))
        }
        Event::PowerupCollected { unit, .. } => {
            format!("{} collected a POWER-UP!", directory.label(*unit))
        }
        Event::UnitAttacked {
            attacker,
            target,
            damage,
            critical,
            cover,
        } => {
            let mut line = format!(
                "{} -> {}: {damage} dmg",
                directory.label(*attacker),
                directory.label(*target)
            );
            if *critical {
                line.push_str(" CRIT!");
            }
            if *cover > 0 {
                let _ = write!(line, " ({cover} cover)");
            }
            line
        }
        Event::UnitEliminated { unit } => format!("{} ELIMINATED!", directory.label(*unit)),
        Event::ScoreAwarded {
            faction,
            amount,
            reason,
        } => format!("  +{amount} {faction}: {reason}"),
        Event::RoundAdvanced { round } => format!("--- Round {round} ---"),
        Event::TurnSkipped { faction } => format!("{faction} has no legal action"),
        Event::ActionRejected {
            unit,
            action,
            reason,
        } => format!(
            "rejected {action:?} for {}: {reason}",
            directory.label(*unit)
        ),
        Event::GameOver {
            winner: Some(faction),
            alive_count,
        } => format!("{} WINS with {alive_count} alive", team_name(*faction)),
        Event::GameOver { winner: None, .. } => "Both squads fell. The match is a draw".to_owned(),
    };
    Some(line)
}

/// Draws the arena row by row, Red units in uppercase and Blue in lowercase.
pub(crate) fn board(terrain: &TerrainView, roster: &RosterView) -> String {
    let mut out = String::new();
    for z in 0..GRID_SIZE {
        for x in 0..GRID_SIZE {
            let position = GridPos::new(x, z);
            let glyph = roster
                .at(position)
                .filter(|unit| unit.health > 0)
                .map_or_else(
                    || terrain.kind(position).map_or(' ', tile_glyph),
                    unit_glyph,
                );
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

fn tile_glyph(kind: TileKind) -> char {
    match kind {
        TileKind::Empty => '.',
        TileKind::Wall => '#',
        TileKind::Door => '+',
        TileKind::Window => '=',
        TileKind::Tree => 'T',
        TileKind::Crate => '%',
        TileKind::Powerup => '*',
    }
}

fn unit_glyph(unit: &UnitSnapshot) -> char {
    let glyph = match unit.archetype {
        Archetype::Soldier => 'S',
        Archetype::Sniper => 'N',
        Archetype::Heavy => 'H',
        Archetype::Scout => 'R',
    };
    match unit.faction {
        Faction::Red => glyph,
        Faction::Blue => glyph.to_ascii_lowercase(),
    }
}

fn team_name(faction: Faction) -> &'static str {
    match faction {
        Faction::Red => "RED TEAM (Minimax)",
        Faction::Blue => "BLUE TEAM (Greedy)",
    }
}

/// Breaks the final score down by source.
pub(crate) fn rewards(
    outcome: Option<MatchOutcome>,
    round: u32,
    scores: &Scoreboard,
    stats: &MatchStats,
) -> String {
    let mut rows: Vec<(String, u64)> = Vec::new();
    let title = match outcome {
        Some(MatchOutcome {
            winner: Some(faction),
            ..
        }) => {
            rows.push(("Victory Bonus".to_owned(), points::VICTORY));
            format!("{} WINS!", team_name(faction))
        }
        Some(MatchOutcome { winner: None, .. }) => "DRAW".to_owned(),
        None => format!("Stopped after round {round}"),
    };

    rows.push((
        format!("Total Damage ({})", stats.damage),
        stats.damage * points::DAMAGE_MULTIPLIER,
    ));
    rows.push((
        format!("Eliminations ({})", stats.kills),
        u64::from(stats.kills) * points::ELIMINATION,
    ));
    rows.push((
        format!("Critical Hits ({})", stats.crits),
        u64::from(stats.crits) * points::CRITICAL,
    ));
    rows.push((
        format!("Power-ups ({})", stats.powerups),
        u64::from(stats.powerups) * points::POWERUP,
    ));
    if let Some(MatchOutcome {
        winner: Some(_),
        alive_count,
    }) = outcome
    {
        if alive_count == SQUAD_SIZE {
            rows.push(("FLAWLESS VICTORY".to_owned(), points::FLAWLESS));
        }
        if alive_count >= points::DOMINATION_SURVIVORS {
            rows.push(("DOMINATION".to_owned(), points::DOMINATION));
        }
    }

    let mut out = format!("=== {title} ===\n");
    for (label, amount) in rows {
        let _ = writeln!(out, "{label:<24}{:>8}", format!("+{amount}"));
    }
    let _ = writeln!(
        out,
        "Final score: {} PTS (Red {}, Blue {})",
        scores.total(),
        scores.score(Faction::Red),
        scores.score(Faction::Blue)
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_arena_core::{ScoreReason, GRID_TILES};

    fn roster() -> RosterView {
        RosterView::from_snapshots(vec![
            UnitSnapshot {
                id: UnitId::new(1),
                faction: Faction::Red,
                archetype: Archetype::Sniper,
                position: GridPos::new(0, 7),
                health: 60,
                max_health: 60,
            },
            UnitSnapshot {
                id: UnitId::new(6),
                faction: Faction::Blue,
                archetype: Archetype::Heavy,
                position: GridPos::new(6, 4),
                health: 180,
                max_health: 180,
            },
        ])
    }

    fn directory() -> UnitDirectory {
        UnitDirectory::from_roster(&roster())
    }

    #[test]
    fn attack_lines_mention_crit_and_cover() {
        let line = event_line(
            &directory(),
            &Event::UnitAttacked {
                attacker: UnitId::new(1),
                target: UnitId::new(6),
                damage: 63,
                critical: true,
                cover: 10,
            },
        );
        assert_eq!(
            line.as_deref(),
            Some("Red Sniper -> Blue Heavy: 63 dmg CRIT! (10 cover)")
        );
    }

    #[test]
    fn door_moves_are_distinguished() {
        let directory = directory();
        let door = event_line(
            &directory,
            &Event::DoorUsed {
                unit: UnitId::new(6),
                tile: GridPos::new(5, 4),
            },
        );
        assert_eq!(
            door.as_deref(),
            Some("Blue Heavy moved through the door at (5,4)")
        );
        let award = event_line(
            &directory,
            &Event::ScoreAwarded {
                faction: Faction::Blue,
                amount: 20,
                reason: ScoreReason::DoorUse,
            },
        );
        assert_eq!(award.as_deref(), Some("  +20 Blue: Used door"));
    }

    #[test]
    fn board_overlays_units_on_terrain() {
        let mut tiles = [TileKind::Empty; GRID_TILES];
        tiles[1] = TileKind::Wall;
        let rendered = board(&TerrainView::from_tiles(tiles), &roster());
        let rows: Vec<&str> = rendered.lines().collect();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0], ".#......");
        assert_eq!(rows[7], "N.......");
        assert_eq!(rows[4], "......h.");
    }

    #[test]
    fn rewards_list_bonuses_for_a_full_squad() {
        let stats = MatchStats {
            damage: 300,
            kills: 4,
            crits: 2,
            powerups: 1,
        };
        let mut scores = Scoreboard::default();
        scores.award(Faction::Red, 4_950);
        let summary = rewards(
            Some(MatchOutcome {
                winner: Some(Faction::Red),
                alive_count: 4,
            }),
            12,
            &scores,
            &stats,
        );
        assert!(summary.starts_with("=== RED TEAM (Minimax) WINS! ==="));
        assert!(summary.contains("Total Damage (300)"));
        assert!(summary.contains("+600"));
        assert!(summary.contains("FLAWLESS VICTORY"));
        assert!(summary.contains("DOMINATION"));
        assert!(summary.contains("Final score: 4950 PTS (Red 4950, Blue 0)"));
    }

    #[test]
    fn stopped_matches_omit_victory_rows() {
        let summary = rewards(None, 201, &Scoreboard::default(), &MatchStats::default());
        assert!(summary.starts_with("=== Stopped after round 201 ==="));
        assert!(!summary.contains("Victory Bonus"));
    }
}
