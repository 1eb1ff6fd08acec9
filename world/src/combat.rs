//! Authoritative execution of unit actions with scoring side effects.

use rand::Rng;
use tactics_arena_core::{
    points, Action, Event, Faction, GridPos, MatchStats, ScoreReason, Scoreboard, TileKind, UnitId,
};
use tracing::debug;

use crate::board::Board;

/// Minimum damage an attack deals regardless of cover.
const DAMAGE_FLOOR: i32 = 5;

/// Critical hits multiply damage by `CRIT_NUMERATOR / CRIT_DENOMINATOR`, rounded down.
const CRIT_NUMERATOR: i32 = 18;
const CRIT_DENOMINATOR: i32 = 10;

/// Scores, tallies and the first-blood flag accumulated over a match.
#[derive(Clone, Debug, Default)]
pub(crate) struct Ledger {
    pub(crate) scores: Scoreboard,
    pub(crate) stats: MatchStats,
    pub(crate) first_blood: bool,
}

impl Ledger {
    /// Credits points to a faction and announces the award.
    pub(crate) fn award(
        &mut self,
        faction: Faction,
        amount: u64,
        reason: ScoreReason,
        out_events: &mut Vec<Event>,
    ) {
        self.scores.award(faction, amount);
        debug!(%faction, amount, %reason, "points awarded");
        out_events.push(Event::ScoreAwarded {
            faction,
            amount,
            reason,
        });
    }
}

/// Executes a validated action for the unit, applying every modifier.
///
/// The caller guarantees the action is legal for the unit.
pub(crate) fn resolve<R: Rng>(
    board: &mut Board,
    ledger: &mut Ledger,
    rng: &mut R,
    unit: UnitId,
    action: Action,
    out_events: &mut Vec<Event>,
) {
    match action {
        Action::Move { to } => resolve_move(board, ledger, unit, to, out_events),
        Action::Attack { target } => resolve_attack(board, ledger, rng, unit, target, out_events),
    }
}

fn resolve_move(
    board: &mut Board,
    ledger: &mut Ledger,
    unit: UnitId,
    to: GridPos,
    out_events: &mut Vec<Event>,
) {
    debug_assert!(!board.is_occupied(to), "tile {to} already occupied");
    let Some(mover) = board.unit(unit) else {
        return;
    };
    let faction = mover.faction();
    let from = mover.position();

    match board.terrain().kind(to) {
        Some(TileKind::Powerup) => {
            board.terrain_mut().set_kind(to, TileKind::Empty);
            ledger.stats.powerups += 1;
            out_events.push(Event::PowerupCollected { unit, tile: to });
            ledger.award(faction, points::POWERUP, ScoreReason::Powerup, out_events);
        }
        Some(TileKind::Door) => {
            out_events.push(Event::DoorUsed { unit, tile: to });
            ledger.award(faction, points::DOOR_USE, ScoreReason::DoorUse, out_events);
        }
        _ => {}
    }

    if let Some(mover) = board.unit_mut(unit) {
        mover.set_position(to);
    }
    debug!(unit = unit.get(), %from, %to, "unit moved");
    out_events.push(Event::UnitMoved { unit, from, to });
}

fn resolve_attack<R: Rng>(
    board: &mut Board,
    ledger: &mut Ledger,
    rng: &mut R,
    attacker: UnitId,
    target: UnitId,
    out_events: &mut Vec<Event>,
) {
    let Some(striker) = board.unit(attacker) else {
        return;
    };
    let faction = striker.faction();
    let stats = *striker.stats();
    let Some(victim) = board.unit(target) else {
        return;
    };
    let cover = board.cover_bonus(victim);

    let critical = rng.gen::<f64>() < stats.crit_chance;
    let shielding = i32::try_from(cover).unwrap_or(i32::MAX);
    let mut damage = stats.attack_power.saturating_sub(shielding).max(DAMAGE_FLOOR);
    if critical {
        damage = damage * CRIT_NUMERATOR / CRIT_DENOMINATOR;
    }

    let remaining = match board.unit_mut(target) {
        Some(victim) => {
            let remaining = victim.health() - damage;
            victim.set_health(remaining);
            remaining
        }
        None => return,
    };
    let dealt = u64::try_from(damage).unwrap_or(0);
    ledger.stats.damage += dealt;

    debug!(
        attacker = attacker.get(),
        target = target.get(),
        damage,
        critical,
        cover,
        remaining,
        "attack resolved"
    );
    out_events.push(Event::UnitAttacked {
        attacker,
        target,
        damage,
        critical,
        cover,
    });

    if critical {
        ledger.stats.crits += 1;
        ledger.award(faction, points::CRITICAL, ScoreReason::Critical, out_events);
    }
    ledger.award(
        faction,
        dealt * points::DAMAGE_MULTIPLIER,
        ScoreReason::Damage,
        out_events,
    );

    if remaining <= 0 {
        ledger.stats.kills += 1;
        ledger.award(faction, points::ELIMINATION, ScoreReason::Elimination, out_events);
        if !ledger.first_blood {
            ledger.first_blood = true;
            ledger.award(faction, points::FIRST_BLOOD, ScoreReason::FirstBlood, out_events);
        }
        let _ = board.remove_unit(target);
        debug!(unit = target.get(), "unit eliminated");
        out_events.push(Event::UnitEliminated { unit: target });
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tactics_arena_core::{Archetype, UnitStats};

    use super::*;
    use crate::terrain::Terrain;

    fn never_crit(attack_power: i32) -> UnitStats {
        UnitStats::new(100, attack_power, 4, 0.0, 1)
    }

    fn always_crit(attack_power: i32) -> UnitStats {
        UnitStats::new(100, attack_power, 4, 1.0, 1)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn awards(events: &[Event]) -> Vec<(ScoreReason, u64)> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::ScoreAwarded { amount, reason, .. } => Some((*reason, *amount)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn cover_never_reduces_damage_below_floor() {
        let terrain = Terrain::open().with_tile(GridPos::new(3, 1), TileKind::Wall);
        let mut board = Board::empty(terrain);
        let red = board.deploy_with_stats(
            Faction::Red,
            Archetype::Heavy,
            never_crit(20),
            GridPos::new(2, 0),
        );
        let blue = board.deploy(Faction::Blue, Archetype::Soldier, GridPos::new(3, 0));
        let mut ledger = Ledger::default();
        let mut events = Vec::new();

        resolve(
            &mut board,
            &mut ledger,
            &mut rng(),
            red,
            Action::Attack { target: blue },
            &mut events,
        );

        assert_eq!(
            events.first(),
            Some(&Event::UnitAttacked {
                attacker: red,
                target: blue,
                damage: 5,
                critical: false,
                cover: 100,
            })
        );
        assert_eq!(board.unit(blue).map(|unit| unit.health()), Some(95));
        assert_eq!(ledger.stats.damage, 5);
        assert_eq!(ledger.scores.score(Faction::Red), 10);
    }

    #[test]
    fn critical_hits_scale_after_cover() {
        let terrain = Terrain::open().with_tile(GridPos::new(4, 1), TileKind::Tree);
        let mut board = Board::empty(terrain);
        let red = board.deploy_with_stats(
            Faction::Red,
            Archetype::Sniper,
            always_crit(45),
            GridPos::new(0, 0),
        );
        let blue = board.deploy(Faction::Blue, Archetype::Heavy, GridPos::new(4, 0));
        let mut ledger = Ledger::default();
        let mut events = Vec::new();

        resolve(
            &mut board,
            &mut ledger,
            &mut rng(),
            red,
            Action::Attack { target: blue },
            &mut events,
        );

        // (45 - 10) * 1.8 = 63
        assert_eq!(board.unit(blue).map(|unit| unit.health()), Some(117));
        assert_eq!(
            awards(&events),
            vec![(ScoreReason::Critical, 100), (ScoreReason::Damage, 126)]
        );
        assert_eq!(ledger.stats.crits, 1);
    }

    #[test]
    fn first_blood_is_awarded_once_per_match() {
        let mut board = Board::empty(Terrain::open());
        let red = board.deploy_with_stats(
            Faction::Red,
            Archetype::Sniper,
            never_crit(45),
            GridPos::new(0, 0),
        );
        let first = board.deploy(Faction::Blue, Archetype::Scout, GridPos::new(2, 0));
        let second = board.deploy(Faction::Blue, Archetype::Scout, GridPos::new(0, 2));
        board.set_health(first, 10);
        board.set_health(second, 10);
        let mut ledger = Ledger::default();
        let mut rng = rng();
        let mut events = Vec::new();

        for target in [first, second] {
            resolve(
                &mut board,
                &mut ledger,
                &mut rng,
                red,
                Action::Attack { target },
                &mut events,
            );
        }

        let first_bloods = awards(&events)
            .into_iter()
            .filter(|(reason, _)| *reason == ScoreReason::FirstBlood)
            .count();
        assert_eq!(first_bloods, 1);
        assert!(ledger.first_blood);
        assert_eq!(ledger.stats.kills, 2);
        assert_eq!(board.roster(Faction::Blue).len(), 0);
        assert_eq!(
            events.last(),
            Some(&Event::UnitEliminated { unit: second })
        );
    }

    #[test]
    fn powerups_are_consumed_on_entry() {
        let tile = GridPos::new(1, 0);
        let terrain = Terrain::open().with_tile(tile, TileKind::Powerup);
        let mut board = Board::empty(terrain);
        let blue = board.deploy(Faction::Blue, Archetype::Scout, GridPos::new(0, 0));
        let mut ledger = Ledger::default();
        let mut events = Vec::new();

        resolve(
            &mut board,
            &mut ledger,
            &mut rng(),
            blue,
            Action::Move { to: tile },
            &mut events,
        );

        assert_eq!(board.terrain().kind(tile), Some(TileKind::Empty));
        assert_eq!(ledger.stats.powerups, 1);
        assert_eq!(ledger.scores.score(Faction::Blue), 50);
        assert_eq!(
            events,
            vec![
                Event::PowerupCollected { unit: blue, tile },
                Event::ScoreAwarded {
                    faction: Faction::Blue,
                    amount: 50,
                    reason: ScoreReason::Powerup,
                },
                Event::UnitMoved {
                    unit: blue,
                    from: GridPos::new(0, 0),
                    to: tile,
                },
            ]
        );
    }

    #[test]
    fn doors_award_points_and_stay_doors() {
        let tile = GridPos::new(0, 1);
        let terrain = Terrain::open().with_tile(tile, TileKind::Door);
        let mut board = Board::empty(terrain);
        let red = board.deploy(Faction::Red, Archetype::Soldier, GridPos::new(0, 0));
        let mut ledger = Ledger::default();
        let mut events = Vec::new();

        resolve(
            &mut board,
            &mut ledger,
            &mut rng(),
            red,
            Action::Move { to: tile },
            &mut events,
        );

        assert_eq!(board.terrain().kind(tile), Some(TileKind::Door));
        assert_eq!(ledger.scores.total(), 20);
        assert_eq!(events.first(), Some(&Event::DoorUsed { unit: red, tile }));
        assert_eq!(board.unit(red).map(|unit| unit.position()), Some(tile));
    }
}
