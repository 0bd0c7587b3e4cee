#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure AI behavior stack: Chase outranks Wander, both emitting world commands.

use std::{collections::BTreeMap, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::{
    AttackAim, ChaseConfig, Command, Event, GridQuery, TileCoord, UnitCategory, UnitId,
    UnitSnapshot, UnitView, WanderConfig,
};

/// Configuration parameters required to construct the behavior system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration seeding the wander rolls with `rng_seed`.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }

    /// Seed used for wander destinations.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

#[derive(Clone, Debug, Default)]
struct BehaviorState {
    next_wander_at: Option<Duration>,
    next_scan_at: Duration,
    next_attack_at: Duration,
    repath_at: Duration,
    chase_goal: Option<TileCoord>,
    returning: bool,
}

/// Pure system that reads unit snapshots and grid passability to drive AI units.
#[derive(Debug)]
pub struct Behaviors {
    clock: Duration,
    rng: ChaCha8Rng,
    states: BTreeMap<UnitId, BehaviorState>,
}

impl Behaviors {
    /// Creates a new behavior system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            clock: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            states: BTreeMap::new(),
        }
    }

    /// Time accumulated from observed `TimeAdvanced` events.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.clock
    }

    /// Consumes events and immutable views to emit behavior commands.
    ///
    /// Units are visited in identifier order. For each unit with a behavior
    /// stack, Chase is evaluated first; Wander only runs when Chase is not
    /// holding a live target in range.
    pub fn handle<G>(
        &mut self,
        events: &[Event],
        units: &UnitView,
        grid: &G,
        out: &mut Vec<Command>,
    ) where
        G: GridQuery + ?Sized,
    {
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.clock = self.clock.saturating_add(*dt);
            }
        }

        self.states.retain(|id, _| units.get_alive(*id).is_some());

        for unit in units.iter() {
            if !unit.is_alive() {
                continue;
            }
            let Some(config) = unit.behavior else {
                continue;
            };

            let chasing =
                config.chase.enabled && self.chase(unit, &config.chase, units, grid, out);
            if !chasing && config.wander.enabled {
                self.wander(unit, &config.wander, grid, out);
            }
        }
    }

    fn chase<G>(
        &mut self,
        unit: &UnitSnapshot,
        config: &ChaseConfig,
        units: &UnitView,
        grid: &G,
        out: &mut Vec<Command>,
    ) -> bool
    where
        G: GridQuery + ?Sized,
    {
        let now = self.clock;
        let state = self.states.entry(unit.id).or_default();

        if state.returning {
            if unit.is_moving() {
                return false;
            }
            state.returning = false;
        }

        if let Some(target_id) = unit.target {
            let target = units
                .get_alive(target_id)
                .filter(|target| target.category == UnitCategory::Hero);
            let Some(target) = target else {
                tracing::debug!(unit = unit.id.get(), "chase target lost");
                state.chase_goal = None;
                out.push(Command::SetCombatTarget {
                    unit: unit.id,
                    target: None,
                });
                return false;
            };
            if unit.tile.manhattan_distance(target.tile) > config.tolerance() {
                tracing::debug!(
                    unit = unit.id.get(),
                    target = target.id.get(),
                    "chase target out of tolerance"
                );
                state.chase_goal = None;
                out.push(Command::SetCombatTarget {
                    unit: unit.id,
                    target: None,
                });
                return false;
            }
            return pursue(state, now, unit, target, config, grid, out);
        }

        if now < state.next_scan_at {
            return false;
        }
        state.next_scan_at = now.saturating_add(config.scan_interval);

        let Some(target) = nearest_hero(unit, config.range, units) else {
            return false;
        };
        tracing::debug!(
            unit = unit.id.get(),
            target = target.id.get(),
            "chase target acquired"
        );
        out.push(Command::SetCombatTarget {
            unit: unit.id,
            target: Some(target.id),
        });
        pursue(state, now, unit, target, config, grid, out)
    }

    fn wander<G>(
        &mut self,
        unit: &UnitSnapshot,
        config: &WanderConfig,
        grid: &G,
        out: &mut Vec<Command>,
    ) where
        G: GridQuery + ?Sized,
    {
        if !unit.category.is_mobile() || unit.target.is_some() || unit.is_moving() {
            return;
        }

        let now = self.clock;
        let state = self.states.entry(unit.id).or_default();
        let due = match state.next_wander_at {
            Some(due) => due,
            None => {
                state.next_wander_at = Some(now.saturating_add(config.interval));
                return;
            }
        };
        if now < due {
            return;
        }
        state.next_wander_at = Some(now.saturating_add(config.interval));

        let radius = i32::try_from(config.radius).unwrap_or(i32::MAX);
        let dx = self.rng.gen_range(-radius..=radius);
        let dy = self.rng.gen_range(-radius..=radius);
        let goal = unit.home.offset(dx, dy);
        if goal == unit.tile || !grid.is_passable(goal) {
            return;
        }

        tracing::debug!(unit = unit.id.get(), ?goal, "wandering");
        out.push(Command::MoveUnit {
            unit: unit.id,
            goal,
        });
    }
}

/// Moves toward, or strikes, an acquired target. Returns whether chase stays active.
fn pursue<G>(
    state: &mut BehaviorState,
    now: Duration,
    unit: &UnitSnapshot,
    target: &UnitSnapshot,
    config: &ChaseConfig,
    grid: &G,
    out: &mut Vec<Command>,
) -> bool
where
    G: GridQuery + ?Sized,
{
    if unit.tile.manhattan_distance(unit.home) > config.leash {
        tracing::debug!(
            unit = unit.id.get(),
            home = ?unit.home,
            "leash exceeded, returning home"
        );
        state.chase_goal = None;
        state.returning = true;
        out.push(Command::SetCombatTarget {
            unit: unit.id,
            target: None,
        });
        out.push(Command::MoveUnit {
            unit: unit.id,
            goal: unit.home,
        });
        return false;
    }

    let reach = unit.stats.attack_range.max(1);
    if unit.tile.manhattan_distance(target.tile) <= reach {
        if unit.is_moving() {
            out.push(Command::StopUnit { unit: unit.id });
        }
        state.chase_goal = None;
        if now >= state.next_attack_at {
            state.next_attack_at = now.saturating_add(unit.stats.cooldown());
            out.push(Command::Attack {
                unit: unit.id,
                kind: None,
                aim: AttackAim::Unit(target.id),
            });
        }
        return true;
    }

    if !unit.category.is_mobile() {
        return true;
    }

    let Some(goal) = approach_tile(unit.tile, target.tile, reach, grid) else {
        return true;
    };
    let goal_changed = state.chase_goal != Some(goal);
    let idle_and_due = !unit.is_moving() && now >= state.repath_at;
    if goal_changed || idle_and_due {
        state.chase_goal = Some(goal);
        state.repath_at = now.saturating_add(config.scan_interval);
        out.push(Command::MoveUnit {
            unit: unit.id,
            goal,
        });
    }
    true
}

/// Closest living hero within `range`; heroes never hunt each other.
fn nearest_hero<'a>(
    unit: &UnitSnapshot,
    range: u32,
    units: &'a UnitView,
) -> Option<&'a UnitSnapshot> {
    if unit.category == UnitCategory::Hero {
        return None;
    }
    units
        .iter()
        .filter(|other| other.id != unit.id)
        .filter(|other| other.is_alive() && other.category == UnitCategory::Hero)
        .map(|other| (unit.tile.manhattan_distance(other.tile), other))
        .filter(|(distance, _)| *distance <= range)
        .min_by_key(|(distance, other)| (*distance, other.id))
        .map(|(_, other)| other)
}

/// Passable tile within `reach` of `target` closest to `from`.
fn approach_tile<G>(from: TileCoord, target: TileCoord, reach: u32, grid: &G) -> Option<TileCoord>
where
    G: GridQuery + ?Sized,
{
    let reach = i32::try_from(reach).unwrap_or(i32::MAX);
    let mut best: Option<(u32, TileCoord)> = None;
    for dy in -reach..=reach {
        let span = reach - dy.abs();
        for dx in -span..=span {
            let tile = target.offset(dx, dy);
            if tile == target || !grid.is_passable(tile) {
                continue;
            }
            let key = (from.manhattan_distance(tile), tile);
            if best.map_or(true, |current| key < current) {
                best = Some(key);
            }
        }
    }
    best.map(|(_, tile)| tile)
}
