#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Attack resolution, projectile kinematics and the pure halves of combat outcomes.
//!
//! The world calls [`plan_attack`] when it receives an attack command. The
//! plan either describes a projectile to spawn or a degraded direct hit; the
//! world then owns the resulting [`Projectile`] and steps it every tick.

use std::time::Duration;

use glam::Vec2;
use skirmish_core::{
    tuning, AttackAim, AttackKind, AttackProfile, AttackRejection, CombatStats, TileCoord,
    UnitId, UnitSnapshot, UnitView,
};

mod outcome;
mod projectile;

pub use outcome::{experience_share, mitigate, reward_recipients};
pub use projectile::{Launch, Projectile, StepOutcome};

/// Resolved attack ready for execution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttackPlan {
    /// Spawn a projectile of the given kind.
    Projectile {
        /// Kinematic variant to spawn.
        kind: AttackKind,
        /// Display-space point the attack is aimed at.
        aim_point: Vec2,
        /// Captured homing target; always `None` for other kinds.
        homing_target: Option<UnitId>,
    },
    /// Apply damage without a projectile because no usable kind is enabled.
    Direct {
        /// Kind that was requested explicitly, if any.
        requested: Option<AttackKind>,
        /// Unit that receives the damage, if one could be resolved.
        target: Option<UnitId>,
    },
}

/// Picks an attack kind for an autonomous actor at the given tile distance.
///
/// Beyond the melee preference distance the fixed priority order applies;
/// at or below it melee is tried first. Returns `None` when nothing is enabled.
#[must_use]
pub fn select_kind(profile: &AttackProfile, distance: u32) -> Option<AttackKind> {
    const FAR: [AttackKind; 3] = AttackKind::PRIORITY;
    const NEAR: [AttackKind; 3] = [AttackKind::Melee, AttackKind::Homing, AttackKind::Ranged];

    let order = if distance > tuning::MELEE_PREFERENCE_DISTANCE {
        FAR
    } else {
        NEAR
    };
    order.into_iter().find(|kind| profile.is_enabled(*kind))
}

/// Reports whether the attack-speed cooldown elapsed since the last attack.
#[must_use]
pub fn cooldown_ready(last_attack: Option<Duration>, now: Duration, stats: &CombatStats) -> bool {
    match last_attack {
        None => true,
        Some(last) => now.saturating_sub(last) >= stats.cooldown(),
    }
}

/// Finds the unit a homing projectile should seek.
///
/// Unit aims accept the named unit when it is alive, not the actor and within
/// attack range. Point aims pick, among live units other than the actor whose
/// hit bounds contain the point and that lie within attack range, the one
/// nearest to the actor.
#[must_use]
pub fn acquire_homing_target(
    actor: &UnitSnapshot,
    aim: AttackAim,
    units: &UnitView,
) -> Option<UnitId> {
    let range = actor.stats.attack_range;
    match aim {
        AttackAim::Unit(id) => units
            .get_alive(id)
            .filter(|unit| unit.id != actor.id)
            .filter(|unit| actor.tile.manhattan_distance(unit.tile) <= range)
            .map(|unit| unit.id),
        AttackAim::Point(point) => units
            .iter()
            .filter(|unit| unit.id != actor.id && unit.is_alive())
            .filter(|unit| unit.bounds_contain(point))
            .filter(|unit| actor.tile.manhattan_distance(unit.tile) <= range)
            .min_by_key(|unit| (actor.tile.manhattan_distance(unit.tile), unit.id))
            .map(|unit| unit.id),
    }
}

/// Runs the attack gates and decides how the attack is executed.
///
/// Rejections leave the actor's cooldown untouched. A disabled or missing
/// kind is not a rejection: the plan degrades to [`AttackPlan::Direct`].
pub fn plan_attack(
    actor: &UnitSnapshot,
    requested: Option<AttackKind>,
    aim: AttackAim,
    units: &UnitView,
    now: Duration,
    last_attack: Option<Duration>,
) -> Result<AttackPlan, AttackRejection> {
    if !actor.is_alive() {
        return Err(AttackRejection::ActorUnavailable);
    }

    if !cooldown_ready(last_attack, now, &actor.stats) {
        return Err(AttackRejection::Cooldown);
    }

    let (aim_point, aim_tile) = match aim {
        AttackAim::Unit(id) => {
            let target = units
                .get_alive(id)
                .filter(|unit| unit.id != actor.id)
                .ok_or(AttackRejection::InvalidAim)?;
            (target.position, target.tile)
        }
        AttackAim::Point(point) if point.is_finite() => (point, TileCoord::from_display(point)),
        AttackAim::Point(_) => return Err(AttackRejection::InvalidAim),
    };

    let profile = &actor.stats.profile;
    let kind = match requested {
        Some(kind) if profile.is_enabled(kind) => Some(kind),
        Some(kind) => {
            tracing::debug!(unit = actor.id.get(), ?kind, "requested attack kind is disabled");
            None
        }
        None => select_kind(profile, actor.tile.manhattan_distance(aim_tile)),
    };

    let Some(kind) = kind else {
        return Ok(AttackPlan::Direct {
            requested,
            target: direct_target(actor, aim, units),
        });
    };

    let homing_target = if kind == AttackKind::Homing {
        acquire_homing_target(actor, aim, units)
    } else {
        None
    };

    Ok(AttackPlan::Projectile {
        kind,
        aim_point,
        homing_target,
    })
}

/// Unit hit by a degraded attack: the named or nearest covering unit, when it
/// is alive, not the actor and within attack range.
fn direct_target(actor: &UnitSnapshot, aim: AttackAim, units: &UnitView) -> Option<UnitId> {
    let range = actor.stats.attack_range;
    let in_reach = |unit: &&UnitSnapshot| {
        unit.id != actor.id
            && unit.is_alive()
            && actor.tile.manhattan_distance(unit.tile) <= range
    };
    match aim {
        AttackAim::Unit(id) => units.get_alive(id).filter(in_reach).map(|unit| unit.id),
        AttackAim::Point(point) => units
            .iter()
            .filter(in_reach)
            .filter(|unit| unit.bounds_contain(point))
            .min_by(|a, b| {
                a.position
                    .distance_squared(point)
                    .total_cmp(&b.position.distance_squared(point))
                    .then(a.id.cmp(&b.id))
            })
            .map(|unit| unit.id),
    }
}
