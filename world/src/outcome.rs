//! Mutating half of combat outcomes: health, death windows, rewards and removal.

use skirmish_core::{Event, Lifecycle, PositionRegistry, UnitCategory, UnitId};
use skirmish_system_combat::{experience_share, mitigate, reward_recipients};

use crate::{query, World};

/// Applies mitigated damage to a live unit.
///
/// Dead or missing targets absorb nothing. The killing blow records the
/// attacker, suspends movement and targeting, and starts the death window.
pub(crate) fn apply_damage(
    world: &mut World,
    target: UnitId,
    raw: u32,
    attacker: Option<UnitId>,
    out_events: &mut Vec<Event>,
) {
    let now = world.clock;
    let Some(unit) = world.units.get_mut(&target) else {
        return;
    };
    if !unit.lifecycle.is_alive() {
        return;
    }

    let damage = mitigate(raw, unit.stats.defense);
    unit.stats.health.lose(damage);

    if !unit.stats.health.is_depleted() {
        out_events.push(Event::UnitHit {
            unit: target,
            damage,
            attacker,
        });
        return;
    }

    unit.killed_by = attacker;
    unit.lifecycle = Lifecycle::Dying { since: now };
    unit.motion.stop();
    unit.target = None;
    tracing::info!(
        unit = target.get(),
        killed_by = ?attacker.map(|id| id.get()),
        "unit died"
    );
    out_events.push(Event::UnitDied {
        unit: target,
        killed_by: attacker,
    });
}

/// Removes every unit whose death window elapsed, distributing its rewards first.
pub(crate) fn sweep_dead(world: &mut World, out_events: &mut Vec<Event>) {
    let now = world.clock;
    let expired: Vec<UnitId> = world
        .units
        .values()
        .filter(|unit| unit.death_window_elapsed(now))
        .map(|unit| unit.id)
        .collect();

    for id in expired {
        if let Some(unit) = world.units.get_mut(&id) {
            unit.lifecycle = Lifecycle::PendingRemoval;
        }
        distribute_rewards(world, id, out_events);
        remove_unit(world, id, out_events);
    }
}

fn distribute_rewards(world: &mut World, id: UnitId, out_events: &mut Vec<Event>) {
    let Some(dead) = world.units.get(&id) else {
        return;
    };
    let rewards = dead.rewards;
    let tile = dead.motion.tile();
    let killed_by = dead.killed_by;

    if rewards.experience > 0 {
        let recipients = reward_recipients(tile, &query::unit_view(world));
        let share = experience_share(rewards.experience, recipients.len());
        if recipients.is_empty() {
            tracing::debug!(unit = id.get(), "no hero nearby, experience discarded");
        }
        if share > 0 {
            for hero in recipients {
                if let Some(progress) = world
                    .units
                    .get_mut(&hero)
                    .and_then(|unit| unit.progress.as_mut())
                {
                    progress.experience = progress.experience.saturating_add(share);
                    tracing::info!(hero = hero.get(), amount = share, "experience awarded");
                    out_events.push(Event::ExperienceAwarded {
                        unit: hero,
                        amount: share,
                    });
                }
            }
        }
    }

    if rewards.gold == 0 {
        return;
    }
    let Some(killer) = killed_by else {
        return;
    };
    let Some(unit) = world.units.get_mut(&killer) else {
        return;
    };
    if unit.category != UnitCategory::Hero {
        return;
    }
    if let Some(progress) = unit.progress.as_mut() {
        progress.gold = progress.gold.saturating_add(rewards.gold);
        tracing::info!(hero = killer.get(), amount = rewards.gold, "gold awarded");
        out_events.push(Event::GoldAwarded {
            unit: killer,
            amount: rewards.gold,
        });
    }
}

pub(crate) fn remove_unit(world: &mut World, id: UnitId, out_events: &mut Vec<Event>) {
    let Some(unit) = world.units.remove(&id) else {
        return;
    };
    let tile = unit.motion.tile();
    world.occupancy.remove_position(id, tile);

    for other in world.units.values_mut() {
        if other.target == Some(id) {
            other.target = None;
        }
    }

    tracing::info!(unit = id.get(), ?tile, "unit removed");
    out_events.push(Event::UnitRemoved { unit: id, tile });
}
