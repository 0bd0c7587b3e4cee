use std::time::Duration;

use glam::Vec2;
use skirmish_core::{
    AttackAim, AttackKind, AttackProfile, AttackRejection, CombatStats, Command, Event,
    ExpiryReason, GridBounds, Health, Lifecycle, Rewards, TileCoord, UnitCategory, UnitId,
    UnitSpec,
};
use skirmish_world::{self as world, query, World};

const TICK: Duration = Duration::from_millis(16);

#[test]
fn defense_never_reduces_damage_below_one() {
    let mut world = grid(10, 10);
    let attacker = spawn(
        &mut world,
        UnitSpec::new(UnitCategory::Mob, TileCoord::new(0, 0)).with_stats(CombatStats {
            attack: 3,
            profile: AttackProfile::default(),
            ..CombatStats::default()
        }),
    );
    let target = spawn(
        &mut world,
        UnitSpec::new(UnitCategory::Mob, TileCoord::new(1, 0)).with_stats(CombatStats {
            health: Health::new(50),
            defense: 5,
            ..CombatStats::default()
        }),
    );

    let events = run(
        &mut world,
        Command::Attack {
            unit: attacker,
            kind: None,
            aim: AttackAim::Unit(target),
        },
    );

    assert_eq!(
        events,
        vec![
            Event::AttackDegraded {
                unit: attacker,
                requested: None,
            },
            Event::UnitHit {
                unit: target,
                damage: 1,
                attacker: Some(attacker),
            },
        ]
    );
    let health = query::unit(&world, target).expect("target").stats.health;
    assert_eq!(health.current(), 49);
}

#[test]
fn melee_swing_damages_an_adjacent_unit_once() {
    let mut world = grid(10, 10);
    let hero = spawn(
        &mut world,
        UnitSpec::new(UnitCategory::Hero, TileCoord::new(0, 0)),
    );
    let mob = spawn(&mut world, UnitSpec::new(UnitCategory::Mob, TileCoord::new(1, 0)));

    let attack = run(
        &mut world,
        Command::Attack {
            unit: hero,
            kind: None,
            aim: AttackAim::Unit(mob),
        },
    );
    assert!(attack.contains(&Event::AttackPerformed {
        unit: hero,
        kind: AttackKind::Melee,
    }));

    let events = tick_for(&mut world, Duration::from_millis(400));

    let hits: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, Event::UnitHit { .. }))
        .collect();
    assert_eq!(hits.len(), 1);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::ProjectileExpired {
            reason: ExpiryReason::SwingComplete,
            ..
        }
    )));
    assert!(query::projectiles(&world).is_empty());
    assert_eq!(
        query::unit(&world, mob).expect("mob").stats.health.current(),
        90
    );
}

#[test]
fn long_reach_swing_still_hits_an_adjacent_unit() {
    let mut world = grid(10, 10);
    let brawler = spawn(
        &mut world,
        UnitSpec::new(UnitCategory::Mob, TileCoord::new(2, 2)).with_stats(CombatStats {
            attack_range: 3,
            profile: AttackProfile::with_kinds(&[AttackKind::Melee]),
            ..CombatStats::default()
        }),
    );
    let hero = spawn(&mut world, UnitSpec::new(UnitCategory::Hero, TileCoord::new(3, 2)));

    let attack = run(
        &mut world,
        Command::Attack {
            unit: brawler,
            kind: None,
            aim: AttackAim::Unit(hero),
        },
    );
    assert!(attack.contains(&Event::AttackPerformed {
        unit: brawler,
        kind: AttackKind::Melee,
    }));

    let events = tick_for(&mut world, Duration::from_millis(1_200));
    let hits = events
        .iter()
        .filter(|event| matches!(event, Event::UnitHit { unit, .. } if *unit == hero))
        .count();
    assert_eq!(hits, 1);
    assert_eq!(
        query::unit(&world, hero).expect("hero").stats.health.current(),
        90
    );
}

#[test]
fn shrinking_the_grid_removes_stranded_units() {
    let mut world = grid(10, 10);
    let inside = spawn(&mut world, UnitSpec::new(UnitCategory::Mob, TileCoord::new(1, 1)));
    let outside = spawn(&mut world, UnitSpec::new(UnitCategory::Mob, TileCoord::new(8, 8)));

    let events = run(
        &mut world,
        Command::ConfigureGrid {
            bounds: GridBounds::new(4, 4),
        },
    );

    assert_eq!(
        events,
        vec![
            Event::GridConfigured {
                bounds: GridBounds::new(4, 4),
            },
            Event::UnitRemoved {
                unit: outside,
                tile: TileCoord::new(8, 8),
            },
        ]
    );
    assert!(query::unit(&world, outside).is_none());
    assert!(query::unit(&world, inside).is_some());

    let respawn = run(
        &mut world,
        Command::SpawnUnit {
            spec: UnitSpec::new(UnitCategory::Mob, TileCoord::new(1, 1)),
        },
    );
    assert!(matches!(
        respawn.as_slice(),
        [Event::UnitSpawnRejected { .. }]
    ));
}

#[test]
fn hero_kill_awards_experience_and_gold_after_death_window() {
    let mut world = grid(10, 10);
    let hero = spawn(
        &mut world,
        UnitSpec::new(UnitCategory::Hero, TileCoord::new(0, 0)),
    );
    let mob = spawn(
        &mut world,
        UnitSpec::new(UnitCategory::Mob, TileCoord::new(1, 0))
            .with_stats(CombatStats {
                health: Health::new(5),
                ..CombatStats::default()
            })
            .with_rewards(Rewards {
                experience: 40,
                gold: 7,
            }),
    );

    let _ = run(
        &mut world,
        Command::Attack {
            unit: hero,
            kind: Some(AttackKind::Melee),
            aim: AttackAim::Unit(mob),
        },
    );
    let events = tick_for(&mut world, Duration::from_millis(320));
    assert!(events.contains(&Event::UnitDied {
        unit: mob,
        killed_by: Some(hero),
    }));

    let dying = query::unit(&world, mob).expect("still registered");
    assert!(matches!(dying.lifecycle, Lifecycle::Dying { .. }));
    assert_eq!(dying.killed_by, Some(hero));
    assert_eq!(query::occupant(&world, TileCoord::new(1, 0)), Some(mob));
    assert!(run(&mut world, Command::SweepDead).is_empty());

    let _ = tick_for(&mut world, Duration::from_millis(1_000));
    let swept = run(&mut world, Command::SweepDead);

    assert_eq!(
        swept,
        vec![
            Event::ExperienceAwarded {
                unit: hero,
                amount: 40,
            },
            Event::GoldAwarded {
                unit: hero,
                amount: 7,
            },
            Event::UnitRemoved {
                unit: mob,
                tile: TileCoord::new(1, 0),
            },
        ]
    );
    assert!(query::unit(&world, mob).is_none());
    assert!(query::is_passable(&world, TileCoord::new(1, 0)));
    let progress = query::unit(&world, hero)
        .and_then(|unit| unit.progress)
        .expect("hero progress");
    assert_eq!((progress.experience, progress.gold), (40, 7));
}

#[test]
fn experience_skips_distant_heroes_and_gold_needs_a_hero_killer() {
    let mut world = grid(100, 100);
    let near = spawn(
        &mut world,
        UnitSpec::new(UnitCategory::Hero, TileCoord::new(15, 15)),
    );
    let far = spawn(
        &mut world,
        UnitSpec::new(UnitCategory::Hero, TileCoord::new(55, 55)),
    );
    let killer = spawn(
        &mut world,
        UnitSpec::new(UnitCategory::Mob, TileCoord::new(9, 10)).with_stats(CombatStats {
            attack: 500,
            profile: AttackProfile::default(),
            ..CombatStats::default()
        }),
    );
    let victim = spawn(
        &mut world,
        UnitSpec::new(UnitCategory::Mob, TileCoord::new(10, 10)).with_rewards(Rewards {
            experience: 100,
            gold: 25,
        }),
    );

    let _ = run(
        &mut world,
        Command::Attack {
            unit: killer,
            kind: None,
            aim: AttackAim::Unit(victim),
        },
    );
    let _ = tick_for(&mut world, Duration::from_millis(1_000));
    let swept = run(&mut world, Command::SweepDead);

    assert_eq!(
        swept,
        vec![
            Event::ExperienceAwarded {
                unit: near,
                amount: 100,
            },
            Event::UnitRemoved {
                unit: victim,
                tile: TileCoord::new(10, 10),
            },
        ]
    );
    let far_progress = query::unit(&world, far).and_then(|unit| unit.progress);
    assert_eq!(far_progress.map(|progress| progress.experience), Some(0));
}

#[test]
fn homing_without_a_target_expires_on_the_next_tick() {
    let mut world = grid(10, 10);
    let caster = spawn(
        &mut world,
        UnitSpec::new(UnitCategory::Hero, TileCoord::new(0, 0)).with_stats(CombatStats {
            attack_range: 5,
            profile: AttackProfile::with_kinds(&[AttackKind::Homing]),
            ..CombatStats::default()
        }),
    );
    let bystander = spawn(&mut world, UnitSpec::new(UnitCategory::Mob, TileCoord::new(2, 2)));

    let fired = run(
        &mut world,
        Command::Attack {
            unit: caster,
            kind: Some(AttackKind::Homing),
            aim: AttackAim::Point(Vec2::new(250.0, -250.0)),
        },
    );
    assert!(fired
        .iter()
        .any(|event| matches!(event, Event::ProjectileSpawned { .. })));

    let events = run(&mut world, Command::Tick { dt: TICK });

    assert!(events.iter().any(|event| matches!(
        event,
        Event::ProjectileExpired {
            reason: ExpiryReason::TargetLost,
            ..
        }
    )));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::UnitHit { .. } | Event::UnitDied { .. })));
    assert_eq!(
        query::unit(&world, bystander).expect("bystander").stats.health.current(),
        100
    );
}

#[test]
fn attacks_respect_cooldown_and_actor_state() {
    let mut world = grid(10, 10);
    let attacker = spawn(
        &mut world,
        UnitSpec::new(UnitCategory::Mob, TileCoord::new(0, 0)).with_stats(CombatStats {
            attack: 1,
            profile: AttackProfile::default(),
            ..CombatStats::default()
        }),
    );
    let target = spawn(&mut world, UnitSpec::new(UnitCategory::Mob, TileCoord::new(1, 0)));
    let attack = Command::Attack {
        unit: attacker,
        kind: None,
        aim: AttackAim::Unit(target),
    };

    let _ = run(&mut world, attack.clone());
    assert_eq!(
        run(&mut world, attack.clone()),
        vec![Event::AttackRejected {
            unit: attacker,
            reason: AttackRejection::Cooldown,
        }]
    );

    let _ = tick_for(&mut world, Duration::from_millis(1_000));
    assert!(run(&mut world, attack.clone())
        .iter()
        .any(|event| matches!(event, Event::UnitHit { .. })));

    assert_eq!(
        run(
            &mut world,
            Command::Attack {
                unit: UnitId::new(99),
                kind: None,
                aim: AttackAim::Unit(target),
            }
        ),
        vec![Event::AttackRejected {
            unit: UnitId::new(99),
            reason: AttackRejection::ActorUnavailable,
        }]
    );
}

#[test]
fn move_unit_walks_around_obstacles_and_updates_occupancy() {
    let mut world = grid(8, 8);
    for y in 0..4 {
        let _ = run(
            &mut world,
            Command::PlaceObstacle {
                tile: TileCoord::new(2, y),
            },
        );
    }
    let unit = spawn(&mut world, UnitSpec::new(UnitCategory::Mob, TileCoord::new(0, 0)));

    let assigned = run(
        &mut world,
        Command::MoveUnit {
            unit,
            goal: TileCoord::new(4, 0),
        },
    );
    let Some(Event::PathAssigned { path, .. }) = assigned.first() else {
        panic!("expected a path, got {assigned:?}");
    };
    assert_eq!(path.first(), Some(&TileCoord::new(0, 0)));
    assert_eq!(path.last(), Some(&TileCoord::new(4, 0)));

    let mut moves = Vec::new();
    let mut finished = false;
    for _ in 0..2_000 {
        for event in run(&mut world, Command::Tick { dt: TICK }) {
            match event {
                Event::UnitMoved { from, to, .. } => moves.push((from, to)),
                Event::MovementFinished { tile, .. } => {
                    assert_eq!(tile, TileCoord::new(4, 0));
                    finished = true;
                }
                _ => {}
            }
        }
        if finished {
            break;
        }
    }

    assert!(finished);
    assert!(moves.iter().all(|(_, to)| to.x() != 2 || to.y() >= 4));
    for pair in moves.windows(2) {
        assert_eq!(pair[0].1, pair[1].0);
    }
    assert_eq!(query::occupant(&world, TileCoord::new(4, 0)), Some(unit));
    assert_eq!(query::occupant(&world, TileCoord::new(0, 0)), None);
    let snapshot = query::unit(&world, unit).expect("unit");
    assert!(!snapshot.is_moving());
    assert_eq!(snapshot.position, TileCoord::new(4, 0).to_display());
}

#[test]
fn unreachable_goal_reports_no_path() {
    let mut world = grid(5, 5);
    let unit = spawn(&mut world, UnitSpec::new(UnitCategory::Mob, TileCoord::new(0, 0)));
    let blocker = spawn(&mut world, UnitSpec::new(UnitCategory::Mob, TileCoord::new(4, 4)));

    let events = run(
        &mut world,
        Command::MoveUnit {
            unit,
            goal: TileCoord::new(4, 4),
        },
    );

    assert_eq!(
        events,
        vec![Event::PathNotFound {
            unit,
            goal: TileCoord::new(4, 4),
        }]
    );
    assert_eq!(query::occupant(&world, TileCoord::new(4, 4)), Some(blocker));
}

#[test]
fn follow_path_rejects_detached_paths() {
    let mut world = grid(5, 5);
    let unit = spawn(&mut world, UnitSpec::new(UnitCategory::Mob, TileCoord::new(1, 1)));

    let rejected = run(
        &mut world,
        Command::FollowPath {
            unit,
            path: vec![TileCoord::new(3, 3), TileCoord::new(4, 4)],
        },
    );
    assert_eq!(
        rejected,
        vec![Event::PathNotFound {
            unit,
            goal: TileCoord::new(4, 4),
        }]
    );

    let accepted = run(
        &mut world,
        Command::FollowPath {
            unit,
            path: vec![TileCoord::new(1, 1), TileCoord::new(1, 3)],
        },
    );
    assert!(matches!(accepted.as_slice(), [Event::PathAssigned { .. }]));

    let stopped = run(&mut world, Command::StopUnit { unit });
    assert_eq!(
        stopped,
        vec![Event::MovementFinished {
            unit,
            tile: TileCoord::new(1, 1),
        }]
    );
}

fn grid(columns: u32, rows: u32) -> World {
    let mut world = World::new();
    let _ = run(
        &mut world,
        Command::ConfigureGrid {
            bounds: GridBounds::new(columns, rows),
        },
    );
    world
}

fn spawn(world: &mut World, spec: UnitSpec) -> UnitId {
    let events = run(world, Command::SpawnUnit { spec });
    match events.as_slice() {
        [Event::UnitSpawned { unit, .. }] => *unit,
        other => panic!("spawn failed: {other:?}"),
    }
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn tick_for(world: &mut World, total: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        world::apply(world, Command::Tick { dt: TICK }, &mut events);
        elapsed += TICK;
    }
    events
}
