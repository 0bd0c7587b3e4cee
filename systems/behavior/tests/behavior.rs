use std::time::Duration;

use skirmish_core::{
    tuning, AttackAim, BehaviorConfig, ChaseConfig, Command, CombatStats, Event, Lifecycle,
    Rewards, TileCoord, UnitCategory, UnitId, UnitSnapshot, UnitView, WanderConfig,
};
use skirmish_system_behavior::{Behaviors, Config};

const STEP: Duration = Duration::from_millis(500);

#[test]
fn wander_waits_for_interval_and_stays_near_home() {
    let home = TileCoord::new(10, 10);
    let view = UnitView::from_snapshots(vec![mob(1, home, wander_only())]);
    let mut behaviors = Behaviors::new(Config::new(3));

    let mut goals = Vec::new();
    for step in 1..=60u32 {
        let commands = run(&mut behaviors, &view, STEP);
        if step * 500 < 3_500 {
            assert!(commands.is_empty(), "wandered before the interval: {commands:?}");
        }
        for command in commands {
            match command {
                Command::MoveUnit { unit, goal } => {
                    assert_eq!(unit, UnitId::new(1));
                    goals.push(goal);
                }
                other => panic!("unexpected command {other:?}"),
            }
        }
    }

    assert!(!goals.is_empty());
    assert!(goals.len() <= 10, "at most one roll per interval");
    for goal in goals {
        assert!(goal.chebyshev_distance(home) <= tuning::WANDER_RADIUS);
        assert_ne!(goal, home);
    }
}

#[test]
fn chase_acquires_nearest_hero_and_closes_in() {
    let view = UnitView::from_snapshots(vec![
        mob(1, TileCoord::new(0, 0), BehaviorConfig::default()),
        hero(2, TileCoord::new(4, 0)),
        hero(3, TileCoord::new(0, 5)),
    ]);
    let mut behaviors = Behaviors::new(Config::new(0));

    let commands = run(&mut behaviors, &view, Duration::ZERO);

    assert_eq!(
        commands,
        vec![
            Command::SetCombatTarget {
                unit: UnitId::new(1),
                target: Some(UnitId::new(2)),
            },
            Command::MoveUnit {
                unit: UnitId::new(1),
                goal: TileCoord::new(3, 0),
            },
        ]
    );
}

#[test]
fn heroes_beyond_chase_range_are_ignored() {
    let view = UnitView::from_snapshots(vec![
        mob(1, TileCoord::new(0, 0), chase_only()),
        hero(2, TileCoord::new(tuning::CHASE_RANGE as i32 + 1, 0)),
    ]);
    let mut behaviors = Behaviors::new(Config::new(0));

    for _ in 0..4 {
        assert!(run(&mut behaviors, &view, STEP).is_empty());
    }
}

#[test]
fn leash_sends_unit_back_home() {
    let mut chaser = mob(1, TileCoord::new(13, 0), chase_only());
    chaser.home = TileCoord::new(0, 0);
    chaser.target = Some(UnitId::new(2));
    let view = UnitView::from_snapshots(vec![chaser, hero(2, TileCoord::new(15, 0))]);
    let mut behaviors = Behaviors::new(Config::new(0));

    let commands = run(&mut behaviors, &view, STEP);

    assert_eq!(
        commands,
        vec![
            Command::SetCombatTarget {
                unit: UnitId::new(1),
                target: None,
            },
            Command::MoveUnit {
                unit: UnitId::new(1),
                goal: TileCoord::new(0, 0),
            },
        ]
    );
}

#[test]
fn returning_unit_does_not_rescan_while_walking_home() {
    let mut chaser = mob(1, TileCoord::new(13, 0), chase_only());
    chaser.home = TileCoord::new(0, 0);
    chaser.target = Some(UnitId::new(2));
    let target = hero(2, TileCoord::new(15, 0));
    let mut behaviors = Behaviors::new(Config::new(0));
    let _ = run(
        &mut behaviors,
        &UnitView::from_snapshots(vec![chaser.clone(), target.clone()]),
        STEP,
    );

    chaser.target = None;
    chaser.tile = TileCoord::new(12, 0);
    chaser.destination = Some(TileCoord::new(0, 0));
    let walking = UnitView::from_snapshots(vec![chaser, target]);
    for _ in 0..3 {
        assert!(run(&mut behaviors, &walking, STEP).is_empty());
    }
}

#[test]
fn target_in_reach_is_attacked_once_per_cooldown() {
    let mut chaser = mob(1, TileCoord::new(0, 0), BehaviorConfig::default());
    chaser.target = Some(UnitId::new(2));
    let view = UnitView::from_snapshots(vec![chaser, hero(2, TileCoord::new(1, 0))]);
    let mut behaviors = Behaviors::new(Config::new(0));
    let attack = Command::Attack {
        unit: UnitId::new(1),
        kind: None,
        aim: AttackAim::Unit(UnitId::new(2)),
    };

    assert_eq!(run(&mut behaviors, &view, Duration::ZERO), vec![attack.clone()]);
    assert!(run(&mut behaviors, &view, Duration::from_millis(400)).is_empty());
    assert!(run(&mut behaviors, &view, Duration::from_millis(400)).is_empty());
    assert_eq!(
        run(&mut behaviors, &view, Duration::from_millis(200)),
        vec![attack]
    );
}

#[test]
fn active_chase_suppresses_wander() {
    let mut chaser = mob(1, TileCoord::new(0, 0), BehaviorConfig::default());
    chaser.target = Some(UnitId::new(2));
    let view = UnitView::from_snapshots(vec![chaser, hero(2, TileCoord::new(0, 1))]);
    let mut behaviors = Behaviors::new(Config::new(9));

    for _ in 0..20 {
        for command in run(&mut behaviors, &view, STEP) {
            assert!(
                matches!(command, Command::Attack { .. }),
                "unexpected command {command:?}"
            );
        }
    }
}

#[test]
fn dead_target_is_released() {
    let mut chaser = mob(1, TileCoord::new(0, 0), BehaviorConfig::default());
    chaser.target = Some(UnitId::new(2));
    let mut fallen = hero(2, TileCoord::new(1, 0));
    fallen.lifecycle = Lifecycle::Dying {
        since: Duration::ZERO,
    };
    let view = UnitView::from_snapshots(vec![chaser, fallen]);
    let mut behaviors = Behaviors::new(Config::new(0));

    assert_eq!(
        run(&mut behaviors, &view, STEP),
        vec![Command::SetCombatTarget {
            unit: UnitId::new(1),
            target: None,
        }]
    );
}

#[test]
fn target_leaving_tolerance_is_released() {
    let mut chaser = mob(1, TileCoord::new(0, 0), chase_only());
    chaser.target = Some(UnitId::new(2));
    let distance = ChaseConfig::default().tolerance() as i32 + 1;
    let view = UnitView::from_snapshots(vec![chaser, hero(2, TileCoord::new(distance, 0))]);
    let mut behaviors = Behaviors::new(Config::new(0));

    assert_eq!(
        run(&mut behaviors, &view, STEP),
        vec![Command::SetCombatTarget {
            unit: UnitId::new(1),
            target: None,
        }]
    );
}

#[test]
fn disabled_chase_ignores_adjacent_heroes() {
    let view = UnitView::from_snapshots(vec![
        mob(1, TileCoord::new(0, 0), wander_only()),
        hero(2, TileCoord::new(1, 0)),
    ]);
    let mut behaviors = Behaviors::new(Config::new(0));

    for _ in 0..10 {
        for command in run(&mut behaviors, &view, STEP) {
            assert!(matches!(command, Command::MoveUnit { .. }));
        }
    }
}

#[test]
fn heroes_with_chase_do_not_hunt_other_heroes() {
    let mut guard = hero(1, TileCoord::new(0, 0));
    guard.behavior = Some(chase_only());
    let view = UnitView::from_snapshots(vec![guard, hero(2, TileCoord::new(2, 0))]);
    let mut behaviors = Behaviors::new(Config::new(0));

    for _ in 0..4 {
        assert!(run(&mut behaviors, &view, STEP).is_empty());
    }
}

#[test]
fn same_seed_replays_identical_wander() {
    let units = (1..=4)
        .map(|id| mob(id, TileCoord::new(id as i32 * 8, 8), wander_only()))
        .collect();
    let view = UnitView::from_snapshots(units);
    let mut first = Behaviors::new(Config::new(1234));
    let mut second = Behaviors::new(Config::new(1234));

    for _ in 0..40 {
        assert_eq!(
            run(&mut first, &view, STEP),
            run(&mut second, &view, STEP)
        );
    }
}

fn run(behaviors: &mut Behaviors, view: &UnitView, dt: Duration) -> Vec<Command> {
    let mut out = Vec::new();
    let events = [Event::TimeAdvanced { dt }];
    behaviors.handle(&events, view, &|_: TileCoord| true, &mut out);
    out
}

fn wander_only() -> BehaviorConfig {
    BehaviorConfig {
        chase: ChaseConfig {
            enabled: false,
            ..ChaseConfig::default()
        },
        wander: WanderConfig::default(),
    }
}

fn chase_only() -> BehaviorConfig {
    BehaviorConfig {
        chase: ChaseConfig::default(),
        wander: WanderConfig {
            enabled: false,
            ..WanderConfig::default()
        },
    }
}

fn mob(id: u32, tile: TileCoord, behavior: BehaviorConfig) -> UnitSnapshot {
    let mut unit = snapshot(id, UnitCategory::Mob, tile);
    unit.behavior = Some(behavior);
    unit
}

fn hero(id: u32, tile: TileCoord) -> UnitSnapshot {
    snapshot(id, UnitCategory::Hero, tile)
}

fn snapshot(id: u32, category: UnitCategory, tile: TileCoord) -> UnitSnapshot {
    UnitSnapshot {
        id: UnitId::new(id),
        category,
        tile,
        position: tile.to_display(),
        home: tile,
        stats: CombatStats::default(),
        movement_speed: tuning::DEFAULT_MOVEMENT_SPEED,
        lifecycle: Lifecycle::Alive,
        target: None,
        killed_by: None,
        destination: None,
        behavior: None,
        rewards: Rewards::default(),
        progress: None,
    }
}
