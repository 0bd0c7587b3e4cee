//! Fixed tuning constants shared by the world and the systems.

use std::time::Duration;

use glam::Vec2;

/// Remaining distance (display units) below which a waypoint counts as reached.
pub const ARRIVAL_THRESHOLD: f32 = 5.0;

/// Default travel speed in display units per second.
pub const DEFAULT_MOVEMENT_SPEED: f32 = 120.0;

/// Half-extents of the screen-space hit box centred on a unit.
pub const HIT_HALF_EXTENTS: Vec2 = Vec2::new(20.0, 24.0);

/// Manhattan distance at or below which autonomous actors prefer melee.
pub const MELEE_PREFERENCE_DISTANCE: u32 = 2;

/// Travel speed of linear projectiles in display units per second.
pub const LINEAR_SPEED: f32 = 360.0;

/// Lifetime of linear projectiles.
pub const LINEAR_LIFETIME: Duration = Duration::from_secs(3);

/// Travel speed of homing projectiles in display units per second.
pub const HOMING_SPEED: f32 = 240.0;

/// Lifetime of homing projectiles.
pub const HOMING_LIFETIME: Duration = Duration::from_secs(5);

/// Fraction of the desired velocity blended into a homing projectile per tick.
pub const HOMING_TURN_RATE: f32 = 0.15;

/// Duration of a full melee half-circle swing.
pub const SWING_DURATION: Duration = Duration::from_millis(300);

/// Hard cap on a melee swing's lifetime.
pub const SWING_TIMEOUT: Duration = Duration::from_millis(1_000);

/// Display-space swing radius contributed by each tile of attack range.
pub const SWING_RADIUS_PER_TILE: f32 = 40.0;

/// Time a dead unit spends in the death animation before removal.
pub const DEATH_WINDOW: Duration = Duration::from_millis(1_000);

/// Manhattan radius within which heroes share death experience.
pub const REWARD_RADIUS: u32 = 80;

/// Default wander radius in tiles.
pub const WANDER_RADIUS: u32 = 3;

/// Default delay between wander decisions.
pub const WANDER_INTERVAL: Duration = Duration::from_millis(3_000);

/// Default chase acquisition range in Manhattan tiles.
pub const CHASE_RANGE: u32 = 6;

/// Default leash distance from home in Manhattan tiles.
pub const CHASE_LEASH: u32 = 12;

/// Default delay between chase acquisition scans.
pub const CHASE_SCAN_INTERVAL: Duration = Duration::from_millis(500);

/// Extra tiles beyond the chase range before a target is considered lost.
pub const CHASE_TOLERANCE_MARGIN: u32 = 2;
