#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish tactical engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! (including fire-and-forget animation triggers) for systems and presentation
//! layers to react to. Systems consume event streams, query immutable
//! [`UnitView`] snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub mod tuning;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Skirmish tactical core ready.";

/// Horizontal half-extent of the isometric projection (the `A` constant).
pub const ISO_HALF_WIDTH: f32 = 32.0;

/// Vertical half-extent of the isometric projection (the `B` constant).
pub const ISO_HALF_HEIGHT: f32 = 16.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the logical bounds of the tile grid.
    ConfigureGrid {
        /// Grid extents; tiles outside are impassable.
        bounds: GridBounds,
    },
    /// Marks a tile as a static impassable obstacle.
    PlaceObstacle {
        /// Tile that becomes blocked.
        tile: TileCoord,
    },
    /// Clears a previously placed static obstacle.
    RemoveObstacle {
        /// Tile that becomes traversable again.
        tile: TileCoord,
    },
    /// Places a new unit into the world.
    SpawnUnit {
        /// Full description of the unit to create.
        spec: UnitSpec,
    },
    /// Advances the simulation clock, movement and projectiles by `dt`.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a unit travel to the provided tile using the pathfinder.
    MoveUnit {
        /// Unit that should move.
        unit: UnitId,
        /// Destination tile.
        goal: TileCoord,
    },
    /// Assigns a precomputed path to a unit.
    FollowPath {
        /// Unit that should follow the path.
        unit: UnitId,
        /// Waypoints starting at the unit's current tile.
        path: Vec<TileCoord>,
    },
    /// Cancels any in-flight path-follow for the unit.
    StopUnit {
        /// Unit that should halt.
        unit: UnitId,
    },
    /// Requests that a unit perform an attack.
    Attack {
        /// Acting unit.
        unit: UnitId,
        /// Explicit attack kind, or `None` to let the resolver choose.
        kind: Option<AttackKind>,
        /// Target unit or display-space aim point.
        aim: AttackAim,
    },
    /// Replaces the unit's combat target reference.
    SetCombatTarget {
        /// Unit whose target changes.
        unit: UnitId,
        /// New target, or `None` to clear it.
        target: Option<UnitId>,
    },
    /// Enables or disables one behavior in a unit's behavior stack.
    SetBehaviorEnabled {
        /// Unit that owns the behavior stack.
        unit: UnitId,
        /// Behavior to toggle.
        behavior: BehaviorKind,
        /// Desired enabled flag.
        enabled: bool,
    },
    /// Removes units whose death-animation window has elapsed.
    SweepDead,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the grid bounds changed.
    GridConfigured {
        /// New grid extents.
        bounds: GridBounds,
    },
    /// Confirms that a unit was placed into the world.
    UnitSpawned {
        /// Identifier allocated to the unit.
        unit: UnitId,
        /// Category of the unit.
        category: UnitCategory,
        /// Tile the unit occupies.
        tile: TileCoord,
    },
    /// Reports that a spawn request was rejected.
    UnitSpawnRejected {
        /// Requested spawn tile.
        tile: TileCoord,
        /// Reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that a unit started following a new path.
    PathAssigned {
        /// Unit that received the path.
        unit: UnitId,
        /// Waypoints the unit will visit, including its current tile.
        path: Vec<TileCoord>,
    },
    /// Reports that no path could be found; the unit stays put.
    PathNotFound {
        /// Unit whose movement request failed.
        unit: UnitId,
        /// Requested destination.
        goal: TileCoord,
    },
    /// Confirms that a unit completed a tile transition.
    UnitMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Tile occupied before the transition.
        from: TileCoord,
        /// Tile occupied after the transition.
        to: TileCoord,
    },
    /// Animation trigger emitted when a unit's movement direction changes.
    FacingChanged {
        /// Unit that turned.
        unit: UnitId,
        /// New facing.
        facing: Facing,
    },
    /// Reports that a unit reached the end of its waypoint list.
    MovementFinished {
        /// Unit that became idle.
        unit: UnitId,
        /// Tile the unit stopped on.
        tile: TileCoord,
    },
    /// Animation trigger emitted when a unit executes an attack.
    AttackPerformed {
        /// Attacking unit.
        unit: UnitId,
        /// Attack kind that was executed.
        kind: AttackKind,
    },
    /// Reports that an attack request was rejected without effect.
    AttackRejected {
        /// Unit that attempted the attack.
        unit: UnitId,
        /// Specific reason the attack failed.
        reason: AttackRejection,
    },
    /// Reports that an attack fell back to direct damage (capability error).
    AttackDegraded {
        /// Unit that attempted the attack.
        unit: UnitId,
        /// Kind that was requested but is not enabled, if any.
        requested: Option<AttackKind>,
    },
    /// Confirms that a projectile entered the world.
    ProjectileSpawned {
        /// Identifier allocated to the projectile.
        projectile: ProjectileId,
        /// Unit that fired the projectile.
        owner: UnitId,
        /// Kinematic variant of the projectile.
        kind: AttackKind,
    },
    /// Confirms that a projectile left the world.
    ProjectileExpired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Why the projectile was destroyed.
        reason: ExpiryReason,
    },
    /// Animation trigger emitted when a unit survives a hit.
    UnitHit {
        /// Unit that was damaged.
        unit: UnitId,
        /// Damage actually applied after mitigation.
        damage: u32,
        /// Unit credited with the hit, if any.
        attacker: Option<UnitId>,
    },
    /// Animation trigger emitted when a unit's health reaches zero.
    UnitDied {
        /// Unit that entered the dying state.
        unit: UnitId,
        /// Unit credited with the killing blow, if any.
        killed_by: Option<UnitId>,
    },
    /// Reports experience credited to a hero.
    ExperienceAwarded {
        /// Hero receiving experience.
        unit: UnitId,
        /// Amount credited.
        amount: u32,
    },
    /// Reports gold credited to a hero.
    GoldAwarded {
        /// Hero receiving gold.
        unit: UnitId,
        /// Amount credited.
        amount: u32,
    },
    /// Confirms that a unit was removed from every registry.
    UnitRemoved {
        /// Unit that was removed.
        unit: UnitId,
        /// Tile the unit occupied when removed.
        tile: TileCoord,
    },
}

/// Unique identifier assigned to a unit.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single tile on the unbounded logical grid.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TileCoord {
    x: i32,
    y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal tile index.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical tile index.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the tile shifted by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Computes the Manhattan distance between two tiles.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Computes the Chebyshev (king-move) distance between two tiles.
    #[must_use]
    pub fn chebyshev_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Projects the tile into continuous display space.
    ///
    /// Uses the fixed isometric projection `((x − y)·A, (x + y)·B)`. The core
    /// only uses the result to measure travel progress and hit overlap.
    #[must_use]
    pub fn to_display(self) -> Vec2 {
        Vec2::new(
            (self.x - self.y) as f32 * ISO_HALF_WIDTH,
            (self.x + self.y) as f32 * ISO_HALF_HEIGHT,
        )
    }

    /// Maps a display-space point back onto the nearest tile.
    #[must_use]
    pub fn from_display(point: Vec2) -> Self {
        let diagonal = point.x / ISO_HALF_WIDTH;
        let depth = point.y / ISO_HALF_HEIGHT;
        Self {
            x: ((depth + diagonal) / 2.0).round() as i32,
            y: ((depth - diagonal) / 2.0).round() as i32,
        }
    }
}

/// Rectangular extents of the playable grid anchored at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    columns: u32,
    rows: u32,
}

impl GridBounds {
    /// Creates grid bounds spanning `columns × rows` tiles.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the tile lies inside the bounds.
    #[must_use]
    pub fn contains(&self, tile: TileCoord) -> bool {
        u32::try_from(tile.x()).map_or(false, |x| x < self.columns)
            && u32::try_from(tile.y()).map_or(false, |y| y < self.rows)
    }
}

/// Answers whether a unit may stand on a tile.
///
/// Implementations must reflect both static obstacles and the current
/// occupancy of other units.
pub trait GridQuery {
    /// Reports whether the tile is free for traversal.
    fn is_passable(&self, tile: TileCoord) -> bool;
}

impl<F> GridQuery for F
where
    F: Fn(TileCoord) -> bool,
{
    fn is_passable(&self, tile: TileCoord) -> bool {
        self(tile)
    }
}

/// Registry tracking which unit stands on which tile.
pub trait PositionRegistry {
    /// Records that the unit now stands on the tile.
    fn register_position(&mut self, unit: UnitId, tile: TileCoord);

    /// Moves the unit's registration between tiles.
    fn update_position(&mut self, unit: UnitId, from: TileCoord, to: TileCoord);

    /// Drops the unit's registration from the tile.
    fn remove_position(&mut self, unit: UnitId, tile: TileCoord);

    /// Returns the unit registered on the tile, if any.
    fn occupant(&self, tile: TileCoord) -> Option<UnitId>;
}

/// Eight-way facing derived from a display-space movement vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Toward increasing display x.
    East,
    /// Toward increasing display x and y.
    SouthEast,
    /// Toward increasing display y.
    South,
    /// Toward decreasing display x and increasing y.
    SouthWest,
    /// Toward decreasing display x.
    West,
    /// Toward decreasing display x and y.
    NorthWest,
    /// Toward decreasing display y.
    North,
    /// Toward increasing display x and decreasing y.
    NorthEast,
}

impl Facing {
    const OCTANTS: [Facing; 8] = [
        Facing::East,
        Facing::SouthEast,
        Facing::South,
        Facing::SouthWest,
        Facing::West,
        Facing::NorthWest,
        Facing::North,
        Facing::NorthEast,
    ];

    /// Maps a display-space direction onto the closest octant.
    ///
    /// Returns `None` for zero-length or non-finite vectors.
    #[must_use]
    pub fn from_vector(direction: Vec2) -> Option<Self> {
        if !direction.is_finite() || direction.length_squared() <= f32::EPSILON {
            return None;
        }

        let angle = direction.y.atan2(direction.x);
        let octant = (angle / std::f32::consts::FRAC_PI_4).round() as i32;
        let index = octant.rem_euclid(8) as usize;
        Some(Self::OCTANTS[index])
    }
}

/// Broad category used for eligibility rules (targeting, rewards).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitCategory {
    /// Player-aligned unit that earns experience and gold.
    Hero,
    /// Autonomous hostile unit.
    Mob,
    /// Immobile unit such as a wall or destructible.
    Structure,
}

impl UnitCategory {
    /// Reports whether units of this category may move.
    #[must_use]
    pub const fn is_mobile(self) -> bool {
        !matches!(self, Self::Structure)
    }
}

/// Kinds of attack a unit may perform, each mapped to one projectile kinematic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    /// Homing projectile that seeks a captured target.
    Homing,
    /// Straight-line projectile.
    Ranged,
    /// Arcing half-circle swing.
    Melee,
}

impl AttackKind {
    /// Fallback order used when the preferred kind is unavailable.
    pub const PRIORITY: [AttackKind; 3] =
        [AttackKind::Homing, AttackKind::Ranged, AttackKind::Melee];

    const fn bit(self) -> u8 {
        match self {
            Self::Homing => 0b001,
            Self::Ranged => 0b010,
            Self::Melee => 0b100,
        }
    }
}

/// Set of enabled attack kinds plus the currently active kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttackProfile {
    enabled: u8,
    active: Option<AttackKind>,
}

impl AttackProfile {
    /// Creates a profile with the provided kinds enabled.
    ///
    /// The first provided kind becomes the active one.
    #[must_use]
    pub fn with_kinds(kinds: &[AttackKind]) -> Self {
        let mut profile = Self::default();
        for kind in kinds {
            profile.enable(*kind);
        }
        profile
    }

    /// Enables the kind; the first enabled kind becomes active.
    pub fn enable(&mut self, kind: AttackKind) {
        self.enabled |= kind.bit();
        if self.active.is_none() {
            self.active = Some(kind);
        }
    }

    /// Disables the kind, moving the active marker to the next enabled kind.
    pub fn disable(&mut self, kind: AttackKind) {
        self.enabled &= !kind.bit();
        if self.active == Some(kind) {
            let next = self.iter().next();
            self.active = next;
        }
    }

    /// Reports whether the kind is enabled.
    #[must_use]
    pub const fn is_enabled(&self, kind: AttackKind) -> bool {
        self.enabled & kind.bit() != 0
    }

    /// Reports whether no kind is enabled.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.enabled == 0
    }

    /// Currently active kind, if any.
    #[must_use]
    pub const fn active(&self) -> Option<AttackKind> {
        self.active
    }

    /// Marks an enabled kind as active. Disabled kinds are ignored.
    pub fn set_active(&mut self, kind: AttackKind) {
        if self.is_enabled(kind) {
            self.active = Some(kind);
        }
    }

    /// Enabled kinds in fixed priority order.
    pub fn iter(&self) -> impl Iterator<Item = AttackKind> + '_ {
        AttackKind::PRIORITY
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
    }
}

/// Current and maximum hit points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    /// Creates full health with the provided maximum.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Creates health with explicit current value, clamped to `[0, max]`.
    #[must_use]
    pub fn with_current(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Reports whether the hit points are exhausted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Subtracts the amount, saturating at zero.
    pub fn lose(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }
}

/// Combat capability block carried by every unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatStats {
    /// Hit points.
    pub health: Health,
    /// Raw damage dealt per attack.
    pub attack: u32,
    /// Flat mitigation subtracted from incoming damage.
    pub defense: u32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Attack reach measured in Manhattan tiles.
    pub attack_range: u32,
    /// Enabled attack kinds.
    pub profile: AttackProfile,
}

impl CombatStats {
    /// Minimum time between two attacks derived from the attack speed.
    ///
    /// Non-positive attack speeds never recover from a cooldown.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        if !(self.attack_speed > 0.0) || !self.attack_speed.is_finite() {
            return Duration::MAX;
        }
        Duration::try_from_secs_f32(1.0 / self.attack_speed).unwrap_or(Duration::MAX)
    }
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            health: Health::new(100),
            attack: 10,
            defense: 0,
            attack_speed: 1.0,
            attack_range: 1,
            profile: AttackProfile::with_kinds(&[AttackKind::Melee]),
        }
    }
}

/// Behaviors available to the autonomous behavior stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    /// Pursue nearby heroes.
    Chase,
    /// Roam around the home tile.
    Wander,
}

/// Tunables for the wander behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WanderConfig {
    /// Whether the behavior participates in arbitration.
    pub enabled: bool,
    /// Maximum tile offset from the home tile on each axis.
    pub radius: u32,
    /// Delay between two wander decisions.
    pub interval: Duration,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: tuning::WANDER_RADIUS,
            interval: tuning::WANDER_INTERVAL,
        }
    }
}

/// Tunables for the chase behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChaseConfig {
    /// Whether the behavior participates in arbitration.
    pub enabled: bool,
    /// Acquisition radius in Manhattan tiles.
    pub range: u32,
    /// Leash: maximum Manhattan distance from home before giving up.
    pub leash: u32,
    /// Minimum delay between two acquisition scans.
    pub scan_interval: Duration,
}

impl ChaseConfig {
    /// Distance beyond which an acquired target is considered lost.
    #[must_use]
    pub const fn tolerance(&self) -> u32 {
        self.range.saturating_add(tuning::CHASE_TOLERANCE_MARGIN)
    }
}

impl Default for ChaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            range: tuning::CHASE_RANGE,
            leash: tuning::CHASE_LEASH,
            scan_interval: tuning::CHASE_SCAN_INTERVAL,
        }
    }
}

/// Behavior capability block for autonomous units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BehaviorConfig {
    /// Chase tunables (higher priority).
    pub chase: ChaseConfig,
    /// Wander tunables (lower priority).
    pub wander: WanderConfig,
}

impl BehaviorConfig {
    /// Updates the enabled flag of one behavior.
    pub fn set_enabled(&mut self, behavior: BehaviorKind, enabled: bool) {
        match behavior {
            BehaviorKind::Chase => self.chase.enabled = enabled,
            BehaviorKind::Wander => self.wander.enabled = enabled,
        }
    }
}

/// Rewards granted when the unit is removed after dying.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rewards {
    /// Experience split between nearby heroes.
    pub experience: u32,
    /// Gold credited to a hero killer.
    pub gold: u32,
}

/// Accumulated progress carried by heroes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeroProgress {
    /// Total experience earned.
    pub experience: u32,
    /// Total gold earned.
    pub gold: u32,
}

/// Lifecycle stage of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// The unit acts normally.
    Alive,
    /// Health reached zero; the death animation plays.
    Dying {
        /// Simulation time at which the unit died.
        since: Duration,
    },
    /// The death window elapsed; the unit awaits removal.
    PendingRemoval,
}

impl Lifecycle {
    /// Reports whether the unit may act and be targeted.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// Everything required to place a unit.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitSpec {
    /// Category of the unit.
    pub category: UnitCategory,
    /// Spawn tile, which also becomes the unit's home tile.
    pub tile: TileCoord,
    /// Combat capability block.
    pub stats: CombatStats,
    /// Travel speed in display units per second.
    pub movement_speed: f32,
    /// Behavior capability block for autonomous units.
    pub behavior: Option<BehaviorConfig>,
    /// Rewards granted on death.
    pub rewards: Rewards,
}

impl UnitSpec {
    /// Creates a spec with default stats and no behaviors.
    #[must_use]
    pub fn new(category: UnitCategory, tile: TileCoord) -> Self {
        Self {
            category,
            tile,
            stats: CombatStats::default(),
            movement_speed: tuning::DEFAULT_MOVEMENT_SPEED,
            behavior: None,
            rewards: Rewards::default(),
        }
    }

    /// Replaces the combat stats.
    #[must_use]
    pub fn with_stats(mut self, stats: CombatStats) -> Self {
        self.stats = stats;
        self
    }

    /// Replaces the movement speed.
    #[must_use]
    pub fn with_movement_speed(mut self, movement_speed: f32) -> Self {
        self.movement_speed = movement_speed;
        self
    }

    /// Attaches a behavior stack.
    #[must_use]
    pub fn with_behavior(mut self, behavior: BehaviorConfig) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Replaces the death rewards.
    #[must_use]
    pub fn with_rewards(mut self, rewards: Rewards) -> Self {
        self.rewards = rewards;
        self
    }
}

/// Target of an attack request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttackAim {
    /// A specific unit, as chosen by autonomous behaviors.
    Unit(UnitId),
    /// A display-space point, as chosen by a pointer.
    Point(Vec2),
}

/// Reasons an attack request may be rejected outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttackRejection {
    /// The attack speed cooldown has not elapsed.
    Cooldown,
    /// The acting unit does not exist or is not alive.
    ActorUnavailable,
    /// The aimed unit does not exist, is not alive, or is the actor.
    InvalidAim,
}

/// Reasons a spawn request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnError {
    /// The tile is outside the grid bounds.
    OutOfBounds,
    /// The tile is blocked by an obstacle or another unit.
    Occupied,
}

/// Reasons a projectile leaves the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpiryReason {
    /// The projectile hit a unit and is single-hit.
    Hit,
    /// The fixed lifetime (or swing timeout) elapsed.
    LifetimeElapsed,
    /// A melee swing reached the end of its arc.
    SwingComplete,
    /// A homing projectile lost its target.
    TargetLost,
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Category of the unit.
    pub category: UnitCategory,
    /// Tile currently registered for the unit.
    pub tile: TileCoord,
    /// Continuous display-space position.
    pub position: Vec2,
    /// Spawn tile used as wander anchor and chase leash origin.
    pub home: TileCoord,
    /// Combat capability block.
    pub stats: CombatStats,
    /// Travel speed in display units per second.
    pub movement_speed: f32,
    /// Lifecycle stage.
    pub lifecycle: Lifecycle,
    /// Current combat target, if any.
    pub target: Option<UnitId>,
    /// Unit credited with the killing blow, if dead.
    pub killed_by: Option<UnitId>,
    /// Final waypoint while moving.
    pub destination: Option<TileCoord>,
    /// Behavior capability block.
    pub behavior: Option<BehaviorConfig>,
    /// Rewards granted on death.
    pub rewards: Rewards,
    /// Hero progress, present for heroes only.
    pub progress: Option<HeroProgress>,
}

impl UnitSnapshot {
    /// Reports whether the unit is travelling along a path.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.destination.is_some()
    }

    /// Reports whether the unit may act and be targeted.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.lifecycle.is_alive()
    }

    /// Reports whether the display-space point lies inside the unit's hit bounds.
    #[must_use]
    pub fn bounds_contain(&self, point: Vec2) -> bool {
        let offset = (point - self.position).abs();
        offset.x <= tuning::HIT_HALF_EXTENTS.x && offset.y <= tuning::HIT_HALF_EXTENTS.y
    }
}

/// Read-only snapshot describing every registered unit.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a unit by identifier.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Looks up a unit that is currently alive.
    #[must_use]
    pub fn get_alive(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.get(id).filter(|snapshot| snapshot.is_alive())
    }

    /// Number of captured units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an in-flight projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Unit that fired the projectile.
    pub owner: UnitId,
    /// Kinematic variant.
    pub kind: AttackKind,
    /// Display-space position.
    pub position: Vec2,
}
