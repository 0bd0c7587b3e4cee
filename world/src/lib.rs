#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Skirmish tactical engine.

use std::{collections::BTreeMap, time::Duration};

use skirmish_core::{
    tuning, AttackAim, AttackKind, AttackRejection, BehaviorConfig, CombatStats, Command, Event,
    GridBounds, GridQuery, HeroProgress, Lifecycle, PositionRegistry, ProjectileId, Rewards,
    SpawnError, TileCoord, UnitCategory, UnitId, UnitSnapshot, UnitSpec, WELCOME_BANNER,
};
use skirmish_system_combat::{plan_attack, AttackPlan, Launch, Projectile};
use skirmish_system_movement::Motion;
use skirmish_system_pathfinding::Pathfinder;

mod occupancy;
mod outcome;

use occupancy::OccupancyGrid;

/// Represents the authoritative world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    occupancy: OccupancyGrid,
    grid_configured: bool,
    units: BTreeMap<UnitId, Unit>,
    projectiles: Vec<Projectile>,
    next_unit: u32,
    next_projectile: u32,
    clock: Duration,
    pathfinder: Pathfinder,
}

impl World {
    /// Creates an empty world with no grid; every tile is impassable until
    /// [`Command::ConfigureGrid`] is applied.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            occupancy: OccupancyGrid::new(GridBounds::new(0, 0)),
            grid_configured: false,
            units: BTreeMap::new(),
            projectiles: Vec::new(),
            next_unit: 1,
            next_projectile: 0,
            clock: Duration::ZERO,
            pathfinder: Pathfinder::new(),
        }
    }

    fn configure_grid(&mut self, bounds: GridBounds, out_events: &mut Vec<Event>) {
        self.occupancy = self.occupancy.resized(bounds);
        self.grid_configured = true;
        out_events.push(Event::GridConfigured { bounds });

        // Units left outside a shrunken grid cannot be registered anywhere.
        let stranded: Vec<UnitId> = self
            .units
            .values()
            .filter(|unit| !bounds.contains(unit.motion.tile()))
            .map(|unit| unit.id)
            .collect();
        for id in stranded {
            tracing::warn!(unit = id.get(), ?bounds, "unit outside resized grid");
            outcome::remove_unit(self, id, out_events);
        }
    }

    fn spawn_unit(&mut self, spec: UnitSpec, out_events: &mut Vec<Event>) {
        let tile = spec.tile;
        if !self.occupancy.bounds().contains(tile) {
            out_events.push(Event::UnitSpawnRejected {
                tile,
                reason: SpawnError::OutOfBounds,
            });
            return;
        }

        if !self.occupancy.is_passable(tile) {
            out_events.push(Event::UnitSpawnRejected {
                tile,
                reason: SpawnError::Occupied,
            });
            return;
        }

        let id = UnitId::new(self.next_unit);
        self.next_unit = self.next_unit.saturating_add(1);
        self.occupancy.register_position(id, tile);
        let unit = Unit::from_spec(id, spec);
        tracing::debug!(unit = id.get(), category = ?unit.category, ?tile, "unit spawned");
        out_events.push(Event::UnitSpawned {
            unit: id,
            category: unit.category,
            tile,
        });
        let _ = self.units.insert(id, unit);
    }

    fn move_unit(&mut self, id: UnitId, goal: TileCoord, out_events: &mut Vec<Event>) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        if !unit.lifecycle.is_alive() {
            return;
        }
        if !unit.category.is_mobile() {
            out_events.push(Event::PathNotFound { unit: id, goal });
            return;
        }

        let grid = &self.occupancy;
        let passable = |tile: TileCoord| grid.passable_for(id, tile);
        let path = self
            .pathfinder
            .find_smoothed_path(unit.motion.tile(), goal, &passable);

        match unit.motion.follow(&path) {
            Ok(()) => {
                tracing::debug!(unit = id.get(), ?goal, waypoints = path.len(), "path assigned");
                out_events.push(Event::PathAssigned { unit: id, path });
            }
            Err(error) => {
                tracing::debug!(unit = id.get(), ?goal, %error, "no path");
                unit.motion.stop();
                out_events.push(Event::PathNotFound { unit: id, goal });
            }
        }
    }

    fn follow_path(&mut self, id: UnitId, path: Vec<TileCoord>, out_events: &mut Vec<Event>) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        if !unit.lifecycle.is_alive() {
            return;
        }

        let goal = path.last().copied().unwrap_or(unit.motion.tile());
        if !unit.category.is_mobile() {
            out_events.push(Event::PathNotFound { unit: id, goal });
            return;
        }

        match unit.motion.follow(&path) {
            Ok(()) => out_events.push(Event::PathAssigned { unit: id, path }),
            Err(error) => {
                tracing::debug!(unit = id.get(), %error, "path rejected");
                out_events.push(Event::PathNotFound { unit: id, goal });
            }
        }
    }

    fn advance_movement(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for unit in self.units.values_mut() {
            if !unit.lifecycle.is_alive() {
                continue;
            }

            let outcome = unit
                .motion
                .tick(unit.id, unit.movement_speed, dt, &mut self.occupancy);
            if let Some(facing) = outcome.facing {
                out_events.push(Event::FacingChanged {
                    unit: unit.id,
                    facing,
                });
            }
            if let Some((from, to)) = outcome.transition {
                out_events.push(Event::UnitMoved {
                    unit: unit.id,
                    from,
                    to,
                });
            }
            if outcome.finished {
                out_events.push(Event::MovementFinished {
                    unit: unit.id,
                    tile: unit.motion.tile(),
                });
            }
        }
    }

    fn attack(
        &mut self,
        id: UnitId,
        requested: Option<AttackKind>,
        aim: AttackAim,
        out_events: &mut Vec<Event>,
    ) {
        let view = query::unit_view(self);
        let Some(actor) = view.get(id) else {
            out_events.push(Event::AttackRejected {
                unit: id,
                reason: AttackRejection::ActorUnavailable,
            });
            return;
        };
        let last_attack = self.units.get(&id).and_then(|unit| unit.last_attack);

        let plan = match plan_attack(actor, requested, aim, &view, self.clock, last_attack) {
            Ok(plan) => plan,
            Err(reason) => {
                tracing::trace!(unit = id.get(), ?reason, "attack rejected");
                out_events.push(Event::AttackRejected { unit: id, reason });
                return;
            }
        };

        let origin = actor.position;
        let stats = actor.stats;
        if let Some(unit) = self.units.get_mut(&id) {
            unit.last_attack = Some(self.clock);
        }

        match plan {
            AttackPlan::Projectile {
                kind,
                aim_point,
                homing_target,
            } => {
                if let Some(unit) = self.units.get_mut(&id) {
                    unit.stats.profile.set_active(kind);
                }
                out_events.push(Event::AttackPerformed { unit: id, kind });

                let projectile_id = ProjectileId::new(self.next_projectile);
                self.next_projectile = self.next_projectile.wrapping_add(1);
                let projectile = Projectile::spawn(
                    projectile_id,
                    Launch {
                        owner: id,
                        kind,
                        origin,
                        aim_point,
                        damage: stats.attack,
                        attack_range: stats.attack_range,
                        homing_target,
                    },
                );
                tracing::debug!(
                    projectile = projectile_id.get(),
                    owner = id.get(),
                    ?kind,
                    ?homing_target,
                    "projectile spawned"
                );
                self.projectiles.push(projectile);
                out_events.push(Event::ProjectileSpawned {
                    projectile: projectile_id,
                    owner: id,
                    kind,
                });
            }
            AttackPlan::Direct { requested, target } => {
                tracing::warn!(
                    unit = id.get(),
                    ?requested,
                    "attack kind unavailable, applying damage directly"
                );
                out_events.push(Event::AttackDegraded {
                    unit: id,
                    requested,
                });
                if let Some(target) = target {
                    outcome::apply_damage(self, target, stats.attack, Some(id), out_events);
                }
            }
        }
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.projectiles.is_empty() {
            return;
        }

        let mut projectiles = std::mem::take(&mut self.projectiles);
        let mut view = query::unit_view(self);
        projectiles.retain_mut(|projectile| {
            let step = projectile.step(dt, &view);
            for target in &step.hits {
                outcome::apply_damage(
                    self,
                    *target,
                    projectile.damage(),
                    Some(projectile.owner()),
                    out_events,
                );
            }
            if !step.hits.is_empty() {
                view = query::unit_view(self);
            }

            match step.expired {
                Some(reason) => {
                    tracing::debug!(
                        projectile = projectile.id().get(),
                        ?reason,
                        "projectile expired"
                    );
                    out_events.push(Event::ProjectileExpired {
                        projectile: projectile.id(),
                        reason,
                    });
                    false
                }
                None => true,
            }
        });
        self.projectiles = projectiles;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { bounds } => world.configure_grid(bounds, out_events),
        Command::PlaceObstacle { tile } => {
            if !world.occupancy.place_obstacle(tile) {
                tracing::debug!(?tile, "obstacle placement ignored");
            }
        }
        Command::RemoveObstacle { tile } => {
            let _ = world.occupancy.remove_obstacle(tile);
        }
        Command::SpawnUnit { spec } => world.spawn_unit(spec, out_events),
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_movement(dt, out_events);
            world.advance_projectiles(dt, out_events);
        }
        Command::MoveUnit { unit, goal } => world.move_unit(unit, goal, out_events),
        Command::FollowPath { unit, path } => world.follow_path(unit, path, out_events),
        Command::StopUnit { unit } => {
            if let Some(unit) = world.units.get_mut(&unit) {
                if unit.motion.is_moving() {
                    unit.motion.stop();
                    out_events.push(Event::MovementFinished {
                        unit: unit.id,
                        tile: unit.motion.tile(),
                    });
                }
            }
        }
        Command::Attack { unit, kind, aim } => world.attack(unit, kind, aim, out_events),
        Command::SetCombatTarget { unit, target } => {
            if let Some(unit) = world.units.get_mut(&unit) {
                if unit.lifecycle.is_alive() {
                    unit.target = target;
                }
            }
        }
        Command::SetBehaviorEnabled {
            unit,
            behavior,
            enabled,
        } => {
            if let Some(config) = world
                .units
                .get_mut(&unit)
                .and_then(|unit| unit.behavior.as_mut())
            {
                config.set_enabled(behavior, enabled);
                tracing::debug!(unit = unit.get(), ?behavior, enabled, "behavior toggled");
            }
        }
        Command::SweepDead => outcome::sweep_dead(world, out_events),
    }
}

#[derive(Clone, Debug)]
struct Unit {
    id: UnitId,
    category: UnitCategory,
    home: TileCoord,
    stats: CombatStats,
    movement_speed: f32,
    motion: Motion,
    lifecycle: Lifecycle,
    target: Option<UnitId>,
    killed_by: Option<UnitId>,
    last_attack: Option<Duration>,
    behavior: Option<BehaviorConfig>,
    rewards: Rewards,
    progress: Option<HeroProgress>,
}

impl Unit {
    fn from_spec(id: UnitId, spec: UnitSpec) -> Self {
        Self {
            id,
            category: spec.category,
            home: spec.tile,
            stats: spec.stats,
            movement_speed: spec.movement_speed,
            motion: Motion::at(spec.tile),
            lifecycle: Lifecycle::Alive,
            target: None,
            killed_by: None,
            last_attack: None,
            behavior: spec.behavior,
            rewards: spec.rewards,
            progress: (spec.category == UnitCategory::Hero).then(HeroProgress::default),
        }
    }

    fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            category: self.category,
            tile: self.motion.tile(),
            position: self.motion.position(),
            home: self.home,
            stats: self.stats,
            movement_speed: self.movement_speed,
            lifecycle: self.lifecycle,
            target: self.target,
            killed_by: self.killed_by,
            destination: self.motion.destination(),
            behavior: self.behavior,
            rewards: self.rewards,
            progress: self.progress,
        }
    }

    fn death_window_elapsed(&self, now: Duration) -> bool {
        match self.lifecycle {
            Lifecycle::Dying { since } => now.saturating_sub(since) >= tuning::DEATH_WINDOW,
            Lifecycle::PendingRemoval => true,
            Lifecycle::Alive => false,
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{occupancy::OccupancyGrid, World};
    use skirmish_core::{
        GridBounds, GridQuery, PositionRegistry, ProjectileSnapshot, TileCoord, UnitId,
        UnitSnapshot, UnitView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current grid bounds, or `None` before the grid was configured.
    #[must_use]
    pub fn grid_bounds(world: &World) -> Option<GridBounds> {
        world
            .grid_configured
            .then(|| world.occupancy.bounds())
    }

    /// Simulation time accumulated from applied ticks.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.clock
    }

    /// Captures a read-only view of every registered unit.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.units.values().map(super::Unit::snapshot).collect())
    }

    /// Captures a single unit, if registered.
    #[must_use]
    pub fn unit(world: &World, id: UnitId) -> Option<UnitSnapshot> {
        world.units.get(&id).map(super::Unit::snapshot)
    }

    /// Captures every in-flight projectile in spawn order.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(skirmish_system_combat::Projectile::snapshot)
            .collect()
    }

    /// Static obstacles in row-major order.
    #[must_use]
    pub fn obstacles(world: &World) -> Vec<TileCoord> {
        world.occupancy.obstacles().collect()
    }

    /// Reports whether the tile is free of obstacles and units.
    #[must_use]
    pub fn is_passable(world: &World, tile: TileCoord) -> bool {
        world.occupancy.is_passable(tile)
    }

    /// Returns the unit registered on the tile, if any.
    #[must_use]
    pub fn occupant(world: &World, tile: TileCoord) -> Option<UnitId> {
        world.occupancy.occupant(tile)
    }

    /// Exposes a read-only view of the occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        OccupancyView {
            grid: &world.occupancy,
        }
    }

    /// Read-only view into the occupancy grid.
    #[derive(Clone, Copy, Debug)]
    pub struct OccupancyView<'a> {
        grid: &'a OccupancyGrid,
    }

    impl<'a> OccupancyView<'a> {
        /// Returns the unit occupying the provided tile, if any.
        #[must_use]
        pub fn occupant(&self, tile: TileCoord) -> Option<UnitId> {
            self.grid.occupant(tile)
        }

        /// Reports whether `unit` could stand on the tile, ignoring its own registration.
        #[must_use]
        pub fn is_free_for(&self, unit: UnitId, tile: TileCoord) -> bool {
            self.grid.passable_for(unit, tile)
        }

        /// Grid bounds backing the view.
        #[must_use]
        pub fn bounds(&self) -> GridBounds {
            self.grid.bounds()
        }
    }

    impl GridQuery for OccupancyView<'_> {
        fn is_passable(&self, tile: TileCoord) -> bool {
            self.grid.is_passable(tile)
        }
    }
}
