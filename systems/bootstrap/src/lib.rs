#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap system that assembles a skirmish and drives its update pass.
//!
//! A [`Simulation`] owns the authoritative [`World`] and the pure behavior
//! system. Each [`Simulation::update`] runs one cooperative pass: queued
//! commands, the world tick (movement and projectiles), AI decisions, and the
//! removal of units whose death window elapsed.

use std::{mem, time::Duration};

use skirmish_core::{
    Command, Event, GridBounds, SpawnError, TileCoord, UnitId, UnitSpec, UnitView,
};
use skirmish_system_behavior::{self as behavior, Behaviors};
use skirmish_world::{self as world, query, World};
use thiserror::Error;

/// Errors raised while assembling a simulation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// No grid bounds were supplied.
    #[error("simulation requires grid bounds")]
    MissingGrid,
    /// Grid bounds describe an empty grid.
    #[error("grid of {columns}x{rows} tiles contains no passable area")]
    InvalidGrid {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// An obstacle lies outside the grid.
    #[error("obstacle at {tile:?} lies outside the grid")]
    ObstacleOutOfBounds {
        /// Offending tile.
        tile: TileCoord,
    },
    /// An initial unit could not be placed.
    #[error("unit at {tile:?} could not be spawned: {reason:?}")]
    SpawnRejected {
        /// Requested spawn tile.
        tile: TileCoord,
        /// Reason reported by the world.
        reason: SpawnError,
    },
}

/// Scalar parameters of a simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationConfig {
    bounds: Option<GridBounds>,
    rng_seed: u64,
}

impl SimulationConfig {
    /// Creates a configuration for a grid of the given bounds.
    #[must_use]
    pub const fn new(bounds: GridBounds, rng_seed: u64) -> Self {
        Self {
            bounds: Some(bounds),
            rng_seed,
        }
    }

    /// Grid bounds, when configured.
    #[must_use]
    pub const fn bounds(&self) -> Option<GridBounds> {
        self.bounds
    }

    /// Seed shared by every randomized system.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

/// Incrementally describes the initial state of a simulation.
#[derive(Clone, Debug, Default)]
pub struct SimulationBuilder {
    config: SimulationConfig,
    obstacles: Vec<TileCoord>,
    units: Vec<UnitSpec>,
}

impl SimulationBuilder {
    /// Starts from an empty description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration.
    #[must_use]
    pub fn from_config(config: SimulationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Sets the grid bounds.
    #[must_use]
    pub fn grid(mut self, bounds: GridBounds) -> Self {
        self.config.bounds = Some(bounds);
        self
    }

    /// Sets the seed used by randomized behaviors.
    #[must_use]
    pub fn seed(mut self, rng_seed: u64) -> Self {
        self.config.rng_seed = rng_seed;
        self
    }

    /// Adds a static obstacle.
    #[must_use]
    pub fn obstacle(mut self, tile: TileCoord) -> Self {
        self.obstacles.push(tile);
        self
    }

    /// Adds a unit spawned when the simulation is built.
    #[must_use]
    pub fn unit(mut self, spec: UnitSpec) -> Self {
        self.units.push(spec);
        self
    }

    /// Validates the description and constructs the simulation.
    ///
    /// Obstacles are placed before units, in insertion order. Unit
    /// identifiers are allocated in the order units were added.
    pub fn build(self) -> Result<Simulation, BuildError> {
        let bounds = self.config.bounds.ok_or(BuildError::MissingGrid)?;
        if bounds.columns() == 0 || bounds.rows() == 0 {
            return Err(BuildError::InvalidGrid {
                columns: bounds.columns(),
                rows: bounds.rows(),
            });
        }

        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(&mut world, Command::ConfigureGrid { bounds }, &mut events);

        for tile in self.obstacles {
            if !bounds.contains(tile) {
                return Err(BuildError::ObstacleOutOfBounds { tile });
            }
            world::apply(&mut world, Command::PlaceObstacle { tile }, &mut events);
        }

        let mut spawned = Vec::with_capacity(self.units.len());
        for spec in self.units {
            events.clear();
            world::apply(&mut world, Command::SpawnUnit { spec }, &mut events);
            for event in &events {
                match event {
                    Event::UnitSpawned { unit, .. } => spawned.push(*unit),
                    Event::UnitSpawnRejected { tile, reason } => {
                        return Err(BuildError::SpawnRejected {
                            tile: *tile,
                            reason: *reason,
                        });
                    }
                    _ => {}
                }
            }
        }

        tracing::debug!(
            columns = bounds.columns(),
            rows = bounds.rows(),
            units = spawned.len(),
            seed = self.config.rng_seed,
            "simulation built"
        );

        Ok(Simulation {
            world,
            behaviors: Behaviors::new(behavior::Config::new(self.config.rng_seed)),
            pending: Vec::new(),
            spawned,
        })
    }
}

/// Running skirmish: authoritative world plus the systems that drive it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    behaviors: Behaviors,
    pending: Vec<Command>,
    spawned: Vec<UnitId>,
}

impl Simulation {
    /// Queues a command for the next update pass.
    pub fn submit(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Runs one update pass and returns every event it produced, in order.
    pub fn update(&mut self, dt: Duration) -> Vec<Event> {
        let mut log = Vec::new();

        for command in mem::take(&mut self.pending) {
            world::apply(&mut self.world, command, &mut log);
        }
        world::apply(&mut self.world, Command::Tick { dt }, &mut log);

        let units = query::unit_view(&self.world);
        let mut commands = Vec::new();
        self.behaviors.handle(
            &log,
            &units,
            &query::occupancy_view(&self.world),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut self.world, command, &mut log);
        }

        world::apply(&mut self.world, Command::SweepDead, &mut log);
        log
    }

    /// Identifiers of the units spawned at build time, in insertion order.
    #[must_use]
    pub fn spawned(&self) -> &[UnitId] {
        &self.spawned
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Snapshot of every unit.
    #[must_use]
    pub fn units(&self) -> UnitView {
        query::unit_view(&self.world)
    }

    /// Simulated time elapsed since the simulation was built.
    #[must_use]
    pub fn now(&self) -> Duration {
        query::now(&self.world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::UnitCategory;

    #[test]
    fn grid_is_required() {
        let error = SimulationBuilder::new().build().unwrap_err();
        assert_eq!(error, BuildError::MissingGrid);
        assert_eq!(error.to_string(), "simulation requires grid bounds");
    }

    #[test]
    fn empty_grid_is_rejected() {
        let error = SimulationBuilder::new()
            .grid(GridBounds::new(0, 4))
            .build()
            .unwrap_err();
        assert_eq!(error, BuildError::InvalidGrid { columns: 0, rows: 4 });
    }

    #[test]
    fn obstacles_must_fit_the_grid() {
        let error = SimulationBuilder::new()
            .grid(GridBounds::new(4, 4))
            .obstacle(TileCoord::new(4, 0))
            .build()
            .unwrap_err();
        assert_eq!(
            error,
            BuildError::ObstacleOutOfBounds {
                tile: TileCoord::new(4, 0)
            }
        );
    }

    #[test]
    fn units_cannot_spawn_on_obstacles() {
        let error = SimulationBuilder::new()
            .grid(GridBounds::new(4, 4))
            .obstacle(TileCoord::new(1, 1))
            .unit(UnitSpec::new(UnitCategory::Mob, TileCoord::new(1, 1)))
            .build()
            .unwrap_err();
        assert_eq!(
            error,
            BuildError::SpawnRejected {
                tile: TileCoord::new(1, 1),
                reason: SpawnError::Occupied,
            }
        );
    }

    #[test]
    fn update_advances_the_clock() {
        let mut simulation = SimulationBuilder::from_config(SimulationConfig::new(
            GridBounds::new(3, 3),
            11,
        ))
        .unit(UnitSpec::new(UnitCategory::Hero, TileCoord::new(0, 0)))
        .build()
        .expect("valid simulation");

        let events = simulation.update(Duration::from_millis(20));

        assert_eq!(simulation.now(), Duration::from_millis(20));
        assert_eq!(simulation.spawned(), &[UnitId::new(1)]);
        assert!(events.contains(&Event::TimeAdvanced {
            dt: Duration::from_millis(20)
        }));
    }
}
