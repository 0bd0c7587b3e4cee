#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-unit movement controller that walks a waypoint list one tick at a time.
//!
//! [`Motion`] owns a unit's registered tile, its continuous display-space
//! position, and the waypoint cursor. Each [`Motion::tick`] moves the position
//! toward the current waypoint; once within the arrival threshold the position
//! snaps to the tile, the position registry is told about the transition, and
//! the cursor advances. A blocked waypoint stalls the unit in place; no
//! implicit re-pathing happens here.

use std::time::Duration;

use glam::Vec2;
use skirmish_core::{tuning, Facing, GridQuery, PositionRegistry, TileCoord, UnitId};

/// Reasons a path cannot be followed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FollowError {
    /// The path holds no waypoints.
    #[error("path contains no waypoints")]
    EmptyPath,
    /// The first waypoint is not the mover's tile.
    #[error("path starts at {found:?} but the unit stands on {expected:?}")]
    DetachedStart {
        /// Tile the unit stands on.
        expected: TileCoord,
        /// First waypoint of the rejected path.
        found: TileCoord,
    },
}

/// Summary of what happened during a single [`Motion::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickOutcome {
    /// Completed tile transition, reported as `(from, to)`.
    pub transition: Option<(TileCoord, TileCoord)>,
    /// New facing when the travel direction changed.
    pub facing: Option<Facing>,
    /// Set when the final waypoint was reached and the unit became idle.
    pub finished: bool,
    /// Set when the current waypoint is blocked and the unit did not move.
    pub stalled: bool,
}

/// Movement state of a single unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Motion {
    tile: TileCoord,
    position: Vec2,
    waypoints: Vec<TileCoord>,
    cursor: usize,
    facing: Option<Facing>,
}

impl Motion {
    /// Creates an idle motion state standing exactly on `tile`.
    #[must_use]
    pub fn at(tile: TileCoord) -> Self {
        Self {
            tile,
            position: tile.to_display(),
            waypoints: Vec::new(),
            cursor: 0,
            facing: None,
        }
    }

    /// Tile currently registered for the unit.
    #[must_use]
    pub const fn tile(&self) -> TileCoord {
        self.tile
    }

    /// Continuous display-space position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Last reported facing, if the unit has ever moved.
    #[must_use]
    pub const fn facing(&self) -> Option<Facing> {
        self.facing
    }

    /// Reports whether waypoints remain.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.cursor < self.waypoints.len()
    }

    /// Final waypoint while moving.
    #[must_use]
    pub fn destination(&self) -> Option<TileCoord> {
        if self.is_moving() {
            self.waypoints.last().copied()
        } else {
            None
        }
    }

    /// Waypoints that have not been reached yet.
    #[must_use]
    pub fn remaining(&self) -> &[TileCoord] {
        self.waypoints.get(self.cursor..).unwrap_or(&[])
    }

    /// Starts following `path`, replacing any path in flight.
    ///
    /// A single-waypoint path is a direct move to that tile. Longer paths must
    /// start at the unit's tile; travel begins at the second waypoint.
    pub fn follow(&mut self, path: &[TileCoord]) -> Result<(), FollowError> {
        match path {
            [] => Err(FollowError::EmptyPath),
            [only] => {
                self.waypoints = vec![*only];
                self.cursor = 0;
                Ok(())
            }
            [first, ..] if *first != self.tile => Err(FollowError::DetachedStart {
                expected: self.tile,
                found: *first,
            }),
            _ => {
                self.waypoints = path.to_vec();
                self.cursor = 1;
                Ok(())
            }
        }
    }

    /// Drops every remaining waypoint; the unit becomes idle where it stands.
    pub fn stop(&mut self) {
        self.waypoints.clear();
        self.cursor = 0;
    }

    /// Advances the unit toward its current waypoint by `speed × dt`.
    pub fn tick<R>(
        &mut self,
        unit: UnitId,
        speed: f32,
        dt: Duration,
        registry: &mut R,
    ) -> TickOutcome
    where
        R: PositionRegistry + GridQuery,
    {
        let mut outcome = TickOutcome::default();
        let Some(&next) = self.waypoints.get(self.cursor) else {
            return outcome;
        };

        if !registry.is_passable(next) && registry.occupant(next) != Some(unit) {
            outcome.stalled = true;
            return outcome;
        }

        let target = next.to_display();
        let delta = target - self.position;
        let distance = delta.length();

        if distance >= tuning::ARRIVAL_THRESHOLD {
            if let Some(facing) = Facing::from_vector(delta) {
                if self.facing != Some(facing) {
                    self.facing = Some(facing);
                    outcome.facing = Some(facing);
                }
            }

            let travel = speed.max(0.0) * dt.as_secs_f32();
            if travel >= distance {
                self.position = target;
            } else {
                self.position += delta / distance * travel;
            }

            if self.position.distance(target) >= tuning::ARRIVAL_THRESHOLD {
                return outcome;
            }
        }

        self.position = target;
        let from = self.tile;
        if from != next {
            registry.update_position(unit, from, next);
            self.tile = next;
            outcome.transition = Some((from, next));
            tracing::trace!(unit = unit.get(), ?from, to = ?next, "tile transition");
        }

        self.cursor += 1;
        if self.cursor >= self.waypoints.len() {
            self.stop();
            outcome.finished = true;
        }

        outcome
    }
}
