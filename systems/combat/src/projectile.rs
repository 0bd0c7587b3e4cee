use std::{
    collections::BTreeSet,
    f32::consts::{FRAC_PI_2, PI, TAU},
    time::Duration,
};

use glam::Vec2;
use skirmish_core::{
    tuning, AttackKind, ExpiryReason, ProjectileId, ProjectileSnapshot, UnitId, UnitSnapshot,
    UnitView,
};

/// In-flight attack owned by the world and advanced once per tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    id: ProjectileId,
    owner: UnitId,
    damage: u32,
    position: Vec2,
    elapsed: Duration,
    kinematics: Kinematics,
}

#[derive(Clone, Debug, PartialEq)]
enum Kinematics {
    Linear {
        velocity: Vec2,
    },
    Arc {
        center: Vec2,
        aim_angle: f32,
        radius: f32,
        swept: f32,
        struck: BTreeSet<UnitId>,
    },
    Homing {
        target: Option<UnitId>,
        velocity: Vec2,
    },
}

/// Everything needed to put a projectile into flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Launch {
    /// Unit credited with every hit.
    pub owner: UnitId,
    /// Kinematic variant.
    pub kind: AttackKind,
    /// Display-space spawn point, normally the owner's position.
    pub origin: Vec2,
    /// Display-space point the attack is aimed at.
    pub aim_point: Vec2,
    /// Raw damage per hit.
    pub damage: u32,
    /// Owner's attack range in tiles; sizes the melee swing.
    pub attack_range: u32,
    /// Captured homing target, ignored by the other kinds.
    pub homing_target: Option<UnitId>,
}

/// Result of advancing a projectile by one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Units struck during this tick, in the order they were hit.
    pub hits: Vec<UnitId>,
    /// Set when the projectile must be removed after this tick.
    pub expired: Option<ExpiryReason>,
}

impl Projectile {
    /// Creates a projectile from a launch description.
    #[must_use]
    pub fn spawn(id: ProjectileId, launch: Launch) -> Self {
        let direction = aim_direction(launch.origin, launch.aim_point);
        let kinematics = match launch.kind {
            AttackKind::Ranged => Kinematics::Linear {
                velocity: direction * tuning::LINEAR_SPEED,
            },
            AttackKind::Melee => Kinematics::Arc {
                center: launch.origin,
                aim_angle: direction.y.atan2(direction.x),
                radius: launch.attack_range.max(1) as f32 * tuning::SWING_RADIUS_PER_TILE,
                swept: 0.0,
                struck: BTreeSet::new(),
            },
            AttackKind::Homing => Kinematics::Homing {
                target: launch.homing_target,
                velocity: direction * tuning::HOMING_SPEED,
            },
        };

        let mut projectile = Self {
            id,
            owner: launch.owner,
            damage: launch.damage,
            position: launch.origin,
            elapsed: Duration::ZERO,
            kinematics,
        };
        if let Some(start) = projectile.arc_point() {
            projectile.position = start;
        }
        projectile
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Unit credited with every hit.
    #[must_use]
    pub const fn owner(&self) -> UnitId {
        self.owner
    }

    /// Raw damage applied per hit before mitigation.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Current display-space position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Kinematic variant of the projectile.
    #[must_use]
    pub const fn kind(&self) -> AttackKind {
        match self.kinematics {
            Kinematics::Linear { .. } => AttackKind::Ranged,
            Kinematics::Arc { .. } => AttackKind::Melee,
            Kinematics::Homing { .. } => AttackKind::Homing,
        }
    }

    /// Captures a read-only snapshot for queries.
    #[must_use]
    pub fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            owner: self.owner,
            kind: self.kind(),
            position: self.position,
        }
    }

    /// Advances the projectile by `dt` against the current unit registry.
    pub fn step(&mut self, dt: Duration, units: &UnitView) -> StepOutcome {
        self.elapsed = self.elapsed.saturating_add(dt);
        let seconds = dt.as_secs_f32();
        let owner = self.owner;

        match &mut self.kinematics {
            Kinematics::Linear { velocity } => {
                self.position += *velocity * seconds;
                if let Some(hit) = first_contact(owner, self.position, units) {
                    return StepOutcome {
                        hits: vec![hit],
                        expired: Some(ExpiryReason::Hit),
                    };
                }
                StepOutcome {
                    hits: Vec::new(),
                    expired: (self.elapsed >= tuning::LINEAR_LIFETIME)
                        .then_some(ExpiryReason::LifetimeElapsed),
                }
            }
            Kinematics::Arc { .. } => {
                let progress = swing_progress(self.elapsed);
                self.sweep(progress, units)
            }
            Kinematics::Homing { target, velocity } => {
                let Some(seek) = (*target).and_then(|id| units.get_alive(id)) else {
                    return StepOutcome {
                        hits: Vec::new(),
                        expired: Some(ExpiryReason::TargetLost),
                    };
                };

                let desired = (seek.position - self.position).normalize_or_zero()
                    * tuning::HOMING_SPEED;
                if desired != Vec2::ZERO {
                    *velocity = velocity.lerp(desired, tuning::HOMING_TURN_RATE);
                }
                self.position += *velocity * seconds;

                if let Some(hit) = first_contact(owner, self.position, units) {
                    return StepOutcome {
                        hits: vec![hit],
                        expired: Some(ExpiryReason::Hit),
                    };
                }
                StepOutcome {
                    hits: Vec::new(),
                    expired: (self.elapsed >= tuning::HOMING_LIFETIME)
                        .then_some(ExpiryReason::LifetimeElapsed),
                }
            }
        }
    }

    fn sweep(&mut self, progress: f32, units: &UnitView) -> StepOutcome {
        let owner = self.owner;
        let Kinematics::Arc {
            center,
            aim_angle,
            radius,
            swept,
            struck,
        } = &mut self.kinematics
        else {
            return StepOutcome::default();
        };

        let start = *aim_angle - FRAC_PI_2;
        let previous = *swept;
        *swept = PI * progress;
        self.position = *center + Vec2::from_angle(start + *swept) * *radius;

        let sector = Sector {
            center: *center,
            start,
            from: previous,
            to: *swept,
            reach: *radius + tuning::HIT_HALF_EXTENTS.max_element(),
        };
        let mut hits = Vec::new();
        for unit in units.iter() {
            if unit.id == owner || !unit.is_alive() || struck.contains(&unit.id) {
                continue;
            }
            if sector.contains(unit.position) {
                let _ = struck.insert(unit.id);
                hits.push(unit.id);
            }
        }

        let expired = if progress >= 1.0 {
            Some(ExpiryReason::SwingComplete)
        } else if self.elapsed >= tuning::SWING_TIMEOUT {
            Some(ExpiryReason::LifetimeElapsed)
        } else {
            None
        };

        StepOutcome { hits, expired }
    }

    fn arc_point(&self) -> Option<Vec2> {
        match &self.kinematics {
            Kinematics::Arc {
                center,
                aim_angle,
                radius,
                ..
            } => Some(*center + Vec2::from_angle(*aim_angle - FRAC_PI_2) * *radius),
            _ => None,
        }
    }
}

/// Slice of the swing covered during one step, angles relative to the swing start.
struct Sector {
    center: Vec2,
    start: f32,
    from: f32,
    to: f32,
    reach: f32,
}

impl Sector {
    fn contains(&self, point: Vec2) -> bool {
        let offset = point - self.center;
        let distance = offset.length();
        if distance > self.reach {
            return false;
        }
        // A body straddling the pivot is inside every slice.
        if distance <= tuning::HIT_HALF_EXTENTS.min_element() {
            return true;
        }
        let bearing = (offset.y.atan2(offset.x) - self.start).rem_euclid(TAU);
        bearing >= self.from && bearing <= self.to
    }
}

fn aim_direction(origin: Vec2, aim_point: Vec2) -> Vec2 {
    let direction = (aim_point - origin).normalize_or_zero();
    if direction == Vec2::ZERO {
        Vec2::X
    } else {
        direction
    }
}

fn swing_progress(elapsed: Duration) -> f32 {
    (elapsed.as_secs_f32() / tuning::SWING_DURATION.as_secs_f32()).clamp(0.0, 1.0)
}

fn first_contact(owner: UnitId, point: Vec2, units: &UnitView) -> Option<UnitId> {
    units
        .iter()
        .filter(|unit| unit.id != owner && unit.is_alive())
        .filter(|unit| unit.bounds_contain(point))
        .min_by(|a, b| closer(a, b, point))
        .map(|unit| unit.id)
}

fn closer(a: &UnitSnapshot, b: &UnitSnapshot, point: Vec2) -> std::cmp::Ordering {
    a.position
        .distance_squared(point)
        .total_cmp(&b.position.distance_squared(point))
        .then(a.id.cmp(&b.id))
}
