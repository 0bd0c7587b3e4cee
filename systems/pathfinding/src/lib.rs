#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid pathfinding: eight-way A* search followed by line-of-sight smoothing.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
};

use skirmish_core::{GridQuery, TileCoord};

/// Cost of a cardinal step, scaled by ten to keep arithmetic integral.
const CARDINAL_COST: u32 = 10;
/// Cost of a diagonal step (≈1.4 scaled by ten).
const DIAGONAL_COST: u32 = 14;
/// Node expansions after which a search is abandoned as unreachable.
const DEFAULT_EXPANSION_LIMIT: usize = 10_000;

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// A* pathfinder over an abstract passability query.
#[derive(Clone, Copy, Debug)]
pub struct Pathfinder {
    expansion_limit: usize,
}

impl Pathfinder {
    /// Creates a pathfinder with the default expansion limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            expansion_limit: DEFAULT_EXPANSION_LIMIT,
        }
    }

    /// Creates a pathfinder that gives up after `expansion_limit` expansions.
    #[must_use]
    pub const fn with_expansion_limit(expansion_limit: usize) -> Self {
        Self { expansion_limit }
    }

    /// Finds a shortest eight-way path from `start` to `goal`.
    ///
    /// The returned sequence includes both endpoints. It is empty when the
    /// goal is impassable or unreachable, and holds a single tile when
    /// `start == goal`. The start tile itself is never tested for
    /// passability because the mover stands on it. Diagonal steps are only
    /// taken when both flanking cardinal tiles are passable.
    #[must_use]
    pub fn find_path<G>(&self, start: TileCoord, goal: TileCoord, grid: &G) -> Vec<TileCoord>
    where
        G: GridQuery + ?Sized,
    {
        if !grid.is_passable(goal) {
            return Vec::new();
        }

        if start == goal {
            return vec![start];
        }

        let mut open = BinaryHeap::new();
        let mut came_from: HashMap<TileCoord, TileCoord> = HashMap::new();
        let mut g_score: HashMap<TileCoord, u32> = HashMap::new();
        let mut sequence: u64 = 0;

        let _ = g_score.insert(start, 0);
        open.push(OpenNode {
            f: heuristic(start, goal),
            h: heuristic(start, goal),
            sequence,
            tile: start,
        });

        let mut expansions = 0usize;
        while let Some(OpenNode { tile: current, .. }) = open.pop() {
            if current == goal {
                return reconstruct(&came_from, current);
            }

            expansions += 1;
            if expansions > self.expansion_limit {
                tracing::warn!(
                    ?start,
                    ?goal,
                    limit = self.expansion_limit,
                    "path search exceeded expansion limit"
                );
                return Vec::new();
            }

            let current_cost = g_score.get(&current).copied().unwrap_or(u32::MAX);
            for (dx, dy) in NEIGHBOR_OFFSETS {
                let neighbor = current.offset(dx, dy);
                if !grid.is_passable(neighbor) {
                    continue;
                }

                let diagonal = dx != 0 && dy != 0;
                if diagonal
                    && !(grid.is_passable(current.offset(dx, 0))
                        && grid.is_passable(current.offset(0, dy)))
                {
                    continue;
                }

                let step = if diagonal { DIAGONAL_COST } else { CARDINAL_COST };
                let tentative = current_cost.saturating_add(step);
                if tentative >= g_score.get(&neighbor).copied().unwrap_or(u32::MAX) {
                    continue;
                }

                let _ = came_from.insert(neighbor, current);
                let _ = g_score.insert(neighbor, tentative);
                let h = heuristic(neighbor, goal);
                sequence += 1;
                open.push(OpenNode {
                    f: tentative.saturating_add(h),
                    h,
                    sequence,
                    tile: neighbor,
                });
            }
        }

        Vec::new()
    }

    /// Removes waypoints that can be skipped along an unobstructed straight line.
    ///
    /// From each retained waypoint the furthest later waypoint with a clear
    /// line is kept. Adjacent waypoints are always reachable, so the worst case
    /// returns the input unchanged.
    #[must_use]
    pub fn smooth_path<G>(&self, path: &[TileCoord], grid: &G) -> Vec<TileCoord>
    where
        G: GridQuery + ?Sized,
    {
        let Some(&first) = path.first() else {
            return Vec::new();
        };

        let mut smoothed = vec![first];
        let mut anchor = 0;
        let last = path.len() - 1;

        while anchor < last {
            let mut next = last;
            while next > anchor + 1 && !line_is_clear(path[anchor], path[next], grid) {
                next -= 1;
            }
            smoothed.push(path[next]);
            anchor = next;
        }

        smoothed
    }

    /// Finds a path and smooths it in one call.
    #[must_use]
    pub fn find_smoothed_path<G>(
        &self,
        start: TileCoord,
        goal: TileCoord,
        grid: &G,
    ) -> Vec<TileCoord>
    where
        G: GridQuery + ?Sized,
    {
        let raw = self.find_path(start, goal, grid);
        let smoothed = self.smooth_path(&raw, grid);
        tracing::trace!(
            raw = raw.len(),
            smoothed = smoothed.len(),
            "path smoothed"
        );
        smoothed
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new()
    }
}

/// Reports whether every tile strictly between `from` and `to` is passable.
///
/// Uses integer Bresenham rasterization; the endpoints are not tested.
#[must_use]
pub fn line_is_clear<G>(from: TileCoord, to: TileCoord, grid: &G) -> bool
where
    G: GridQuery + ?Sized,
{
    line_tiles(from, to)
        .filter(|tile| *tile != from && *tile != to)
        .all(|tile| grid.is_passable(tile))
}

/// Rasterizes the segment between two tiles, endpoints included.
pub fn line_tiles(from: TileCoord, to: TileCoord) -> impl Iterator<Item = TileCoord> {
    LineIter::new(from, to)
}

#[derive(Clone, Debug)]
struct LineIter {
    current: TileCoord,
    end: TileCoord,
    dx: i32,
    dy: i32,
    step_x: i32,
    step_y: i32,
    error: i32,
    done: bool,
}

impl LineIter {
    fn new(from: TileCoord, to: TileCoord) -> Self {
        let dx = (to.x() - from.x()).abs();
        let dy = -(to.y() - from.y()).abs();
        Self {
            current: from,
            end: to,
            dx,
            dy,
            step_x: if from.x() < to.x() { 1 } else { -1 },
            step_y: if from.y() < to.y() { 1 } else { -1 },
            error: dx + dy,
            done: false,
        }
    }
}

impl Iterator for LineIter {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let tile = self.current;
        if tile == self.end {
            self.done = true;
            return Some(tile);
        }

        let doubled = 2 * self.error;
        let mut x = tile.x();
        let mut y = tile.y();
        if doubled >= self.dy {
            self.error += self.dy;
            x += self.step_x;
        }
        if doubled <= self.dx {
            self.error += self.dx;
            y += self.step_y;
        }
        self.current = TileCoord::new(x, y);
        Some(tile)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    h: u32,
    sequence: u64,
    tile: TileCoord,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(from: TileCoord, to: TileCoord) -> u32 {
    from.manhattan_distance(to).saturating_mul(CARDINAL_COST)
}

fn reconstruct(came_from: &HashMap<TileCoord, TileCoord>, goal: TileCoord) -> Vec<TileCoord> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(previous) = came_from.get(&current) {
        current = *previous;
        path.push(current);
    }
    path.reverse();
    path
}
