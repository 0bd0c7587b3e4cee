use std::{fmt, time::Duration};

use skirmish_core::{Event, TileCoord, UnitCategory, UnitId, UnitView};

/// Aggregates the event stream of a run into a printable report.
#[derive(Debug, Default)]
pub(crate) struct Summary {
    ticks: u32,
    elapsed: Duration,
    paths: u32,
    attacks: u32,
    degraded: u32,
    hits: u32,
    deaths: u32,
    removals: u32,
    survivors: Vec<Survivor>,
}

#[derive(Debug)]
struct Survivor {
    id: UnitId,
    category: UnitCategory,
    tile: TileCoord,
    health: (u32, u32),
    experience: u32,
    gold: u32,
}

impl Summary {
    /// Folds the events of one update pass into the counters.
    pub(crate) fn record(&mut self, events: &[Event]) {
        self.ticks += 1;
        for event in events {
            match event {
                Event::PathAssigned { .. } => self.paths += 1,
                Event::AttackPerformed { .. } => self.attacks += 1,
                Event::AttackDegraded { .. } => {
                    self.attacks += 1;
                    self.degraded += 1;
                }
                Event::UnitHit { .. } => self.hits += 1,
                Event::UnitDied { .. } => {
                    self.hits += 1;
                    self.deaths += 1;
                }
                Event::UnitRemoved { .. } => self.removals += 1,
                _ => {}
            }
        }
    }

    /// Captures the final state of every unit still in the world.
    pub(crate) fn finish(&mut self, units: &UnitView, elapsed: Duration) {
        self.elapsed = elapsed;
        self.survivors = units
            .iter()
            .map(|unit| {
                let progress = unit.progress.unwrap_or_default();
                Survivor {
                    id: unit.id,
                    category: unit.category,
                    tile: unit.tile,
                    health: (unit.stats.health.current(), unit.stats.health.max()),
                    experience: progress.experience,
                    gold: progress.gold,
                }
            })
            .collect();
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ran {} ticks ({:.2}s simulated)",
            self.ticks,
            self.elapsed.as_secs_f32()
        )?;
        writeln!(
            f,
            "paths: {}  attacks: {} ({} degraded)  hits: {}  deaths: {}  removed: {}",
            self.paths, self.attacks, self.degraded, self.hits, self.deaths, self.removals
        )?;
        for survivor in &self.survivors {
            write!(
                f,
                "  #{:<3} {:<9} at ({:>3},{:>3})  hp {}/{}",
                survivor.id.get(),
                format!("{:?}", survivor.category),
                survivor.tile.x(),
                survivor.tile.y(),
                survivor.health.0,
                survivor.health.1
            )?;
            if survivor.category == UnitCategory::Hero {
                write!(f, "  xp {}  gold {}", survivor.experience, survivor.gold)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
