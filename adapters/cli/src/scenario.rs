//! TOML scenario files describing the initial state of a skirmish.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use skirmish_core::{
    AttackKind, AttackProfile, BehaviorConfig, ChaseConfig, CombatStats, GridBounds, Health,
    Rewards, TileCoord, UnitCategory, UnitSpec, WanderConfig,
};
use skirmish_system_bootstrap::SimulationBuilder;

const SUPPORTED_SCENARIO_VERSION: u32 = 1;
const DEFAULT_TICKS: u32 = 600;
const DEFAULT_TICK_MS: u64 = 16;

/// Scenario used when no file is supplied: a lone hero ambushed by three mobs.
pub(crate) const BUILT_IN: &str = r#"
version = 1
seed = 7
obstacles = [[5, 3], [5, 4], [5, 5], [5, 6]]

[run]
ticks = 600
tick_ms = 16

[grid]
columns = 12
rows = 12

[[unit]]
category = "hero"
tile = [2, 4]
health = 400
attack = 20
defense = 3
attacks = ["melee", "ranged"]
attack_range = 5

[[unit]]
category = "mob"
tile = [8, 2]
experience = 30
gold = 5
chase = {}
wander = {}

[[unit]]
category = "mob"
tile = [8, 6]
health = 60
experience = 30
gold = 5
chase = { range = 8 }
wander = { radius = 2 }

[[unit]]
category = "mob"
tile = [10, 10]
experience = 20
wander = { interval_ms = 1500 }
"#;

/// Parsed scenario file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    version: u32,
    #[serde(default)]
    seed: u64,
    #[serde(default)]
    run: RunSection,
    grid: GridSection,
    #[serde(default)]
    obstacles: Vec<[i32; 2]>,
    #[serde(default, rename = "unit")]
    units: Vec<UnitEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunSection {
    #[serde(default = "default_ticks")]
    ticks: u32,
    #[serde(default = "default_tick_ms")]
    tick_ms: u64,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            ticks: DEFAULT_TICKS,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

fn default_ticks() -> u32 {
    DEFAULT_TICKS
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GridSection {
    columns: u32,
    rows: u32,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Category {
    Hero,
    Mob,
    Structure,
}

impl From<Category> for UnitCategory {
    fn from(category: Category) -> Self {
        match category {
            Category::Hero => UnitCategory::Hero,
            Category::Mob => UnitCategory::Mob,
            Category::Structure => UnitCategory::Structure,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitEntry {
    category: Category,
    tile: [i32; 2],
    health: Option<u32>,
    attack: Option<u32>,
    defense: Option<u32>,
    attack_speed: Option<f32>,
    attack_range: Option<u32>,
    #[serde(default)]
    attacks: Vec<String>,
    speed: Option<f32>,
    chase: Option<ChaseEntry>,
    wander: Option<WanderEntry>,
    #[serde(default)]
    experience: u32,
    #[serde(default)]
    gold: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChaseEntry {
    #[serde(default = "enabled")]
    enabled: bool,
    range: Option<u32>,
    leash: Option<u32>,
    scan_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WanderEntry {
    #[serde(default = "enabled")]
    enabled: bool,
    radius: Option<u32>,
    interval_ms: Option<u64>,
}

impl Scenario {
    /// Reads and parses a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid scenario at {}", path.display()))
    }

    /// Parses scenario contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let scenario: Self =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        if scenario.version != SUPPORTED_SCENARIO_VERSION {
            bail!(
                "unsupported scenario version {}; expected {}",
                scenario.version,
                SUPPORTED_SCENARIO_VERSION
            );
        }
        if scenario.run.tick_ms == 0 {
            bail!("tick_ms must be greater than zero");
        }
        Ok(scenario)
    }

    pub(crate) const fn seed(&self) -> u64 {
        self.seed
    }

    pub(crate) const fn ticks(&self) -> u32 {
        self.run.ticks
    }

    pub(crate) const fn tick(&self) -> Duration {
        Duration::from_millis(self.run.tick_ms)
    }

    /// Translates the scenario into a simulation description.
    pub(crate) fn builder(&self) -> Result<SimulationBuilder> {
        let mut builder = SimulationBuilder::new()
            .grid(GridBounds::new(self.grid.columns, self.grid.rows))
            .seed(self.seed);
        for [x, y] in &self.obstacles {
            builder = builder.obstacle(TileCoord::new(*x, *y));
        }
        for (index, entry) in self.units.iter().enumerate() {
            let spec = entry
                .to_spec()
                .with_context(|| format!("invalid unit #{index}"))?;
            builder = builder.unit(spec);
        }
        Ok(builder)
    }
}

impl UnitEntry {
    fn to_spec(&self) -> Result<UnitSpec> {
        let [x, y] = self.tile;
        let mut spec = UnitSpec::new(self.category.into(), TileCoord::new(x, y))
            .with_stats(self.stats()?)
            .with_rewards(Rewards {
                experience: self.experience,
                gold: self.gold,
            });
        if let Some(speed) = self.speed {
            if !speed.is_finite() || speed < 0.0 {
                bail!("movement speed must be a non-negative number, got {speed}");
            }
            spec = spec.with_movement_speed(speed);
        }
        if let Some(behavior) = self.behavior() {
            spec = spec.with_behavior(behavior);
        }
        Ok(spec)
    }

    fn stats(&self) -> Result<CombatStats> {
        let defaults = CombatStats::default();
        let profile = if self.attacks.is_empty() {
            defaults.profile
        } else {
            let kinds = self
                .attacks
                .iter()
                .map(|name| parse_attack_kind(name))
                .collect::<Result<Vec<_>>>()?;
            AttackProfile::with_kinds(&kinds)
        };
        Ok(CombatStats {
            health: self.health.map_or(defaults.health, Health::new),
            attack: self.attack.unwrap_or(defaults.attack),
            defense: self.defense.unwrap_or(defaults.defense),
            attack_speed: self.attack_speed.unwrap_or(defaults.attack_speed),
            attack_range: self.attack_range.unwrap_or(defaults.attack_range),
            profile,
        })
    }

    fn behavior(&self) -> Option<BehaviorConfig> {
        if self.chase.is_none() && self.wander.is_none() {
            return None;
        }

        let mut chase = ChaseConfig::default();
        match &self.chase {
            Some(entry) => {
                chase.enabled = entry.enabled;
                chase.range = entry.range.unwrap_or(chase.range);
                chase.leash = entry.leash.unwrap_or(chase.leash);
                chase.scan_interval = entry
                    .scan_ms
                    .map_or(chase.scan_interval, Duration::from_millis);
            }
            None => chase.enabled = false,
        }

        let mut wander = WanderConfig::default();
        match &self.wander {
            Some(entry) => {
                wander.enabled = entry.enabled;
                wander.radius = entry.radius.unwrap_or(wander.radius);
                wander.interval = entry
                    .interval_ms
                    .map_or(wander.interval, Duration::from_millis);
            }
            None => wander.enabled = false,
        }

        Some(BehaviorConfig { chase, wander })
    }
}

fn parse_attack_kind(name: &str) -> Result<AttackKind> {
    match name {
        "melee" => Ok(AttackKind::Melee),
        "ranged" => Ok(AttackKind::Ranged),
        "homing" => Ok(AttackKind::Homing),
        other => bail!("unknown attack kind `{other}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_scenario_builds() {
        let scenario = Scenario::parse(BUILT_IN).expect("built-in scenario parses");
        assert_eq!(scenario.seed(), 7);
        assert_eq!(scenario.ticks(), 600);
        assert_eq!(scenario.tick(), Duration::from_millis(16));

        let simulation = scenario
            .builder()
            .expect("units convert")
            .build()
            .expect("simulation builds");
        assert_eq!(simulation.spawned().len(), 4);
    }

    #[test]
    fn unit_sections_map_onto_specs() {
        let scenario = Scenario::parse(
            r#"
            version = 1
            [grid]
            columns = 4
            rows = 4

            [[unit]]
            category = "mob"
            tile = [1, 2]
            health = 30
            attacks = ["homing", "melee"]
            speed = 90.0
            chase = { range = 3, enabled = false }
            experience = 12
            "#,
        )
        .expect("scenario parses");
        let spec = scenario.units[0].to_spec().expect("spec converts");

        assert_eq!(spec.category, UnitCategory::Mob);
        assert_eq!(spec.tile, TileCoord::new(1, 2));
        assert_eq!(spec.stats.health, Health::new(30));
        assert!(spec.stats.profile.is_enabled(AttackKind::Homing));
        assert!(!spec.stats.profile.is_enabled(AttackKind::Ranged));
        assert_eq!(spec.movement_speed, 90.0);
        assert_eq!(spec.rewards.experience, 12);

        let behavior = spec.behavior.expect("behavior configured");
        assert!(!behavior.chase.enabled);
        assert_eq!(behavior.chase.range, 3);
        assert!(!behavior.wander.enabled);
    }

    #[test]
    fn run_section_defaults_apply() {
        let scenario = Scenario::parse("version = 1\n[grid]\ncolumns = 2\nrows = 2\n")
            .expect("scenario parses");
        assert_eq!(scenario.ticks(), DEFAULT_TICKS);
        assert_eq!(scenario.tick(), Duration::from_millis(DEFAULT_TICK_MS));
        assert!(scenario.units.is_empty());
    }

    #[test]
    fn rejects_unknown_attack_kinds() {
        let scenario = Scenario::parse(
            r#"
            version = 1
            [grid]
            columns = 4
            rows = 4
            [[unit]]
            category = "hero"
            tile = [0, 0]
            attacks = ["fireball"]
            "#,
        )
        .expect("scenario parses");
        let error = scenario.builder().unwrap_err();
        assert!(format!("{error:#}").contains("unknown attack kind `fireball`"));
    }

    #[test]
    fn rejects_unsupported_versions() {
        let error = Scenario::parse("version = 2\n[grid]\ncolumns = 2\nrows = 2\n").unwrap_err();
        assert!(error.to_string().contains("unsupported scenario version 2"));
    }
}
