//! Session Configuration
//!
//! [`GameConfig`] is the human-facing description of a session, in canvas
//! units and milliseconds, loadable from JSON. [`GameConfig::rules`]
//! validates it and compiles it into [`Rules`], the fixed-point form the
//! tick loop reads.

use std::path::Path;
use std::time::Duration;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::fixed::{Fixed, FIXED_ONE, to_f64, to_fixed};
use crate::core::vec2::FixedVec2;
use crate::game::combat::AttackRule;
use crate::game::map::{check_grid, MapLayout, RadiusNoise};
use crate::game::movement::{MovementRule, MovementTiming};
use crate::game::pickup::PickupRule;

/// Frame rate the runtime driver ticks at unless configured otherwise.
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Highest frame rate the driver accepts.
pub const MAX_FRAME_RATE: u32 = 1_000;

// =============================================================================
// ERRORS
// =============================================================================

/// Invalid configuration or map construction input.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Grid with no cells
    #[error("map must have at least one cell, got {columns}x{rows}")]
    EmptyMap {
        /// Requested width in tiles
        columns: u32,
        /// Requested height in tiles
        rows: u32,
    },

    /// Grid with more cells than [`MAX_MAP_CELLS`](crate::game::map::MAX_MAP_CELLS)
    #[error("map of {columns}x{rows} cells exceeds {max} cells")]
    GridTooLarge {
        /// Requested width in tiles
        columns: u32,
        /// Requested height in tiles
        rows: u32,
        /// Cell limit
        max: u64,
    },

    /// Explicit cell list does not match the grid dimensions
    #[error("expected {expected} cells, got {actual}")]
    CellCount {
        /// `columns * rows`
        expected: usize,
        /// Length of the supplied list
        actual: usize,
    },

    /// A size, speed, health or rate that must be positive
    #[error("{field} must be positive")]
    NonPositive {
        /// Config field name
        field: &'static str,
    },

    /// A value outside its allowed interval
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        /// Config field name
        field: &'static str,
        /// Rejected value
        value: f64,
        /// Lowest accepted value
        min: f64,
        /// Highest accepted value
        max: f64,
    },

    /// A spawn box that does not fit on the canvas
    #[error("{entity} spawn ({x}, {y}) does not fit on the canvas")]
    SpawnOutsideCanvas {
        /// Which entity
        entity: &'static str,
        /// Spawn x
        x: f64,
        /// Spawn y
        y: f64,
    },

    /// Archipelago islands large enough to touch each other
    #[error("archipelago islands overlap: radius plus noise {reach} exceeds {limit}")]
    IslandsOverlap {
        /// Base radius plus largest noise offset
        reach: f64,
        /// Half the spacing between island centers
        limit: f64,
    },

    /// Config file could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for [`GameConfig`]
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// POLICIES
// =============================================================================

/// How the player moves over terrain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MovementPolicy {
    /// Water and trees block; the box must stay on passable cells
    Strict,
    /// Water slows; the position is clamped to the canvas
    Wading {
        /// Speed factor while the player's center is over water, 0.0..=1.0
        water_multiplier: f64,
    },
}

/// When the player takes the weapon.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PickupPolicy {
    /// Positions closer than `radius`
    Distance {
        /// Pickup distance
        radius: f64,
    },
    /// Bounding boxes overlap
    Overlap,
}

/// How the boss takes damage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttackPolicy {
    /// Automatic damage in range, rate-limited by wall time
    Contact {
        /// Engagement distance (exclusive)
        range: f64,
        /// Health removed per hit
        damage: i32,
        /// Minimum time between hits
        cooldown_ms: u64,
    },
    /// Damage per attack press, rate-limited by ticks
    Triggered {
        /// Engagement distance (inclusive)
        range: f64,
        /// Health removed per hit
        damage: i32,
        /// Ticks before the next press can land
        cooldown_ticks: u32,
    },
}

/// A square entity's spawn and size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Top-left x
    pub x: f64,
    /// Top-left y
    pub y: f64,
    /// Edge length
    pub size: f64,
}

impl EntityConfig {
    const fn new(x: f64, y: f64, size: f64) -> Self {
        Self { x, y, size }
    }
}

// =============================================================================
// GAME CONFIG
// =============================================================================

/// Complete session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Canvas width in canvas units
    pub canvas_width: f64,
    /// Canvas height in canvas units
    pub canvas_height: f64,
    /// Tile edge length
    pub tile_size: f64,
    /// Player spawn and size
    pub player: EntityConfig,
    /// Player step per tick on land
    pub player_speed: f64,
    /// Weapon spawn and size
    pub weapon: EntityConfig,
    /// Boss spawn and size
    pub boss: EntityConfig,
    /// Boss health at spawn
    pub boss_max_health: i32,
    /// Extra cells cleared around each spawn beyond the entity's half-size
    pub spawn_patch_margin: u32,
    /// Terrain generation
    pub map: MapLayout,
    /// Movement policy
    pub movement: MovementPolicy,
    /// Movement timing
    pub timing: MovementTiming,
    /// Pickup policy
    pub pickup: PickupPolicy,
    /// Attack policy
    pub attack: AttackPolicy,
    /// Ticks per second for the runtime driver
    pub frame_rate: u32,
    /// Terrain seed
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::archipelago()
    }
}

impl GameConfig {
    /// One island with a sand ring and trees, strict collision, distance
    /// pickup and contact damage.
    ///
    /// Player and boss spawns sit on the island so the strict policy can
    /// reach both.
    pub fn classic() -> Self {
        Self {
            player: EntityConfig::new(220.0, 420.0, 24.0),
            boss: EntityConfig::new(560.0, 160.0, 48.0),
            map: MapLayout::center_island(),
            movement: MovementPolicy::Strict,
            pickup: PickupPolicy::Distance { radius: 30.0 },
            attack: AttackPolicy::Contact {
                range: 60.0,
                damage: 10,
                cooldown_ms: 500,
            },
            ..Self::base()
        }
    }

    /// One large island, wading movement, overlap pickup and contact damage.
    pub fn large_island() -> Self {
        Self {
            map: MapLayout::large_island(),
            attack: AttackPolicy::Contact {
                range: 60.0,
                damage: 10,
                cooldown_ms: 500,
            },
            ..Self::base()
        }
    }

    /// Three islands, wading movement, overlap pickup and a triggered attack.
    pub fn archipelago() -> Self {
        Self::base()
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "classic" => Some(Self::classic()),
            "large_island" | "large-island" => Some(Self::large_island()),
            "archipelago" => Some(Self::archipelago()),
            _ => None,
        }
    }

    fn base() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            tile_size: 32.0,
            player: EntityConfig::new(100.0, 500.0, 24.0),
            player_speed: 3.0,
            weapon: EntityConfig::new(400.0, 200.0, 16.0),
            boss: EntityConfig::new(650.0, 100.0, 48.0),
            boss_max_health: 100,
            spawn_patch_margin: 1,
            map: MapLayout::archipelago(),
            movement: MovementPolicy::Wading { water_multiplier: 0.5 },
            timing: MovementTiming::PerTick,
            pickup: PickupPolicy::Overlap,
            attack: AttackPolicy::Triggered {
                range: 50.0,
                damage: 20,
                cooldown_ticks: 30,
            },
            frame_rate: DEFAULT_FRAME_RATE,
            seed: 0,
        }
    }

    /// Parse a JSON config. Missing fields take archipelago defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validate and compile into fixed-point rules.
    pub fn rules(&self) -> Result<Rules, ConfigError> {
        positive("canvas_width", self.canvas_width)?;
        positive("canvas_height", self.canvas_height)?;
        positive("tile_size", self.tile_size)?;
        positive("player.size", self.player.size)?;
        positive("weapon.size", self.weapon.size)?;
        positive("boss.size", self.boss.size)?;
        positive("player_speed", self.player_speed)?;
        if self.boss_max_health <= 0 {
            return Err(ConfigError::NonPositive { field: "boss_max_health" });
        }
        in_range("frame_rate", self.frame_rate as f64, 1.0, MAX_FRAME_RATE as f64)?;
        // Q16.16 integer range
        in_range("canvas_width", self.canvas_width, 0.0, 16_384.0)?;
        in_range("canvas_height", self.canvas_height, 0.0, 16_384.0)?;

        // Grid from the fixed-point values the tick loop will see
        let tile_size = to_fixed(self.tile_size);
        if tile_size <= 0 {
            return Err(ConfigError::OutOfRange {
                field: "tile_size",
                value: self.tile_size,
                min: 1.0 / FIXED_ONE as f64,
                max: self.canvas_width.max(self.canvas_height),
            });
        }
        let canvas = FixedVec2::new(to_fixed(self.canvas_width), to_fixed(self.canvas_height));
        let columns = ceil_div(canvas.x, tile_size);
        let rows = ceil_div(canvas.y, tile_size);
        check_grid(columns, rows)?;

        let max_margin = columns.max(rows);
        if self.spawn_patch_margin > max_margin {
            return Err(ConfigError::OutOfRange {
                field: "spawn_patch_margin",
                value: self.spawn_patch_margin as f64,
                min: 0.0,
                max: max_margin as f64,
            });
        }

        for (entity, spawn) in [("player", self.player), ("weapon", self.weapon), ("boss", self.boss)] {
            let fits = spawn.x >= 0.0
                && spawn.y >= 0.0
                && spawn.x + spawn.size <= self.canvas_width
                && spawn.y + spawn.size <= self.canvas_height;
            if !fits {
                return Err(ConfigError::SpawnOutsideCanvas { entity, x: spawn.x, y: spawn.y });
            }
        }

        self.check_layout(columns as f64 * to_f64(tile_size))?;

        let movement = match self.movement {
            MovementPolicy::Strict => MovementRule::Strict,
            MovementPolicy::Wading { water_multiplier } => {
                in_range("movement.water_multiplier", water_multiplier, 0.0, 1.0)?;
                MovementRule::Wading {
                    water_multiplier: to_fixed(water_multiplier),
                }
            }
        };

        if let MovementTiming::Scaled { reference_hz } = self.timing {
            in_range("timing.reference_hz", reference_hz as f64, 1.0, MAX_FRAME_RATE as f64)?;
        }

        let pickup = match self.pickup {
            PickupPolicy::Distance { radius } => {
                positive("pickup.radius", radius)?;
                PickupRule::Distance { radius: to_fixed(radius) }
            }
            PickupPolicy::Overlap => PickupRule::Overlap,
        };

        let attack = match self.attack {
            AttackPolicy::Contact { range, damage, cooldown_ms } => {
                positive("attack.range", range)?;
                positive("attack.damage", damage as f64)?;
                AttackRule::Contact {
                    range: to_fixed(range),
                    damage,
                    cooldown: Duration::from_millis(cooldown_ms),
                }
            }
            AttackPolicy::Triggered { range, damage, cooldown_ticks } => {
                positive("attack.range", range)?;
                positive("attack.damage", damage as f64)?;
                AttackRule::Triggered {
                    range: to_fixed(range),
                    damage,
                    cooldown_ticks,
                }
            }
        };

        Ok(Rules {
            canvas,
            tile_size,
            columns,
            rows,
            layout: self.map,
            player_spawn: vec(self.player.x, self.player.y),
            player_size: vec(self.player.size, self.player.size),
            player_speed: to_fixed(self.player_speed),
            weapon_spawn: vec(self.weapon.x, self.weapon.y),
            weapon_size: vec(self.weapon.size, self.weapon.size),
            boss_spawn: vec(self.boss.x, self.boss.y),
            boss_size: vec(self.boss.size, self.boss.size),
            boss_max_health: self.boss_max_health,
            spawn_patch_margin: self.spawn_patch_margin,
            movement,
            timing: self.timing,
            pickup,
            attack,
            frame_rate: self.frame_rate,
        })
    }

    /// `grid_width` is the generated grid's extent, which islands are laid
    /// out against.
    fn check_layout(&self, grid_width: f64) -> Result<(), ConfigError> {
        let check_noise = |noise: &RadiusNoise| {
            let all_finite = [noise.amplitude_x, noise.frequency_x, noise.amplitude_y, noise.frequency_y]
                .iter()
                .all(|v| v.is_finite());
            if all_finite {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    field: "map.noise",
                    value: f64::NAN,
                    min: f64::MIN,
                    max: f64::MAX,
                })
            }
        };

        match &self.map {
            MapLayout::CenterIsland { grass_radius, sand_width, noise, trees } => {
                positive("map.grass_radius", *grass_radius)?;
                in_range("map.sand_width", *sand_width, 0.0, f64::MAX)?;
                in_range("map.trees.chance", trees.chance, 0.0, 1.0)?;
                in_range("map.trees.clearing_radius", trees.clearing_radius, 0.0, f64::MAX)?;
                check_noise(noise)
            }
            MapLayout::LargeIsland { radius, noise } => {
                positive("map.radius", *radius)?;
                check_noise(noise)
            }
            MapLayout::Archipelago { radius, noise } => {
                positive("map.radius", *radius)?;
                check_noise(noise)?;
                // Centers are 0.3 of the width apart
                let reach = radius + noise.max_offset();
                let limit = grid_width * 0.15;
                if reach >= limit {
                    return Err(ConfigError::IslandsOverlap { reach, limit });
                }
                Ok(())
            }
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field })
    }
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, min, max })
    }
}

/// Tiles needed to cover `extent`. Both are positive and below 2^31.
fn ceil_div(extent: Fixed, tile: Fixed) -> u32 {
    let (extent, tile) = (extent as i64, tile as i64);
    ((extent + tile - 1) / tile) as u32
}

fn vec(x: f64, y: f64) -> FixedVec2 {
    FixedVec2::new(to_fixed(x), to_fixed(y))
}

// =============================================================================
// RULES
// =============================================================================

/// Validated configuration in fixed-point form.
#[derive(Clone, Debug, PartialEq)]
pub struct Rules {
    /// Canvas extent
    pub canvas: FixedVec2,
    /// Tile edge length
    pub tile_size: Fixed,
    /// Grid width, `ceil(canvas_width / tile_size)`
    pub columns: u32,
    /// Grid height, `ceil(canvas_height / tile_size)`
    pub rows: u32,
    /// Terrain generation
    pub layout: MapLayout,
    /// Player spawn (top-left)
    pub player_spawn: FixedVec2,
    /// Player box
    pub player_size: FixedVec2,
    /// Player step on land
    pub player_speed: Fixed,
    /// Weapon spawn (top-left)
    pub weapon_spawn: FixedVec2,
    /// Weapon box
    pub weapon_size: FixedVec2,
    /// Boss spawn (top-left)
    pub boss_spawn: FixedVec2,
    /// Boss box
    pub boss_size: FixedVec2,
    /// Boss health at spawn
    pub boss_max_health: i32,
    /// Extra patch cells around each spawn
    pub spawn_patch_margin: u32,
    /// Movement policy
    pub movement: MovementRule,
    /// Movement timing
    pub timing: MovementTiming,
    /// Pickup policy
    pub pickup: PickupRule,
    /// Attack policy
    pub attack: AttackRule,
    /// Driver ticks per second
    pub frame_rate: u32,
}

impl Rules {
    /// Chebyshev radius, in cells, of the patch cleared around a spawn box:
    /// enough to cover half the box plus the configured margin.
    pub fn spawn_patch_radius(&self, size: FixedVec2) -> u32 {
        let half = (size.x.max(size.y) >> 1) as i64;
        let tile = self.tile_size as i64;
        let cells = (half + tile - 1) / tile;
        (cells as u32).saturating_add(self.spawn_patch_margin)
    }

    /// Nominal tick period for the driver.
    pub fn frame_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.frame_rate.clamp(1, MAX_FRAME_RATE) as u64)
    }
}

// =============================================================================
// TESTS
// =============================================================================
