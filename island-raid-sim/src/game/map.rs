//! Island Tile Map
//!
//! Fixed-size terrain grid generated from noise-perturbed circular islands.
//! Dimensions never change after generation; the only later mutation is the
//! spawn patch that clears a neighbourhood around each fixed spawn point.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, fixed_floor_div, to_f64, to_fixed};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::FixedVec2;
use crate::game::config::ConfigError;

/// Largest grid a map may have, in cells.
pub const MAX_MAP_CELLS: u64 = 1 << 20;

// =============================================================================
// TERRAIN
// =============================================================================

/// Terrain class of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Terrain {
    /// Open water. Blocks strict movement, slows wading movement.
    Water = 0,
    /// Passable land.
    Grass = 1,
    /// Passable shore ring.
    Sand = 2,
    /// Obstacle inside the grass region.
    Tree = 3,
}

impl Terrain {
    /// Can a player stand here under strict collision?
    #[inline]
    pub fn is_passable(self) -> bool {
        matches!(self, Terrain::Grass | Terrain::Sand)
    }

    /// Is this water?
    #[inline]
    pub fn is_water(self) -> bool {
        self == Terrain::Water
    }
}

// =============================================================================
// GENERATION RULES
// =============================================================================

/// Radius perturbation: `amplitude_x·sin(x·frequency_x) + amplitude_y·cos(y·frequency_y)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadiusNoise {
    /// Weight of the sine term
    pub amplitude_x: f64,
    /// Frequency applied to the sample x coordinate
    pub frequency_x: f64,
    /// Weight of the cosine term
    pub amplitude_y: f64,
    /// Frequency applied to the sample y coordinate
    pub frequency_y: f64,
}

impl RadiusNoise {
    /// Offset added to the base radius at a sample point.
    pub fn at(&self, x: f64, y: f64) -> f64 {
        self.amplitude_x * (x * self.frequency_x).sin()
            + self.amplitude_y * (y * self.frequency_y).cos()
    }

    /// Largest offset this noise can produce.
    pub fn max_offset(&self) -> f64 {
        self.amplitude_x.abs() + self.amplitude_y.abs()
    }
}

/// Tree scattering inside an island's grass region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeRule {
    /// Chance per eligible grass cell, 0.0..=1.0
    pub chance: f64,
    /// No trees closer than this to the island center
    pub clearing_radius: f64,
}

/// Map generation policy.
///
/// Islands sit at fixed positions relative to the map extent; radii and
/// noise amplitudes are in canvas units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapLayout {
    /// One island in the middle: grass inside, a sand ring, scattered trees.
    CenterIsland {
        /// Grass radius before noise
        grass_radius: f64,
        /// Width of the sand ring outside the grass
        sand_width: f64,
        /// Radius noise
        noise: RadiusNoise,
        /// Tree placement
        trees: TreeRule,
    },
    /// One island filling most of the map, water elsewhere.
    LargeIsland {
        /// Base radius before noise
        radius: f64,
        /// Radius noise
        noise: RadiusNoise,
    },
    /// Three disjoint islands at left, center and right.
    Archipelago {
        /// Base radius of each island before noise
        radius: f64,
        /// Radius noise shared by all three
        noise: RadiusNoise,
    },
}

impl MapLayout {
    /// Default single island with trees.
    pub fn center_island() -> Self {
        MapLayout::CenterIsland {
            grass_radius: 250.0,
            sand_width: 30.0,
            noise: RadiusNoise {
                amplitude_x: 12.0,
                frequency_x: 0.03,
                amplitude_y: 10.0,
                frequency_y: 0.025,
            },
            trees: TreeRule {
                chance: 0.1,
                clearing_radius: 80.0,
            },
        }
    }

    /// Default large island.
    pub fn large_island() -> Self {
        MapLayout::LargeIsland {
            radius: 300.0,
            noise: RadiusNoise {
                amplitude_x: 20.0,
                frequency_x: 0.02,
                amplitude_y: 15.0,
                frequency_y: 0.03,
            },
        }
    }

    /// Default three-island layout.
    pub fn archipelago() -> Self {
        MapLayout::Archipelago {
            radius: 100.0,
            noise: RadiusNoise {
                amplitude_x: 6.0,
                frequency_x: 0.05,
                amplitude_y: 4.0,
                frequency_y: 0.04,
            },
        }
    }

    /// Expand the policy into concrete islands for a canvas.
    pub fn islands(&self, canvas_width: f64, canvas_height: f64) -> Vec<Island> {
        match *self {
            MapLayout::CenterIsland { grass_radius, sand_width, noise, trees } => vec![Island {
                center: (canvas_width * 0.5, canvas_height * 0.5),
                radius: grass_radius,
                noise,
                shore_width: sand_width,
                trees: Some(trees),
            }],
            MapLayout::LargeIsland { radius, noise } => vec![Island {
                center: (canvas_width * 0.5, canvas_height * 0.5),
                radius,
                noise,
                shore_width: 0.0,
                trees: None,
            }],
            MapLayout::Archipelago { radius, noise } => [0.2, 0.5, 0.8]
                .iter()
                .map(|rel_x| Island {
                    center: (canvas_width * rel_x, canvas_height * 0.5),
                    radius,
                    noise,
                    shore_width: 0.0,
                    trees: None,
                })
                .collect(),
        }
    }
}

/// One concrete island produced by a [`MapLayout`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Island {
    /// Center in canvas units
    pub center: (f64, f64),
    /// Base radius
    pub radius: f64,
    /// Radius noise
    pub noise: RadiusNoise,
    /// Sand ring width beyond the land radius (0 = none)
    pub shore_width: f64,
    /// Tree placement (None = no trees)
    pub trees: Option<TreeRule>,
}

impl Island {
    /// Terrain this island puts at a sample point, or None if the point is
    /// off the island.
    fn terrain_at(&self, x: f64, y: f64, tree_chance: Fixed, rng: &mut DeterministicRng) -> Option<Terrain> {
        let dx = x - self.center.0;
        let dy = y - self.center.1;
        let distance = (dx * dx + dy * dy).sqrt();
        let land_radius = self.radius + self.noise.at(x, y);

        if distance < land_radius {
            if let Some(trees) = self.trees {
                if distance > trees.clearing_radius && rng.next_chance(tree_chance) {
                    return Some(Terrain::Tree);
                }
            }
            Some(Terrain::Grass)
        } else if distance < land_radius + self.shore_width {
            Some(Terrain::Sand)
        } else {
            None
        }
    }
}

// =============================================================================
// TILE MAP
// =============================================================================

/// Rectangular terrain grid, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMap {
    columns: u32,
    rows: u32,
    tile_size: Fixed,
    cells: Vec<Terrain>,
}

impl TileMap {
    /// Generate a map from a layout policy.
    ///
    /// Each cell is classified by its top-left corner. Where islands overlap
    /// the first island in layout order wins. Tree placement draws from
    /// `rng`, so the seed fully determines the result.
    pub fn generate(
        columns: u32,
        rows: u32,
        tile_size: Fixed,
        layout: &MapLayout,
        rng: &mut DeterministicRng,
    ) -> Result<Self, ConfigError> {
        let count = check_dimensions(columns, rows, tile_size)?;

        let tile = to_f64(tile_size);
        let islands = layout.islands(columns as f64 * tile, rows as f64 * tile);
        let mut cells = Vec::with_capacity(count);

        for row in 0..rows {
            for col in 0..columns {
                let x = col as f64 * tile;
                let y = row as f64 * tile;
                let terrain = islands
                    .iter()
                    .find_map(|island| {
                        let chance = island.trees.map_or(0, |t| to_fixed(t.chance));
                        island.terrain_at(x, y, chance, rng)
                    })
                    .unwrap_or(Terrain::Water);
                cells.push(terrain);
            }
        }

        Ok(Self { columns, rows, tile_size, cells })
    }

    /// Build a map from explicit cells (row-major).
    pub fn from_cells(
        columns: u32,
        rows: u32,
        tile_size: Fixed,
        cells: Vec<Terrain>,
    ) -> Result<Self, ConfigError> {
        let expected = check_dimensions(columns, rows, tile_size)?;
        if cells.len() != expected {
            return Err(ConfigError::CellCount { expected, actual: cells.len() });
        }
        Ok(Self { columns, rows, tile_size, cells })
    }

    /// Map where every cell has the same terrain.
    pub fn filled(columns: u32, rows: u32, tile_size: Fixed, terrain: Terrain) -> Result<Self, ConfigError> {
        let count = check_dimensions(columns, rows, tile_size)?;
        Self::from_cells(columns, rows, tile_size, vec![terrain; count])
    }

    /// Width in tiles.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Height in tiles.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile edge length.
    pub fn tile_size(&self) -> Fixed {
        self.tile_size
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Terrain] {
        &self.cells
    }

    /// Terrain of a cell, None outside the grid.
    pub fn cell(&self, col: i32, row: i32) -> Option<Terrain> {
        self.index(col, row).map(|i| self.cells[i])
    }

    /// Cell coordinates containing a point (may lie outside the grid).
    #[inline]
    pub fn cell_of(&self, pos: FixedVec2) -> (i32, i32) {
        (
            fixed_floor_div(pos.x, self.tile_size),
            fixed_floor_div(pos.y, self.tile_size),
        )
    }

    /// Terrain under a point. None means out of bounds.
    #[inline]
    pub fn classify(&self, pos: FixedVec2) -> Option<Terrain> {
        let (col, row) = self.cell_of(pos);
        self.cell(col, row)
    }

    /// True if the point lies on a cell passable under strict collision.
    #[inline]
    pub fn is_passable_at(&self, pos: FixedVec2) -> bool {
        self.classify(pos).is_some_and(Terrain::is_passable)
    }

    /// Force every cell within `radius_cells` (Chebyshev) of the cell
    /// containing `pos` to grass. Cells outside the grid are skipped.
    ///
    /// Returns the number of cells that changed; a second call with the same
    /// arguments returns 0.
    pub fn ensure_passable_patch(&mut self, pos: FixedVec2, radius_cells: u32) -> usize {
        let (center_col, center_row) = self.cell_of(pos);
        let cols = clip_span(center_col, radius_cells, self.columns);
        let rows = clip_span(center_row, radius_cells, self.rows);
        let mut changed = 0;

        for row in rows {
            for col in cols.clone() {
                let i = row * self.columns as usize + col;
                if self.cells[i] != Terrain::Grass {
                    self.cells[i] = Terrain::Grass;
                    changed += 1;
                }
            }
        }

        changed
    }

    /// Count of cells with the given terrain.
    pub fn count(&self, terrain: Terrain) -> usize {
        self.cells.iter().filter(|t| **t == terrain).count()
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col as u32 >= self.columns || row as u32 >= self.rows {
            return None;
        }
        Some(row as usize * self.columns as usize + col as usize)
    }
}

/// Validate grid dimensions and return the cell count.
pub(crate) fn check_grid(columns: u32, rows: u32) -> Result<usize, ConfigError> {
    if columns == 0 || rows == 0 {
        return Err(ConfigError::EmptyMap { columns, rows });
    }
    let cells = columns as u64 * rows as u64;
    if cells > MAX_MAP_CELLS {
        return Err(ConfigError::GridTooLarge { columns, rows, max: MAX_MAP_CELLS });
    }
    Ok(cells as usize)
}

fn check_dimensions(columns: u32, rows: u32, tile_size: Fixed) -> Result<usize, ConfigError> {
    if tile_size <= 0 {
        return Err(ConfigError::NonPositive { field: "tile_size" });
    }
    check_grid(columns, rows)
}

/// Indices within `radius` of `center`, clipped to `0..len`.
fn clip_span(center: i32, radius: u32, len: u32) -> std::ops::Range<usize> {
    let lo = (center as i64 - radius as i64).max(0);
    let hi = (center as i64 + radius as i64 + 1).min(len as i64);
    if lo >= hi {
        return 0..0;
    }
    lo as usize..hi as usize
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, to_fixed};

    const TILE: Fixed = from_int(32);

    fn generate(layout: MapLayout, seed: u64) -> TileMap {
        let mut rng = DeterministicRng::new(seed);
        TileMap::generate(25, 19, TILE, &layout, &mut rng).unwrap()
    }

    #[test]
    fn test_rejects_empty_grid() {
        let mut rng = DeterministicRng::new(1);
        let layout = MapLayout::center_island();
        assert!(matches!(
            TileMap::generate(0, 19, TILE, &layout, &mut rng),
            Err(ConfigError::EmptyMap { .. })
        ));
        assert!(TileMap::generate(25, 19, 0, &layout, &mut rng).is_err());
        assert!(TileMap::from_cells(2, 2, TILE, vec![Terrain::Grass; 3]).is_err());
    }

    #[test]
    fn test_center_island_shape() {
        let map = generate(MapLayout::center_island(), 42);
        assert_eq!(map.cells().len(), 25 * 19);

        // Corners are open water, the center is clear grass
        assert_eq!(map.cell(0, 0), Some(Terrain::Water));
        assert_eq!(map.cell(24, 18), Some(Terrain::Water));
        assert_eq!(map.classify(FixedVec2::from_ints(400, 300)), Some(Terrain::Grass));

        assert!(map.count(Terrain::Sand) > 0);
        assert!(map.count(Terrain::Tree) > 0);
    }

    #[test]
    fn test_center_island_clearing_has_no_trees() {
        let map = generate(MapLayout::center_island(), 7);
        // 25x19 tiles of 32 → island centered at (400, 304)
        for row in 0..map.rows() as i32 {
            for col in 0..map.columns() as i32 {
                let dx = col as f64 * 32.0 - 400.0;
                let dy = row as f64 * 32.0 - 304.0;
                if (dx * dx + dy * dy).sqrt() <= 80.0 {
                    assert_ne!(map.cell(col, row), Some(Terrain::Tree));
                }
            }
        }
    }

    #[test]
    fn test_generation_is_seed_deterministic() {
        let a = generate(MapLayout::center_island(), 99);
        let b = generate(MapLayout::center_island(), 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_layouts_without_trees_ignore_seed() {
        assert_eq!(generate(MapLayout::archipelago(), 1), generate(MapLayout::archipelago(), 2));
        assert_eq!(generate(MapLayout::large_island(), 1), generate(MapLayout::large_island(), 2));
    }

    #[test]
    fn test_large_island_is_mostly_land() {
        let map = generate(MapLayout::large_island(), 0);
        assert!(map.count(Terrain::Grass) > map.count(Terrain::Water));
        assert_eq!(map.count(Terrain::Tree), 0);
        assert_eq!(map.count(Terrain::Sand), 0);
    }

    #[test]
    fn test_archipelago_islands_are_disjoint() {
        let map = generate(MapLayout::archipelago(), 0);
        // Island centers are land
        for x in [160, 400, 640] {
            assert_eq!(map.classify(FixedVec2::from_ints(x, 300)), Some(Terrain::Grass));
        }
        // Straits between them are water
        for x in [290, 515] {
            assert_eq!(map.classify(FixedVec2::from_ints(x, 300)), Some(Terrain::Water));
        }
    }

    #[test]
    fn test_classify_out_of_bounds() {
        let map = generate(MapLayout::archipelago(), 0);
        assert_eq!(map.classify(FixedVec2::new(to_fixed(-0.5), 0)), None);
        assert_eq!(map.classify(FixedVec2::from_ints(800, 10)), None);
        assert_eq!(map.classify(FixedVec2::from_ints(10, 608)), None);
        assert!(map.classify(FixedVec2::from_ints(799, 607)).is_some());
    }

    #[test]
    fn test_classify_floor_division() {
        let mut cells = vec![Terrain::Water; 4];
        cells[1] = Terrain::Sand; // (col 1, row 0)
        let map = TileMap::from_cells(2, 2, TILE, cells).unwrap();

        assert_eq!(map.classify(FixedVec2::new(to_fixed(31.99), 0)), Some(Terrain::Water));
        assert_eq!(map.classify(FixedVec2::from_ints(32, 0)), Some(Terrain::Sand));
        assert_eq!(map.classify(FixedVec2::from_ints(63, 31)), Some(Terrain::Sand));
        assert_eq!(map.classify(FixedVec2::from_ints(63, 32)), Some(Terrain::Water));
    }

    #[test]
    fn test_passable_patch_is_idempotent() {
        let mut map = TileMap::filled(10, 10, TILE, Terrain::Water).unwrap();
        let spawn = FixedVec2::from_ints(100, 100); // cell (3, 3)

        assert_eq!(map.ensure_passable_patch(spawn, 1), 9);
        assert_eq!(map.ensure_passable_patch(spawn, 1), 0);
        assert_eq!(map.cell(2, 2), Some(Terrain::Grass));
        assert_eq!(map.cell(4, 4), Some(Terrain::Grass));
        assert_eq!(map.cell(5, 5), Some(Terrain::Water));
    }

    #[test]
    fn test_rejects_oversized_grid() {
        assert!(matches!(
            TileMap::filled(800_000, 600_000, TILE, Terrain::Water),
            Err(ConfigError::GridTooLarge { .. })
        ));
        assert!(matches!(check_grid(1024, 1025), Err(ConfigError::GridTooLarge { .. })));
        assert_eq!(check_grid(1024, 1024).unwrap(), 1 << 20);
    }

    #[test]
    fn test_huge_patch_radius_covers_whole_grid() {
        let mut map = TileMap::filled(6, 4, TILE, Terrain::Water).unwrap();
        assert_eq!(map.ensure_passable_patch(FixedVec2::from_ints(40, 40), u32::MAX), 24);
        assert_eq!(map.count(Terrain::Grass), 24);

        // Patch centered off the grid still reaches back in
        let mut map = TileMap::filled(6, 4, TILE, Terrain::Water).unwrap();
        assert_eq!(map.ensure_passable_patch(FixedVec2::from_ints(-64, 0), 2), 3);
    }

    #[test]
    fn test_passable_patch_clips_at_edges() {
        let mut map = TileMap::filled(4, 4, TILE, Terrain::Tree).unwrap();
        assert_eq!(map.ensure_passable_patch(FixedVec2::ZERO, 1), 4);
        assert!(map.is_passable_at(FixedVec2::ZERO));
    }
}
