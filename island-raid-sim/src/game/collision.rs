//! Collision Detection
//!
//! Axis-aligned box tests against other boxes, the canvas and the tile grid.
//! Boxes are given by their top-left position and size.

use crate::core::vec2::FixedVec2;
use crate::game::map::TileMap;

/// Check if two boxes overlap.
///
/// All four comparisons are strict, so boxes that only touch along an edge
/// do not overlap.
#[inline]
pub fn boxes_overlap(
    pos_a: FixedVec2,
    size_a: FixedVec2,
    pos_b: FixedVec2,
    size_b: FixedVec2,
) -> bool {
    pos_a.x < pos_b.x + size_b.x
        && pos_a.x + size_a.x > pos_b.x
        && pos_a.y < pos_b.y + size_b.y
        && pos_a.y + size_a.y > pos_b.y
}

/// The four corners of a box: top-left, top-right, bottom-left, bottom-right.
#[inline]
pub fn box_corners(pos: FixedVec2, size: FixedVec2) -> [FixedVec2; 4] {
    [
        pos,
        FixedVec2::new(pos.x + size.x, pos.y),
        FixedVec2::new(pos.x, pos.y + size.y),
        FixedVec2::new(pos.x + size.x, pos.y + size.y),
    ]
}

/// Check the box lies fully inside `[0, canvas]` on both axes.
#[inline]
pub fn box_inside_canvas(pos: FixedVec2, size: FixedVec2, canvas: FixedVec2) -> bool {
    pos.x >= 0
        && pos.y >= 0
        && pos.x + size.x <= canvas.x
        && pos.y + size.y <= canvas.y
}

/// Check every corner of the box sits on passable terrain.
///
/// A corner outside the grid counts as impassable.
pub fn box_on_passable(map: &TileMap, pos: FixedVec2, size: FixedVec2) -> bool {
    box_corners(pos, size)
        .iter()
        .all(|corner| map.is_passable_at(*corner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, to_fixed};
    use crate::game::map::Terrain;

    #[test]
    fn test_boxes_overlap() {
        let size = FixedVec2::from_ints(10, 10);
        let a = FixedVec2::from_ints(0, 0);

        assert!(boxes_overlap(a, size, FixedVec2::from_ints(5, 5), size));
        assert!(boxes_overlap(a, size, FixedVec2::from_ints(-9, 9), size));
        assert!(!boxes_overlap(a, size, FixedVec2::from_ints(20, 0), size));
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let size = FixedVec2::from_ints(10, 10);
        let a = FixedVec2::from_ints(0, 0);

        assert!(!boxes_overlap(a, size, FixedVec2::from_ints(10, 0), size));
        assert!(!boxes_overlap(a, size, FixedVec2::from_ints(0, 10), size));
        assert!(boxes_overlap(a, size, FixedVec2::new(to_fixed(9.5), 0), size));
    }

    #[test]
    fn test_box_inside_canvas() {
        let canvas = FixedVec2::from_ints(800, 600);
        let size = FixedVec2::from_ints(24, 24);

        assert!(box_inside_canvas(FixedVec2::ZERO, size, canvas));
        assert!(box_inside_canvas(FixedVec2::from_ints(776, 576), size, canvas));
        assert!(!box_inside_canvas(FixedVec2::from_ints(777, 0), size, canvas));
        assert!(!box_inside_canvas(FixedVec2::new(-1, 0), size, canvas));
    }

    #[test]
    fn test_box_on_passable_checks_all_corners() {
        // 3x1 strip: grass, grass, tree
        let map = TileMap::from_cells(
            3,
            1,
            from_int(32),
            vec![Terrain::Grass, Terrain::Grass, Terrain::Tree],
        )
        .unwrap();
        let size = FixedVec2::from_ints(24, 24);

        assert!(box_on_passable(&map, FixedVec2::from_ints(4, 4), size));
        assert!(box_on_passable(&map, FixedVec2::from_ints(30, 4), size));
        // Right edge reaches the tree column
        assert!(!box_on_passable(&map, FixedVec2::from_ints(41, 4), size));
        // Bottom edge leaves the grid
        assert!(!box_on_passable(&map, FixedVec2::from_ints(4, 10), size));
    }
}
