//! Movement Resolution
//!
//! Applies one frame of directional input to the player under one of two
//! policies:
//!
//! - **Strict**: each axis step is accepted only if the moved box stays on
//!   the canvas and all four corners land on passable terrain.
//! - **Wading**: water only slows the player. Each axis step is accepted if
//!   the box center stays on the grid, then the position is clamped to the
//!   canvas.
//!
//! X is resolved before Y, so a blocked diagonal still slides along the
//! open axis.

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, FIXED_ONE, fixed_mul};
use crate::core::vec2::FixedVec2;
use crate::game::collision::{box_inside_canvas, box_on_passable};
use crate::game::input::InputFrame;
use crate::game::map::{TileMap, Terrain};
use crate::game::state::PlayerState;

/// Compiled movement policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementRule {
    /// Water and trees block
    Strict,
    /// Water slows by `water_multiplier`
    Wading {
        /// Speed factor over water
        water_multiplier: Fixed,
    },
}

/// How far one tick moves the player.
///
/// `PerTick` moves a fixed distance per tick, so actual speed follows the
/// frame rate of whatever drives the loop. `Scaled` multiplies the step by
/// the elapsed time relative to `reference_hz`, giving the same speed at any
/// frame rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MovementTiming {
    /// Speed is distance per tick
    #[default]
    PerTick,
    /// Speed is distance per `1 / reference_hz` seconds
    Scaled {
        /// Tick rate at which one step equals `speed`
        reference_hz: u32,
    },
}

/// Step length for a tick of duration `dt`.
pub fn step_distance(speed: Fixed, timing: MovementTiming, dt: Duration) -> Fixed {
    match timing {
        MovementTiming::PerTick => speed,
        MovementTiming::Scaled { reference_hz } => {
            let factor = dt.as_micros() as i64 * reference_hz as i64 * FIXED_ONE as i64 / 1_000_000;
            fixed_mul(speed, factor.min(Fixed::MAX as i64) as Fixed)
        }
    }
}

/// Move the player one step in the frame's direction.
pub fn resolve_movement(
    player: &mut PlayerState,
    frame: InputFrame,
    map: &TileMap,
    canvas: FixedVec2,
    rule: MovementRule,
    step: Fixed,
) {
    let (dx, dy) = frame.direction();
    match rule {
        MovementRule::Strict => resolve_strict(player, dx, dy, map, canvas, step),
        MovementRule::Wading { water_multiplier } => {
            resolve_wading(player, dx, dy, map, canvas, step, water_multiplier)
        }
    }
}

fn resolve_strict(
    player: &mut PlayerState,
    dx: i32,
    dy: i32,
    map: &TileMap,
    canvas: FixedVec2,
    step: Fixed,
) {
    let size = player.size;
    let accepts = |pos: FixedVec2| {
        box_inside_canvas(pos, size, canvas) && box_on_passable(map, pos, size)
    };

    if dx != 0 {
        let candidate = FixedVec2::new(player.position.x + step * dx, player.position.y);
        if accepts(candidate) {
            player.position = candidate;
        }
    }
    if dy != 0 {
        let candidate = FixedVec2::new(player.position.x, player.position.y + step * dy);
        if accepts(candidate) {
            player.position = candidate;
        }
    }

    player.in_water = false;
}

fn resolve_wading(
    player: &mut PlayerState,
    dx: i32,
    dy: i32,
    map: &TileMap,
    canvas: FixedVec2,
    step: Fixed,
    water_multiplier: Fixed,
) {
    let half = player.size.half();

    // Terrain under the center at the start of the tick sets the speed
    let speed = if map.classify(player.center()).is_some_and(Terrain::is_water) {
        fixed_mul(step, water_multiplier)
    } else {
        step
    };

    if dx != 0 {
        let candidate = FixedVec2::new(player.position.x + speed * dx, player.position.y);
        if map.classify(candidate + half).is_some() {
            player.position = candidate;
        }
    }
    if dy != 0 {
        let candidate = FixedVec2::new(player.position.x, player.position.y + speed * dy);
        if map.classify(candidate + half).is_some() {
            player.position = candidate;
        }
    }

    player.position = player.position.clamp_to_rect(FixedVec2::ZERO, canvas - player.size);
    player.in_water = map.classify(player.center()).is_some_and(Terrain::is_water);
}

// =============================================================================
// TESTS
// =============================================================================
