//! Protocol Messages
//!
//! What flows between the frame driver and its clients. Everything is
//! serde-serializable so a renderer can consume it as JSON.

use serde::{Serialize, Deserialize};

use crate::core::vec2::FixedVec2;
use crate::game::combat::AttackOutcome;
use crate::game::events::GameEvent;
use crate::game::input::KeyEvent;
use crate::game::map::{Terrain, TileMap};
use crate::game::state::{GamePhase, SessionState};

// =============================================================================
// CLIENT -> DRIVER
// =============================================================================

/// Messages sent from a client to the frame driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Key pressed or released.
    Key {
        /// The press or release.
        event: KeyEvent,
    },
    /// Leave the start screen.
    Start,
    /// Reset to spawn after (or during) a round.
    Restart,
}

// =============================================================================
// DRIVER -> CLIENT
// =============================================================================

/// An axis-aligned box in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxView {
    /// Top-left x.
    pub x: f32,
    /// Top-left y.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl BoxView {
    fn new(position: FixedVec2, size: FixedVec2) -> Self {
        let (x, y) = position.to_floats();
        let (width, height) = size.to_floats();
        Self { x, y, width, height }
    }
}

/// Player as rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Bounds.
    #[serde(flatten)]
    pub bounds: BoxView,
    /// Carrying the weapon.
    pub has_weapon: bool,
    /// Wading.
    pub in_water: bool,
}

/// Weapon as rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponView {
    /// Bounds.
    #[serde(flatten)]
    pub bounds: BoxView,
    /// Picked up (not drawn).
    pub collected: bool,
}

/// Boss as rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossView {
    /// Bounds.
    #[serde(flatten)]
    pub bounds: BoxView,
    /// Current health.
    pub health: i32,
    /// Health at spawn.
    pub max_health: i32,
}

/// Read-only view of a session after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Ticks simulated so far.
    pub tick: u32,
    /// Current phase.
    pub phase: GamePhase,
    /// Player.
    pub player: PlayerView,
    /// Weapon.
    pub weapon: WeaponView,
    /// Boss.
    pub boss: BossView,
}

impl GameSnapshot {
    /// Capture the renderable parts of a session.
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            tick: state.tick,
            phase: state.phase,
            player: PlayerView {
                bounds: BoxView::new(state.player.position, state.player.size),
                has_weapon: state.player.has_weapon,
                in_water: state.player.in_water,
            },
            weapon: WeaponView {
                bounds: BoxView::new(state.weapon.position, state.weapon.size),
                collected: state.weapon.collected,
            },
            boss: BossView {
                bounds: BoxView::new(state.boss.position, state.boss.size),
                health: state.boss.health,
                max_health: state.boss.max_health,
            },
        }
    }
}

/// The terrain grid, sent once since it never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// Width in tiles.
    pub columns: u32,
    /// Height in tiles.
    pub rows: u32,
    /// Tile edge length.
    pub tile_size: f32,
    /// Row-major terrain.
    pub cells: Vec<Terrain>,
}

impl MapView {
    /// Copy a tile map for rendering.
    pub fn from_map(map: &TileMap) -> Self {
        Self {
            columns: map.columns(),
            rows: map.rows(),
            tile_size: crate::core::fixed::to_float(map.tile_size()),
            cells: map.cells().to_vec(),
        }
    }
}

/// Everything a client needs after one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameUpdate {
    /// State after the tick.
    pub snapshot: GameSnapshot,
    /// Events since the previous frame.
    pub events: Vec<GameEvent>,
    /// Result of an attack press this frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack: Option<AttackOutcome>,
}
