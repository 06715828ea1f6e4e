//! Game Logic Module
//!
//! All session simulation code. Deterministic given a seed and an input
//! sequence.
//!
//! ## Module Structure
//!
//! - `config`: Session configuration, presets and compiled rules
//! - `map`: Terrain grid generation and classification
//! - `input`: Key capture and per-tick input frames
//! - `state`: Session, player, weapon and boss state
//! - `collision`: Box tests against boxes, canvas and terrain
//! - `movement`: Strict and wading movement resolution
//! - `pickup`: Weapon collection
//! - `combat`: Contact and triggered boss damage
//! - `tick`: Simulation loop and replay
//! - `events`: Events drained per tick

pub mod config;
pub mod map;
pub mod input;
pub mod state;
pub mod collision;
pub mod movement;
pub mod pickup;
pub mod combat;
pub mod tick;
pub mod events;

// Re-export key types
pub use config::{ConfigError, GameConfig, Rules};
pub use map::{MapLayout, Terrain, TileMap};
pub use input::{InputFrame, InputState, Key, KeyEvent};
pub use state::{GamePhase, SessionState};
pub use combat::AttackOutcome;
pub use tick::{tick, replay_session, RecordedFrame, TickResult};
pub use events::{GameEvent, GameEventData};
