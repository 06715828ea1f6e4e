//! # Island Raid Simulation
//!
//! Simulation core for a single-player island game: cross the terrain, grab
//! the weapon, defeat the boss.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ISLAND RAID SIM                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for replay checks           │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── config.rs   - Presets, validation, compiled rules       │
//! │  ├── map.rs      - Island generation and terrain lookup      │
//! │  ├── input.rs    - Key capture and input frames              │
//! │  ├── state.rs    - Session and entity state                  │
//! │  ├── movement.rs - Strict and wading movement                │
//! │  ├── pickup.rs   - Weapon collection                         │
//! │  ├── combat.rs   - Contact and triggered boss damage         │
//! │  └── tick.rs     - Simulation loop and replay                │
//! │                                                              │
//! │  runtime/        - Real-time driving (non-deterministic)     │
//! │  ├── driver.rs   - tokio frame loop                          │
//! │  └── protocol.rs - Controls, snapshots, frame updates        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! The `core/` and `game/` modules are deterministic:
//! - The tick loop uses fixed-point arithmetic only
//! - Terrain randomness comes from a seeded Xorshift128+
//! - Time enters only as the `dt` argument to [`game::tick::tick`]
//!
//! Map generation samples `sin`/`cos` in `f64` once, at session creation.
//! Given the same seed, input frames and frame durations, two sessions end
//! with the same [`game::state::SessionState::compute_hash`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod runtime;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use core::vec2::FixedVec2;
pub use core::rng::DeterministicRng;
pub use game::config::{GameConfig, Rules, ConfigError, DEFAULT_FRAME_RATE};
pub use game::input::{InputFrame, InputState, Key, KeyEvent};
pub use game::state::{GamePhase, SessionState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
