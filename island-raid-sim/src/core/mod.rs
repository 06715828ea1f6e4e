//! Core deterministic primitives.
//!
//! All types in this module are designed for reproducible simulation:
//! the same seed and input sequence always yield the same session state.

pub mod fixed;
pub mod vec2;
pub mod rng;
pub mod hash;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use vec2::FixedVec2;
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash};
