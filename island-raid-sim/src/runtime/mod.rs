//! Runtime Module
//!
//! Drives a session in real time. Not deterministic: frame timing comes
//! from the tokio clock.
//!
//! - `driver`: Frame loop task and its client handle
//! - `protocol`: Control messages, snapshots and frame updates

pub mod driver;
pub mod protocol;

pub use driver::{DriverError, DriverHandle, DriverOutput, FrameDriver};
pub use protocol::{ControlMessage, FrameUpdate, GameSnapshot, MapView};
