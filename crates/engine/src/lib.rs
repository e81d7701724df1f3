//! Level session driver
//!
//! Wraps the core grid engine and goal tracker into a playable level: swap validation,
//! turn resolution, goal feeding, move accounting, dead-board reshuffles and hints.

pub mod session;

pub use tile_cascade_core as core;
pub use tile_cascade_types as types;

pub use session::{LevelSession, SessionSnapshot, SwapError, TurnReport};
