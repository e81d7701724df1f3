//! Core match-3 logic - pure, deterministic, and testable
//!
//! This crate holds the grid, the match and booster rules, the cascade loop and goal
//! tracking. It performs no I/O and has no notion of time or rendering, making it:
//!
//! - **Deterministic**: the same seed and calls produce identical boards
//! - **Testable**: every rule is exercised by unit tests against text layouts
//! - **Portable**: runs headless, under a renderer, or inside a solver
//!
//! # Module Structure
//!
//! - [`grid`]: flat row-major board with holes and effect-area queries
//! - [`tile`]: tiles, ids and obstacle layers
//! - [`matching`]: run detection and booster-reward selection
//! - [`booster`]: single, combo and chained booster effects
//! - [`engine`]: generation, gravity, refill, dead-board handling and cascades
//! - [`goals`]: level goals, move budget and win/lose events
//! - [`level`]: level documents and their validation
//! - [`rng`]: seeded generator and weighted tile-kind draws
//! - [`snapshot`]: plain-data board copies with a stable hash
//!
//! # Example
//!
//! ```
//! use tile_cascade_core::{Match3Engine, SpawnWeights};
//!
//! let mut engine = Match3Engine::new(12345);
//! engine.generate(8, 8, &SpawnWeights::first_kinds(5));
//!
//! // Fresh boards never start with a match
//! assert!(engine.find_matches().is_empty());
//!
//! // Reshuffle if the generator produced a dead board
//! if !engine.has_valid_moves() {
//!     engine.reshuffle_board();
//! }
//! ```

pub mod booster;
pub mod engine;
pub mod goals;
pub mod grid;
pub mod level;
pub mod matching;
pub mod rng;
pub mod snapshot;
pub mod tile;

pub use tile_cascade_types as types;

// Re-export commonly used types for convenience
pub use booster::{BoosterActivator, BoosterBlast};
pub use engine::{
    CascadeOutcome, CascadeStep, DestroyedObstacle, Match3Engine, Movement, ObstacleDamage,
    SpawnData,
};
pub use goals::{GoalEvent, GoalTarget, LevelGoal, LevelGoalTracker, LevelState, SubscriptionId};
pub use grid::Grid;
pub use level::{EngineRules, LevelConfig, LevelError};
pub use matching::{find_matches, find_matches_with_boosters, BoosterSpawn, Match, MatchResolution};
pub use rng::{SimpleRng, SpawnWeights};
pub use snapshot::{CellSnapshot, GridSnapshot};
pub use tile::{ObstacleState, Tile, TileId};
