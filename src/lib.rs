//! Tile Cascade (workspace facade crate).
//!
//! Re-exports the member crates as `tile_cascade::{core, engine, types}` so binaries, tests
//! and benchmarks depend on one path while the implementation lives under `crates/`.

pub use tile_cascade_core as core;
pub use tile_cascade_engine as engine;
pub use tile_cascade_types as types;
