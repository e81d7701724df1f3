//! Level configuration - board layout, spawn rules, goals and move budget
//!
//! Levels are plain JSON documents supplied by the caller at session start:
//!
//! ```json
//! {
//!   "id": "level_01",
//!   "rows": 8, "cols": 8, "moves": 20,
//!   "spawn_weights": { "fuel": 3, "ore": 3, "crystal": 3, "plasma": 3, "water": 3 },
//!   "holes": [{ "row": 0, "col": 0 }],
//!   "obstacles": [{ "row": 4, "col": 4, "kind": "ice", "layers": 2 }],
//!   "tiles": [{ "row": 7, "col": 3, "kind": "seed", "booster": "area" }],
//!   "goals": [{ "target": { "kind": "collect", "tile": "fuel" }, "required": 15 }]
//! }
//! ```
//!
//! The core performs no I/O; callers read the file and hand over the text or the parsed
//! struct.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::goals::{GoalTarget, LevelGoal};
use crate::rng::SpawnWeights;
use crate::types::{
    BoosterKind, ObstacleKind, Position, TileKind, DEFAULT_AREA_RADIUS, GENERATION_ATTEMPTS,
    MAX_CASCADE_DEPTH, MAX_GRID_COLS, MAX_GRID_ROWS, RESHUFFLE_ATTEMPTS,
};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("layout row {row} has a different width")]
    RaggedLayout { row: usize },
    #[error("unknown layout code {ch:?} at {pos}")]
    UnknownLayoutCode { ch: char, pos: Position },
    #[error("{what} at {pos} is outside the grid")]
    OutOfBounds { what: &'static str, pos: Position },
    #[error("{what} at {pos} sits on an inactive cell")]
    OnHole { what: &'static str, pos: Position },
    #[error("more than one {what} at {pos}")]
    DuplicatePlacement { what: &'static str, pos: Position },
    #[error("obstacle at {pos} needs at least one layer")]
    NoLayers { pos: Position },
    #[error("spawn weights are all zero")]
    EmptySpawnWeights,
    #[error("level has no goals")]
    NoGoals,
    #[error("goal {index} requires zero progress")]
    ZeroRequired { index: usize },
    #[error("level has no moves")]
    NoMoves,
    #[error("cascade depth cap must be at least 1")]
    ZeroCascadeDepth,
    #[error("area radius {radius} exceeds the largest grid side")]
    AreaRadiusTooLarge { radius: usize },
    #[error("invalid level json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunable caps and radii; every field defaults to the shared constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineRules {
    pub max_cascade_depth: u32,
    pub generation_attempts: u32,
    pub reshuffle_attempts: u32,
    pub area_radius: usize,
}

impl Default for EngineRules {
    fn default() -> Self {
        Self {
            max_cascade_depth: MAX_CASCADE_DEPTH,
            generation_attempts: GENERATION_ATTEMPTS,
            reshuffle_attempts: RESHUFFLE_ATTEMPTS,
            area_radius: DEFAULT_AREA_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstaclePlacement {
    pub row: usize,
    pub col: usize,
    pub kind: ObstacleKind,
    #[serde(default)]
    pub layers: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePlacement {
    pub row: usize,
    pub col: usize,
    pub kind: TileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booster: Option<BoosterKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSpec {
    pub target: GoalTarget,
    pub required: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default)]
    pub id: String,
    pub rows: usize,
    pub cols: usize,
    pub moves: u32,
    pub spawn_weights: SpawnWeights,
    #[serde(default)]
    pub holes: Vec<Position>,
    #[serde(default)]
    pub obstacles: Vec<ObstaclePlacement>,
    #[serde(default)]
    pub tiles: Vec<TilePlacement>,
    pub goals: Vec<GoalSpec>,
    #[serde(default)]
    pub rules: EngineRules,
}

impl LevelConfig {
    /// Parse and validate a level document
    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        let config: LevelConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if self.rows == 0 || self.cols == 0 || self.rows > MAX_GRID_ROWS || self.cols > MAX_GRID_COLS
        {
            return Err(LevelError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.spawn_weights.is_empty() {
            return Err(LevelError::EmptySpawnWeights);
        }
        if self.moves == 0 {
            return Err(LevelError::NoMoves);
        }
        if self.goals.is_empty() {
            return Err(LevelError::NoGoals);
        }
        if let Some(index) = self.goals.iter().position(|g| g.required == 0) {
            return Err(LevelError::ZeroRequired { index });
        }
        if self.rules.max_cascade_depth == 0 {
            return Err(LevelError::ZeroCascadeDepth);
        }
        if self.rules.area_radius > MAX_GRID_ROWS.max(MAX_GRID_COLS) {
            return Err(LevelError::AreaRadiusTooLarge {
                radius: self.rules.area_radius,
            });
        }

        let holes = self.inactive_cells();
        for &pos in &self.holes {
            self.check_bounds("hole", pos)?;
        }

        let mut seen_obstacles: Vec<Position> = Vec::new();
        for o in &self.obstacles {
            let pos = Position::new(o.row, o.col);
            self.check_bounds("obstacle", pos)?;
            if seen_obstacles.contains(&pos) {
                return Err(LevelError::DuplicatePlacement {
                    what: "obstacle",
                    pos,
                });
            }
            seen_obstacles.push(pos);
            if o.kind.is_destructible() {
                if self.holes.contains(&pos) {
                    return Err(LevelError::OnHole {
                        what: "obstacle",
                        pos,
                    });
                }
                if o.layers == 0 {
                    return Err(LevelError::NoLayers { pos });
                }
            }
        }

        let mut seen_tiles: Vec<Position> = Vec::new();
        for t in &self.tiles {
            let pos = Position::new(t.row, t.col);
            self.check_bounds("tile", pos)?;
            if holes.contains(&pos) {
                return Err(LevelError::OnHole { what: "tile", pos });
            }
            if seen_tiles.contains(&pos) {
                return Err(LevelError::DuplicatePlacement { what: "tile", pos });
            }
            seen_tiles.push(pos);
        }

        Ok(())
    }

    fn check_bounds(&self, what: &'static str, pos: Position) -> Result<(), LevelError> {
        if pos.row >= self.rows || pos.col >= self.cols {
            return Err(LevelError::OutOfBounds { what, pos });
        }
        Ok(())
    }

    /// Layout holes plus Blocked obstacle cells
    pub fn inactive_cells(&self) -> Vec<Position> {
        let mut out = self.holes.clone();
        out.extend(
            self.obstacles
                .iter()
                .filter(|o| !o.kind.is_destructible())
                .map(|o| Position::new(o.row, o.col)),
        );
        out.sort();
        out.dedup();
        out
    }

    pub fn build_goals(&self) -> Vec<LevelGoal> {
        self.goals
            .iter()
            .map(|g| LevelGoal::new(g.target, g.required))
            .collect()
    }
}
