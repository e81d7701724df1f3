//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the simulation.
//! All types are plain data with no behaviour beyond parsing and printing, making them
//! usable in any context (grid engine, level files, session driver, runner output).
//!
//! # Grid Coordinates
//!
//! Positions are `(row, col)` pairs, row 0 at the top, col 0 on the left. Gravity pulls
//! tiles towards larger row indices.
//!
//! # Rule Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_MATCH_LEN` | 3 | Shortest run that counts as a match |
//! | `LINE_BOOSTER_RUN` | 4 | Run length that creates a line booster |
//! | `COLOR_CLEAR_RUN` | 5 | Run length that creates a color-clear booster |
//! | `GENERATION_ATTEMPTS` | 100 | Redraws per cell before accepting a matching draw |
//! | `RESHUFFLE_ATTEMPTS` | 100 | Full regenerations before accepting a dead board |
//! | `MAX_CASCADE_DEPTH` | 20 | Cascade steps resolved per turn at most |
//! | `DEFAULT_AREA_RADIUS` | 1 | Area booster radius (3x3) |
//! | `COMBO_AREA_RADIUS` | 2 | Area + Area combo radius (5x5) |
//!
//! # Examples
//!
//! ```
//! use tile_cascade_types::{BoosterKind, Position, TileKind, MIN_MATCH_LEN};
//!
//! // Parse from string (case-insensitive)
//! let kind = TileKind::from_str("Fuel").unwrap();
//! assert_eq!(kind, TileKind::Fuel);
//! assert_eq!(kind.as_char(), 'F');
//!
//! // Boosters are ordered so combo pairs can be normalised
//! assert!(BoosterKind::LineRow < BoosterKind::ColorClear);
//!
//! // Adjacency is orthogonal only
//! assert!(Position::new(2, 3).is_adjacent(Position::new(2, 4)));
//! assert!(!Position::new(2, 3).is_adjacent(Position::new(3, 4)));
//!
//! assert_eq!(MIN_MATCH_LEN, 3);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shortest run of identical tiles that counts as a match
pub const MIN_MATCH_LEN: usize = 3;

/// Run length that rewards a line booster
pub const LINE_BOOSTER_RUN: usize = 4;

/// Run length that rewards a color-clear booster
pub const COLOR_CLEAR_RUN: usize = 5;

/// Redraws per cell during generation before the last draw is accepted
pub const GENERATION_ATTEMPTS: u32 = 100;

/// Full board regenerations during a reshuffle before the last attempt is accepted
pub const RESHUFFLE_ATTEMPTS: u32 = 100;

/// Maximum cascade steps resolved in a single turn
pub const MAX_CASCADE_DEPTH: u32 = 20;

/// Radius of a plain Area booster (1 = 3x3)
pub const DEFAULT_AREA_RADIUS: usize = 1;

/// Radius of the Area + Area combo (2 = 5x5)
pub const COMBO_AREA_RADIUS: usize = 2;

/// Largest supported grid height
pub const MAX_GRID_ROWS: usize = 16;

/// Largest supported grid width
pub const MAX_GRID_COLS: usize = 16;


/// The base tile kinds a cell can hold
///
/// Each kind has a single-character layout code used by text layouts and the runner:
/// - **Fuel**: `F`
/// - **Ore**: `O`
/// - **Crystal**: `C`
/// - **Plasma**: `P`
/// - **Water**: `W`
/// - **Seed**: `S`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Fuel,
    Ore,
    Crystal,
    Plasma,
    Water,
    Seed,
}

impl TileKind {
    /// Number of tile kinds
    pub const COUNT: usize = 6;

    /// Every tile kind in ordinal order
    pub const ALL: [TileKind; Self::COUNT] = [
        TileKind::Fuel,
        TileKind::Ore,
        TileKind::Crystal,
        TileKind::Plasma,
        TileKind::Water,
        TileKind::Seed,
    ];

    /// Ordinal used to index fixed per-kind tables
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parse tile kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_cascade_types::TileKind;
    ///
    /// assert_eq!(TileKind::from_str("fuel"), Some(TileKind::Fuel));
    /// assert_eq!(TileKind::from_str("ORE"), Some(TileKind::Ore));
    /// assert_eq!(TileKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fuel" => Some(TileKind::Fuel),
            "ore" => Some(TileKind::Ore),
            "crystal" => Some(TileKind::Crystal),
            "plasma" => Some(TileKind::Plasma),
            "water" => Some(TileKind::Water),
            "seed" => Some(TileKind::Seed),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TileKind::Fuel => "fuel",
            TileKind::Ore => "ore",
            TileKind::Crystal => "crystal",
            TileKind::Plasma => "plasma",
            TileKind::Water => "water",
            TileKind::Seed => "seed",
        }
    }

    /// Parse a layout code (case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'F' => Some(TileKind::Fuel),
            'O' => Some(TileKind::Ore),
            'C' => Some(TileKind::Crystal),
            'P' => Some(TileKind::Plasma),
            'W' => Some(TileKind::Water),
            'S' => Some(TileKind::Seed),
            _ => None,
        }
    }

    /// Upper-case layout code
    pub fn as_char(&self) -> char {
        match self {
            TileKind::Fuel => 'F',
            TileKind::Ore => 'O',
            TileKind::Crystal => 'C',
            TileKind::Plasma => 'P',
            TileKind::Water => 'W',
            TileKind::Seed => 'S',
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Special-tile tags attached on top of a base tile kind
///
/// - **LineRow**: clears the whole row
/// - **LineCol**: clears the whole column
/// - **Area**: clears the square neighbourhood (radius 1 by default)
/// - **ColorClear**: clears every tile sharing the trigger's base kind
///
/// The derived ordering is used to normalise unordered combo pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoosterKind {
    LineRow,
    LineCol,
    Area,
    ColorClear,
}

impl BoosterKind {
    /// Parse booster kind from string (case-insensitive)
    ///
    /// Accepts snake_case or the short aliases "row", "col", "bomb", "color".
    ///
    /// ```
    /// use tile_cascade_types::BoosterKind;
    ///
    /// assert_eq!(BoosterKind::from_str("line_row"), Some(BoosterKind::LineRow));
    /// assert_eq!(BoosterKind::from_str("bomb"), Some(BoosterKind::Area));
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "line_row" | "row" => Some(BoosterKind::LineRow),
            "line_col" | "col" => Some(BoosterKind::LineCol),
            "area" | "bomb" => Some(BoosterKind::Area),
            "color_clear" | "color" => Some(BoosterKind::ColorClear),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoosterKind::LineRow => "line_row",
            BoosterKind::LineCol => "line_col",
            BoosterKind::Area => "area",
            BoosterKind::ColorClear => "color_clear",
        }
    }

    /// Whether this is one of the two line boosters
    pub fn is_line(&self) -> bool {
        matches!(self, BoosterKind::LineRow | BoosterKind::LineCol)
    }
}

impl fmt::Display for BoosterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Obstacle overlays that absorb match damage
///
/// `Ice`, `Grass` and `Crate` lose one layer per covering match and become removable at
/// zero layers. `Blocked` is never matchable and never destroyed; level loading turns it
/// into an inactive cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Ice,
    Grass,
    Crate,
    Blocked,
}

impl ObstacleKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ice" => Some(ObstacleKind::Ice),
            "grass" => Some(ObstacleKind::Grass),
            "crate" => Some(ObstacleKind::Crate),
            "blocked" => Some(ObstacleKind::Blocked),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Ice => "ice",
            ObstacleKind::Grass => "grass",
            ObstacleKind::Crate => "crate",
            ObstacleKind::Blocked => "blocked",
        }
    }

    /// Whether match damage can ever wear this obstacle down
    pub fn is_destructible(&self) -> bool {
        !matches!(self, ObstacleKind::Blocked)
    }
}

impl fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis of a match run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Horizontal run along a row
    Row,
    /// Vertical run along a column
    Col,
}

/// A cell coordinate on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Orthogonal neighbours only (no diagonals, not itself)
    pub fn is_adjacent(&self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
