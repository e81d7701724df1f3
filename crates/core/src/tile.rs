//! Tile payloads carried by grid cells

use serde::{Deserialize, Serialize};

use crate::types::{BoosterKind, ObstacleKind, Position, TileKind};

/// Opaque tile identity, stable while a tile is swapped or falls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u32);

/// Obstacle overlay and its remaining layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObstacleState {
    pub kind: ObstacleKind,
    pub layers: u32,
}

impl ObstacleState {
    pub fn new(kind: ObstacleKind, layers: u32) -> Self {
        Self { kind, layers }
    }

    /// Whether this overlay currently keeps its tile from being removed
    pub fn is_shielding(&self) -> bool {
        !self.kind.is_destructible() || self.layers > 0
    }

    pub fn is_destroyed(&self) -> bool {
        self.kind.is_destructible() && self.layers == 0
    }
}

/// A tile sitting on the grid
///
/// `row`/`col` always mirror the cell holding the tile; the grid rewrites them whenever a
/// tile is placed or moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub row: usize,
    pub col: usize,
    pub kind: TileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booster: Option<BoosterKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obstacle: Option<ObstacleState>,
}

impl Tile {
    pub fn new(id: TileId, pos: Position, kind: TileKind) -> Self {
        Self {
            id,
            row: pos.row,
            col: pos.col,
            kind,
            booster: None,
            obstacle: None,
        }
    }

    pub fn pos(&self) -> Position {
        Position::new(self.row, self.col)
    }

    /// Blocked tiles never take part in a match
    pub fn is_matchable(&self) -> bool {
        !matches!(
            self.obstacle,
            Some(ObstacleState {
                kind: ObstacleKind::Blocked,
                ..
            })
        )
    }

    /// A covering match damages this tile's obstacle instead of removing it
    pub fn is_protected(&self) -> bool {
        self.obstacle.is_some_and(|o| o.is_shielding())
    }

    pub fn with_booster(mut self, booster: BoosterKind) -> Self {
        self.booster = Some(booster);
        self
    }

    pub fn with_obstacle(mut self, obstacle: ObstacleState) -> Self {
        self.obstacle = Some(obstacle);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protection_follows_layers() {
        let tile = Tile::new(TileId(1), Position::new(0, 0), TileKind::Fuel);
        assert!(!tile.is_protected());

        let iced = tile.with_obstacle(ObstacleState::new(ObstacleKind::Ice, 2));
        assert!(iced.is_protected());
        assert!(iced.is_matchable());

        let broken = tile.with_obstacle(ObstacleState::new(ObstacleKind::Ice, 0));
        assert!(!broken.is_protected());
    }

    #[test]
    fn blocked_is_never_matchable_or_destroyed() {
        let blocked = ObstacleState::new(ObstacleKind::Blocked, 0);
        assert!(blocked.is_shielding());
        assert!(!blocked.is_destroyed());

        let tile = Tile::new(TileId(1), Position::new(0, 0), TileKind::Ore).with_obstacle(blocked);
        assert!(!tile.is_matchable());
        assert!(tile.is_protected());
    }
}
