// Core types shared across the map generator.
//
// Defines grid coordinates (`GridCoord`), the four cardinal `Direction`s used
// by adjacency rules, propagation and pathfinding, and the `TileType` terrain
// identifiers. All types derive `Serialize` and `Deserialize` so they can
// appear in configs and saved maps.
//
// Coordinate convention: `x` grows to the right, `y` grows upward. `Up` is
// `y + 1`, `Down` is `y - 1`. Row-major scans visit lowest `y` first, then
// lowest `x`.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell position on a 2D tile grid.
///
/// Signed so that neighbor offsets can step off the grid and be rejected by
/// a bounds check instead of wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance between two coordinates.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// The coordinate one step away in `dir`. May be out of bounds.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four axis-aligned neighbor directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions in canonical order. Propagation, arc consistency and
    /// A* neighbor expansion all iterate in this order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(dx, dy)` for one step in this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Stable index into per-direction arrays (`[T; 4]`).
    pub const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Terrain identifiers
// ---------------------------------------------------------------------------

/// Terrain category of a tile.
///
/// Straight shore tiles are named for the side of the island they sit on
/// (`UpperLand` is the top shore, water above it). `*CornerLand` tiles are the
/// island's outer corners; `*Curve` tiles are inner (concave) corners where
/// water cuts into land. Bridges are catalog-defined connectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileType {
    MiddleLand,
    Water,
    UpperLand,
    LowerLand,
    LeftLand,
    RightLand,
    UpperLeftCornerLand,
    UpperRightCornerLand,
    LowerLeftCornerLand,
    LowerRightCornerLand,
    LowerBridge,
    UpperBridge,
    LeftBridge,
    RightBridge,
    LowerLeftCurve,
    LowerRightCurve,
    UpperLeftCurve,
    UpperRightCurve,
}

impl TileType {
    /// The four straight shoreline tiles.
    pub const STRAIGHT_SHORES: [TileType; 4] = [
        TileType::UpperLand,
        TileType::LowerLand,
        TileType::LeftLand,
        TileType::RightLand,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TileType::MiddleLand => "MiddleLand",
            TileType::Water => "Water",
            TileType::UpperLand => "UpperLand",
            TileType::LowerLand => "LowerLand",
            TileType::LeftLand => "LeftLand",
            TileType::RightLand => "RightLand",
            TileType::UpperLeftCornerLand => "UpperLeftCornerLand",
            TileType::UpperRightCornerLand => "UpperRightCornerLand",
            TileType::LowerLeftCornerLand => "LowerLeftCornerLand",
            TileType::LowerRightCornerLand => "LowerRightCornerLand",
            TileType::LowerBridge => "LowerBridge",
            TileType::UpperBridge => "UpperBridge",
            TileType::LeftBridge => "LeftBridge",
            TileType::RightBridge => "RightBridge",
            TileType::LowerLeftCurve => "LowerLeftCurve",
            TileType::LowerRightCurve => "LowerRightCurve",
            TileType::UpperLeftCurve => "UpperLeftCurve",
            TileType::UpperRightCurve => "UpperRightCurve",
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
