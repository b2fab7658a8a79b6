// Navigation grid derived from a fully collapsed constraint grid.
//
// Each `NavCell` records whether its tile is walkable and, for walkable
// cells, which of its four edges may be crossed. Both are decided by
// caller-supplied predicates that look only at the cell's own tile; the
// neighbor's tile is not consulted. Non-walkable cells have no passable
// edges.
//
// `TerrainRules` supplies the default predicates for the coastline tile set:
// water is never walkable, straight shore tiles are walkable only when
// `allow_edge_tiles` is set, and an edge is passable iff the tile's allowed
// set in that direction does not contain water.
//
// A built `NavGrid` is never mutated. Rebuilt grids are published through
// `SharedNavGrid`, which swaps an `Arc` under a lock so readers keep the grid
// they loaded while a new one goes live.
//
// `GridTransform` converts between grid coordinates and world positions by a
// fixed additive offset.
//
// See also: `pathfinding.rs` for A* over the `NavGrid`, `grid.rs` for the
// input grid, `generator.rs` which builds and publishes nav grids.

use crate::catalog::TileCatalog;
use crate::error::ConfigError;
use crate::grid::ConstraintGrid;
use crate::types::{Direction, GridCoord, TileType};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Walkability and per-edge passability of one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavCell {
    pub walkable: bool,
    /// Indexed by `Direction::index()`.
    pub passable: [bool; 4],
}

impl NavCell {
    pub const BLOCKED: NavCell = NavCell {
        walkable: false,
        passable: [false; 4],
    };

    pub const OPEN: NavCell = NavCell {
        walkable: true,
        passable: [true; 4],
    };

    pub fn is_passable(&self, dir: Direction) -> bool {
        self.passable[dir.index()]
    }
}

/// Read-only walkability grid searched by the pathfinder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavGrid {
    width: u32,
    height: u32,
    /// Flat storage: index = x + y * width.
    cells: Vec<NavCell>,
}

impl NavGrid {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    pub(crate) fn index(&self, coord: GridCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(coord.x as usize + coord.y as usize * self.width as usize)
        } else {
            None
        }
    }

    pub(crate) fn coord_of(&self, index: usize) -> GridCoord {
        let w = self.width as usize;
        GridCoord::new((index % w) as i32, (index / w) as i32)
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn cell_at(&self, index: usize) -> &NavCell {
        &self.cells[index]
    }

    #[cfg(test)]
    pub(crate) fn cells_mut(&mut self) -> &mut [NavCell] {
        &mut self.cells
    }

    pub fn cell(&self, coord: GridCoord) -> Option<&NavCell> {
        self.index(coord).map(|i| &self.cells[i])
    }

    /// Out-of-bounds coordinates are not walkable.
    pub fn is_walkable(&self, coord: GridCoord) -> bool {
        self.cell(coord).is_some_and(|c| c.walkable)
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.walkable).count()
    }

    /// Rows highest `y` first, `1` for walkable and `0` for blocked.
    pub fn render_walkability(&self) -> String {
        let mut out = String::new();
        for row in self.cells.chunks(self.width as usize).rev() {
            for cell in row {
                out.push(if cell.walkable { '1' } else { '0' });
            }
            out.push('\n');
        }
        out
    }

    /// Build a grid from text rows, highest `y` first. `.` is walkable with
    /// every edge passable, `#` is blocked.
    pub fn from_rows(rows: &[&str]) -> Result<Self, ConfigError> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as u32;
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroDimension { width, height });
        }
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for row in rows.iter().rev() {
            if row.chars().count() as u32 != width {
                return Err(ConfigError::InvalidOption(format!(
                    "row {row:?} is not {width} cells wide"
                )));
            }
            for ch in row.chars() {
                cells.push(match ch {
                    '.' => NavCell::OPEN,
                    '#' => NavCell::BLOCKED,
                    other => {
                        return Err(ConfigError::InvalidOption(format!(
                            "unknown navigation cell {other:?}"
                        )));
                    }
                });
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }
}

/// Derive a `NavGrid` from a fully collapsed grid.
///
/// Fails with `ConfigError::UncollapsedCell` naming the first uncollapsed
/// cell in row-major order.
pub fn build_nav_grid(
    grid: &ConstraintGrid,
    walkable: impl Fn(TileType) -> bool,
    edge_passable: impl Fn(TileType, Direction) -> bool,
) -> Result<NavGrid, ConfigError> {
    let mut cells = Vec::with_capacity(grid.cells().len());
    for cell in grid.cells() {
        let tile = cell
            .tile()
            .ok_or(ConfigError::UncollapsedCell { x: cell.x, y: cell.y })?;
        let mut nav = NavCell::BLOCKED;
        if walkable(tile) {
            nav.walkable = true;
            for dir in Direction::ALL {
                nav.passable[dir.index()] = edge_passable(tile, dir);
            }
        }
        cells.push(nav);
    }
    let nav = NavGrid {
        width: grid.width(),
        height: grid.height(),
        cells,
    };
    debug!(
        "nav grid {}x{}: {} walkable cells",
        nav.width,
        nav.height,
        nav.walkable_count()
    );
    Ok(nav)
}

/// Default walkability policy for the coastline tile set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainRules {
    /// Let agents walk on straight shore tiles.
    #[serde(default)]
    pub allow_edge_tiles: bool,
}

impl TerrainRules {
    pub fn is_walkable(&self, tile: TileType) -> bool {
        match tile {
            TileType::Water => false,
            t if TileType::STRAIGHT_SHORES.contains(&t) => self.allow_edge_tiles,
            _ => true,
        }
    }

    /// An edge is passable unless the tile may border water across it.
    pub fn is_edge_passable(&self, catalog: &TileCatalog, tile: TileType, dir: Direction) -> bool {
        catalog
            .get(tile)
            .is_some_and(|def| !def.allowed(dir).contains(&TileType::Water))
    }
}

pub fn build_nav_grid_with_rules(
    grid: &ConstraintGrid,
    catalog: &TileCatalog,
    rules: &TerrainRules,
) -> Result<NavGrid, ConfigError> {
    build_nav_grid(
        grid,
        |tile| rules.is_walkable(tile),
        |tile, dir| rules.is_edge_passable(catalog, tile, dir),
    )
}

/// Publish point for the current navigation grid.
///
/// `load()` hands out an `Arc` that stays valid after a later `publish()`;
/// the grid behind it is never mutated.
#[derive(Debug)]
pub struct SharedNavGrid {
    current: RwLock<Arc<NavGrid>>,
}

impl SharedNavGrid {
    pub fn new(grid: impl Into<Arc<NavGrid>>) -> Self {
        Self {
            current: RwLock::new(grid.into()),
        }
    }

    pub fn load(&self) -> Arc<NavGrid> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap in a rebuilt grid, returning the one it replaces.
    pub fn publish(&self, grid: impl Into<Arc<NavGrid>>) -> Arc<NavGrid> {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, grid.into())
    }
}

/// Additive offset between grid cells and world positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridTransform {
    pub offset: [f32; 3],
}

impl GridTransform {
    pub fn new(offset: [f32; 3]) -> Self {
        Self { offset }
    }

    pub fn grid_to_world(&self, coord: GridCoord) -> [f32; 3] {
        [
            coord.x as f32 + self.offset[0],
            coord.y as f32 + self.offset[1],
            self.offset[2],
        ]
    }

    /// Nearest cell, rounding halves away from zero. The third axis is
    /// ignored.
    pub fn world_to_grid(&self, pos: [f32; 3]) -> GridCoord {
        GridCoord::new(
            (pos[0] - self.offset[0]).round() as i32,
            (pos[1] - self.offset[1]).round() as i32,
        )
    }
}
