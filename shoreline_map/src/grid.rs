// Constraint grid: the per-cell candidate domains the solver narrows down.
//
// Cells are stored in a flat `Vec<Cell>` indexed by `x + y * width`, so a
// row-major scan (lowest `y` first, then lowest `x`) is simply index order.
// All mutation goes through methods on the grid that take a coordinate or an
// index into that single backing store; callers never hold a copied-out cell
// that could silently drop writes.
//
// A cell's domain is an ordered list of tile types in catalog order. A fresh
// or reset grid seeds every domain with the full catalog. Collapsing a cell
// leaves exactly one candidate and sets `collapsed`; an uncollapsed cell with
// an empty domain is a contradiction.
//
// `snapshot()` deep-copies every cell (domains included) into a
// `GridSnapshot`, and `restore()` copies it back. The solver keeps one
// snapshot per decision frame on its backtrack stack.
//
// See also: `catalog.rs` for the tile set every domain is seeded from,
// `solver.rs` which owns the grid during generation, `nav.rs` which reads a
// fully collapsed grid, `persistence.rs` for saving and rebuilding grids.
//
// **Critical constraint: determinism.** Cell order and domain order are
// fixed by construction, so the same seed always explores the same search
// tree.

use crate::catalog::TileCatalog;
use crate::error::ConfigError;
use crate::types::{Direction, GridCoord, TileType};
use smallvec::SmallVec;
use std::fmt::Write as _;

/// Candidate tile types for one cell, in catalog order.
pub type Domain = SmallVec<[TileType; 16]>;

/// One grid cell and its remaining candidates.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    domain: Domain,
    collapsed: bool,
}

impl Cell {
    pub fn coord(&self) -> GridCoord {
        GridCoord::new(self.x, self.y)
    }

    pub fn domain(&self) -> &[TileType] {
        &self.domain
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Uncollapsed with no candidates left.
    pub fn is_contradiction(&self) -> bool {
        !self.collapsed && self.domain.is_empty()
    }

    /// The committed tile, if collapsed.
    pub fn tile(&self) -> Option<TileType> {
        if self.collapsed {
            self.domain.first().copied()
        } else {
            None
        }
    }
}

/// Deep copy of every cell of a grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridSnapshot {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

/// Fixed-size 2D array of cells with candidate domains.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintGrid {
    width: u32,
    height: u32,
    /// Flat storage: index = x + y * width.
    cells: Vec<Cell>,
    /// Full tile set in catalog order; the seed for every domain.
    tiles: Domain,
}

impl ConstraintGrid {
    /// Create a `width` x `height` grid with every domain holding the full
    /// catalog.
    pub fn initialize(width: u32, height: u32, catalog: &TileCatalog) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroDimension { width, height });
        }
        if catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let tiles: Domain = catalog.ids().collect();
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                cells.push(Cell {
                    x,
                    y,
                    domain: tiles.clone(),
                    collapsed: false,
                });
            }
        }
        Ok(Self {
            width,
            height,
            cells,
            tiles,
        })
    }

    /// Return every cell to the full, uncollapsed domain.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.domain.clone_from(&self.tiles);
            cell.collapsed = false;
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The tile set domains are seeded with.
    pub fn tile_set(&self) -> &[TileType] {
        &self.tiles
    }

    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    /// Flat index of a coordinate, or `None` if out of bounds.
    pub fn index(&self, coord: GridCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(coord.x as usize + coord.y as usize * self.width as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, coord: GridCoord) -> Option<&Cell> {
        self.index(coord).map(|i| &self.cells[i])
    }

    /// Commit `coord` to `tile`. Does not consult the catalog; see
    /// `set_cell_tile()` for the checked variant.
    pub fn collapse_at(&mut self, coord: GridCoord, tile: TileType) -> Result<(), ConfigError> {
        let index = self.index(coord).ok_or(ConfigError::CellOutOfBounds {
            x: coord.x,
            y: coord.y,
        })?;
        self.collapse_index(index, tile);
        Ok(())
    }

    /// Force-collapse `coord` to a tile from this grid's tile set.
    pub fn set_cell_tile(&mut self, coord: GridCoord, tile: TileType) -> Result<(), ConfigError> {
        if !self.tiles.contains(&tile) {
            return Err(ConfigError::UnknownTile(tile));
        }
        self.collapse_at(coord, tile)
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            width: self.width,
            height: self.height,
            cells: self.cells.clone(),
        }
    }

    /// Replace every cell with the snapshot's contents. The snapshot must
    /// come from a grid with the same dimensions.
    pub fn restore(&mut self, snapshot: &GridSnapshot) -> Result<(), ConfigError> {
        if snapshot.width != self.width || snapshot.height != self.height {
            return Err(ConfigError::InvalidOption(format!(
                "snapshot is {}x{} but grid is {}x{}",
                snapshot.width, snapshot.height, self.width, self.height
            )));
        }
        self.cells.clone_from(&snapshot.cells);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    pub fn is_fully_collapsed(&self) -> bool {
        self.cells.iter().all(|c| c.collapsed)
    }

    pub fn uncollapsed_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.collapsed).count()
    }

    pub fn collapsed_tile(&self, coord: GridCoord) -> Option<TileType> {
        self.cell(coord).and_then(Cell::tile)
    }

    /// First contradiction in row-major order.
    pub fn first_contradiction(&self) -> Option<GridCoord> {
        self.cells
            .iter()
            .find(|c| c.is_contradiction())
            .map(Cell::coord)
    }

    /// One line per row, highest `y` first. Collapsed cells show their tile
    /// name, uncollapsed ones `?N`, contradictions `!`.
    pub fn render_ascii(&self) -> String {
        let mut out = String::new();
        for row in self.cells.chunks(self.width as usize).rev() {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match cell.tile() {
                    Some(tile) => tile.name().to_string(),
                    None if cell.domain.is_empty() => "!".to_string(),
                    None => format!("?{}", cell.domain.len()),
                })
                .collect();
            let _ = writeln!(out, "{}", line.join(" "));
        }
        out
    }

    // -----------------------------------------------------------------------
    // Index-based access for the solver
    // -----------------------------------------------------------------------

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn cell_at(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub(crate) fn collapse_index(&mut self, index: usize, tile: TileType) {
        let cell = &mut self.cells[index];
        cell.domain.clear();
        cell.domain.push(tile);
        cell.collapsed = true;
    }

    pub(crate) fn domain_mut(&mut self, index: usize) -> &mut Domain {
        &mut self.cells[index].domain
    }

    pub(crate) fn set_domain(&mut self, index: usize, domain: Domain) {
        self.cells[index].domain = domain;
    }

    /// Index of the neighbor of `index` in `dir`, if on the grid.
    pub(crate) fn neighbor_index(&self, index: usize, dir: Direction) -> Option<usize> {
        let cell = &self.cells[index];
        self.index(cell.coord().step(dir))
    }
}
