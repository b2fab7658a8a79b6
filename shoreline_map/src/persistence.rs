// Saved-map format: grid dimensions plus a flat list of collapsed cells.
//
// `MapData` is the only on-disk structure. It records `width`, `height` and
// one `(x, y, tile)` entry per cell in row-major order, which is enough to
// rebuild the collapsed grid (and from it the navigation grid) without
// running the solver again. Loading validates the data against a catalog:
// every cell must appear exactly once, in bounds, with a known tile.
//
// See also: `grid.rs` for `ConstraintGrid`, `generator.rs` where
// `GeneratedMap::map_data()` exports a generated map.

use crate::catalog::TileCatalog;
use crate::error::{ConfigError, PersistError};
use crate::grid::ConstraintGrid;
use crate::types::{GridCoord, TileType};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// One committed cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedCell {
    pub x: i32,
    pub y: i32,
    pub tile: TileType,
}

/// A fully collapsed map, ready to save or rebuild.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapData {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<CollapsedCell>,
}

impl MapData {
    /// Export a fully collapsed grid.
    pub fn from_grid(grid: &ConstraintGrid) -> Result<Self, ConfigError> {
        let cells = grid
            .cells()
            .iter()
            .map(|cell| {
                cell.tile()
                    .map(|tile| CollapsedCell {
                        x: cell.x,
                        y: cell.y,
                        tile,
                    })
                    .ok_or(ConfigError::UncollapsedCell { x: cell.x, y: cell.y })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            width: grid.width(),
            height: grid.height(),
            cells,
        })
    }

    /// Rebuild the collapsed grid without solving.
    pub fn to_grid(&self, catalog: &TileCatalog) -> Result<ConstraintGrid, ConfigError> {
        let mut grid = ConstraintGrid::initialize(self.width, self.height, catalog)?;
        let mut seen = vec![false; grid.cells().len()];
        for cell in &self.cells {
            let coord = GridCoord::new(cell.x, cell.y);
            let index = grid
                .index(coord)
                .ok_or(ConfigError::CellOutOfBounds { x: cell.x, y: cell.y })?;
            if std::mem::replace(&mut seen[index], true) {
                return Err(ConfigError::DuplicateCell { x: cell.x, y: cell.y });
            }
            grid.set_cell_tile(coord, cell.tile)?;
        }
        if let Some(missing) = grid.cells().iter().find(|c| !c.is_collapsed()) {
            return Err(ConfigError::MissingCell {
                x: missing.x,
                y: missing.y,
            });
        }
        Ok(grid)
    }

    pub fn save_json<W: Write>(&self, writer: W) -> Result<(), PersistError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_json<R: Read>(reader: R) -> Result<Self, PersistError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.save_json(&mut writer)?;
        writer.flush()?;
        info!(
            "saved {}x{} map to {}",
            self.width,
            self.height,
            path.display()
        );
        Ok(())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let data = Self::load_json(BufReader::new(File::open(path)?))?;
        info!(
            "loaded {}x{} map from {}",
            data.width,
            data.height,
            path.display()
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn striped_grid() -> ConstraintGrid {
        let catalog = TileCatalog::land_and_water();
        let mut grid = ConstraintGrid::initialize(3, 2, &catalog).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                let tile = if x == 1 {
                    TileType::Water
                } else {
                    TileType::MiddleLand
                };
                grid.set_cell_tile(GridCoord::new(x, y), tile).unwrap();
            }
        }
        grid
    }

    #[test]
    fn export_lists_cells_in_row_major_order() {
        let data = MapData::from_grid(&striped_grid()).unwrap();
        assert_eq!(data.cells.len(), 6);
        assert_eq!(
            data.cells[1],
            CollapsedCell {
                x: 1,
                y: 0,
                tile: TileType::Water
            }
        );
        assert_eq!(data.cells[3].y, 1);
    }

    #[test]
    fn export_requires_full_collapse() {
        let catalog = TileCatalog::land_and_water();
        let grid = ConstraintGrid::initialize(2, 2, &catalog).unwrap();
        assert_eq!(
            MapData::from_grid(&grid),
            Err(ConfigError::UncollapsedCell { x: 0, y: 0 })
        );
    }

    #[test]
    fn rebuilt_grid_matches_the_saved_one() {
        let grid = striped_grid();
        let json = {
            let mut buf = Vec::new();
            MapData::from_grid(&grid).unwrap().save_json(&mut buf).unwrap();
            buf
        };
        let data = MapData::load_json(json.as_slice()).unwrap();
        let rebuilt = data.to_grid(&TileCatalog::land_and_water()).unwrap();
        assert_eq!(rebuilt, grid);
    }

    #[test]
    fn cells_may_be_listed_in_any_order() {
        let mut data = MapData::from_grid(&striped_grid()).unwrap();
        data.cells.reverse();
        let rebuilt = data.to_grid(&TileCatalog::land_and_water()).unwrap();
        assert_eq!(rebuilt, striped_grid());
    }

    #[test]
    fn malformed_maps_are_rejected() {
        let catalog = TileCatalog::land_and_water();
        let good = MapData::from_grid(&striped_grid()).unwrap();

        let mut data = good.clone();
        data.cells.pop();
        assert_eq!(data.to_grid(&catalog), Err(ConfigError::MissingCell { x: 2, y: 1 }));

        let mut data = good.clone();
        data.cells[5] = data.cells[0];
        assert_eq!(data.to_grid(&catalog), Err(ConfigError::DuplicateCell { x: 0, y: 0 }));

        let mut data = good.clone();
        data.cells[0].x = 7;
        assert_eq!(data.to_grid(&catalog), Err(ConfigError::CellOutOfBounds { x: 7, y: 0 }));

        let mut data = good.clone();
        data.cells[2].tile = TileType::UpperBridge;
        assert_eq!(
            data.to_grid(&catalog),
            Err(ConfigError::UnknownTile(TileType::UpperBridge))
        );

        let mut data = good;
        data.width = 0;
        assert!(matches!(
            data.to_grid(&catalog),
            Err(ConfigError::ZeroDimension { .. })
        ));
    }

    #[test]
    fn json_layout_is_flat() {
        let data = MapData {
            width: 1,
            height: 1,
            cells: vec![CollapsedCell {
                x: 0,
                y: 0,
                tile: TileType::Water,
            }],
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "width": 1,
                "height": 1,
                "cells": [{ "x": 0, "y": 0, "tile": "Water" }]
            })
        );
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!("shoreline_map_{}.json", std::process::id()));
        let data = MapData::from_grid(&striped_grid()).unwrap();
        data.save_to_path(&path).unwrap();
        let loaded = MapData::load_from_path(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, data);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("shoreline_map_does_not_exist.json");
        assert!(matches!(
            MapData::load_from_path(path),
            Err(PersistError::Io(_))
        ));
    }
}
