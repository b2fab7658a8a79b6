// Data-driven generator configuration.
//
// `GeneratorConfig` gathers everything one generation run needs: grid size,
// solver options, terrain (walkability) rules, the world offset used for
// grid/world conversion, and the tile catalog itself. It is loaded from JSON
// and never mutated afterwards. Every field has a default, so partial JSON
// documents fill the rest from `GeneratorConfig::default()`.
//
// Named presets (`island()`, `open_field()`) tune the same parameter set.
// `validate()` checks the whole config and returns the validated catalog.
//
// See also: `solver.rs` for `SolverOptions`, `nav.rs` for `TerrainRules`,
// `catalog.rs` for `TileDefinition`, `generator.rs` which consumes the
// config.
//
// **Critical constraint: determinism.** Config values feed directly into the
// solver. Maps are `BTreeMap`s so that serialization order is stable.

use crate::catalog::{TileCatalog, TileDefinition};
use crate::error::{ConfigError, PersistError};
use crate::nav::{GridTransform, TerrainRules};
use crate::solver::{BoundaryConfig, SolverOptions};
use crate::types::TileType;
use serde::{Deserialize, Serialize};

/// Complete configuration for one map generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    pub solver: SolverOptions,
    pub terrain: TerrainRules,
    /// Added to grid coordinates to get world positions.
    pub world_offset: [f32; 3],
    /// Tile catalog, in the order domains are seeded.
    pub tiles: Vec<TileDefinition>,
}

impl GeneratorConfig {
    /// 16x16 coastline map: island tiles inside a one-cell ring of water.
    pub fn island() -> Self {
        Self {
            grid_width: 16,
            grid_height: 16,
            solver: SolverOptions {
                boundary: Some(BoundaryConfig {
                    tile: TileType::Water,
                    thickness: 1,
                }),
                ..SolverOptions::default()
            },
            terrain: TerrainRules::default(),
            world_offset: [0.0, 0.0, 0.0],
            tiles: TileCatalog::island().tiles().to_vec(),
        }
    }

    /// Unconstrained land/water map with no boundary.
    pub fn open_field(width: u32, height: u32) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            solver: SolverOptions::default(),
            terrain: TerrainRules::default(),
            world_offset: [0.0, 0.0, 0.0],
            tiles: TileCatalog::land_and_water().tiles().to_vec(),
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, PersistError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check dimensions, catalog and solver options, returning the catalog.
    pub fn validate(&self) -> Result<TileCatalog, ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        let catalog = TileCatalog::load(self.tiles.clone())?;
        self.solver.validate(&catalog)?;
        Ok(catalog)
    }

    pub fn transform(&self) -> GridTransform {
        GridTransform::new(self.world_offset)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::island()
    }
}
