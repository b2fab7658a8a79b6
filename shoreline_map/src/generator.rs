// End-to-end map generation: config -> solved grid -> navigation grid.
//
// `MapGenerator` validates a `GeneratorConfig` once and keeps the resulting
// catalog. Each `generate()` call builds a fresh constraint grid, runs the
// solver, derives the navigation grid with the configured terrain rules and
// returns everything as a `GeneratedMap`. The navigation grid is wrapped in
// an `Arc` so it can be handed to a `SharedNavGrid` and read by concurrent
// path queries.
//
// See also: `config.rs`, `solver.rs`, `nav.rs`, `pathfinding.rs`,
// `persistence.rs`.

use crate::catalog::TileCatalog;
use crate::config::GeneratorConfig;
use crate::error::{ConfigError, MapError, PathError};
use crate::grid::ConstraintGrid;
use crate::nav::{GridTransform, NavGrid, build_nav_grid_with_rules};
use crate::pathfinding::find_path;
use crate::persistence::MapData;
use crate::solver::{SolveReport, SolverOptions, solve};
use crate::types::GridCoord;
use std::sync::Arc;

/// A validated config ready to generate maps.
#[derive(Clone, Debug)]
pub struct MapGenerator {
    config: GeneratorConfig,
    catalog: TileCatalog,
}

/// Output of one successful generation.
#[derive(Clone, Debug)]
pub struct GeneratedMap {
    pub grid: ConstraintGrid,
    pub nav: Arc<NavGrid>,
    pub report: SolveReport,
    pub transform: GridTransform,
}

impl MapGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        let catalog = config.validate()?;
        Ok(Self { config, catalog })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    /// Generate with the configured seed.
    pub fn generate(&self) -> Result<GeneratedMap, MapError> {
        self.generate_with_seed(self.config.solver.seed)
    }

    /// Generate with an explicit seed, leaving every other option as
    /// configured.
    pub fn generate_with_seed(&self, seed: u64) -> Result<GeneratedMap, MapError> {
        let mut grid = ConstraintGrid::initialize(
            self.config.grid_width,
            self.config.grid_height,
            &self.catalog,
        )?;
        let options = SolverOptions {
            seed,
            ..self.config.solver.clone()
        };
        let report = solve(&mut grid, &self.catalog, &options)?;
        let nav = build_nav_grid_with_rules(&grid, &self.catalog, &self.config.terrain)?;
        Ok(GeneratedMap {
            grid,
            nav: Arc::new(nav),
            report,
            transform: self.config.transform(),
        })
    }

    /// Rebuild a saved map and its navigation grid without solving.
    pub fn restore(&self, data: &MapData) -> Result<(ConstraintGrid, NavGrid), ConfigError> {
        let grid = data.to_grid(&self.catalog)?;
        let nav = build_nav_grid_with_rules(&grid, &self.catalog, &self.config.terrain)?;
        Ok((grid, nav))
    }
}

impl GeneratedMap {
    pub fn find_path(
        &self,
        start: GridCoord,
        goal: GridCoord,
    ) -> Result<Vec<GridCoord>, PathError> {
        find_path(&self.nav, start, goal)
    }

    /// Path between two world positions, as world positions.
    pub fn find_world_path(
        &self,
        start: [f32; 3],
        goal: [f32; 3],
    ) -> Result<Vec<[f32; 3]>, PathError> {
        let path = self.find_path(
            self.transform.world_to_grid(start),
            self.transform.world_to_grid(goal),
        )?;
        Ok(path
            .into_iter()
            .map(|c| self.transform.grid_to_world(c))
            .collect())
    }

    pub fn map_data(&self) -> Result<MapData, ConfigError> {
        MapData::from_grid(&self.grid)
    }
}
