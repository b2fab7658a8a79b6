// Error taxonomy for map generation, navigation and persistence.
//
// Each subsystem has its own enum so callers can match on exactly the
// failures an operation can produce:
// - `ConfigError`: bad input rejected before any work starts.
// - `GenerationFailure`: the solver gave up (retry budget or time budget).
// - `PathError`: a path query was invalid or has no answer.
// - `PersistError`: saving/loading a collapsed map failed.
// - `MapError`: umbrella for the end-to-end pipeline in `generator.rs`.
//
// A contradiction (an uncollapsed cell with an empty domain) is not an error
// type: the solver recovers from it by backtracking, and only reports
// `GenerationFailure::RetriesExhausted` once every attempt has run dry.

use crate::types::{GridCoord, TileType};
use std::time::Duration;
use thiserror::Error;

/// Invalid configuration or input. Always fatal to the call that returned it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("tile catalog is empty")]
    EmptyCatalog,
    #[error("tile {0} is defined more than once")]
    DuplicateTile(TileType),
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: u32, height: u32 },
    #[error("cell ({x}, {y}) is not collapsed")]
    UncollapsedCell { x: i32, y: i32 },
    #[error("tile {0} is not in the catalog")]
    UnknownTile(TileType),
    #[error("cell ({x}, {y}) is outside the grid")]
    CellOutOfBounds { x: i32, y: i32 },
    #[error("no tile recorded for cell ({x}, {y})")]
    MissingCell { x: i32, y: i32 },
    #[error("cell ({x}, {y}) is recorded more than once")]
    DuplicateCell { x: i32, y: i32 },
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

/// The solver could not produce a fully collapsed grid. Non-fatal: the caller
/// may retry with another seed or looser options.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationFailure {
    #[error("all {attempts} generation attempts failed")]
    RetriesExhausted { attempts: u32 },
    #[error("generation timed out after {elapsed:?} ({attempts} attempts started)")]
    Timeout { elapsed: Duration, attempts: u32 },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A path query that cannot be answered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("coordinate {coord} is outside the navigation grid")]
    OutOfBounds { coord: GridCoord },
    #[error("no walkable route from {start} to {goal}")]
    Unreachable { start: GridCoord, goal: GridCoord },
}

/// Saving or loading a collapsed map failed.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("map file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("map data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Any failure of the end-to-end generation pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Generation(#[from] GenerationFailure),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = ConfigError::ZeroDimension {
            width: 0,
            height: 4,
        };
        assert_eq!(err.to_string(), "grid dimensions must be non-zero (got 0x4)");

        let err = PathError::OutOfBounds {
            coord: GridCoord::new(-1, 2),
        };
        assert_eq!(err.to_string(), "coordinate (-1, 2) is outside the navigation grid");
    }

    #[test]
    fn config_errors_lift_into_pipeline_errors() {
        let failure: GenerationFailure = ConfigError::EmptyCatalog.into();
        assert_eq!(failure.to_string(), "tile catalog is empty");
        let map_err: MapError = failure.into();
        assert!(matches!(
            map_err,
            MapError::Generation(GenerationFailure::Config(ConfigError::EmptyCatalog))
        ));
    }
}
