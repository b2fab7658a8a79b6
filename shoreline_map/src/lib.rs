// shoreline_map: constraint-solved tile maps with A* navigation.
//
// This crate generates a tile grid under adjacency rules with a
// wave-function-collapse solver, derives a walkability grid from the result
// and answers shortest-path queries over it. It has no rendering, input or
// engine dependencies; hosts call plain synchronous functions and pick their
// own logger (`log` facade).
//
// Module overview:
// - `types.rs`:       GridCoord, Direction, TileType.
// - `error.rs`:       ConfigError, GenerationFailure, PathError, PersistError, MapError.
// - `catalog.rs`:     TileDefinition + TileCatalog, corner-built presets, symmetry diagnostics.
// - `grid.rs`:        ConstraintGrid (per-cell candidate domains), snapshots, ASCII dump.
// - `solver.rs`:      WFC collapse/propagate/backtrack with retries, timeout, arc consistency.
// - `nav.rs`:         NavGrid derived from a collapsed grid, terrain rules, shared publish handle, world transform.
// - `pathfinding.rs`: A* over the NavGrid.
// - `persistence.rs`: MapData save/load as JSON.
// - `config.rs`:      GeneratorConfig, every tunable, loaded from JSON.
// - `generator.rs`:   MapGenerator, config to solved grid to nav grid.
// - `prng`:           Re-exported from `shoreline_prng`, xoshiro256++ PRNG with SplitMix64 seeding.
//
// **Critical constraint: determinism.** Generation is a pure function of
// (config, seed) apart from the wall-clock timeout. All randomness comes
// from an explicitly passed `MapRng`; ordered collections are `BTreeMap`s
// and the only hash map is a lookup cache whose iteration order is never
// observed.

pub mod catalog;
pub mod config;
pub mod error;
pub mod generator;
pub mod grid;
pub mod nav;
pub mod pathfinding;
pub mod persistence;
pub use shoreline_prng as prng;
pub mod solver;
pub mod types;
