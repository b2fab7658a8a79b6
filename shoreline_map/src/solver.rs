// Wave-function-collapse solver: collapse, propagate, backtrack.
//
// `solve()` runs up to `max_retries` attempts on a grid. Each attempt:
//
// 1. Resets the grid and, if a boundary is configured, force-collapses the
//    outer rings to the boundary tile, propagating from each.
// 2. Optionally runs an arc-consistency fixed point (see below).
// 3. Repeatedly selects the uncollapsed cell with the fewest candidates
//    (ties go to the lowest `y`, then lowest `x`), draws a tile for it,
//    collapses it and propagates to its four neighbors.
// 4. On a contradiction, pops the most recent decision frame, restores its
//    snapshot, strikes the tile that was tried and retries the same cell
//    with what is left. Frames whose domain runs dry are popped in turn; an
//    empty stack abandons the attempt.
//
// A decision frame is pushed only when the collapsed cell had more than one
// candidate, since a forced collapse has no alternative to fall back to.
//
// Propagation after a collapse is one-directional: a neighbor keeps only the
// tiles listed in the collapsed tile's allowed set for that direction.
// Already-collapsed neighbors are not pruned but are checked against the same
// rule, so every committed pair is validated from both sides. Arc
// consistency uses the symmetric rule (`TileCatalog::admits_symmetric()`):
// a neighbor tile survives only if some candidate of the current cell admits
// it and is admitted back.
//
// Rule lookups are answered as 32-bit tile masks. With `use_cache` they are
// memoized per (direction, source tile) in an `FxHashMap`; without it they
// are rebuilt from the catalog on every lookup. The two modes give
// identical results.
//
// Attempt `k` draws from `MapRng::new(seed + k * GOLDEN_GAMMA)` (wrapping),
// so attempt 0 uses the seed verbatim and each retry gets its own stream.
// Elapsed wall-clock time is checked at the start of every attempt and before
// every collapse.
//
// Each decision frame holds a full grid snapshot, so a solve that branches at
// most cells keeps O(cells^2) domain storage alive at its deepest point (about
// 4096 snapshots of 4096 cells on a 64x64 grid). Arc consistency and a
// boundary ring shrink domains early and cut the number of frames.
//
// See also: `grid.rs` for cell storage and snapshots, `catalog.rs` for the
// rules, `generator.rs` which drives `solve()` from a `GeneratorConfig`.
//
// **Critical constraint: determinism.** For a fixed catalog, grid size,
// options and seed, the sequence of draws, collapses and backtracks is
// identical across runs. Only the timeout depends on wall-clock time.

use crate::catalog::TileCatalog;
use crate::error::{ConfigError, GenerationFailure};
use crate::grid::{ConstraintGrid, Domain, GridSnapshot};
use crate::types::{Direction, GridCoord, TileType};
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use shoreline_prng::MapRng;
use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

/// Seed stride between attempts (the 64-bit golden ratio).
const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Outer rings of the grid pre-collapsed to one tile before solving.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    pub tile: TileType,
    pub thickness: u32,
}

/// Tunables for one `solve()` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub seed: u64,
    /// Number of attempts before giving up. Must be at least 1.
    pub max_retries: u32,
    /// Wall-clock budget for the whole solve, in milliseconds.
    pub time_budget_ms: u64,
    pub use_arc_consistency: bool,
    pub boundary: Option<BoundaryConfig>,
    /// Per-tile probability of discarding a draw of that tile and drawing
    /// once more.
    pub reroll_bias: BTreeMap<TileType, f64>,
    pub use_cache: bool,
    /// Draw by `TileDefinition::weight` instead of uniformly.
    pub weighted_draw: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            max_retries: 500,
            time_budget_ms: 10_000,
            use_arc_consistency: false,
            boundary: None,
            reroll_bias: BTreeMap::new(),
            use_cache: true,
            weighted_draw: false,
        }
    }
}

impl SolverOptions {
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    /// Reject options no attempt could run with.
    pub fn validate(&self, catalog: &TileCatalog) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::InvalidOption(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if let Some(boundary) = self.boundary.as_ref().filter(|b| !catalog.contains(b.tile)) {
            return Err(ConfigError::UnknownTile(boundary.tile));
        }
        for (tile, &p) in &self.reroll_bias {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::InvalidOption(format!(
                    "reroll bias for {tile} must be in [0, 1] (got {p})"
                )));
            }
        }
        Ok(())
    }
}

/// Counters from a successful solve, summed over all attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolveReport {
    /// Attempts started, including the one that succeeded.
    pub attempts: u32,
    /// Collapses performed (boundary seeding excluded).
    pub nodes_expanded: u64,
    /// Decision frames popped.
    pub backtracks: u64,
    pub elapsed: Duration,
}

/// Collapse every cell of `grid` so that all adjacency rules hold.
///
/// On success the grid is fully collapsed. On failure its contents are
/// whatever the last attempt left behind.
pub fn solve(
    grid: &mut ConstraintGrid,
    catalog: &TileCatalog,
    options: &SolverOptions,
) -> Result<SolveReport, GenerationFailure> {
    options.validate(catalog)?;
    if let Some(&missing) = grid.tile_set().iter().find(|t| !catalog.contains(**t)) {
        return Err(ConfigError::UnknownTile(missing).into());
    }
    Solver::new(catalog, options).run(grid)
}

/// Why an attempt ended without a full collapse.
enum Abort {
    /// Every decision was exhausted, or the boundary/initial pruning failed.
    Exhausted,
    Timeout,
}

/// A collapse that can be undone.
struct DecisionFrame {
    index: usize,
    /// Domain at the time of the collapse, minus tiles already tried.
    domain: Domain,
    tried: TileType,
    snapshot: GridSnapshot,
}

struct Solver<'a> {
    catalog: &'a TileCatalog,
    options: &'a SolverOptions,
    /// One-directional rule masks keyed by (direction, source tile).
    allowed_cache: FxHashMap<(Direction, TileType), u32>,
    /// Symmetric rule masks keyed by (direction, source tile).
    symmetric_cache: FxHashMap<(Direction, TileType), u32>,
    started: Instant,
    nodes_expanded: u64,
    backtracks: u64,
}

fn bit(tile: TileType) -> u32 {
    1 << (tile as u32)
}

impl<'a> Solver<'a> {
    fn new(catalog: &'a TileCatalog, options: &'a SolverOptions) -> Self {
        Self {
            catalog,
            options,
            allowed_cache: FxHashMap::default(),
            symmetric_cache: FxHashMap::default(),
            started: Instant::now(),
            nodes_expanded: 0,
            backtracks: 0,
        }
    }

    fn timed_out(&self) -> bool {
        self.started.elapsed() >= self.options.time_budget()
    }

    fn run(mut self, grid: &mut ConstraintGrid) -> Result<SolveReport, GenerationFailure> {
        let max = self.options.max_retries;
        for attempt in 0..max {
            if self.timed_out() {
                return Err(self.timeout(attempt));
            }
            let seed = self
                .options
                .seed
                .wrapping_add(u64::from(attempt).wrapping_mul(GOLDEN_GAMMA));
            let mut rng = MapRng::new(seed);
            debug!("wfc attempt {}/{} (seed {seed:#x})", attempt + 1, max);

            match self.attempt(grid, &mut rng) {
                Ok(()) => {
                    let report = SolveReport {
                        attempts: attempt + 1,
                        nodes_expanded: self.nodes_expanded,
                        backtracks: self.backtracks,
                        elapsed: self.started.elapsed(),
                    };
                    info!(
                        "wfc solved {}x{} grid: attempts={} nodes_expanded={} backtracks={} elapsed={:?}",
                        grid.width(),
                        grid.height(),
                        report.attempts,
                        report.nodes_expanded,
                        report.backtracks,
                        report.elapsed
                    );
                    return Ok(report);
                }
                Err(Abort::Exhausted) => {
                    debug!("wfc attempt {} exhausted its decisions", attempt + 1);
                }
                Err(Abort::Timeout) => return Err(self.timeout(attempt + 1)),
            }
        }
        warn!("wfc gave up after {max} attempts ({:?})", self.started.elapsed());
        Err(GenerationFailure::RetriesExhausted { attempts: max })
    }

    fn timeout(&self, attempts: u32) -> GenerationFailure {
        let elapsed = self.started.elapsed();
        warn!("wfc timed out after {elapsed:?} ({attempts} attempts started)");
        GenerationFailure::Timeout { elapsed, attempts }
    }

    fn attempt(&mut self, grid: &mut ConstraintGrid, rng: &mut MapRng) -> Result<(), Abort> {
        grid.reset();
        let options = self.options;
        if let Some(boundary) = &options.boundary {
            if !self.seed_boundary(grid, boundary.tile, boundary.thickness) {
                debug!("wfc boundary {} contradicts itself", boundary.tile);
                return Err(Abort::Exhausted);
            }
        }
        let every_cell = 0..grid.len();
        if options.use_arc_consistency && !self.enforce_arc_consistency(grid, every_cell) {
            debug!("wfc initial arc consistency emptied a domain");
            return Err(Abort::Exhausted);
        }

        let mut stack: Vec<DecisionFrame> = Vec::new();
        // Cell to retry after a backtrack, with its narrowed domain in place.
        let mut retry: Option<usize> = None;

        loop {
            if self.timed_out() {
                return Err(Abort::Timeout);
            }
            let index = match retry.take().or_else(|| select_cell(grid)) {
                Some(index) => index,
                None => return Ok(()),
            };

            let domain = grid.cell_at(index).domain();
            if domain.is_empty() {
                retry = Some(self.backtrack(grid, &mut stack)?);
                continue;
            }

            let tile = self.draw(domain, rng);
            if domain.len() > 1 {
                stack.push(DecisionFrame {
                    index,
                    domain: Domain::from_slice(domain),
                    tried: tile,
                    snapshot: grid.snapshot(),
                });
            }
            grid.collapse_index(index, tile);
            self.nodes_expanded += 1;

            let consistent = self.propagate(grid, index, tile)
                && (!options.use_arc_consistency || self.restore_arc_consistency(grid, index));
            if !consistent {
                retry = Some(self.backtrack(grid, &mut stack)?);
            }
        }
    }

    /// Undo decisions until one has an untried tile left. Returns the cell
    /// to retry, with its narrowed domain written back to the grid.
    fn backtrack(
        &mut self,
        grid: &mut ConstraintGrid,
        stack: &mut Vec<DecisionFrame>,
    ) -> Result<usize, Abort> {
        while let Some(frame) = stack.pop() {
            self.backtracks += 1;
            if grid.restore(&frame.snapshot).is_err() {
                return Err(Abort::Exhausted);
            }
            let mut remaining = frame.domain;
            remaining.retain(|t| *t != frame.tried);
            if !remaining.is_empty() {
                grid.set_domain(frame.index, remaining);
                return Ok(frame.index);
            }
        }
        Err(Abort::Exhausted)
    }

    /// Uniform (or weighted) pick, with at most one biased redraw.
    fn draw(&self, domain: &[TileType], rng: &mut MapRng) -> TileType {
        let first = self.pick(domain, rng);
        match self.options.reroll_bias.get(&first) {
            Some(&p) if rng.random_bool(p) => self.pick(domain, rng),
            _ => first,
        }
    }

    fn pick(&self, domain: &[TileType], rng: &mut MapRng) -> TileType {
        if self.options.weighted_draw {
            let weight = |t: TileType| {
                self.catalog
                    .get(t)
                    .map(|def| def.effective_weight())
                    .unwrap_or(1.0)
            };
            let total: f64 = domain.iter().map(|&t| weight(t)).sum();
            if total > 0.0 {
                let mut r = rng.next_f64() * total;
                for &t in domain {
                    let w = weight(t);
                    if r < w {
                        return t;
                    }
                    r -= w;
                }
                // Rounding can leave `r` just past the last bucket.
                if let Some(&last) = domain.iter().rev().find(|&&t| weight(t) > 0.0) {
                    return last;
                }
            }
        }
        domain[rng.index(domain.len())]
    }

    // -----------------------------------------------------------------------
    // Constraint propagation
    // -----------------------------------------------------------------------

    fn allowed_mask(&mut self, dir: Direction, source: TileType) -> u32 {
        if !self.options.use_cache {
            return allowed_mask(self.catalog, dir, source);
        }
        let catalog = self.catalog;
        *self
            .allowed_cache
            .entry((dir, source))
            .or_insert_with(|| allowed_mask(catalog, dir, source))
    }

    fn symmetric_mask(&mut self, dir: Direction, source: TileType) -> u32 {
        if !self.options.use_cache {
            return symmetric_mask(self.catalog, dir, source);
        }
        let catalog = self.catalog;
        *self
            .symmetric_cache
            .entry((dir, source))
            .or_insert_with(|| symmetric_mask(catalog, dir, source))
    }

    /// Prune the neighbors of a freshly collapsed cell. Returns `false` on a
    /// contradiction.
    fn propagate(&mut self, grid: &mut ConstraintGrid, index: usize, tile: TileType) -> bool {
        for dir in Direction::ALL {
            let Some(n) = grid.neighbor_index(index, dir) else {
                continue;
            };
            let mask = self.allowed_mask(dir, tile);
            let neighbor = grid.cell_at(n);
            if let Some(placed) = neighbor.tile() {
                if mask & bit(placed) == 0 {
                    return false;
                }
                continue;
            }
            let domain = grid.domain_mut(n);
            domain.retain(|t| mask & bit(*t) != 0);
            if domain.is_empty() {
                return false;
            }
        }
        true
    }

    /// Re-establish arc consistency after collapsing `index`. Only the
    /// neighbors' domains changed, so they seed the queue; the fixed point is
    /// the same one a full pass would reach.
    fn restore_arc_consistency(&mut self, grid: &mut ConstraintGrid, index: usize) -> bool {
        let changed: Vec<usize> = Direction::ALL
            .iter()
            .filter_map(|&dir| grid.neighbor_index(index, dir))
            .collect();
        self.enforce_arc_consistency(grid, changed)
    }

    /// AC-3 from `seeds` until no domain shrinks. Only uncollapsed cells act
    /// as sources. Returns `false` if a domain empties or a collapsed cell
    /// loses its support.
    fn enforce_arc_consistency(
        &mut self,
        grid: &mut ConstraintGrid,
        seeds: impl IntoIterator<Item = usize>,
    ) -> bool {
        let mut queue = VecDeque::new();
        let mut queued = vec![false; grid.len()];
        for index in seeds {
            if !queued[index] {
                queued[index] = true;
                queue.push_back(index);
            }
        }

        while let Some(index) = queue.pop_front() {
            queued[index] = false;
            if grid.cell_at(index).is_collapsed() {
                continue;
            }
            let domain = Domain::from_slice(grid.cell_at(index).domain());
            for dir in Direction::ALL {
                let Some(n) = grid.neighbor_index(index, dir) else {
                    continue;
                };
                let mut support = 0u32;
                for &t in &domain {
                    support |= self.symmetric_mask(dir, t);
                }
                let neighbor = grid.cell_at(n);
                if let Some(placed) = neighbor.tile() {
                    if support & bit(placed) == 0 {
                        return false;
                    }
                    continue;
                }
                let before = neighbor.domain().len();
                let neighbor_domain = grid.domain_mut(n);
                neighbor_domain.retain(|t| support & bit(*t) != 0);
                let after = neighbor_domain.len();
                if after == 0 {
                    return false;
                }
                if after < before && !queued[n] {
                    queued[n] = true;
                    queue.push_back(n);
                }
            }
        }
        true
    }

    /// Collapse every cell within `thickness` rings of the edge to `tile`,
    /// in row-major order, propagating from each.
    fn seed_boundary(&mut self, grid: &mut ConstraintGrid, tile: TileType, thickness: u32) -> bool {
        if thickness == 0 {
            return true;
        }
        let (w, h) = (grid.width() as i32, grid.height() as i32);
        let depth = thickness.min(i32::MAX as u32) as i32;
        for y in 0..h {
            for x in 0..w {
                let ring = x.min(y).min(w - 1 - x).min(h - 1 - y);
                if ring >= depth {
                    continue;
                }
                let Some(index) = grid.index(GridCoord::new(x, y)) else {
                    continue;
                };
                let cell = grid.cell_at(index);
                if !cell.domain().contains(&tile) {
                    return false;
                }
                grid.collapse_index(index, tile);
                if !self.propagate(grid, index, tile) {
                    return false;
                }
            }
        }
        true
    }
}

/// Minimum-remaining-values choice; the first in row-major order wins ties.
fn select_cell(grid: &ConstraintGrid) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for index in 0..grid.len() {
        let cell = grid.cell_at(index);
        if cell.is_collapsed() {
            continue;
        }
        let size = cell.domain().len();
        if best.is_none_or(|(_, best_size)| size < best_size) {
            best = Some((index, size));
            if size == 0 {
                break;
            }
        }
    }
    best.map(|(index, _)| index)
}

fn allowed_mask(catalog: &TileCatalog, dir: Direction, source: TileType) -> u32 {
    catalog
        .get(source)
        .map(|def| def.allowed(dir).iter().fold(0, |m, &t| m | bit(t)))
        .unwrap_or(0)
}

fn symmetric_mask(catalog: &TileCatalog, dir: Direction, source: TileType) -> u32 {
    catalog
        .ids()
        .filter(|&t| catalog.admits_symmetric(source, dir, t))
        .fold(0, |m, t| m | bit(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TileDefinition;

    fn options(seed: u64) -> SolverOptions {
        SolverOptions {
            seed,
            ..SolverOptions::default()
        }
    }

    /// Every committed pair admits its neighbor, checked from both sides.
    fn assert_sound(grid: &ConstraintGrid, catalog: &TileCatalog) {
        assert!(grid.is_fully_collapsed());
        for cell in grid.cells() {
            assert_eq!(cell.domain().len(), 1);
            let tile = cell.tile().unwrap();
            for dir in Direction::ALL {
                if let Some(other) = grid.collapsed_tile(cell.coord().step(dir)) {
                    assert!(
                        catalog.admits(tile, dir, other),
                        "{tile} at {} does not admit {other} {dir:?}",
                        cell.coord()
                    );
                }
            }
        }
    }

    /// A only beside B, B only beside A: a checkerboard.
    fn checkerboard_catalog() -> TileCatalog {
        TileCatalog::load(vec![
            TileDefinition::allowing_everywhere(TileType::MiddleLand, &[TileType::Water]),
            TileDefinition::allowing_everywhere(TileType::Water, &[TileType::MiddleLand]),
        ])
        .unwrap()
    }

    #[test]
    fn solves_permissive_catalog() {
        let catalog = TileCatalog::land_and_water();
        let mut grid = ConstraintGrid::initialize(3, 3, &catalog).unwrap();
        let report = solve(&mut grid, &catalog, &options(7)).unwrap();
        assert_eq!(report.attempts, 1);
        assert_eq!(report.backtracks, 0);
        assert_sound(&grid, &catalog);
    }

    #[test]
    fn solves_island_preset_with_water_boundary() {
        let catalog = TileCatalog::island();
        let mut grid = ConstraintGrid::initialize(12, 10, &catalog).unwrap();
        let opts = SolverOptions {
            boundary: Some(BoundaryConfig {
                tile: TileType::Water,
                thickness: 1,
            }),
            ..options(42)
        };
        solve(&mut grid, &catalog, &opts).unwrap();
        assert_sound(&grid, &catalog);
        for cell in grid.cells() {
            if cell.x == 0 || cell.y == 0 || cell.x == 11 || cell.y == 9 {
                assert_eq!(cell.tile(), Some(TileType::Water));
            }
        }
    }

    #[test]
    fn same_seed_same_grid() {
        let catalog = TileCatalog::island();
        let mut a = ConstraintGrid::initialize(8, 8, &catalog).unwrap();
        let mut b = a.clone();
        solve(&mut a, &catalog, &options(99)).unwrap();
        solve(&mut b, &catalog, &options(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn checkerboard_solves_in_a_single_attempt() {
        let catalog = checkerboard_catalog();
        for seed in 0..20 {
            let mut grid = ConstraintGrid::initialize(3, 3, &catalog).unwrap();
            let opts = SolverOptions {
                max_retries: 1,
                ..options(seed)
            };
            solve(&mut grid, &catalog, &opts).unwrap();
            assert_sound(&grid, &catalog);
        }
    }

    #[test]
    fn dead_end_picks_are_undone_within_one_attempt() {
        // Land must be followed by a bridge, and a bridge by nothing, so in a
        // 3x1 row any land or bridge in the first cell runs out of room. Only
        // an all-water row fits.
        let mut land = TileDefinition::new(TileType::MiddleLand);
        land.right = [TileType::UpperBridge].into();
        let mut bridge = TileDefinition::new(TileType::UpperBridge);
        bridge.left = [TileType::MiddleLand].into();
        let mut water = TileDefinition::new(TileType::Water);
        water.left = [TileType::Water].into();
        water.right = [TileType::Water].into();
        let catalog = TileCatalog::load(vec![land, water, bridge]).unwrap();

        let mut backtracked = 0;
        for seed in 0..40 {
            let mut grid = ConstraintGrid::initialize(3, 1, &catalog).unwrap();
            let opts = SolverOptions {
                max_retries: 1,
                ..options(seed)
            };
            let report = solve(&mut grid, &catalog, &opts).unwrap();
            assert_eq!(report.attempts, 1);
            assert!(grid.cells().iter().all(|c| c.tile() == Some(TileType::Water)));
            if report.backtracks > 0 {
                backtracked += 1;
            }
        }
        assert!(backtracked > 0, "no seed ever had to backtrack");
    }

    #[test]
    fn forced_contradiction_exhausts_retries() {
        // Neither tile may sit next to itself, so a solid boundary ring of
        // either one cannot be placed.
        let catalog = checkerboard_catalog();
        let mut grid = ConstraintGrid::initialize(2, 2, &catalog).unwrap();
        let opts = SolverOptions {
            max_retries: 3,
            boundary: Some(BoundaryConfig {
                tile: TileType::MiddleLand,
                thickness: 1,
            }),
            ..options(1)
        };
        assert_eq!(
            solve(&mut grid, &catalog, &opts),
            Err(GenerationFailure::RetriesExhausted { attempts: 3 })
        );
    }

    #[test]
    fn unsatisfiable_rules_exhaust_retries_through_backtracking() {
        // Each tile only tolerates itself on the left and the other on the
        // right, which no row of width 2 can satisfy from both sides.
        let both = [TileType::MiddleLand, TileType::Water];
        let mut a = TileDefinition::allowing_everywhere(TileType::MiddleLand, &both);
        a.left = [TileType::MiddleLand].into();
        a.right = [TileType::Water].into();
        let mut b = TileDefinition::allowing_everywhere(TileType::Water, &both);
        b.left = [TileType::Water].into();
        b.right = [TileType::MiddleLand].into();
        let catalog = TileCatalog::load(vec![a, b]).unwrap();

        let mut grid = ConstraintGrid::initialize(2, 1, &catalog).unwrap();
        let opts = SolverOptions {
            max_retries: 4,
            ..options(5)
        };
        assert_eq!(
            solve(&mut grid, &catalog, &opts),
            Err(GenerationFailure::RetriesExhausted { attempts: 4 })
        );
    }

    #[test]
    fn zero_time_budget_times_out_immediately() {
        let catalog = TileCatalog::land_and_water();
        let mut grid = ConstraintGrid::initialize(4, 4, &catalog).unwrap();
        let opts = SolverOptions {
            time_budget_ms: 0,
            ..options(0)
        };
        match solve(&mut grid, &catalog, &opts) {
            Err(GenerationFailure::Timeout { attempts, .. }) => assert_eq!(attempts, 0),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn invalid_options_are_config_errors() {
        let catalog = TileCatalog::land_and_water();
        let mut grid = ConstraintGrid::initialize(2, 2, &catalog).unwrap();

        let opts = SolverOptions {
            max_retries: 0,
            ..options(0)
        };
        assert!(matches!(
            solve(&mut grid, &catalog, &opts),
            Err(GenerationFailure::Config(ConfigError::InvalidOption(_)))
        ));

        let opts = SolverOptions {
            boundary: Some(BoundaryConfig {
                tile: TileType::RightBridge,
                thickness: 1,
            }),
            ..options(0)
        };
        assert_eq!(
            solve(&mut grid, &catalog, &opts),
            Err(GenerationFailure::Config(ConfigError::UnknownTile(
                TileType::RightBridge
            )))
        );

        let opts = SolverOptions {
            reroll_bias: BTreeMap::from([(TileType::Water, 1.5)]),
            ..options(0)
        };
        assert!(solve(&mut grid, &catalog, &opts).is_err());
    }

    #[test]
    fn cache_and_arc_consistency_do_not_change_soundness() {
        let catalog = TileCatalog::island();
        for (use_cache, use_arc_consistency) in [(false, false), (true, true), (false, true)] {
            let mut grid = ConstraintGrid::initialize(10, 10, &catalog).unwrap();
            let opts = SolverOptions {
                use_cache,
                use_arc_consistency,
                ..options(3)
            };
            solve(&mut grid, &catalog, &opts).unwrap();
            assert_sound(&grid, &catalog);
        }
    }

    #[test]
    fn cache_does_not_change_the_result() {
        let catalog = TileCatalog::island();
        let mut cached = ConstraintGrid::initialize(9, 7, &catalog).unwrap();
        let mut uncached = cached.clone();
        solve(&mut cached, &catalog, &options(11)).unwrap();
        let opts = SolverOptions {
            use_cache: false,
            ..options(11)
        };
        solve(&mut uncached, &catalog, &opts).unwrap();
        assert_eq!(cached, uncached);
    }

    #[test]
    fn arc_consistency_prunes_before_any_collapse() {
        let catalog = checkerboard_catalog();
        let mut grid = ConstraintGrid::initialize(3, 1, &catalog).unwrap();
        grid.collapse_at(GridCoord::new(0, 0), TileType::Water).unwrap();
        let opts = options(0);
        let mut solver = Solver::new(&catalog, &opts);
        assert!(solver.enforce_arc_consistency(&mut grid, 0..3));
        // Collapsed cells are checked but never used as a source, so the
        // middle cell keeps both tiles.
        assert_eq!(grid.cell_at(0).tile(), Some(TileType::Water));
        assert_eq!(grid.cell_at(1).domain().len(), 2);
    }

    #[test]
    fn arc_consistency_detects_empty_domains() {
        // Water admits nothing, so every neighbor loses Water and then,
        // with only Water in the catalog, empties.
        let catalog = TileCatalog::load(vec![TileDefinition::new(TileType::Water)]).unwrap();
        let mut grid = ConstraintGrid::initialize(2, 1, &catalog).unwrap();
        let opts = options(0);
        let mut solver = Solver::new(&catalog, &opts);
        assert!(!solver.enforce_arc_consistency(&mut grid, 0..2));
    }

    #[test]
    fn select_prefers_fewest_candidates_then_row_major() {
        let catalog = TileCatalog::island();
        let mut grid = ConstraintGrid::initialize(3, 3, &catalog).unwrap();
        assert_eq!(select_cell(&grid), Some(0));
        grid.domain_mut(7).truncate(3);
        grid.domain_mut(5).truncate(3);
        assert_eq!(select_cell(&grid), Some(5));
        grid.collapse_index(5, TileType::Water);
        assert_eq!(select_cell(&grid), Some(7));
    }

    #[test]
    fn certain_reroll_bias_still_draws_from_the_domain() {
        let catalog = TileCatalog::land_and_water();
        let opts = SolverOptions {
            reroll_bias: BTreeMap::from([(TileType::Water, 1.0), (TileType::MiddleLand, 1.0)]),
            ..options(0)
        };
        let solver = Solver::new(&catalog, &opts);
        let mut rng = MapRng::new(8);
        let domain = [TileType::Water];
        for _ in 0..10 {
            assert_eq!(solver.draw(&domain, &mut rng), TileType::Water);
        }
    }

    #[test]
    fn reroll_bias_halves_the_share_of_a_biased_tile() {
        let catalog = TileCatalog::land_and_water();
        let domain = [TileType::MiddleLand, TileType::Water];
        let count_water = |bias: f64| {
            let opts = SolverOptions {
                reroll_bias: BTreeMap::from([(TileType::Water, bias)]),
                ..options(0)
            };
            let solver = Solver::new(&catalog, &opts);
            let mut rng = MapRng::new(1);
            (0..10_000)
                .filter(|_| solver.draw(&domain, &mut rng) == TileType::Water)
                .count()
        };
        // A redraw of Water lands on Water half the time: 1/2 becomes 1/4.
        let unbiased = count_water(0.0);
        let biased = count_water(1.0);
        assert!((4_500..5_500).contains(&unbiased), "unbiased {unbiased}");
        assert!((2_000..3_000).contains(&biased), "biased {biased}");
    }

    #[test]
    fn weighted_draw_skips_zero_weight_tiles() {
        let catalog = TileCatalog::load(vec![
            TileDefinition::new(TileType::Water).with_weight(0.0),
            TileDefinition::new(TileType::MiddleLand).with_weight(2.0),
        ])
        .unwrap();
        let opts = SolverOptions {
            weighted_draw: true,
            ..options(0)
        };
        let solver = Solver::new(&catalog, &opts);
        let mut rng = MapRng::new(3);
        let domain = [TileType::Water, TileType::MiddleLand];
        for _ in 0..50 {
            assert_eq!(solver.pick(&domain, &mut rng), TileType::MiddleLand);
        }
    }
}
