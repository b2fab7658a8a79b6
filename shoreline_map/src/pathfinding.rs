// A* pathfinding over the navigation grid.
//
// Standard A* with a `BinaryHeap` open set (min-heap via reversed ordering).
// Every move costs 1 and the heuristic is Manhattan distance to the goal,
// which is admissible and consistent on a 4-connected grid. Scores,
// came-from links and the closed set live in `Vec`s indexed by flat cell
// index, so there is no hashing on the hot path.
//
// A move from a cell in direction `d` is allowed iff the current cell's
// `passable[d]` is set and the neighbor is walkable. Passability of the
// neighbor's facing edge is not consulted, so passage can be one-way.
//
// Open-set order: lowest `f = g + h`, then lowest `h`, then earliest pushed.
// Neighbors are pushed in `Direction::ALL` order (Up, Down, Left, Right).
//
// See also: `nav.rs` for the `NavGrid` being searched, `generator.rs` where
// `GeneratedMap::find_path()` delegates here.
//
// **Critical constraint: determinism.** A* is a pure function of the grid
// and endpoints. Identical inputs always produce the identical path.

use crate::error::PathError;
use crate::nav::NavGrid;
use crate::types::{Direction, GridCoord};
use log::debug;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Entry in the A* open set (min-heap via reversed ordering).
struct OpenEntry {
    index: usize,
    f_score: u32,
    h_score: u32,
    /// Push order, the final tie-break.
    seq: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest (f, h, seq) is "greatest".
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.h_score.cmp(&self.h_score))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Find a shortest path from `start` to `goal`, both inclusive.
///
/// Returns `OutOfBounds` if either endpoint is off the grid and
/// `Unreachable` if either endpoint is blocked or no route exists.
pub fn find_path(
    grid: &NavGrid,
    start: GridCoord,
    goal: GridCoord,
) -> Result<Vec<GridCoord>, PathError> {
    let (Some(si), Some(gi)) = (grid.index(start), grid.index(goal)) else {
        let coord = if grid.in_bounds(start) { goal } else { start };
        debug!("path request {start} -> {goal} rejected: {coord} out of bounds");
        return Err(PathError::OutOfBounds { coord });
    };
    let unreachable = PathError::Unreachable { start, goal };
    if !grid.cell_at(si).walkable || !grid.cell_at(gi).walkable {
        debug!("path request {start} -> {goal} rejected: endpoint not walkable");
        return Err(unreachable);
    }
    if si == gi {
        return Ok(vec![start]);
    }

    let n = grid.cell_count();
    // g_score[cell] = steps on the cheapest known path from start.
    let mut g_score = vec![u32::MAX; n];
    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut closed = vec![false; n];
    let mut seq = 0u64;

    g_score[si] = 0;
    let h_start = start.manhattan_distance(goal);
    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        index: si,
        f_score: h_start,
        h_score: h_start,
        seq,
    });

    while let Some(current) = open.pop() {
        let ci = current.index;
        if ci == gi {
            return Ok(reconstruct_path(grid, &came_from, gi));
        }
        if closed[ci] {
            continue;
        }
        closed[ci] = true;

        let coord = grid.coord_of(ci);
        let cell = grid.cell_at(ci);
        let tentative_g = g_score[ci] + 1;

        for dir in Direction::ALL {
            if !cell.is_passable(dir) {
                continue;
            }
            let next = coord.step(dir);
            let Some(ni) = grid.index(next) else {
                continue;
            };
            if closed[ni] || !grid.cell_at(ni).walkable {
                continue;
            }
            if tentative_g < g_score[ni] {
                g_score[ni] = tentative_g;
                came_from[ni] = Some(ci);
                let h = next.manhattan_distance(goal);
                seq += 1;
                open.push(OpenEntry {
                    index: ni,
                    f_score: tentative_g + h,
                    h_score: h,
                    seq,
                });
            }
        }
    }

    debug!("no path from {start} to {goal}");
    Err(unreachable)
}

/// Walk came-from links back from `goal` and reverse.
fn reconstruct_path(grid: &NavGrid, came_from: &[Option<usize>], goal: usize) -> Vec<GridCoord> {
    let mut path = vec![grid.coord_of(goal)];
    let mut current = goal;
    while let Some(prev) = came_from[current] {
        path.push(grid.coord_of(prev));
        current = prev;
    }
    path.reverse();
    path
}
