// Tile catalog: the immutable set of tile definitions and their adjacency
// rules.
//
// A `TileDefinition` lists, for each of the four directions, the tile types
// that may occupy the neighboring cell on that side. The catalog takes these
// sets as given. It does not force them to be symmetric, but
// `validate_symmetry()` reports every one-sided rule so data authors can fix
// them.
//
// Two lookups are exposed. `admits()` reads only the source tile's allowed
// set and is what propagation after a collapse uses. `admits_symmetric()`
// additionally requires the neighbor to allow the source back, and is what
// arc consistency uses.
//
// Presets are built with `from_corners()`: each tile declares which of its
// four corners are land, and two tiles may touch iff the corners along the
// shared edge agree. Rules built this way are symmetric by construction.
//
// See also: `grid.rs` which seeds every cell's domain from the catalog,
// `solver.rs` for propagation and arc consistency, `config.rs` where the
// catalog's tile list is loaded from JSON.

use crate::error::ConfigError;
use crate::types::{Direction, TileType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

/// One tile type and the neighbors it allows on each side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileDefinition {
    pub id: TileType,
    #[serde(default)]
    pub up: BTreeSet<TileType>,
    #[serde(default)]
    pub down: BTreeSet<TileType>,
    #[serde(default)]
    pub left: BTreeSet<TileType>,
    #[serde(default)]
    pub right: BTreeSet<TileType>,
    /// Relative draw weight, used only when the solver's `weighted_draw`
    /// option is on. Missing means 1.0.
    #[serde(default)]
    pub weight: Option<f64>,
}

impl TileDefinition {
    /// A tile with no allowed neighbors in any direction.
    pub fn new(id: TileType) -> Self {
        Self {
            id,
            up: BTreeSet::new(),
            down: BTreeSet::new(),
            left: BTreeSet::new(),
            right: BTreeSet::new(),
            weight: None,
        }
    }

    /// Allow `neighbors` on every side.
    pub fn allowing_everywhere(id: TileType, neighbors: &[TileType]) -> Self {
        let mut def = Self::new(id);
        for dir in Direction::ALL {
            def.allowed_mut(dir).extend(neighbors.iter().copied());
        }
        def
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Tile types allowed in the neighboring cell in `dir`.
    pub fn allowed(&self, dir: Direction) -> &BTreeSet<TileType> {
        match dir {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    pub fn allowed_mut(&mut self, dir: Direction) -> &mut BTreeSet<TileType> {
        match dir {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }

    pub fn effective_weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }
}

/// A one-sided adjacency rule: `tile` allows `neighbor` in `dir`, but
/// `neighbor` does not allow `tile` in the opposite direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymmetryViolation {
    pub tile: TileType,
    pub dir: Direction,
    pub neighbor: TileType,
}

/// Land/water flags for the four corners of a tile, used by
/// `TileCatalog::from_corners()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LandCorners {
    pub upper_left: bool,
    pub upper_right: bool,
    pub lower_left: bool,
    pub lower_right: bool,
}

impl LandCorners {
    pub const fn new(
        upper_left: bool,
        upper_right: bool,
        lower_left: bool,
        lower_right: bool,
    ) -> Self {
        Self {
            upper_left,
            upper_right,
            lower_left,
            lower_right,
        }
    }

    /// The two corners along the edge facing `dir`, ordered left-to-right
    /// for horizontal edges and top-to-bottom for vertical ones.
    fn edge(self, dir: Direction) -> (bool, bool) {
        match dir {
            Direction::Up => (self.upper_left, self.upper_right),
            Direction::Down => (self.lower_left, self.lower_right),
            Direction::Left => (self.upper_left, self.lower_left),
            Direction::Right => (self.upper_right, self.lower_right),
        }
    }
}

/// Immutable, validated set of tile definitions.
#[derive(Clone, Debug)]
pub struct TileCatalog {
    tiles: Vec<TileDefinition>,
    index: BTreeMap<TileType, usize>,
}

impl TileCatalog {
    /// Validate and index a tile list. Catalog order is the order given and
    /// is the order every fresh cell domain is seeded in.
    pub fn load(tiles: Vec<TileDefinition>) -> Result<Self, ConfigError> {
        if tiles.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let mut index = BTreeMap::new();
        for (i, def) in tiles.iter().enumerate() {
            if index.insert(def.id, i).is_some() {
                return Err(ConfigError::DuplicateTile(def.id));
            }
            if def.weight.is_some_and(|w| !w.is_finite() || w < 0.0) {
                return Err(ConfigError::InvalidOption(format!(
                    "weight of {} must be a finite non-negative number (got {})",
                    def.id,
                    def.effective_weight()
                )));
            }
        }
        Ok(Self { tiles, index })
    }

    /// Index a preset tile list whose ids are known to be unique.
    fn indexed(tiles: Vec<TileDefinition>) -> Self {
        let index = tiles.iter().enumerate().map(|(i, def)| (def.id, i)).collect();
        Self { tiles, index }
    }

    /// Build a catalog from corner terrain. Tile `a` allows `b` in `dir` iff
    /// `a`'s edge facing `dir` matches `b`'s edge facing back.
    pub fn from_corners(specs: &[(TileType, LandCorners)]) -> Result<Self, ConfigError> {
        Self::load(corner_tiles(specs))
    }

    /// Two tiles, `MiddleLand` and `Water`, each allowing both on every side.
    pub fn land_and_water() -> Self {
        let both = [TileType::MiddleLand, TileType::Water];
        Self::indexed(vec![
            TileDefinition::allowing_everywhere(TileType::MiddleLand, &both),
            TileDefinition::allowing_everywhere(TileType::Water, &both),
        ])
    }

    /// Coastline preset: open water, island interior, straight shores, outer
    /// corners and inner curves. Interior and water are weighted up so that
    /// weighted draws favor large regions.
    pub fn island() -> Self {
        const F: bool = false;
        const T: bool = true;
        let specs = [
            (TileType::Water, LandCorners::new(F, F, F, F)),
            (TileType::MiddleLand, LandCorners::new(T, T, T, T)),
            (TileType::UpperLand, LandCorners::new(F, F, T, T)),
            (TileType::LowerLand, LandCorners::new(T, T, F, F)),
            (TileType::LeftLand, LandCorners::new(F, T, F, T)),
            (TileType::RightLand, LandCorners::new(T, F, T, F)),
            (TileType::UpperLeftCornerLand, LandCorners::new(F, F, F, T)),
            (TileType::UpperRightCornerLand, LandCorners::new(F, F, T, F)),
            (TileType::LowerLeftCornerLand, LandCorners::new(F, T, F, F)),
            (TileType::LowerRightCornerLand, LandCorners::new(T, F, F, F)),
            (TileType::UpperLeftCurve, LandCorners::new(F, T, T, T)),
            (TileType::UpperRightCurve, LandCorners::new(T, F, T, T)),
            (TileType::LowerLeftCurve, LandCorners::new(T, T, F, T)),
            (TileType::LowerRightCurve, LandCorners::new(T, T, T, F)),
        ];
        let mut tiles = corner_tiles(&specs);
        for def in &mut tiles {
            if matches!(def.id, TileType::Water | TileType::MiddleLand) {
                def.weight = Some(4.0);
            }
        }
        Self::indexed(tiles)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Definitions in catalog order.
    pub fn tiles(&self) -> &[TileDefinition] {
        &self.tiles
    }

    /// Tile ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = TileType> + '_ {
        self.tiles.iter().map(|def| def.id)
    }

    pub fn get(&self, tile: TileType) -> Option<&TileDefinition> {
        self.index.get(&tile).map(|&i| &self.tiles[i])
    }

    pub fn contains(&self, tile: TileType) -> bool {
        self.index.contains_key(&tile)
    }

    /// One-directional rule: `neighbor` is in `source`'s allowed set for `dir`.
    pub fn admits(&self, source: TileType, dir: Direction, neighbor: TileType) -> bool {
        self.get(source)
            .is_some_and(|def| def.allowed(dir).contains(&neighbor))
    }

    /// Symmetric rule: each tile allows the other across the shared edge.
    pub fn admits_symmetric(&self, source: TileType, dir: Direction, neighbor: TileType) -> bool {
        self.admits(source, dir, neighbor) && self.admits(neighbor, dir.opposite(), source)
    }

    /// Every one-sided rule, in catalog order then direction order.
    /// Neighbors that are not in the catalog are skipped; they can never be
    /// placed, so the rule is inert.
    pub fn validate_symmetry(&self) -> Vec<SymmetryViolation> {
        let mut violations = Vec::new();
        for def in &self.tiles {
            for dir in Direction::ALL {
                for &neighbor in def.allowed(dir) {
                    let Some(other) = self.get(neighbor) else {
                        continue;
                    };
                    if !other.allowed(dir.opposite()).contains(&def.id) {
                        violations.push(SymmetryViolation {
                            tile: def.id,
                            dir,
                            neighbor,
                        });
                    }
                }
            }
        }
        violations
    }

    /// Human-readable dump of every tile and its allowed neighbors.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "--- Tiles ({}) ---", self.tiles.len());
        for def in &self.tiles {
            let _ = writeln!(out, "  - {} (weight {}):", def.id, def.effective_weight());
            for dir in Direction::ALL {
                let names: Vec<&str> = def.allowed(dir).iter().map(|t| t.name()).collect();
                let list = if names.is_empty() {
                    "None".to_string()
                } else {
                    names.join(", ")
                };
                let _ = writeln!(out, "    {dir:?}: {list}");
            }
        }
        out
    }
}

/// Tile `a` allows `b` in `dir` iff `a`'s edge facing `dir` matches `b`'s
/// edge facing back.
fn corner_tiles(specs: &[(TileType, LandCorners)]) -> Vec<TileDefinition> {
    specs
        .iter()
        .map(|&(id, corners)| {
            let mut def = TileDefinition::new(id);
            for dir in Direction::ALL {
                let edge = corners.edge(dir);
                def.allowed_mut(dir).extend(
                    specs
                        .iter()
                        .filter(|(_, other)| other.edge(dir.opposite()) == edge)
                        .map(|&(other_id, _)| other_id),
                );
            }
            def
        })
        .collect()
}
