//! Rule framework for pairwise planting constraints
//!
//! Each rule scores one candidate pair of plants in two cells on `[0.0, 1.0]`:
//! `1.0` means satisfied (or not applicable), `0.0` means fully violated.
//! Rules are pure functions of their `ConstraintContext`.
//!
//! Built-in rules live in their own modules and are collected in the closed
//! `BuiltinRule` enum. Anything else implements `ScoringRule` and is stored as
//! `Rule::Custom`.

pub mod antagonist;
pub mod companion;
pub mod spacing;
pub mod sunlight;

pub use antagonist::AntagonistRule;
pub use companion::CompanionRule;
pub use spacing::SpacingRule;
pub use sunlight::SunlightRule;

use crate::cells::{CellId, CellIndex};
use crate::data::{Plant, PlantCatalog};
use crate::error::{PlannerError, Result};
use std::fmt;

/// Everything a rule may look at for one candidate pair
///
/// Built fresh for every pairwise check and never retained.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintContext<'a> {
    pub plant_a: &'a Plant,
    pub plant_b: &'a Plant,
    /// Position of the first cell in `cells`
    pub cell_a: usize,
    /// Position of the second cell in `cells`
    pub cell_b: usize,
    /// Full cell index, including the neighbor graph
    pub cells: &'a CellIndex,
    pub catalog: &'a PlantCatalog,
    /// Side length of the bed holding `cell_a`
    pub grid_size: usize,
}

impl<'a> ConstraintContext<'a> {
    pub fn new(
        plant_a: &'a Plant,
        plant_b: &'a Plant,
        cell_a: usize,
        cell_b: usize,
        cells: &'a CellIndex,
        catalog: &'a PlantCatalog,
    ) -> Self {
        Self {
            plant_a,
            plant_b,
            cell_a,
            cell_b,
            cells,
            catalog,
            grid_size: cells.bed_at(cell_a).grid_size,
        }
    }

    pub fn cell_a_id(&self) -> &'a CellId {
        self.cells.cell(self.cell_a)
    }

    pub fn cell_b_id(&self) -> &'a CellId {
        self.cells.cell(self.cell_b)
    }

    /// Whether the two cells touch (Moore neighborhood, same bed)
    pub fn are_neighbors(&self) -> bool {
        self.cells.are_neighbors(self.cell_a, self.cell_b)
    }

    pub fn same_species(&self) -> bool {
        self.plant_a.name == self.plant_b.name
    }
}

/// A weighted-scoring rule over a pair of placements
///
/// Implementations must be pure and should treat both plants symmetrically
/// unless the name says otherwise.
pub trait ScoringRule: Send + Sync {
    /// Human-readable name used in logs and score breakdowns
    fn name(&self) -> &str;

    /// Score on `[0.0, 1.0]`; `1.0` is fully satisfied
    fn score(&self, ctx: &ConstraintContext<'_>) -> f64;
}

/// The rules shipped with the crate
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinRule {
    Spacing(SpacingRule),
    Antagonist(AntagonistRule),
    Companion(CompanionRule),
    Sunlight(SunlightRule),
}

impl BuiltinRule {
    /// Look up a built-in rule by its config name
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "spacing" => Ok(Self::Spacing(SpacingRule)),
            "antagonist" | "antagonists" => Ok(Self::Antagonist(AntagonistRule)),
            "companion" | "companions" => Ok(Self::Companion(CompanionRule::default())),
            "sunlight" | "sun" => Ok(Self::Sunlight(SunlightRule)),
            _ => Err(PlannerError::UnknownRule(name.to_string())),
        }
    }
}

impl ScoringRule for BuiltinRule {
    fn name(&self) -> &str {
        match self {
            Self::Spacing(r) => r.name(),
            Self::Antagonist(r) => r.name(),
            Self::Companion(r) => r.name(),
            Self::Sunlight(r) => r.name(),
        }
    }

    fn score(&self, ctx: &ConstraintContext<'_>) -> f64 {
        match self {
            Self::Spacing(r) => r.score(ctx),
            Self::Antagonist(r) => r.score(ctx),
            Self::Companion(r) => r.score(ctx),
            Self::Sunlight(r) => r.score(ctx),
        }
    }
}

/// A registered rule: built-in or caller-supplied
pub enum Rule {
    Builtin(BuiltinRule),
    Custom(Box<dyn ScoringRule>),
}

impl Rule {
    pub fn custom<R: ScoringRule + 'static>(rule: R) -> Self {
        Self::Custom(Box::new(rule))
    }
}

impl ScoringRule for Rule {
    fn name(&self) -> &str {
        match self {
            Self::Builtin(r) => r.name(),
            Self::Custom(r) => r.name(),
        }
    }

    fn score(&self, ctx: &ConstraintContext<'_>) -> f64 {
        match self {
            Self::Builtin(r) => r.score(ctx),
            Self::Custom(r) => r.score(ctx),
        }
    }
}

impl From<BuiltinRule> for Rule {
    fn from(rule: BuiltinRule) -> Self {
        Self::Builtin(rule)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(r) => write!(f, "Rule::Builtin({:?})", r),
            Self::Custom(r) => write!(f, "Rule::Custom {{ name: {} }}", r.name()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::cells::CellIndex;
    use crate::data::{GardenBedConfig, Plant, PlantCatalog};

    /// 3x3 bed "a" plus 2x2 bed "b" and a small catalog
    pub fn setup() -> (CellIndex, PlantCatalog) {
        let cells = CellIndex::build(&[
            GardenBedConfig::new("a", 3),
            GardenBedConfig::new("b", 2),
        ])
        .unwrap();

        let catalog = PlantCatalog::new(vec![
            Plant::new("Tomato", 2)
                .with_sun("full")
                .with_companions(["Basil"])
                .with_antagonists(["Fennel"]),
            Plant::new("Basil", 1).with_sun("full"),
            Plant::new("Fennel", 1).with_sun("full"),
            Plant::new("Lettuce", 1).with_sun("partial"),
            Plant::new("Mint", 1),
        ])
        .unwrap();

        (cells, catalog)
    }

    /// Position of `(row, col)` in bed "a"
    pub fn a(row: usize, col: usize) -> usize {
        row * 3 + col
    }
}
