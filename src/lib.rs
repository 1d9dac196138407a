//! Bed Planner
//!
//! Places plants into square garden beds so that pairwise agronomic rules
//! hold between touching cells.
//!
//! Layout:
//! - `data`: plants, beds and the catalog (serde/JSON)
//! - `cells`: cell enumeration and the Moore neighbor graph
//! - `rules/`: individual scoring rules (spacing, antagonist, companion, sunlight)
//! - `scorer`: weighted aggregation and the thresholded predicate
//! - `csp/`: generic CSP representation and min-conflicts local search
//! - `solver`: compiles everything into a CSP, solves and reshapes the result
//! - `config`: JSON/env configuration
//!
//! The search is a randomized heuristic: it may fail on satisfiable inputs and
//! gives no optimality guarantee.

pub mod cells;
pub mod config;
pub mod csp;
pub mod data;
pub mod error;
pub mod rules;
pub mod scorer;
pub mod solver;

// Re-export commonly used types
pub use cells::{CellId, CellIndex};
pub use config::{PlannerConfig, RuleSpec};
pub use data::{GardenBedConfig, Plant, PlantCatalog, PlantingInput};
pub use error::PlannerError;
pub use rules::{BuiltinRule, ConstraintContext, Rule, ScoringRule};
pub use scorer::{ScoreBreakdown, WeightedScorer, DEFAULT_SATISFACTION_THRESHOLD};
pub use solver::{
    CompiledProblem, PlantingSolver, SolveOptions, SolveReport, SolveStatus, SolverSolution,
    Violation,
};
