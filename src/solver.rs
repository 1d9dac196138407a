//! Planting Solver - compiles beds and catalog into a CSP and runs min-conflicts
//!
//! Lifecycle:
//!   1. `PlantingSolver::new` compiles the cell index, neighbor graph and
//!      per-cell domains once (`CompiledProblem`, immutable from then on)
//!   2. every `solve*` call binds the current rules and threshold into a
//!      predicate, builds a throwaway `Problem` over the compiled shape and
//!      runs the search
//!   3. a complete conflict-free assignment is reshaped into per-bed grids;
//!      anything else yields no solution
//!
//! `solve*` takes `&self`, so concurrent solves on one solver are safe and
//! `solve_portfolio` uses that to run seeded restarts in parallel.

use crate::cells::{CellId, CellIndex};
use crate::csp::{min_conflicts, Problem, ProblemShape, SearchLimits, SearchOutcome, SearchStatistics};
use crate::data::{GardenBedConfig, PlantCatalog};
use crate::error::{PlannerError, Result};
use crate::rules::{ConstraintContext, Rule};
use crate::scorer::{ScoreBreakdown, WeightedScorer, DEFAULT_SATISFACTION_THRESHOLD};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default step budget for a single run
pub const DEFAULT_MAX_ITERATIONS: u64 = 1000;

/// Cells, neighbors and domains, built once per solver
#[derive(Debug, Clone)]
pub struct CompiledProblem {
    cells: CellIndex,
    shape: ProblemShape<CellId, Arc<str>>,
}

impl CompiledProblem {
    pub fn compile(beds: &[GardenBedConfig], catalog: &PlantCatalog) -> Result<Self> {
        if catalog.is_empty() {
            return Err(PlannerError::EmptyCatalog);
        }

        let cells = CellIndex::build(beds)?;

        // every cell may hold any plant; pruning happens only through the predicate
        let names: Vec<Arc<str>> = catalog.names().map(Arc::from).collect();
        let domains = cells
            .cells()
            .iter()
            .map(|cell| (cell.clone(), names.clone()))
            .collect();

        let shape = ProblemShape::new(cells.cells().to_vec(), domains, cells.neighbor_map())?;

        tracing::debug!(
            "Compiled {} cells across {} beds, {} plants per domain",
            cells.len(),
            beds.len(),
            names.len()
        );

        Ok(Self { cells, shape })
    }

    pub fn cells(&self) -> &CellIndex {
        &self.cells
    }

    pub fn shape(&self) -> &ProblemShape<CellId, Arc<str>> {
        &self.shape
    }
}

/// Placement per bed: `bed_id → ("row,col" → plant name)`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SolverSolution {
    beds: BTreeMap<String, BTreeMap<String, String>>,
}

impl SolverSolution {
    /// Reshape a flat cell assignment into per-bed maps
    pub fn from_assignment<'p, I>(assignment: I) -> Self
    where
        I: IntoIterator<Item = (&'p CellId, &'p str)>,
    {
        let mut beds: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (cell, plant) in assignment {
            beds.entry(cell.bed_id.to_string())
                .or_default()
                .insert(cell.coord_key(), plant.to_string());
        }
        Self { beds }
    }

    pub fn bed(&self, bed_id: &str) -> Option<&BTreeMap<String, String>> {
        self.beds.get(bed_id)
    }

    pub fn beds(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, String>)> + '_ {
        self.beds.iter().map(|(id, cells)| (id.as_str(), cells))
    }

    pub fn plant_at(&self, bed_id: &str, row: usize, col: usize) -> Option<&str> {
        self.beds
            .get(bed_id)?
            .get(&format!("{},{}", row, col))
            .map(String::as_str)
    }

    /// Row-major grid for display; unassigned cells are `None`
    pub fn grid(&self, bed_id: &str, grid_size: usize) -> Vec<Vec<Option<&str>>> {
        (0..grid_size)
            .map(|row| {
                (0..grid_size)
                    .map(|col| self.plant_at(bed_id, row, col))
                    .collect()
            })
            .collect()
    }

    /// Number of assigned cells across all beds
    pub fn len(&self) -> usize {
        self.beds.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Knobs for one solve
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOptions {
    pub max_iterations: u64,
    pub satisfaction_threshold: f64,
    /// Fixed seed for a reproducible run; random when `None`
    pub seed: Option<u64>,
    pub time_limit: Option<Duration>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            satisfaction_threshold: DEFAULT_SATISFACTION_THRESHOLD,
            seed: None,
            time_limit: None,
        }
    }
}

impl SolveOptions {
    pub fn new(max_iterations: u64, satisfaction_threshold: f64) -> Self {
        Self {
            max_iterations,
            satisfaction_threshold,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let t = self.satisfaction_threshold;
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(PlannerError::InvalidThreshold(t));
        }
        Ok(())
    }
}

/// How a solve ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Solved,
    Exhausted,
    Interrupted,
    TimedOut,
}

/// Solution (if any) with the run's status and statistics
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub status: SolveStatus,
    pub solution: Option<SolverSolution>,
    pub statistics: SearchStatistics,
    /// Seed of the run that produced this report
    pub seed: u64,
}

/// A neighboring pair in a solution that fails the predicate
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub cell_a: String,
    pub plant_a: String,
    pub cell_b: String,
    pub plant_b: String,
    /// Per-rule scores, when both plants are in the catalog
    pub breakdown: Option<ScoreBreakdown>,
}

/// Weighted-rule planting solver over a fixed set of beds and plants
pub struct PlantingSolver<'a> {
    catalog: &'a PlantCatalog,
    compiled: CompiledProblem,
    scorer: WeightedScorer,
}

impl<'a> PlantingSolver<'a> {
    /// Solver with the default spacing and antagonist rules
    pub fn new(beds: &[GardenBedConfig], catalog: &'a PlantCatalog) -> Result<Self> {
        Self::with_scorer(beds, catalog, WeightedScorer::with_default_rules())
    }

    pub fn with_scorer(
        beds: &[GardenBedConfig],
        catalog: &'a PlantCatalog,
        scorer: WeightedScorer,
    ) -> Result<Self> {
        let compiled = CompiledProblem::compile(beds, catalog)?;
        Ok(Self {
            catalog,
            compiled,
            scorer,
        })
    }

    pub fn register_rule(&mut self, rule: impl Into<Rule>, weight: f64) -> &mut Self {
        self.scorer.register(rule, weight);
        self
    }

    pub fn scorer(&self) -> &WeightedScorer {
        &self.scorer
    }

    pub fn compiled(&self) -> &CompiledProblem {
        &self.compiled
    }

    pub fn cells(&self) -> &CellIndex {
        &self.compiled.cells
    }

    pub fn catalog(&self) -> &'a PlantCatalog {
        self.catalog
    }

    /// Solve once; `None` when no satisfying assignment was found
    ///
    /// An invalid threshold is logged and also yields `None`.
    pub fn solve(&self, max_iterations: u64, satisfaction_threshold: f64) -> Option<SolverSolution> {
        let options = SolveOptions::new(max_iterations, satisfaction_threshold);
        match self.solve_with(&options) {
            Ok(report) => report.solution,
            Err(e) => {
                tracing::warn!("Solve rejected: {}", e);
                None
            }
        }
    }

    /// Solve once with full options, returning status and statistics
    pub fn solve_with(&self, options: &SolveOptions) -> Result<SolveReport> {
        options.validate()?;
        let seed = options.seed.unwrap_or_else(rand::random);
        Ok(self.run(options, seed, None))
    }

    /// Like `solve_with`, stopping early when `cancel` is raised
    pub fn solve_cancellable(&self, options: &SolveOptions, cancel: &AtomicBool) -> Result<SolveReport> {
        options.validate()?;
        let seed = options.seed.unwrap_or_else(rand::random);
        Ok(self.run(options, seed, Some(cancel)))
    }

    /// Run `restarts` independently seeded searches in parallel
    ///
    /// The first run to succeed raises a shared flag that stops the rest. With
    /// no success, the report of the run with the fewest remaining conflicts is
    /// returned.
    pub fn solve_portfolio(&self, options: &SolveOptions, restarts: usize) -> Result<SolveReport> {
        options.validate()?;
        if restarts == 0 {
            return Err(PlannerError::NoRestarts);
        }
        let base_seed = options.seed.unwrap_or_else(rand::random);
        let stop = AtomicBool::new(false);

        let reports: Vec<SolveReport> = (0..restarts)
            .into_par_iter()
            .map(|i| {
                let seed = base_seed.wrapping_add(i as u64);
                let report = self.run(options, seed, Some(&stop));
                tracing::debug!("Restart {} (seed {}) finished: {:?}", i, seed, report.status);
                if report.status == SolveStatus::Solved {
                    stop.store(true, Ordering::Relaxed);
                }
                report
            })
            .collect();

        reports
            .into_iter()
            .min_by_key(|r| (r.status != SolveStatus::Solved, r.statistics.final_conflicts))
            .ok_or(PlannerError::NoRestarts)
    }

    fn run(&self, options: &SolveOptions, seed: u64, interrupt: Option<&AtomicBool>) -> SolveReport {
        let threshold = options.satisfaction_threshold;
        let cells = &self.compiled.cells;

        tracing::info!(
            "Solving {} cells across {} beds with {} plants (threshold {}, max {} iterations, seed {})",
            cells.len(),
            cells.beds().len(),
            self.catalog.len(),
            threshold,
            options.max_iterations,
            seed
        );

        let predicate = self.scorer.predicate(cells, self.catalog, threshold);
        let problem = Problem::new(
            &self.compiled.shape,
            |cell_a: &CellId, plant_a: &Arc<str>, cell_b: &CellId, plant_b: &Arc<str>| {
                predicate.check(cell_a, plant_a, cell_b, plant_b)
            },
        );

        let mut limits = SearchLimits::steps(options.max_iterations);
        if let Some(limit) = options.time_limit {
            limits = limits.with_time_limit(limit);
        }
        if let Some(flag) = interrupt {
            limits = limits.with_interrupt(flag);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let result = min_conflicts(&problem, &limits, &mut rng);

        let (status, solution) = match result.outcome {
            SearchOutcome::Solved(assignment) => {
                (SolveStatus::Solved, Some(reshape(&assignment)))
            }
            SearchOutcome::Exhausted => (SolveStatus::Exhausted, None),
            SearchOutcome::Interrupted => (SolveStatus::Interrupted, None),
            SearchOutcome::TimedOut => (SolveStatus::TimedOut, None),
        };

        tracing::info!(
            "Solve finished: {:?} after {} steps ({} conflicts left, {:?})",
            status,
            result.statistics.steps,
            result.statistics.final_conflicts,
            result.statistics.elapsed
        );

        SolveReport {
            status,
            solution,
            statistics: result.statistics,
            seed,
        }
    }

    /// Per-rule scores for one placement pair
    pub fn explain_pair(
        &self,
        cell_a: &CellId,
        plant_a: &str,
        cell_b: &CellId,
        plant_b: &str,
    ) -> Option<ScoreBreakdown> {
        let cells = &self.compiled.cells;
        let ctx = ConstraintContext::new(
            self.catalog.get(plant_a)?,
            self.catalog.get(plant_b)?,
            cells.position_of(cell_a)?,
            cells.position_of(cell_b)?,
            cells,
            self.catalog,
        );
        Some(self.scorer.breakdown(&ctx))
    }

    /// Every neighboring pair in `solution` that fails at `threshold`
    ///
    /// Both directions of each edge are checked. Cells missing from the
    /// solution are skipped.
    pub fn violations(&self, solution: &SolverSolution, threshold: f64) -> Vec<Violation> {
        let cells = &self.compiled.cells;
        let predicate = self.scorer.predicate(cells, self.catalog, threshold);
        let mut found = Vec::new();

        for a in 0..cells.len() {
            let cell_a = cells.cell(a);
            let Some(plant_a) = solution.plant_at(&cell_a.bed_id, cell_a.row, cell_a.col) else {
                continue;
            };

            for &b in cells.neighbors(a).iter().filter(|&&b| b > a) {
                let cell_b = cells.cell(b);
                let Some(plant_b) = solution.plant_at(&cell_b.bed_id, cell_b.row, cell_b.col) else {
                    continue;
                };

                let ok = predicate.check_positions(a, plant_a, b, plant_b)
                    && predicate.check_positions(b, plant_b, a, plant_a);
                if !ok {
                    found.push(Violation {
                        cell_a: cell_a.to_string(),
                        plant_a: plant_a.to_string(),
                        cell_b: cell_b.to_string(),
                        plant_b: plant_b.to_string(),
                        breakdown: self.explain_pair(cell_a, plant_a, cell_b, plant_b),
                    });
                }
            }
        }

        found
    }
}

fn reshape(assignment: &FxHashMap<CellId, Arc<str>>) -> SolverSolution {
    SolverSolution::from_assignment(assignment.iter().map(|(cell, plant)| (cell, &**plant)))
}
