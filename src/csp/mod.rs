//! Generic binary constraint satisfaction problems and local search
//!
//! Knows nothing about plants or beds. A problem is:
//!   - a list of variables
//!   - a domain (candidate values) per variable
//!   - a neighbor list per variable
//!   - one binary constraint `(var_a, val_a, var_b, val_b) -> bool`, checked
//!     between neighbors only
//!
//! `ProblemShape` holds the validated variables/domains/neighbors and is built
//! once. `Problem` pairs a shape with a constraint closure and is cheap to
//! create, so a caller can re-solve the same shape under different
//! constraints (or concurrently) without rebuilding anything.

pub mod limits;
pub mod min_conflicts;
pub mod stats;

pub use limits::SearchLimits;
pub use min_conflicts::min_conflicts;
pub use stats::SearchStatistics;

use rustc_hash::FxHashMap;
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

/// Structural problems detected while building a `ProblemShape`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CspError {
    #[error("variable {0} is listed more than once")]
    DuplicateVariable(String),

    #[error("variable {0} has no domain")]
    MissingDomain(String),

    #[error("variable {0} has an empty domain")]
    EmptyDomain(String),

    #[error("variable {variable} lists unknown neighbor {neighbor}")]
    UnknownNeighbor { variable: String, neighbor: String },
}

/// Validated variables, domains and neighbor lists in dense form
#[derive(Debug, Clone)]
pub struct ProblemShape<V, D> {
    variables: Vec<V>,
    index: FxHashMap<V, usize>,
    domains: Vec<Vec<D>>,
    neighbors: Vec<Vec<usize>>,
}

impl<V, D> ProblemShape<V, D>
where
    V: Clone + Eq + Hash + Debug,
{
    /// Validate and index a problem description
    ///
    /// A variable missing from `neighbors` simply has none.
    pub fn new(
        variables: Vec<V>,
        mut domains: FxHashMap<V, Vec<D>>,
        mut neighbors: FxHashMap<V, Vec<V>>,
    ) -> Result<Self, CspError> {
        let mut index = FxHashMap::default();
        index.reserve(variables.len());
        for (i, var) in variables.iter().enumerate() {
            if index.insert(var.clone(), i).is_some() {
                return Err(CspError::DuplicateVariable(format!("{:?}", var)));
            }
        }

        let mut dense_domains = Vec::with_capacity(variables.len());
        let mut dense_neighbors = Vec::with_capacity(variables.len());

        for var in &variables {
            let domain = domains
                .remove(var)
                .ok_or_else(|| CspError::MissingDomain(format!("{:?}", var)))?;
            if domain.is_empty() {
                return Err(CspError::EmptyDomain(format!("{:?}", var)));
            }
            dense_domains.push(domain);

            let list = neighbors.remove(var).unwrap_or_default();
            let mut dense = Vec::with_capacity(list.len());
            for neighbor in &list {
                let &n = index.get(neighbor).ok_or_else(|| CspError::UnknownNeighbor {
                    variable: format!("{:?}", var),
                    neighbor: format!("{:?}", neighbor),
                })?;
                dense.push(n);
            }
            dense_neighbors.push(dense);
        }

        Ok(Self {
            variables,
            index,
            domains: dense_domains,
            neighbors: dense_neighbors,
        })
    }

    pub fn index_of(&self, var: &V) -> Option<usize> {
        self.index.get(var).copied()
    }
}

impl<V, D> ProblemShape<V, D> {
    pub fn variables(&self) -> &[V] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn domain(&self, var: usize) -> &[D] {
        &self.domains[var]
    }

    pub fn neighbors(&self, var: usize) -> &[usize] {
        &self.neighbors[var]
    }
}

/// A shape plus the binary constraint to search under
pub struct Problem<'s, V, D, C> {
    shape: &'s ProblemShape<V, D>,
    constraint: C,
}

impl<'s, V, D, C> Problem<'s, V, D, C>
where
    C: Fn(&V, &D, &V, &D) -> bool,
{
    pub fn new(shape: &'s ProblemShape<V, D>, constraint: C) -> Self {
        Self { shape, constraint }
    }

    pub fn shape(&self) -> &'s ProblemShape<V, D> {
        self.shape
    }

    /// Whether value `a` (index into var_a's domain) is compatible with `b`
    #[inline]
    fn satisfied(&self, var_a: usize, a: usize, var_b: usize, b: usize) -> bool {
        (self.constraint)(
            &self.shape.variables[var_a],
            &self.shape.domains[var_a][a],
            &self.shape.variables[var_b],
            &self.shape.domains[var_b][b],
        )
    }
}

/// How a search run ended
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<V: Eq + Hash, D> {
    /// Every constraint between neighbors holds
    Solved(FxHashMap<V, D>),
    /// The step budget ran out with conflicts remaining
    Exhausted,
    /// The interrupt flag was raised
    Interrupted,
    /// The deadline passed
    TimedOut,
}

impl<V: Eq + Hash, D> SearchOutcome<V, D> {
    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved(_))
    }

    /// The assignment on success, `None` for every other outcome
    pub fn into_assignment(self) -> Option<FxHashMap<V, D>> {
        match self {
            Self::Solved(assignment) => Some(assignment),
            _ => None,
        }
    }
}

/// Outcome plus the statistics of the run that produced it
#[derive(Debug, Clone)]
pub struct SearchResult<V: Eq + Hash, D> {
    pub outcome: SearchOutcome<V, D>,
    pub statistics: SearchStatistics,
}
