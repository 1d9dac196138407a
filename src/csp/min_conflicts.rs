//! Min-conflicts local search
//!
//! 1. Greedy start: visit variables in order, giving each the value with the
//!    fewest conflicts against already-assigned neighbors.
//! 2. Repair: while conflicts remain and budget allows, pick a conflicted
//!    variable at random and move it to the value with the fewest conflicts
//!    against its neighbors' current values.
//!
//! Ties are broken uniformly at random, so runs with different RNG states may
//! end differently (including success vs. exhaustion). Conflict counts are
//! kept per variable and updated incrementally after each move; only the
//! moved variable's neighbors are re-evaluated.

use super::limits::{SearchLimits, Stop};
use super::stats::SearchStatistics;
use super::{Problem, SearchOutcome, SearchResult};
use rand::Rng;
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::time::Instant;

/// Run min-conflicts until solved or a limit is hit
pub fn min_conflicts<V, D, C, R>(
    problem: &Problem<'_, V, D, C>,
    limits: &SearchLimits<'_>,
    rng: &mut R,
) -> SearchResult<V, D>
where
    V: Clone + Eq + Hash,
    D: Clone,
    C: Fn(&V, &D, &V, &D) -> bool,
    R: Rng + ?Sized,
{
    let started = Instant::now();
    let shape = problem.shape();
    let n = shape.len();
    let mut statistics = SearchStatistics::default();

    let values = initial_assignment(problem, rng);
    let mut state = RepairState::new(problem, values);
    statistics.initial_conflicts = state.conflicted.len();

    let mut stop = None;
    let mut step = 0u64;
    while step < limits.max_steps && !state.conflicted.is_empty() {
        if let Some(reason) = limits.check(step) {
            stop = Some(reason);
            break;
        }

        let var = state.conflicted.choose(rng);
        let changed = state.repair(problem, var, rng);
        statistics.on_step(changed);
        step += 1;
    }

    statistics.final_conflicts = state.conflicted.len();
    statistics.elapsed = started.elapsed();

    let outcome = if state.conflicted.is_empty() {
        let assignment = (0..n)
            .map(|var| {
                (
                    shape.variables()[var].clone(),
                    shape.domain(var)[state.values[var]].clone(),
                )
            })
            .collect::<FxHashMap<V, D>>();
        SearchOutcome::Solved(assignment)
    } else {
        match stop {
            Some(Stop::Interrupted) => SearchOutcome::Interrupted,
            Some(Stop::TimedOut) => SearchOutcome::TimedOut,
            None => SearchOutcome::Exhausted,
        }
    };

    SearchResult {
        outcome,
        statistics,
    }
}

/// Greedy start against neighbors assigned so far
fn initial_assignment<V, D, C, R>(problem: &Problem<'_, V, D, C>, rng: &mut R) -> Vec<usize>
where
    C: Fn(&V, &D, &V, &D) -> bool,
    R: Rng + ?Sized,
{
    let shape = problem.shape();
    let mut values: Vec<Option<usize>> = vec![None; shape.len()];

    for var in 0..shape.len() {
        let best = pick_min(shape.domain(var).len(), rng, |candidate| {
            shape
                .neighbors(var)
                .iter()
                .filter_map(|&n| values[n].map(|v| (n, v)))
                .filter(|&(n, v)| !problem.satisfied(var, candidate, n, v))
                .count()
        });
        values[var] = Some(best);
    }

    values.into_iter().map(|v| v.unwrap_or(0)).collect()
}

/// Index in `0..len` minimising `cost`, ties broken uniformly at random
fn pick_min<R, F>(len: usize, rng: &mut R, mut cost: F) -> usize
where
    R: Rng + ?Sized,
    F: FnMut(usize) -> usize,
{
    let mut best = 0;
    let mut best_cost = usize::MAX;
    let mut ties = 0u32;

    for candidate in 0..len {
        let c = cost(candidate);
        if c < best_cost {
            best = candidate;
            best_cost = c;
            ties = 1;
        } else if c == best_cost {
            // reservoir sampling over equal-cost candidates
            ties += 1;
            if rng.gen_range(0..ties) == 0 {
                best = candidate;
            }
        }
    }

    best
}

/// Current values, per-variable conflict counts and the conflicted set
struct RepairState {
    values: Vec<usize>,
    conflicts: Vec<usize>,
    conflicted: IndexedSet,
}

impl RepairState {
    fn new<V, D, C>(problem: &Problem<'_, V, D, C>, values: Vec<usize>) -> Self
    where
        C: Fn(&V, &D, &V, &D) -> bool,
    {
        let shape = problem.shape();
        let n = shape.len();
        let mut conflicts = vec![0; n];
        let mut conflicted = IndexedSet::with_capacity(n);

        for var in 0..n {
            conflicts[var] = shape
                .neighbors(var)
                .iter()
                .filter(|&&u| !problem.satisfied(var, values[var], u, values[u]))
                .count();
            if conflicts[var] > 0 {
                conflicted.insert(var);
            }
        }

        Self {
            values,
            conflicts,
            conflicted,
        }
    }

    /// Move `var` to its least-conflicted value; returns whether it changed
    fn repair<V, D, C, R>(&mut self, problem: &Problem<'_, V, D, C>, var: usize, rng: &mut R) -> bool
    where
        C: Fn(&V, &D, &V, &D) -> bool,
        R: Rng + ?Sized,
    {
        let shape = problem.shape();
        let neighbors = shape.neighbors(var);
        let values = &self.values;

        let best = pick_min(shape.domain(var).len(), rng, |candidate| {
            neighbors
                .iter()
                .filter(|&&u| !problem.satisfied(var, candidate, u, values[u]))
                .count()
        });

        let old = self.values[var];
        self.values[var] = best;
        let mut own = 0;

        for &u in neighbors {
            let val_u = self.values[u];
            if !problem.satisfied(var, best, u, val_u) {
                own += 1;
            }
            if old == best {
                continue;
            }

            // u's view of the edge changes with var's value
            let was_bad = !problem.satisfied(u, val_u, var, old);
            let is_bad = !problem.satisfied(u, val_u, var, best);
            match (was_bad, is_bad) {
                (false, true) => self.conflicts[u] += 1,
                (true, false) => self.conflicts[u] = self.conflicts[u].saturating_sub(1),
                _ => {}
            }
            self.sync(u);
        }

        self.conflicts[var] = own;
        self.sync(var);
        old != best
    }

    #[inline]
    fn sync(&mut self, var: usize) {
        if self.conflicts[var] > 0 {
            self.conflicted.insert(var);
        } else {
            self.conflicted.remove(var);
        }
    }
}

/// Set of variable indices with O(1) insert, remove and uniform choice
struct IndexedSet {
    items: Vec<usize>,
    slots: Vec<Option<usize>>,
}

impl IndexedSet {
    fn with_capacity(n: usize) -> Self {
        Self {
            items: Vec::with_capacity(n),
            slots: vec![None; n],
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn insert(&mut self, item: usize) {
        if self.slots[item].is_none() {
            self.slots[item] = Some(self.items.len());
            self.items.push(item);
        }
    }

    fn remove(&mut self, item: usize) {
        if let Some(slot) = self.slots[item].take() {
            self.items.swap_remove(slot);
            if let Some(&moved) = self.items.get(slot) {
                self.slots[moved] = Some(slot);
            }
        }
    }

    /// Uniform random member; callers check `is_empty` first
    fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.items[rng.gen_range(0..self.items.len())]
    }
}
