//! Counters for a single local search run

use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStatistics {
    /// Repair steps taken (one conflicted variable revisited per step)
    pub steps: u64,
    /// Steps that actually changed the variable's value
    pub reassignments: u64,
    /// Conflicted variables after the greedy initial assignment
    pub initial_conflicts: usize,
    /// Conflicted variables when the run ended
    pub final_conflicts: usize,
    pub elapsed: Duration,
}

impl SearchStatistics {
    #[inline]
    pub fn on_step(&mut self, changed: bool) {
        self.steps = self.steps.saturating_add(1);
        if changed {
            self.reassignments = self.reassignments.saturating_add(1);
        }
    }
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Min-conflicts statistics:")?;
        writeln!(f, "   Steps:              {}", self.steps)?;
        writeln!(f, "   Reassignments:      {}", self.reassignments)?;
        writeln!(f, "   Initial conflicts:  {}", self.initial_conflicts)?;
        writeln!(f, "   Final conflicts:    {}", self.final_conflicts)?;
        writeln!(f, "   Elapsed:            {:?}", self.elapsed)?;
        Ok(())
    }
}
