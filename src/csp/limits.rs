//! Search budgets: step count, wall-clock deadline and an interrupt flag
//!
//! The step budget always applies. The deadline and interrupt flag are
//! optional exits for long runs; the clock is only read every
//! `clock_check_mask + 1` steps to keep the inner loop cheap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Reason a run stopped before its step budget or a solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    Interrupted,
    TimedOut,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchLimits<'a> {
    pub max_steps: u64,
    pub deadline: Option<Instant>,
    pub interrupt: Option<&'a AtomicBool>,
    pub clock_check_mask: u64,
}

impl<'a> SearchLimits<'a> {
    /// Checks the clock every 1024 steps
    pub const DEFAULT_CLOCK_CHECK_MASK: u64 = 0x03FF;

    pub fn steps(max_steps: u64) -> Self {
        Self {
            max_steps,
            deadline: None,
            interrupt: None,
            clock_check_mask: Self::DEFAULT_CLOCK_CHECK_MASK,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_time_limit(self, limit: Duration) -> Self {
        self.with_deadline(Instant::now() + limit)
    }

    pub fn with_interrupt(mut self, flag: &'a AtomicBool) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn with_clock_check_mask(mut self, mask: u64) -> Self {
        self.clock_check_mask = mask;
        self
    }

    /// `Some` when the run must stop before `step`
    #[inline]
    pub fn check(&self, step: u64) -> Option<Stop> {
        if let Some(flag) = self.interrupt {
            if flag.load(Ordering::Relaxed) {
                return Some(Stop::Interrupted);
            }
        }

        if let Some(deadline) = self.deadline {
            if step & self.clock_check_mask == 0 && Instant::now() >= deadline {
                return Some(Stop::TimedOut);
            }
        }

        None
    }
}
