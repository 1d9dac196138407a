//! Planner configuration
//!
//! Loaded from a JSON file, with environment variables taking precedence.
//! Every field has a default, so `{}` is a valid config:
//!
//! ```json
//! {
//!   "satisfaction_threshold": 0.75,
//!   "max_iterations": 1000,
//!   "seed": 42,
//!   "time_limit_ms": 2000,
//!   "restarts": 4,
//!   "rules": [
//!     { "rule": "spacing", "weight": 1.0 },
//!     { "rule": "antagonist", "weight": 2.0 },
//!     { "rule": "companion", "weight": 0.5 }
//!   ]
//! }
//! ```

use crate::error::Result;
use crate::rules::BuiltinRule;
use crate::scorer::{WeightedScorer, DEFAULT_SATISFACTION_THRESHOLD};
use crate::solver::{SolveOptions, DEFAULT_MAX_ITERATIONS};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// One rule entry in the config file
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RuleSpec {
    pub rule: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub satisfaction_threshold: f64,
    pub max_iterations: u64,
    pub seed: Option<u64>,
    pub time_limit_ms: Option<u64>,
    /// More than one runs a parallel portfolio of seeded restarts
    pub restarts: usize,
    pub rules: Vec<RuleSpec>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            satisfaction_threshold: DEFAULT_SATISFACTION_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
            time_limit_ms: None,
            restarts: 1,
            rules: vec![
                RuleSpec {
                    rule: "spacing".to_string(),
                    weight: 1.0,
                },
                RuleSpec {
                    rule: "antagonist".to_string(),
                    weight: 1.0,
                },
            ],
        }
    }
}

impl PlannerConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read planner config: {:?}", path))?;

        serde_json::from_str(&contents).with_context(|| "Failed to parse planner config JSON")
    }

    /// Override fields from `PLANNER_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override fields from any key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "PLANNER_THRESHOLD") {
            self.satisfaction_threshold = v;
        }
        if let Some(v) = parse_var(&lookup, "PLANNER_MAX_ITERATIONS") {
            self.max_iterations = v;
        }
        if let Some(v) = parse_var(&lookup, "PLANNER_SEED") {
            self.seed = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "PLANNER_TIME_LIMIT_MS") {
            self.time_limit_ms = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "PLANNER_RESTARTS") {
            self.restarts = v;
        }
    }

    /// Build the weighted rule set named in `rules`
    pub fn build_scorer(&self) -> Result<WeightedScorer> {
        let mut scorer = WeightedScorer::new();
        for entry in &self.rules {
            scorer.register(BuiltinRule::from_name(&entry.rule)?, entry.weight);
        }
        Ok(scorer)
    }

    pub fn solve_options(&self) -> SolveOptions {
        SolveOptions {
            max_iterations: self.max_iterations,
            satisfaction_threshold: self.satisfaction_threshold,
            seed: self.seed,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {}={:?}", key, raw);
            None
        }
    }
}
