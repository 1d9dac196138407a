//! Weighted Scorer - combines registered rules into one pairwise verdict
//!
//! Each rule contributes `score * weight`; the aggregate is normalised by the
//! total positive weight:
//!
//! ```text
//! score = Σ(rule.score(ctx) · weight) / Σ(weight)    over rules with weight > 0
//! ```
//!
//! With no positively weighted rule the pair is vacuously satisfied (`1.0`).
//!
//! The search engine only understands hard constraints, so `Predicate` turns
//! the aggregate into `score >= threshold`. The magnitude of a violation is
//! lost at that point: the search sees satisfied or not, never how badly.

use crate::cells::{CellId, CellIndex};
use crate::data::PlantCatalog;
use crate::rules::{AntagonistRule, BuiltinRule, ConstraintContext, Rule, ScoringRule, SpacingRule};
use serde::Serialize;

/// Threshold used when the caller does not choose one
pub const DEFAULT_SATISFACTION_THRESHOLD: f64 = 0.75;

/// A rule together with its aggregation weight
#[derive(Debug)]
pub struct WeightedRule {
    pub rule: Rule,
    pub weight: f64,
}

impl WeightedRule {
    /// Only finite, strictly positive weights take part in aggregation
    pub fn is_active(&self) -> bool {
        self.weight.is_finite() && self.weight > 0.0
    }
}

/// Per-rule contribution to one pair's aggregate score
#[derive(Debug, Clone, Serialize)]
pub struct RuleScore {
    pub name: String,
    pub score: f64,
    pub weight: f64,
    /// False when the weight excluded this rule from the aggregate
    pub active: bool,
}

/// Aggregate score plus the per-rule numbers behind it
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub overall: f64,
    pub rules: Vec<RuleScore>,
}

/// Ordered collection of weighted rules
#[derive(Debug, Default)]
pub struct WeightedScorer {
    rules: Vec<WeightedRule>,
}

impl WeightedScorer {
    /// Scorer with no rules; every pair is vacuously satisfied
    pub fn new() -> Self {
        Self::default()
    }

    /// Spacing and antagonist rules, weight 1.0 each
    pub fn with_default_rules() -> Self {
        let mut scorer = Self::new();
        scorer
            .register(BuiltinRule::Spacing(SpacingRule), 1.0)
            .register(BuiltinRule::Antagonist(AntagonistRule), 1.0);
        scorer
    }

    /// Add a rule
    ///
    /// A weight `<= 0` (or non-finite) is accepted but the rule is left out of
    /// aggregation, since it cannot move a weighted average.
    pub fn register(&mut self, rule: impl Into<Rule>, weight: f64) -> &mut Self {
        let entry = WeightedRule {
            rule: rule.into(),
            weight,
        };

        if !entry.is_active() {
            tracing::warn!(
                "Rule '{}' registered with non-positive weight {}; it will not affect scoring",
                entry.rule.name(),
                weight
            );
        }

        self.rules.push(entry);
        self
    }

    pub fn rules(&self) -> &[WeightedRule] {
        &self.rules
    }

    /// Sum of weights over rules that take part in aggregation
    pub fn active_weight(&self) -> f64 {
        self.rules
            .iter()
            .filter(|r| r.is_active())
            .map(|r| r.weight)
            .sum()
    }

    /// Normalised weighted score for one pair
    pub fn score(&self, ctx: &ConstraintContext<'_>) -> f64 {
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for entry in self.rules.iter().filter(|r| r.is_active()) {
            weighted_sum += entry.rule.score(ctx).clamp(0.0, 1.0) * entry.weight;
            total_weight += entry.weight;
        }

        if total_weight > 0.0 {
            weighted_sum / total_weight
        } else {
            1.0
        }
    }

    /// Like `score`, but keeps every rule's individual result
    pub fn breakdown(&self, ctx: &ConstraintContext<'_>) -> ScoreBreakdown {
        let rules = self
            .rules
            .iter()
            .map(|entry| RuleScore {
                name: entry.rule.name().to_string(),
                score: entry.rule.score(ctx).clamp(0.0, 1.0),
                weight: entry.weight,
                active: entry.is_active(),
            })
            .collect();

        ScoreBreakdown {
            overall: self.score(ctx),
            rules,
        }
    }

    pub fn is_satisfied(&self, ctx: &ConstraintContext<'_>, threshold: f64) -> bool {
        self.score(ctx) >= threshold
    }

    /// Bind this rule set to a cell index, catalog and threshold
    pub fn predicate<'a>(
        &'a self,
        cells: &'a CellIndex,
        catalog: &'a PlantCatalog,
        threshold: f64,
    ) -> Predicate<'a> {
        Predicate {
            scorer: self,
            cells,
            catalog,
            threshold,
        }
    }
}

/// Binary pairwise constraint handed to the search engine
#[derive(Debug, Clone, Copy)]
pub struct Predicate<'a> {
    scorer: &'a WeightedScorer,
    cells: &'a CellIndex,
    catalog: &'a PlantCatalog,
    threshold: f64,
}

impl<'a> Predicate<'a> {
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether `plant_a` in `cell_a` and `plant_b` in `cell_b` are compatible
    ///
    /// Unknown plant names or cells are logged and treated as a violation, so a
    /// single bad pairing cannot abort a running search.
    pub fn check(&self, cell_a: &CellId, plant_a: &str, cell_b: &CellId, plant_b: &str) -> bool {
        let (Some(pos_a), Some(pos_b)) = (self.cells.position_of(cell_a), self.cells.position_of(cell_b))
        else {
            tracing::warn!("Unknown cell in pair {} / {}; treating as violated", cell_a, cell_b);
            return false;
        };

        self.check_positions(pos_a, plant_a, pos_b, plant_b)
    }

    /// `check` for cells already resolved to positions
    pub fn check_positions(&self, pos_a: usize, plant_a: &str, pos_b: usize, plant_b: &str) -> bool {
        let (Some(a), Some(b)) = (self.catalog.get(plant_a), self.catalog.get(plant_b)) else {
            tracing::warn!(
                "Plant lookup failed for pair ({}, {}); treating as violated",
                plant_a,
                plant_b
            );
            return false;
        };

        let ctx = ConstraintContext::new(a, b, pos_a, pos_b, self.cells, self.catalog);
        self.scorer.is_satisfied(&ctx, self.threshold)
    }
}
