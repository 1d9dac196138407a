//! Antagonist adjacency
//!
//! Two touching plants violate the rule when either one lists the other as an
//! antagonist. The relationship only has to be recorded on one side.

use super::{ConstraintContext, ScoringRule};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AntagonistRule;

impl ScoringRule for AntagonistRule {
    fn name(&self) -> &str {
        "antagonist"
    }

    fn score(&self, ctx: &ConstraintContext<'_>) -> f64 {
        let hostile = ctx.plant_a.is_antagonist_of(&ctx.plant_b.name)
            || ctx.plant_b.is_antagonist_of(&ctx.plant_a.name);

        if hostile && ctx.are_neighbors() {
            0.0
        } else {
            1.0
        }
    }
}
