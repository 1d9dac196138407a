//! Sunlight compatibility
//!
//! Touching plants with different recorded sun requirements (e.g. "full" next
//! to "partial") violate the rule. Plants without a recorded requirement fit
//! anywhere. Comparison ignores case and surrounding whitespace.

use super::{ConstraintContext, ScoringRule};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SunlightRule;

impl ScoringRule for SunlightRule {
    fn name(&self) -> &str {
        "sunlight"
    }

    fn score(&self, ctx: &ConstraintContext<'_>) -> f64 {
        let (Some(sun_a), Some(sun_b)) = (
            ctx.plant_a.sun_requirements.as_deref(),
            ctx.plant_b.sun_requirements.as_deref(),
        ) else {
            return 1.0;
        };

        if ctx.are_neighbors() && !sun_a.trim().eq_ignore_ascii_case(sun_b.trim()) {
            0.0
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{a, setup};

    #[test]
    fn test_mismatched_sun_neighbors_violate() {
        let (cells, catalog) = setup();
        let tomato = catalog.get("Tomato").unwrap();
        let lettuce = catalog.get("Lettuce").unwrap();
        let ctx = ConstraintContext::new(tomato, lettuce, a(1, 1), a(0, 0), &cells, &catalog);
        assert_eq!(SunlightRule.score(&ctx), 0.0);

        let ctx = ConstraintContext::new(tomato, lettuce, a(0, 0), a(2, 2), &cells, &catalog);
        assert_eq!(SunlightRule.score(&ctx), 1.0);
    }

    #[test]
    fn test_matching_or_unknown_sun_satisfies() {
        let (cells, catalog) = setup();
        let tomato = catalog.get("Tomato").unwrap();
        let basil = catalog.get("Basil").unwrap();
        let mint = catalog.get("Mint").unwrap();

        let ctx = ConstraintContext::new(tomato, basil, a(0, 0), a(0, 1), &cells, &catalog);
        assert_eq!(SunlightRule.score(&ctx), 1.0);

        let ctx = ConstraintContext::new(tomato, mint, a(0, 0), a(0, 1), &cells, &catalog);
        assert_eq!(SunlightRule.score(&ctx), 1.0);
    }
}
