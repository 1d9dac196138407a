//! Same-species spacing
//!
//! A species with `min_spacing > 1` may not be planted in two touching cells.
//! Different species, or species happy at spacing 1, are always fine.

use super::{ConstraintContext, ScoringRule};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpacingRule;

impl ScoringRule for SpacingRule {
    fn name(&self) -> &str {
        "spacing"
    }

    fn score(&self, ctx: &ConstraintContext<'_>) -> f64 {
        if ctx.same_species() && ctx.plant_a.min_spacing > 1 && ctx.are_neighbors() {
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
    fn test_same_species_neighbors_with_spacing_violate() {
        let (cells, catalog) = setup();
        let tomato = catalog.get("Tomato").unwrap();
        let ctx = ConstraintContext::new(tomato, tomato, a(0, 0), a(0, 1), &cells, &catalog);
        assert_eq!(SpacingRule.score(&ctx), 0.0);

        // diagonal counts as touching
        let ctx = ConstraintContext::new(tomato, tomato, a(1, 1), a(2, 2), &cells, &catalog);
        assert_eq!(SpacingRule.score(&ctx), 0.0);
    }

    #[test]
    fn test_spacing_of_one_allows_neighbors() {
        let (cells, catalog) = setup();
        let basil = catalog.get("Basil").unwrap();
        let ctx = ConstraintContext::new(basil, basil, a(0, 0), a(0, 1), &cells, &catalog);
        assert_eq!(SpacingRule.score(&ctx), 1.0);
    }

    #[test]
    fn test_non_neighbors_always_satisfy() {
        let (cells, catalog) = setup();
        let tomato = catalog.get("Tomato").unwrap();
        let ctx = ConstraintContext::new(tomato, tomato, a(0, 0), a(2, 2), &cells, &catalog);
        assert_eq!(SpacingRule.score(&ctx), 1.0);

        // different beds never touch
        let ctx = ConstraintContext::new(tomato, tomato, a(0, 2), 9, &cells, &catalog);
        assert_eq!(SpacingRule.score(&ctx), 1.0);
    }

    #[test]
    fn test_different_species_satisfy() {
        let (cells, catalog) = setup();
        let tomato = catalog.get("Tomato").unwrap();
        let basil = catalog.get("Basil").unwrap();
        let ctx = ConstraintContext::new(tomato, basil, a(0, 0), a(0, 1), &cells, &catalog);
        assert_eq!(SpacingRule.score(&ctx), 1.0);
    }
}
