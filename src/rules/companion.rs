//! Companion preference
//!
//! Soft rule: touching plants that list each other (on either side) as
//! companions score `1.0`, touching plants with no companion relationship get
//! `neutral_score`. Same-species pairs and non-neighbors are not affected.
//!
//! Not registered by default. Its value is in combination with a threshold
//! below `1.0`, where it tips otherwise borderline pairs.

use super::{ConstraintContext, ScoringRule};

const DEFAULT_NEUTRAL_SCORE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompanionRule {
    pub neutral_score: f64,
}

impl CompanionRule {
    pub fn with_neutral_score(neutral_score: f64) -> Self {
        Self {
            neutral_score: neutral_score.clamp(0.0, 1.0),
        }
    }
}

impl Default for CompanionRule {
    fn default() -> Self {
        Self {
            neutral_score: DEFAULT_NEUTRAL_SCORE,
        }
    }
}

impl ScoringRule for CompanionRule {
    fn name(&self) -> &str {
        "companion"
    }

    fn score(&self, ctx: &ConstraintContext<'_>) -> f64 {
        if ctx.same_species() || !ctx.are_neighbors() {
            return 1.0;
        }

        let friendly = ctx.plant_a.is_companion_of(&ctx.plant_b.name)
            || ctx.plant_b.is_companion_of(&ctx.plant_a.name);

        if friendly {
            1.0
        } else {
            self.neutral_score
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{a, setup};
    use approx::assert_relative_eq;

    #[test]
    fn test_companions_score_full() {
        let (cells, catalog) = setup();
        let tomato = catalog.get("Tomato").unwrap();
        let basil = catalog.get("Basil").unwrap();
        let ctx = ConstraintContext::new(basil, tomato, a(0, 0), a(0, 1), &cells, &catalog);
        assert_relative_eq!(CompanionRule::default().score(&ctx), 1.0);
    }

    #[test]
    fn test_unrelated_neighbors_score_neutral() {
        let (cells, catalog) = setup();
        let lettuce = catalog.get("Lettuce").unwrap();
        let mint = catalog.get("Mint").unwrap();
        let ctx = ConstraintContext::new(lettuce, mint, a(0, 0), a(0, 1), &cells, &catalog);
        assert_relative_eq!(CompanionRule::default().score(&ctx), 0.5);
        assert_relative_eq!(CompanionRule::with_neutral_score(0.8).score(&ctx), 0.8);
        assert_relative_eq!(CompanionRule::with_neutral_score(3.0).score(&ctx), 1.0);
    }

    #[test]
    fn test_unrelated_non_neighbors_unaffected() {
        let (cells, catalog) = setup();
        let lettuce = catalog.get("Lettuce").unwrap();
        let mint = catalog.get("Mint").unwrap();
        let ctx = ConstraintContext::new(lettuce, mint, a(0, 0), a(2, 2), &cells, &catalog);
        assert_relative_eq!(CompanionRule::default().score(&ctx), 1.0);
    }
}
