//! End-to-end tests: build beds and a catalog, solve, check the placement

use approx::assert_relative_eq;
use bed_planner::rules::{AntagonistRule, CompanionRule, SpacingRule};
use bed_planner::{
    BuiltinRule, CellIndex, ConstraintContext, GardenBedConfig, Plant, PlannerConfig, PlantCatalog,
    PlantingInput, PlantingSolver, Rule, ScoringRule, SolveOptions, SolveStatus, WeightedScorer,
};
use std::io::Write;
use std::sync::atomic::AtomicBool;

fn kitchen_catalog() -> PlantCatalog {
    PlantCatalog::new(vec![
        Plant::new("Tomato", 2)
            .with_sun("full")
            .with_companions(["Basil"])
            .with_antagonists(["Fennel"]),
        Plant::new("Basil", 1).with_sun("full"),
        Plant::new("Fennel", 1).with_sun("full"),
        Plant::new("Lettuce", 1).with_sun("partial"),
        Plant::new("Carrot", 1).with_sun("full"),
    ])
    .unwrap()
}

fn kitchen_beds() -> Vec<GardenBedConfig> {
    vec![
        GardenBedConfig::new("north", 4),
        GardenBedConfig::new("south", 3),
        GardenBedConfig::new("pot", 1),
    ]
}

/// Rule that always returns a fixed score
struct Fixed(f64);

impl ScoringRule for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    fn score(&self, _ctx: &ConstraintContext<'_>) -> f64 {
        self.0
    }
}

#[test]
fn test_solutions_cover_every_cell_without_violations() {
    let catalog = kitchen_catalog();
    let beds = kitchen_beds();
    let solver = PlantingSolver::new(&beds, &catalog).unwrap();

    let mut solved = 0;
    for seed in 0..20 {
        let report = solver
            .solve_with(&SolveOptions::new(2_000, 1.0).with_seed(seed))
            .unwrap();
        let Some(solution) = report.solution else {
            continue;
        };
        solved += 1;

        assert_eq!(solution.len(), 16 + 9 + 1);
        for bed in &beds {
            for row in 0..bed.grid_size {
                for col in 0..bed.grid_size {
                    let plant = solution.plant_at(&bed.id, row, col).unwrap();
                    assert!(catalog.contains(plant));
                }
            }
        }
        assert!(solver.violations(&solution, 1.0).is_empty());
    }

    // five plants and only one spaced species: this instance is easy
    assert!(solved > 0);
}

#[test]
fn test_neighbors_are_symmetric_and_bed_local() {
    let cells = CellIndex::build(&kitchen_beds()).unwrap();

    for a in 0..cells.len() {
        let neighbors = cells.neighbors(a);
        assert!(neighbors.len() <= 8);
        assert!(!neighbors.contains(&a));
        for &b in neighbors {
            assert!(cells.neighbors(b).contains(&a));
            assert_eq!(cells.cell(a).bed_id, cells.cell(b).bed_id);
        }
    }

    let pot = cells.cell_id("pot", 0, 0).unwrap();
    assert!(cells.neighbor_ids(&pot).is_empty());
    assert!(cells.cell_id("pot", 1, 0).is_err());
}

#[test]
fn test_spacing_and_antagonist_scores() {
    let catalog = kitchen_catalog();
    let cells = CellIndex::build(&[GardenBedConfig::new("bed", 3)]).unwrap();
    let tomato = catalog.get("Tomato").unwrap();
    let fennel = catalog.get("Fennel").unwrap();
    let basil = catalog.get("Basil").unwrap();

    // (0,0) touches (1,1); (0,0) does not touch (2,2)
    let touching = ConstraintContext::new(tomato, tomato, 0, 4, &cells, &catalog);
    let apart = ConstraintContext::new(tomato, tomato, 0, 8, &cells, &catalog);
    assert_relative_eq!(SpacingRule.score(&touching), 0.0);
    assert_relative_eq!(SpacingRule.score(&apart), 1.0);

    let hostile = ConstraintContext::new(fennel, tomato, 0, 1, &cells, &catalog);
    let friendly = ConstraintContext::new(basil, tomato, 0, 1, &cells, &catalog);
    assert_relative_eq!(AntagonistRule.score(&hostile), 0.0);
    assert_relative_eq!(AntagonistRule.score(&friendly), 1.0);
    assert_relative_eq!(CompanionRule::default().score(&friendly), 1.0);
}

#[test]
fn test_weighted_mean_and_threshold_monotonicity() {
    let catalog = kitchen_catalog();
    let cells = CellIndex::build(&[GardenBedConfig::new("bed", 2)]).unwrap();
    let basil = catalog.get("Basil").unwrap();
    let ctx = ConstraintContext::new(basil, basil, 0, 1, &cells, &catalog);

    let mut scorer = WeightedScorer::new();
    scorer.register(Rule::custom(Fixed(1.0)), 3.0);
    scorer.register(Rule::custom(Fixed(0.0)), 1.0);
    scorer.register(Rule::custom(Fixed(0.0)), 0.0);
    assert_relative_eq!(scorer.score(&ctx), 0.75);

    let mut satisfied = true;
    for step in 0..=20 {
        let threshold = f64::from(step) / 20.0;
        let now = scorer.is_satisfied(&ctx, threshold);
        // once unsatisfied, raising the threshold never satisfies again
        assert!(satisfied || !now);
        satisfied = now;
    }
    assert!(scorer.is_satisfied(&ctx, 0.75));
    assert!(!scorer.is_satisfied(&ctx, 0.76));
}

#[test]
fn test_no_rules_is_vacuously_satisfied() {
    let catalog = kitchen_catalog();
    let solver =
        PlantingSolver::with_scorer(&kitchen_beds(), &catalog, WeightedScorer::new()).unwrap();

    let report = solver
        .solve_with(&SolveOptions::new(0, 1.0).with_seed(5))
        .unwrap();
    assert_eq!(report.status, SolveStatus::Solved);
    assert_eq!(report.statistics.steps, 0);
}

#[test]
fn test_zero_threshold_accepts_everything() {
    let catalog = PlantCatalog::new(vec![
        Plant::new("Tomato", 3).with_antagonists(["Fennel"]),
        Plant::new("Fennel", 3),
    ])
    .unwrap();
    let solver = PlantingSolver::new(&[GardenBedConfig::new("bed", 3)], &catalog).unwrap();

    assert!(solver.solve(1, 1.0).is_none());
    assert!(solver.solve(1, 0.0).is_some());
}

#[test]
fn test_exhaustion_returns_none() {
    // two mutually hostile plants, both needing spacing: no 2x2 layout works
    let catalog = PlantCatalog::new(vec![
        Plant::new("Walnut", 2).with_antagonists(["Apple"]),
        Plant::new("Apple", 2).with_antagonists(["Walnut"]),
    ])
    .unwrap();
    let solver = PlantingSolver::new(&[GardenBedConfig::new("orchard", 2)], &catalog).unwrap();

    for seed in 0..5 {
        let report = solver
            .solve_with(&SolveOptions::new(300, 0.75).with_seed(seed))
            .unwrap();
        assert_eq!(report.status, SolveStatus::Exhausted);
        assert!(report.solution.is_none());
        assert!(report.statistics.final_conflicts > 0);
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let catalog = kitchen_catalog();
    let beds = kitchen_beds();
    let solver = PlantingSolver::new(&beds, &catalog).unwrap();
    let options = SolveOptions::new(2_000, 1.0).with_seed(1234);

    let first = solver.solve_with(&options).unwrap();
    let second = solver.solve_with(&options).unwrap();
    assert_eq!(first.status, second.status);
    assert_eq!(first.solution, second.solution);
    assert_eq!(first.statistics.steps, second.statistics.steps);
}

#[test]
fn test_cancelled_solve_reports_interrupted() {
    let catalog = PlantCatalog::new(vec![
        Plant::new("Walnut", 2).with_antagonists(["Apple"]),
        Plant::new("Apple", 2),
    ])
    .unwrap();
    let solver = PlantingSolver::new(&[GardenBedConfig::new("orchard", 5)], &catalog).unwrap();
    let cancel = AtomicBool::new(true);

    let report = solver
        .solve_cancellable(&SolveOptions::new(1_000_000, 1.0), &cancel)
        .unwrap();
    assert_eq!(report.status, SolveStatus::Interrupted);
    assert!(report.solution.is_none());
}

#[test]
fn test_concurrent_solves_share_one_solver() {
    let catalog = kitchen_catalog();
    let beds = kitchen_beds();
    let solver = PlantingSolver::new(&beds, &catalog).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4u64)
            .map(|seed| {
                let solver = &solver;
                scope.spawn(move || {
                    solver
                        .solve_with(&SolveOptions::new(2_000, 1.0).with_seed(seed))
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            let report = handle.join().unwrap();
            if let Some(solution) = report.solution {
                assert!(solver.violations(&solution, 1.0).is_empty());
            }
        }
    });
}

#[test]
fn test_config_driven_solve_from_files() {
    let dir = std::env::temp_dir().join(format!("bed_planner_it_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let input_path = dir.join("input.json");
    let mut input = std::fs::File::create(&input_path).unwrap();
    write!(
        input,
        r#"{{
            "beds": [{{"id": "raised", "gridSize": 3}}],
            "plants": [
                {{"name": "Tomato", "minSpacing": 2, "sunRequirements": "full",
                  "companions": ["Basil"], "antagonists": ["Fennel"], "family": "Solanaceae"}},
                {{"name": "Basil", "sunRequirements": "full"}},
                {{"name": "Fennel", "sunRequirements": "full"}}
            ]
        }}"#
    )
    .unwrap();

    let config_path = dir.join("config.json");
    std::fs::write(
        &config_path,
        r#"{"seed": 11, "max_iterations": 2000, "restarts": 3,
            "rules": [{"rule": "spacing"}, {"rule": "antagonist", "weight": 2.0}, {"rule": "sunlight"}]}"#,
    )
    .unwrap();

    let (beds, catalog) = PlantingInput::load(&input_path)
        .unwrap()
        .into_parts()
        .unwrap();
    assert_eq!(
        catalog.get("Tomato").unwrap().extension::<String>("family"),
        Some("Solanaceae".to_string())
    );

    let config = PlannerConfig::load(&config_path).unwrap();
    let scorer = config.build_scorer().unwrap();
    assert!(matches!(
        scorer.rules()[2].rule,
        Rule::Builtin(BuiltinRule::Sunlight(_))
    ));

    let solver = PlantingSolver::with_scorer(&beds, &catalog, scorer).unwrap();
    let report = solver
        .solve_portfolio(&config.solve_options(), config.restarts)
        .unwrap();
    assert!((11..14).contains(&report.seed));
    if let Some(solution) = &report.solution {
        assert!(solver.violations(solution, config.satisfaction_threshold).is_empty());
    }

    std::fs::remove_dir_all(&dir).ok();
}
