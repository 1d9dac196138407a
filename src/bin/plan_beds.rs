// Bed planner CLI
//
// Usage: plan_beds <input.json> [config.json]
//
// The input holds `beds` and `plants`; the optional config sets threshold,
// budget, seed, restarts and rules. PLANNER_* environment variables override
// both. Prints the solution as JSON followed by a grid per bed.

use anyhow::Context;
use bed_planner::{PlannerConfig, PlantingInput, PlantingSolver, SolveStatus};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bed_planner=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let input_path: PathBuf = args
        .next()
        .context("usage: plan_beds <input.json> [config.json]")?
        .into();
    let config_path: Option<PathBuf> = args.next().map(PathBuf::from);

    let mut config = match &config_path {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    config.apply_env_overrides();

    tracing::info!("Configuration:");
    tracing::info!("  threshold: {}", config.satisfaction_threshold);
    tracing::info!("  max_iterations: {}", config.max_iterations);
    tracing::info!("  restarts: {}", config.restarts);

    let input = PlantingInput::load(&input_path)?;
    let (beds, catalog) = input.into_parts()?;

    let scorer = config.build_scorer()?;
    let solver = PlantingSolver::with_scorer(&beds, &catalog, scorer)?;
    let options = config.solve_options();

    let report = if config.restarts > 1 {
        solver.solve_portfolio(&options, config.restarts)?
    } else {
        solver.solve_with(&options)?
    };

    eprintln!("{}", report.statistics);

    let Some(solution) = report.solution else {
        tracing::warn!("No placement found ({:?}, seed {})", report.status, report.seed);
        println!("null");
        std::process::exit(match report.status {
            SolveStatus::TimedOut | SolveStatus::Interrupted => 3,
            _ => 2,
        });
    };

    println!("{}", serde_json::to_string_pretty(&solution)?);

    for bed in &beds {
        println!("\n{} ({}x{})", bed.id, bed.grid_size, bed.grid_size);
        for row in solution.grid(&bed.id, bed.grid_size) {
            let cells: Vec<&str> = row.iter().map(|p| p.unwrap_or("Empty")).collect();
            println!("  {}", cells.join(" | "));
        }
    }

    Ok(())
}
