//! Standalone benchmark runner for the panel solver.

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use bf_bench::{BenchmarkSuite, default_benchmarks, run_scenario};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let crate_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = crate_path
        .parent()
        .and_then(|p| p.parent())
        .ok_or("Could not determine repo root")?
        .to_path_buf();

    let benchmarks = default_benchmarks();
    tracing::info!(count = benchmarks.len(), runs = 3, "running benchmark suite");

    let mut results = Vec::new();
    for (idx, scenario) in benchmarks.iter().enumerate() {
        match run_scenario(scenario, 3) {
            Ok(result) => {
                let agg = &result.aggregate;
                tracing::info!(
                    index = idx + 1,
                    scenario = %scenario.name,
                    median_s = agg.total_time_median_s,
                    steps = agg.steps,
                    cl = agg.cl,
                    cd = agg.cd,
                    warnings = agg.warnings_total,
                    "scenario finished"
                );
                results.push(result);
            }
            Err(e) => {
                tracing::error!(scenario = %scenario.name, error = %e, "scenario failed");
            }
        }
    }

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)?
        .as_secs();
    let baseline_json = serde_json::to_string_pretty(&BenchmarkSuite {
        timestamp: format!("timestamp_{timestamp}"),
        results,
    })?;

    let baseline_dir = repo_root.join("benchmarks");
    fs::create_dir_all(&baseline_dir)?;
    let baseline_path = baseline_dir.join("baseline.json");
    fs::write(&baseline_path, baseline_json)?;
    tracing::info!(path = %baseline_path.display(), "baseline saved");

    Ok(())
}
