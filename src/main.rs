use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triage_core::{TriageConfig, TriageEngine, parse_patients_json};

/// Main entry point for the batch triage runner
///
/// Reads a JSON export of casualty cards, ranks the casualties and writes the ranking to
/// stdout as JSON. Logs go to stderr so the output can be piped.
///
/// # Environment Variables
/// - `TRIAGE_PATIENTS_FILE`: JSON array of casualty-card observations (required)
/// - `TRIAGE_CONFIG`: YAML file overriding the comparison matrices (optional)
/// - `TRIAGE_DETAILED`: set to "true" to print the full report with score breakdowns
/// - `RUST_LOG`: tracing filter (default adds "triage_core=info")
///
/// # Returns
/// * `Ok(())` - If the ranking was written
/// * `Err(anyhow::Error)` - If configuration or the patient file cannot be loaded
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let patients_file: PathBuf = std::env::var("TRIAGE_PATIENTS_FILE")
        .context("TRIAGE_PATIENTS_FILE must point to a JSON array of casualty cards")?
        .into();
    let config_path = std::env::var("TRIAGE_CONFIG").ok().map(PathBuf::from);
    let detailed = std::env::var("TRIAGE_DETAILED").unwrap_or_else(|_| "false".into()) == "true";

    tracing::info!("++ Ranking casualties from {}", patients_file.display());

    let cfg = TriageConfig::resolve(config_path.as_deref())?;
    let engine = TriageEngine::new(Arc::new(cfg))?;

    let text = std::fs::read_to_string(&patients_file)
        .with_context(|| format!("failed to read {}", patients_file.display()))?;
    let patients = parse_patients_json(&text)?;

    let report = engine.run_detailed(&patients);
    if detailed {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let outcome: triage_core::TriageOutcome = report.into();
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    Ok(())
}
