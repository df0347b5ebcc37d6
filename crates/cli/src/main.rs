use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use triage_core::{
    map_patient_to_scores, parse_patients_json, Criterion, PatientObservation, TriageConfig,
    TriageEngine,
};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "AHP casualty triage CLI")]
struct Cli {
    /// YAML file overriding the default comparison matrices
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank casualties, most urgent first
    Rank {
        /// JSON array of casualty-card observations
        patients_file: PathBuf,
        /// Print the full report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show each casualty's subcriterion severity scores
    Scores {
        /// JSON array of casualty-card observations
        patients_file: PathBuf,
    },
    /// Show criterion and subcriterion weights with consistency ratios
    Weights,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = TriageConfig::resolve(cli.config.as_deref())?;
    let engine = TriageEngine::new(Arc::new(cfg))?;

    match cli.command {
        Some(Commands::Rank {
            patients_file,
            json,
        }) => {
            let patients = read_patients(&patients_file)?;
            let report = engine.run_detailed(&patients);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.ranked_patients.is_empty() {
                println!("No patients found.");
            } else {
                println!("{:>4}  {:<12} {:<28} {:>10}", "#", "Card", "Name", "Priority");
                for (rank, patient) in report.ranked_patients.iter().enumerate() {
                    println!(
                        "{:>4}  {:<12} {:<28} {:>10.4}",
                        rank + 1,
                        patient.card_id,
                        patient.patient_name,
                        patient.final_priority
                    );
                }
                for warning in &report.inconsistent_comparisons {
                    println!(
                        "note: {}/{} comparison CR = {:.3}",
                        warning.criterion, warning.subcriterion, warning.consistency_ratio
                    );
                }
            }
        }
        Some(Commands::Scores { patients_file }) => {
            let patients = read_patients(&patients_file)?;
            let reference_date = engine.reference_date();
            for patient in &patients {
                let scores = map_patient_to_scores(patient, reference_date);
                println!("Card {} ({})", patient.card_id(), patient.patient_name());
                let readings: Vec<String> = [
                    ("rr", patient.breathing_rate),
                    ("spo2", patient.breathing_saturation),
                    ("hr", patient.pulse_rate),
                    ("crt", patient.capillary_refill_time),
                    ("gcs", patient.gcs_total),
                    ("temp", patient.body_temperature),
                ]
                .into_iter()
                .filter(|(_, value)| !value.is_unknown())
                .map(|(label, value)| format!("{label}={value}"))
                .collect();
                if !readings.is_empty() {
                    println!("  {:<12} {}", "readings", readings.join(" "));
                }
                for criterion in Criterion::ALL {
                    let values = scores.criterion_scores(criterion);
                    let cells: Vec<String> = criterion
                        .subcriteria()
                        .iter()
                        .zip(values)
                        .map(|(name, value)| format!("{name}={value:.2}"))
                        .collect();
                    println!("  {:<12} {}", criterion.name(), cells.join(" "));
                }
            }
        }
        Some(Commands::Weights) => {
            let weights = engine.weights();
            let criteria = &weights.criteria;
            println!(
                "criteria  lambda_max={:.4} CI={:.4} CR={:.4} consistent={}",
                criteria.lambda_max, criteria.ci, criteria.cr, criteria.is_consistent
            );
            for criterion in Criterion::ALL {
                println!(
                    "  {:<12} {:.4}",
                    criterion.name(),
                    weights.criterion_weight(criterion)
                );
                if let Some(sub) = weights.subcriteria.get(&criterion) {
                    for (name, weight) in criterion.subcriteria().iter().zip(&sub.weights) {
                        println!("      {:<18} {:.4}", name, weight);
                    }
                    println!("      (CR={:.4})", sub.cr);
                }
            }
        }
        None => {
            println!("Use 'triage --help' for commands");
        }
    }

    Ok(())
}

fn read_patients(path: &Path) -> anyhow::Result<Vec<PatientObservation>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(parse_patients_json(&text)?)
}
