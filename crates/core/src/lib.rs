//! # Triage Core
//!
//! Casualty triage ranking using the Analytic Hierarchy Process (AHP).
//!
//! This crate contains the pure triage computation:
//! - Severity scoring of casualty-card observations
//! - AHP weight solving with consistency checks
//! - Patient-to-patient comparison, weighted aggregation and ranking
//!
//! **No I/O concerns**: fetching casualty cards from the record store and rendering the
//! ranking belong to the calling application. The only file access here is loading an
//! optional YAML configuration at startup.

pub mod ahp;
pub mod clinical_value;
pub mod comparator;
pub mod config;
pub mod constants;
pub mod criteria;
pub mod error;
pub mod observation;
pub mod scoring;
pub mod triage;

pub use ahp::{calculate_ahp, AhpResult, ComparisonMatrix};
pub use clinical_value::ClinicalValue;
pub use comparator::compare_scores;
pub use config::TriageConfig;
pub use criteria::Criterion;
pub use error::{TriageError, TriageResult};
pub use observation::{parse_patients_json, PatientInfo, PatientObservation};
pub use scoring::{get_score_from_range, map_patient_to_scores, ScoreTree};
pub use triage::{
    perform_ahp_triage, RankedPatient, TriageEngine, TriageOutcome, TriageReport,
};
