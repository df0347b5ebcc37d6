//! AHP triage pipeline: scoring, patient comparison, aggregation and ranking.
//!
//! ## Pipeline
//!
//! 1. Every patient is mapped to a [`ScoreTree`] of subcriterion severities.
//! 2. Criterion and subcriterion weights come from the configured hand-authored matrices.
//!    They are solved once, when the engine is built.
//! 3. For every subcriterion an N x N patient comparison matrix is solved, giving each
//!    patient a local priority.
//! 4. Local priorities are weighted into per-criterion scores, and those into one final
//!    priority per patient.
//! 5. Patients are sorted by final priority, highest first.
//!
//! The engine holds no mutable state, so one instance can serve concurrent callers.

use crate::ahp::{calculate_ahp, AhpResult};
use crate::comparator::local_priorities;
use crate::config::TriageConfig;
use crate::criteria::Criterion;
use crate::observation::PatientObservation;
use crate::scoring::{map_patient_to_scores, ScoreTree};
use crate::TriageResult;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One entry of the triage ranking.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPatient {
    pub patient_id: String,
    pub card_id: String,
    pub patient_name: String,
    pub final_priority: f64,
}

/// Ranked patients, most urgent first.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageOutcome {
    pub ranked_patients: Vec<RankedPatient>,
}

/// Per-patient detail behind a ranking entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientBreakdown {
    pub patient_id: String,
    pub card_id: String,
    pub patient_name: String,
    pub scores: ScoreTree,
    pub criterion_scores: BTreeMap<Criterion, f64>,
    pub final_priority: f64,
}

/// A patient comparison matrix whose consistency ratio reached the threshold.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyWarning {
    pub criterion: Criterion,
    pub subcriterion: &'static str,
    pub consistency_ratio: f64,
}

/// Solved weights of the fixed criteria hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyWeights {
    pub criteria: AhpResult,
    pub subcriteria: BTreeMap<Criterion, AhpResult>,
}

impl HierarchyWeights {
    fn solve(cfg: &TriageConfig) -> Self {
        let criteria = calculate_ahp(&cfg.criteria_matrix);
        log_hierarchy_result("criteria", &criteria);

        let subcriteria = Criterion::ALL
            .into_iter()
            .map(|criterion| {
                let result = calculate_ahp(cfg.subcriteria_matrices.get(criterion));
                log_hierarchy_result(criterion.name(), &result);
                (criterion, result)
            })
            .collect();

        Self {
            criteria,
            subcriteria,
        }
    }

    /// Weight of `criterion` in the final priority.
    pub fn criterion_weight(&self, criterion: Criterion) -> f64 {
        self.criteria.weights[criterion.index()]
    }

    /// Subcriterion weights of `criterion`, ordered like [`Criterion::subcriteria`].
    pub fn subcriterion_weights(&self, criterion: Criterion) -> &[f64] {
        self.subcriteria
            .get(&criterion)
            .map(|result| result.weights.as_slice())
            .unwrap_or(&[])
    }
}

fn log_hierarchy_result(name: &str, result: &AhpResult) {
    tracing::debug!(
        matrix = name,
        weights = ?result.weights,
        lambda_max = result.lambda_max,
        cr = result.cr,
        "hierarchy weights"
    );
    if !result.is_consistent {
        tracing::warn!(matrix = name, cr = result.cr, "hand-authored matrix is inconsistent");
    }
}

/// Full diagnostic output of one triage run.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageReport {
    pub ranked_patients: Vec<RankedPatient>,
    /// Breakdowns in ranking order.
    pub patients: Vec<PatientBreakdown>,
    pub weights: HierarchyWeights,
    pub inconsistent_comparisons: Vec<ConsistencyWarning>,
}

impl From<TriageReport> for TriageOutcome {
    fn from(report: TriageReport) -> Self {
        Self {
            ranked_patients: report.ranked_patients,
        }
    }
}

/// Ranks casualties by AHP composite priority.
#[derive(Clone, Debug)]
pub struct TriageEngine {
    cfg: Arc<TriageConfig>,
    weights: HierarchyWeights,
}

impl Default for TriageEngine {
    fn default() -> Self {
        let cfg = Arc::new(TriageConfig::default());
        let weights = HierarchyWeights::solve(&cfg);
        Self { cfg, weights }
    }
}

impl TriageEngine {
    /// Validates `cfg` and solves the criteria hierarchy.
    ///
    /// # Errors
    ///
    /// Returns any error from [`TriageConfig::validate`].
    pub fn new(cfg: Arc<TriageConfig>) -> TriageResult<Self> {
        cfg.validate()?;
        let weights = HierarchyWeights::solve(&cfg);
        Ok(Self { cfg, weights })
    }

    pub fn weights(&self) -> &HierarchyWeights {
        &self.weights
    }

    /// Date used as "today" for age derivation: the configured date or the current UTC date.
    pub fn reference_date(&self) -> NaiveDate {
        self.cfg
            .reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Ranks `patients`, most urgent first.
    pub fn run(&self, patients: &[PatientObservation]) -> TriageOutcome {
        self.run_detailed(patients).into()
    }

    /// Ranks `patients` and keeps every intermediate score.
    pub fn run_detailed(&self, patients: &[PatientObservation]) -> TriageReport {
        let span = tracing::info_span!("ahp_triage", patients = patients.len());
        let _guard = span.enter();

        let score_trees = score_patients(patients, self.reference_date());

        let mut criterion_scores: Vec<BTreeMap<Criterion, f64>> =
            vec![BTreeMap::new(); patients.len()];
        let mut inconsistent_comparisons = Vec::new();

        if !patients.is_empty() {
            for criterion in Criterion::ALL {
                let sub_weights = self.weights.subcriterion_weights(criterion);
                let per_patient: Vec<Vec<f64>> = score_trees
                    .iter()
                    .map(|tree| tree.criterion_scores(criterion))
                    .collect();

                for (l, (&subcriterion, &sub_weight)) in
                    criterion.subcriteria().iter().zip(sub_weights).enumerate()
                {
                    let column: Vec<f64> = per_patient.iter().map(|scores| scores[l]).collect();
                    let local = local_priorities(&column);
                    tracing::debug!(
                        %criterion,
                        subcriterion,
                        sub_weight,
                        lambda_max = local.lambda_max,
                        cr = local.cr,
                        "patient comparison matrix"
                    );
                    if !local.is_consistent {
                        tracing::warn!(
                            %criterion,
                            subcriterion,
                            cr = local.cr,
                            "patient comparison matrix is inconsistent"
                        );
                        inconsistent_comparisons.push(ConsistencyWarning {
                            criterion,
                            subcriterion,
                            consistency_ratio: local.cr,
                        });
                    }

                    for (scores, priority) in criterion_scores.iter_mut().zip(&local.weights) {
                        *scores.entry(criterion).or_insert(0.0) += priority * sub_weight;
                    }
                }
            }
        }

        let mut breakdowns: Vec<PatientBreakdown> = patients
            .iter()
            .zip(score_trees)
            .zip(criterion_scores)
            .map(|((patient, scores), criterion_scores)| {
                let final_priority = criterion_scores
                    .iter()
                    .map(|(criterion, score)| score * self.weights.criterion_weight(*criterion))
                    .sum();
                PatientBreakdown {
                    patient_id: patient.patient_id().to_string(),
                    card_id: patient.card_id().to_string(),
                    patient_name: patient.patient_name().to_string(),
                    scores,
                    criterion_scores,
                    final_priority,
                }
            })
            .collect();

        rank(&mut breakdowns);

        let ranked_patients = breakdowns
            .iter()
            .map(|b| RankedPatient {
                patient_id: b.patient_id.clone(),
                card_id: b.card_id.clone(),
                patient_name: b.patient_name.clone(),
                final_priority: b.final_priority,
            })
            .collect();

        tracing::info!(
            inconsistent = inconsistent_comparisons.len(),
            "triage ranking complete"
        );

        TriageReport {
            ranked_patients,
            patients: breakdowns,
            weights: self.weights.clone(),
            inconsistent_comparisons,
        }
    }
}

fn score_patients(patients: &[PatientObservation], reference_date: NaiveDate) -> Vec<ScoreTree> {
    patients
        .iter()
        .map(|patient| map_patient_to_scores(patient, reference_date))
        .collect()
}

/// Highest priority first; ties broken by card id, then input order.
fn rank(breakdowns: &mut [PatientBreakdown]) {
    breakdowns.sort_by(|a, b| {
        b.final_priority
            .total_cmp(&a.final_priority)
            .then_with(|| a.card_id.cmp(&b.card_id))
    });
}

/// Ranks `patients` with the default clinical configuration.
pub fn perform_ahp_triage(patients: &[PatientObservation]) -> TriageOutcome {
    TriageEngine::default().run(patients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ahp::ComparisonMatrix;
    use crate::clinical_value::ClinicalValue;
    use crate::observation::PatientInfo;
    use crate::TriageError;
    use serde_json::json;

    fn nominal(card_id: &str) -> PatientObservation {
        serde_json::from_value(json!({
            "_id": format!("id-{card_id}"),
            "cardId": card_id,
            "airwayStatus": "clear_open_spontaneous",
            "breathingRate": 16,
            "breathingSaturation": "95-100",
            "breathingQuality": "normal",
            "chestExcursion": "symmetric",
            "auscultationLungs": "clear",
            "externalBleeding": "none",
            "pulseLocation": "radial",
            "pulseRate": 80,
            "pulseQuality": "strong_regular",
            "capillaryRefillTime": 1.5,
            "skinStatus": "normal",
            "motorSensoryStatus": "intact",
            "gcsTotal": 15,
            "pupilReaction": "equal_reactive",
            "bodyTemperature": 36.8,
            "patientInfo": { "patientName": format!("Casualty {card_id}"), "patientApproximateAge": 30 }
        }))
        .expect("fixture should deserialize")
    }

    fn priority_of(outcome: &TriageOutcome, card_id: &str) -> f64 {
        outcome
            .ranked_patients
            .iter()
            .find(|p| p.card_id == card_id)
            .map(|p| p.final_priority)
            .expect("card should be ranked")
    }

    #[test]
    fn test_empty_input_returns_empty_ranking() {
        let outcome = perform_ahp_triage(&[]);
        assert_eq!(outcome, TriageOutcome::default());

        let report = TriageEngine::default().run_detailed(&[]);
        assert!(report.patients.is_empty());
        assert!(report.inconsistent_comparisons.is_empty());
    }

    #[test]
    fn test_every_patient_is_ranked() {
        let patients: Vec<_> = ["A", "B", "C", "D", "E"].iter().map(|c| nominal(c)).collect();
        let outcome = perform_ahp_triage(&patients);
        assert_eq!(outcome.ranked_patients.len(), patients.len());
    }

    #[test]
    fn test_single_patient_gets_full_priority() {
        let outcome = perform_ahp_triage(&[nominal("solo")]);
        assert_eq!(outcome.ranked_patients.len(), 1);
        assert!((outcome.ranked_patients[0].final_priority - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_priorities_sum_to_one() {
        let mut critical = nominal("B");
        critical.airway_status = Some("partially_obstructed_fluid".into());
        critical.pulse_rate = ClinicalValue::GreaterThan(150.0);
        let patients = vec![nominal("A"), critical, PatientObservation::default()];

        let total: f64 = perform_ahp_triage(&patients)
            .ranked_patients
            .iter()
            .map(|p| p.final_priority)
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_obstructed_airway_ranks_first() {
        let mut obstructed = nominal("A");
        obstructed.airway_status = Some("fully_obstructed".into());
        let clear = nominal("B");

        let outcome = perform_ahp_triage(&[clear, obstructed]);
        assert_eq!(outcome.ranked_patients[0].card_id, "A");
        assert!(
            outcome.ranked_patients[0].final_priority > outcome.ranked_patients[1].final_priority
        );
    }

    #[test]
    fn test_worse_saturation_never_ranks_lower() {
        let mut hypoxic = nominal("hypoxic");
        hypoxic.breathing_saturation = ClinicalValue::parse("<85");
        let stable = nominal("stable");

        let outcome = perform_ahp_triage(&[stable, hypoxic]);
        assert!(priority_of(&outcome, "hypoxic") >= priority_of(&outcome, "stable"));
        assert_eq!(outcome.ranked_patients[0].card_id, "hypoxic");
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let mut bleeding = nominal("2");
        bleeding.external_bleeding = Some("massive_uncontrolled".into());
        let patients = vec![nominal("1"), bleeding, nominal("3")];

        let engine = TriageEngine::default();
        assert_eq!(engine.run(&patients), engine.run(&patients));
    }

    #[test]
    fn test_ties_break_by_card_id() {
        let patients = vec![nominal("C"), nominal("A"), nominal("B")];
        let outcome = perform_ahp_triage(&patients);
        let order: Vec<_> = outcome
            .ranked_patients
            .iter()
            .map(|p| p.card_id.as_str())
            .collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert!(outcome
            .ranked_patients
            .iter()
            .all(|p| (p.final_priority - 1.0 / 3.0).abs() < 1e-9));
        assert_eq!(outcome.ranked_patients[0].patient_id, "id-A");
        assert_eq!(outcome.ranked_patients[0].patient_name, "Casualty A");
    }

    #[test]
    fn test_reference_date_drives_age_from_date_of_birth() {
        let cfg = TriageConfig {
            reference_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            ..Default::default()
        };
        let engine = TriageEngine::new(Arc::new(cfg)).expect("default matrices are valid");

        let mut elderly = nominal("old");
        elderly.patient_info = PatientInfo {
            patient_date_of_birth: Some("1940-05-05".into()),
            ..Default::default()
        };

        let report = engine.run_detailed(&[elderly, nominal("young")]);
        let old = report
            .patients
            .iter()
            .find(|p| p.card_id == "old")
            .expect("ranked");
        assert_eq!(old.scores.reserves.age, 10.0);
        assert_eq!(report.patients[0].card_id, "old");
    }

    #[test]
    fn test_report_exposes_breakdown_and_weights() {
        let mut bleeding = nominal("B");
        bleeding.external_bleeding = Some("massive_uncontrolled".into());
        let report = TriageEngine::default().run_detailed(&[nominal("A"), bleeding]);

        assert_eq!(report.ranked_patients.len(), 2);
        assert_eq!(report.patients[0].card_id, report.ranked_patients[0].card_id);
        assert_eq!(report.patients[0].card_id, "B");
        assert_eq!(report.patients[0].criterion_scores.len(), Criterion::ALL.len());
        assert!(
            report.patients[0].criterion_scores[&Criterion::Circulation]
                > report.patients[1].criterion_scores[&Criterion::Circulation]
        );
        // Airway did not differ, so both share it evenly.
        assert!((report.patients[0].criterion_scores[&Criterion::Airway] - 0.5).abs() < 1e-9);

        assert!(report.weights.criteria.is_consistent);
        assert_eq!(report.weights.subcriteria.len(), Criterion::ALL.len());
        assert!(report.inconsistent_comparisons.is_empty());
    }

    #[test]
    fn test_hierarchy_weights_follow_abcde_order() {
        let engine = TriageEngine::default();
        let weights = engine.weights();
        for pair in Criterion::ALL.windows(2).take(4) {
            assert!(weights.criterion_weight(pair[0]) > weights.criterion_weight(pair[1]));
        }
        for criterion in Criterion::ALL {
            let sub = weights.subcriterion_weights(criterion);
            assert_eq!(sub.len(), criterion.subcriteria().len());
            assert!((sub.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let cfg = TriageConfig {
            criteria_matrix: ComparisonMatrix::from_array(&[[1.0]]),
            ..Default::default()
        };
        let err = TriageEngine::new(Arc::new(cfg)).expect_err("should reject 1x1 criteria");
        assert!(matches!(err, TriageError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_demo_casualties_rank_critical_first() {
        let patients = crate::parse_patients_json(include_str!("../../../demos/casualties.json"))
            .expect("demo file should parse");
        let outcome = perform_ahp_triage(&patients);
        assert_eq!(outcome.ranked_patients.len(), 3);
        assert_eq!(outcome.ranked_patients[0].card_id, "KT-002");
        assert_eq!(outcome.ranked_patients[2].card_id, "KT-001");
        assert_eq!(outcome.ranked_patients[0].patient_id, "6650a1f0c9e77a0012a1b002");
    }

    #[test]
    fn test_outcome_serialises_with_camel_case_keys() {
        let outcome = perform_ahp_triage(&[nominal("A")]);
        let value = serde_json::to_value(&outcome).expect("serialise");
        let first = &value["rankedPatients"][0];
        assert_eq!(first["cardId"], "A");
        assert_eq!(first["patientId"], "id-A");
        assert!(first["finalPriority"].is_number());
    }
}
