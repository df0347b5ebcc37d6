//! Severity scoring of clinical observations.
//!
//! Every observation maps to a score where 1 means clinically normal and
//! [`MAX_SCORE`] means most severe. Missing or unreadable data never fails: it scores at the
//! neutral midpoint so unknown patients are neither ignored nor over-triaged.

use crate::clinical_value::ClinicalValue;
use crate::constants::{
    BREATHING_RATE_NORMAL, CAPILLARY_REFILL_NORMAL, DEFAULT_AGE_YEARS, EXACT_DEVIATION_FACTOR,
    MAX_SCORE, NORMAL_SCORE, PULSE_RATE_NORMAL, SATURATION_NORMAL, TEMPERATURE_NORMAL,
    UNKNOWN_CATEGORY_SCORE,
};
use crate::criteria::Criterion;
use crate::observation::{PatientInfo, PatientObservation};
use chrono::{DateTime, Datelike, NaiveDate};
use serde::Serialize;

// ============================================================================
// CATEGORICAL TABLES
// ============================================================================

/// Lookup table from a recorded category token to a severity score.
#[derive(Debug)]
pub struct CategoricalTable {
    pub name: &'static str,
    entries: &'static [(&'static str, f64)],
}

impl CategoricalTable {
    /// Scores `value`, using [`UNKNOWN_CATEGORY_SCORE`] for missing or unlisted tokens.
    ///
    /// Tokens are compared case-insensitively with spaces and hyphens treated as underscores.
    pub fn score(&self, value: Option<&str>) -> f64 {
        let Some(token) = value.map(normalise_token).filter(|t| !t.is_empty()) else {
            return UNKNOWN_CATEGORY_SCORE;
        };
        match self.entries.iter().find(|(key, _)| *key == token) {
            Some((_, score)) => *score,
            None => {
                tracing::trace!(table = self.name, %token, "unrecognised category");
                UNKNOWN_CATEGORY_SCORE
            }
        }
    }
}

fn normalise_token(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

pub const AIRWAY_STATUS: CategoricalTable = CategoricalTable {
    name: "airway_status",
    entries: &[
        ("fully_obstructed", 10.0),
        ("partially_obstructed_foreign_body", 8.0),
        ("partially_obstructed_tongue", 7.0),
        ("partially_obstructed_fluid", 7.0),
        ("compromised_facial_trauma", 6.0),
        ("maintained_with_adjunct", 4.0),
        ("secured_advanced_airway", 3.0),
        ("clear_open_spontaneous", 1.0),
    ],
};

pub const BREATHING_QUALITY: CategoricalTable = CategoricalTable {
    name: "breathing_quality",
    entries: &[
        ("absent", 10.0),
        ("gasping", 9.0),
        ("laboured", 7.0),
        ("shallow", 6.0),
        ("irregular", 5.0),
        ("normal", 1.0),
    ],
};

pub const CHEST_EXCURSION: CategoricalTable = CategoricalTable {
    name: "chest_excursion",
    entries: &[
        ("absent", 10.0),
        ("paradoxical", 9.0),
        ("asymmetric", 7.0),
        ("reduced", 5.0),
        ("symmetric", 1.0),
    ],
};

pub const AUSCULTATION_LUNGS: CategoricalTable = CategoricalTable {
    name: "auscultation_lungs",
    entries: &[
        ("silent_chest", 10.0),
        ("absent_unilateral", 9.0),
        ("diminished", 6.0),
        ("crackles", 5.0),
        ("wheeze", 5.0),
        ("clear", 1.0),
    ],
};

pub const EXTERNAL_BLEEDING: CategoricalTable = CategoricalTable {
    name: "external_bleeding",
    entries: &[
        ("massive_uncontrolled", 10.0),
        ("moderate_uncontrolled", 8.0),
        ("controlled_tourniquet", 6.0),
        ("controlled_pressure", 4.0),
        ("minor", 2.0),
        ("none", 1.0),
    ],
};

pub const PULSE_QUALITY: CategoricalTable = CategoricalTable {
    name: "pulse_quality",
    entries: &[
        ("absent", 10.0),
        ("thready", 8.0),
        ("weak", 6.0),
        ("irregular", 5.0),
        ("bounding", 4.0),
        ("strong_regular", 1.0),
    ],
};

/// Most distal site at which a pulse is palpable.
pub const PULSE_LOCATION: CategoricalTable = CategoricalTable {
    name: "pulse_location",
    entries: &[
        ("none", 10.0),
        ("carotid", 8.0),
        ("femoral", 6.0),
        ("radial", 1.0),
    ],
};

pub const SKIN_STATUS: CategoricalTable = CategoricalTable {
    name: "skin_status",
    entries: &[
        ("mottled", 9.0),
        ("cyanotic", 9.0),
        ("pale_cold_clammy", 8.0),
        ("pale", 5.0),
        ("flushed", 4.0),
        ("normal", 1.0),
    ],
};

pub const MOTOR_SENSORY_STATUS: CategoricalTable = CategoricalTable {
    name: "motor_sensory_status",
    entries: &[
        ("no_response", 10.0),
        ("paralysis", 9.0),
        ("unilateral_deficit", 7.0),
        ("weakness", 6.0),
        ("sensory_loss", 5.0),
        ("intact", 1.0),
    ],
};

pub const PUPIL_REACTION: CategoricalTable = CategoricalTable {
    name: "pupil_reaction",
    entries: &[
        ("bilateral_fixed_dilated", 10.0),
        ("unilateral_fixed_dilated", 9.0),
        ("unequal", 7.0),
        ("sluggish", 6.0),
        ("pinpoint", 6.0),
        ("equal_reactive", 1.0),
    ],
};

// ============================================================================
// NUMERIC RULES
// ============================================================================

/// Scores a reading against an inclusive normal range.
///
/// - unknown: `max_score / 2`
/// - `>x`: `max_score` if `x` exceeds the upper bound, else `max_score / 2`
/// - `<x`: `max_score` if `x` is below the lower bound, else `max_score / 2`
/// - `lo-hi`: midpoint in range scores 1, else `1 + distance to nearest bound`
/// - exact: in range scores 1, else `1 + 1.5 * distance to nearest bound`
///
/// Out-of-range scores are capped at `max_score`.
pub fn get_score_from_range(value: &ClinicalValue, normal: (f64, f64), max_score: f64) -> f64 {
    let (low, high) = normal;
    let neutral = max_score / 2.0;
    let deviation = |x: f64| {
        if x < low {
            low - x
        } else if x > high {
            x - high
        } else {
            0.0
        }
    };

    match *value {
        ClinicalValue::Unknown => neutral,
        ClinicalValue::GreaterThan(x) => {
            if x > high {
                max_score
            } else {
                neutral
            }
        }
        ClinicalValue::LessThan(x) => {
            if x < low {
                max_score
            } else {
                neutral
            }
        }
        ClinicalValue::Range(a, b) => {
            let distance = deviation((a + b) / 2.0);
            if distance == 0.0 {
                NORMAL_SCORE
            } else {
                max_score.min(NORMAL_SCORE + distance)
            }
        }
        ClinicalValue::Exact(x) => {
            let distance = deviation(x);
            if distance == 0.0 {
                NORMAL_SCORE
            } else {
                max_score.min(NORMAL_SCORE + distance * EXACT_DEVIATION_FACTOR)
            }
        }
    }
}

/// Scores the Glasgow Coma Scale.
///
/// Uses `gcsTotal` when readable, otherwise the sum of the eye, verbal and motor components
/// when all three are present.
pub fn gcs_score(patient: &PatientObservation) -> f64 {
    let total = patient.gcs_total.point_estimate().or_else(|| {
        let eye = patient.glasgow_coma_scale_eye.point_estimate()?;
        let verbal = patient.glasgow_coma_scale_verbal.point_estimate()?;
        let motor = patient.glasgow_coma_scale_motor.point_estimate()?;
        Some(eye + verbal + motor)
    });

    match total {
        None => UNKNOWN_CATEGORY_SCORE,
        Some(gcs) if gcs >= 15.0 => 1.0,
        Some(gcs) if gcs >= 13.0 => 3.0,
        Some(gcs) if gcs >= 9.0 => 6.0,
        Some(_) => MAX_SCORE,
    }
}

/// Resolves the patient's age in whole years.
///
/// The approximate age is read like an integer prefix (`"30-40"` gives 30). Without it the age
/// is the year difference between the date of birth and `reference_date`. If neither can be
/// read the patient is assumed to be [`DEFAULT_AGE_YEARS`].
///
/// A negative approximate age counts as unreadable, whether it arrived as a number or text.
pub fn age_in_years(info: &PatientInfo, reference_date: NaiveDate) -> i64 {
    let approximate = match info.patient_approximate_age {
        ClinicalValue::Exact(age) | ClinicalValue::Range(age, _) if age >= 0.0 => {
            Some(age.trunc() as i64)
        }
        _ => None,
    };

    approximate
        .or_else(|| {
            info.patient_date_of_birth
                .as_deref()
                .and_then(parse_date_of_birth)
                .map(|dob| i64::from(reference_date.year() - dob.year()))
        })
        .unwrap_or(DEFAULT_AGE_YEARS)
}

fn parse_date_of_birth(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            raw.get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
        .or_else(|| NaiveDate::parse_from_str(raw, "%d.%m.%Y").ok())
}

/// Infants and the elderly have the least physiological reserve.
pub fn age_score(age: i64) -> f64 {
    if !(2..=75).contains(&age) {
        MAX_SCORE
    } else if !(10..=60).contains(&age) {
        5.0
    } else {
        NORMAL_SCORE
    }
}

/// More interventions imply a patient who needed more care.
pub fn count_score(count: usize) -> f64 {
    NORMAL_SCORE + count as f64
}

// ============================================================================
// SCORE TREE
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AirwayScores {
    pub status: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BreathingScores {
    pub rate: f64,
    pub saturation: f64,
    pub quality: f64,
    pub chest_excursion: f64,
    pub auscultation: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CirculationScores {
    pub external_bleeding: f64,
    pub pulse_rate: f64,
    pub pulse_quality: f64,
    pub pulse_location: f64,
    pub capillary_refill: f64,
    pub skin: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DisabilityScores {
    pub gcs: f64,
    pub pupils: f64,
    pub motor_sensory: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExposureScores {
    pub temperature: f64,
    pub medications: f64,
    pub procedures: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReservesScores {
    pub age: f64,
}

/// Per-subcriterion severity scores for one patient.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreTree {
    pub airway: AirwayScores,
    pub breathing: BreathingScores,
    pub circulation: CirculationScores,
    pub disability: DisabilityScores,
    pub exposure: ExposureScores,
    pub reserves: ReservesScores,
}

impl ScoreTree {
    /// Scores of `criterion`, ordered like [`Criterion::subcriteria`].
    pub fn criterion_scores(&self, criterion: Criterion) -> Vec<f64> {
        match criterion {
            Criterion::Airway => vec![self.airway.status],
            Criterion::Breathing => vec![
                self.breathing.rate,
                self.breathing.saturation,
                self.breathing.quality,
                self.breathing.chest_excursion,
                self.breathing.auscultation,
            ],
            Criterion::Circulation => vec![
                self.circulation.external_bleeding,
                self.circulation.pulse_rate,
                self.circulation.pulse_quality,
                self.circulation.pulse_location,
                self.circulation.capillary_refill,
                self.circulation.skin,
            ],
            Criterion::Disability => vec![
                self.disability.gcs,
                self.disability.pupils,
                self.disability.motor_sensory,
            ],
            Criterion::Exposure => vec![
                self.exposure.temperature,
                self.exposure.medications,
                self.exposure.procedures,
            ],
            Criterion::Reserves => vec![self.reserves.age],
        }
    }
}

/// Converts one patient's observations into subcriterion severity scores.
///
/// `reference_date` stands in for "today" when deriving age from a date of birth.
pub fn map_patient_to_scores(patient: &PatientObservation, reference_date: NaiveDate) -> ScoreTree {
    ScoreTree {
        airway: AirwayScores {
            status: AIRWAY_STATUS.score(patient.airway_status.as_deref()),
        },
        breathing: BreathingScores {
            rate: get_score_from_range(&patient.breathing_rate, BREATHING_RATE_NORMAL, MAX_SCORE),
            saturation: get_score_from_range(
                &patient.breathing_saturation,
                SATURATION_NORMAL,
                MAX_SCORE,
            ),
            quality: BREATHING_QUALITY.score(patient.breathing_quality.as_deref()),
            chest_excursion: CHEST_EXCURSION.score(patient.chest_excursion.as_deref()),
            auscultation: AUSCULTATION_LUNGS.score(patient.auscultation_lungs.as_deref()),
        },
        circulation: CirculationScores {
            external_bleeding: EXTERNAL_BLEEDING.score(patient.external_bleeding.as_deref()),
            pulse_rate: get_score_from_range(&patient.pulse_rate, PULSE_RATE_NORMAL, MAX_SCORE),
            pulse_quality: PULSE_QUALITY.score(patient.pulse_quality.as_deref()),
            pulse_location: PULSE_LOCATION.score(patient.pulse_location.as_deref()),
            capillary_refill: get_score_from_range(
                &patient.capillary_refill_time,
                CAPILLARY_REFILL_NORMAL,
                MAX_SCORE,
            ),
            skin: SKIN_STATUS.score(patient.skin_status.as_deref()),
        },
        disability: DisabilityScores {
            gcs: gcs_score(patient),
            pupils: PUPIL_REACTION.score(patient.pupil_reaction.as_deref()),
            motor_sensory: MOTOR_SENSORY_STATUS.score(patient.motor_sensory_status.as_deref()),
        },
        exposure: ExposureScores {
            temperature: get_score_from_range(
                &patient.body_temperature,
                TEMPERATURE_NORMAL,
                MAX_SCORE,
            ),
            medications: count_score(patient.medications_administered.len()),
            procedures: count_score(patient.procedures_performed.len()),
        },
        reserves: ReservesScores {
            age: age_score(age_in_years(&patient.patient_info, reference_date)),
        },
    }
}
