//! Constants used throughout the triage core crate.
//!
//! The comparison matrices below encode the ABCDE trauma-priority doctrine and were
//! authored by clinicians. Their numeric values feed straight into patient ranking, so they
//! must not be altered without clinical review.

/// Upper bound of every severity score.
pub const MAX_SCORE: f64 = 10.0;

/// Score given to a clinically normal observation.
pub const NORMAL_SCORE: f64 = 1.0;

/// Score used for missing or unrecognised categorical values (midpoint of the tables).
pub const UNKNOWN_CATEGORY_SCORE: f64 = 5.0;

/// Multiplier applied to the deviation of a single out-of-range reading.
pub const EXACT_DEVIATION_FACTOR: f64 = 1.5;

/// Age assumed when neither an approximate age nor a date of birth can be parsed.
pub const DEFAULT_AGE_YEARS: i64 = 35;

/// Consistency ratios at or above this value are reported as inconsistent.
pub const CONSISTENCY_THRESHOLD: f64 = 0.1;

/// Tolerance used when checking hand-authored matrices for reciprocity.
pub const RECIPROCAL_TOLERANCE: f64 = 1e-6;

/// Lower clamp for patient-to-patient ratios.
pub const MIN_COMPARISON_RATIO: f64 = 1.0 / 9.0;

/// Upper clamp for patient-to-patient ratios.
pub const MAX_COMPARISON_RATIO: f64 = 9.0;

/// Saaty random index for matrices of size 1 to 10.
pub const RANDOM_INDEX: [f64; 10] = [0.0, 0.0, 0.58, 0.9, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49];

/// Random index used for matrices larger than the table.
pub const RANDOM_INDEX_BEYOND_TABLE: f64 = 1.49;

/// Random index used by the zero-weight fallback when the table lookup misses.
pub const RANDOM_INDEX_ZERO_WEIGHT_FALLBACK: f64 = 1.98;

// Normal ranges (inclusive) for range-scored observations.

pub const BREATHING_RATE_NORMAL: (f64, f64) = (12.0, 20.0);
pub const SATURATION_NORMAL: (f64, f64) = (95.0, 100.0);
pub const PULSE_RATE_NORMAL: (f64, f64) = (60.0, 100.0);
pub const CAPILLARY_REFILL_NORMAL: (f64, f64) = (0.0, 2.0);
pub const TEMPERATURE_NORMAL: (f64, f64) = (36.0, 37.5);

// Hierarchy names.

pub const AIRWAY: &str = "airway";
pub const BREATHING: &str = "breathing";
pub const CIRCULATION: &str = "circulation";
pub const DISABILITY: &str = "disability";
pub const EXPOSURE: &str = "exposure";
pub const RESERVES: &str = "reserves";

pub const AIRWAY_SUBCRITERIA: [&str; 1] = ["status"];
pub const BREATHING_SUBCRITERIA: [&str; 5] =
    ["rate", "saturation", "quality", "chest_excursion", "auscultation"];
pub const CIRCULATION_SUBCRITERIA: [&str; 6] = [
    "external_bleeding",
    "pulse_rate",
    "pulse_quality",
    "pulse_location",
    "capillary_refill",
    "skin",
];
pub const DISABILITY_SUBCRITERIA: [&str; 3] = ["gcs", "pupils", "motor_sensory"];
pub const EXPOSURE_SUBCRITERIA: [&str; 3] = ["temperature", "medications", "procedures"];
pub const RESERVES_SUBCRITERIA: [&str; 1] = ["age"];

// Hand-authored comparison matrices.

/// Airway > Breathing > Circulation > Disability > Exposure ≈ Reserves.
pub const CRITERIA_MATRIX: [[f64; 6]; 6] = [
    [1.0, 3.0, 5.0, 7.0, 9.0, 9.0],
    [1.0 / 3.0, 1.0, 3.0, 5.0, 7.0, 7.0],
    [1.0 / 5.0, 1.0 / 3.0, 1.0, 3.0, 5.0, 5.0],
    [1.0 / 7.0, 1.0 / 5.0, 1.0 / 3.0, 1.0, 3.0, 3.0],
    [1.0 / 9.0, 1.0 / 7.0, 1.0 / 5.0, 1.0 / 3.0, 1.0, 1.0],
    [1.0 / 9.0, 1.0 / 7.0, 1.0 / 5.0, 1.0 / 3.0, 1.0, 1.0],
];

pub const AIRWAY_MATRIX: [[f64; 1]; 1] = [[1.0]];

pub const BREATHING_MATRIX: [[f64; 5]; 5] = [
    [1.0, 1.0 / 2.0, 2.0, 3.0, 3.0],
    [2.0, 1.0, 3.0, 4.0, 5.0],
    [1.0 / 2.0, 1.0 / 3.0, 1.0, 2.0, 2.0],
    [1.0 / 3.0, 1.0 / 4.0, 1.0 / 2.0, 1.0, 1.0],
    [1.0 / 3.0, 1.0 / 5.0, 1.0 / 2.0, 1.0, 1.0],
];

pub const CIRCULATION_MATRIX: [[f64; 6]; 6] = [
    [1.0, 3.0, 3.0, 2.0, 4.0, 5.0],
    [1.0 / 3.0, 1.0, 1.0, 1.0 / 2.0, 2.0, 3.0],
    [1.0 / 3.0, 1.0, 1.0, 1.0 / 2.0, 2.0, 3.0],
    [1.0 / 2.0, 2.0, 2.0, 1.0, 3.0, 4.0],
    [1.0 / 4.0, 1.0 / 2.0, 1.0 / 2.0, 1.0 / 3.0, 1.0, 2.0],
    [1.0 / 5.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 4.0, 1.0 / 2.0, 1.0],
];

pub const DISABILITY_MATRIX: [[f64; 3]; 3] = [
    [1.0, 3.0, 5.0],
    [1.0 / 3.0, 1.0, 2.0],
    [1.0 / 5.0, 1.0 / 2.0, 1.0],
];

pub const EXPOSURE_MATRIX: [[f64; 3]; 3] = [
    [1.0, 3.0, 3.0],
    [1.0 / 3.0, 1.0, 1.0],
    [1.0 / 3.0, 1.0, 1.0],
];

pub const RESERVES_MATRIX: [[f64; 1]; 1] = [[1.0]];
