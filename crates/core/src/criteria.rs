//! The fixed two-level triage hierarchy.

use crate::constants::{
    AIRWAY, AIRWAY_SUBCRITERIA, BREATHING, BREATHING_SUBCRITERIA, CIRCULATION,
    CIRCULATION_SUBCRITERIA, DISABILITY, DISABILITY_SUBCRITERIA, EXPOSURE, EXPOSURE_SUBCRITERIA,
    RESERVES, RESERVES_SUBCRITERIA,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level triage criterion, in ABCDE order followed by physiological reserves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Airway,
    Breathing,
    Circulation,
    Disability,
    Exposure,
    Reserves,
}

impl Criterion {
    /// All criteria in the order used by the criteria comparison matrix.
    pub const ALL: [Criterion; 6] = [
        Criterion::Airway,
        Criterion::Breathing,
        Criterion::Circulation,
        Criterion::Disability,
        Criterion::Exposure,
        Criterion::Reserves,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Criterion::Airway => AIRWAY,
            Criterion::Breathing => BREATHING,
            Criterion::Circulation => CIRCULATION,
            Criterion::Disability => DISABILITY,
            Criterion::Exposure => EXPOSURE,
            Criterion::Reserves => RESERVES,
        }
    }

    /// Subcriterion names in the order used by this criterion's comparison matrix.
    pub fn subcriteria(self) -> &'static [&'static str] {
        match self {
            Criterion::Airway => &AIRWAY_SUBCRITERIA,
            Criterion::Breathing => &BREATHING_SUBCRITERIA,
            Criterion::Circulation => &CIRCULATION_SUBCRITERIA,
            Criterion::Disability => &DISABILITY_SUBCRITERIA,
            Criterion::Exposure => &EXPOSURE_SUBCRITERIA,
            Criterion::Reserves => &RESERVES_SUBCRITERIA,
        }
    }

    /// Position in [`Criterion::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
