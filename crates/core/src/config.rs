//! Triage runtime configuration.
//!
//! Configuration is resolved once at process startup and handed to the engine inside an
//! `Arc`. The default configuration carries the clinically reviewed matrices from
//! [`crate::constants`]; a YAML file may override them for research or training scenarios,
//! but every override is validated before use.

use crate::ahp::ComparisonMatrix;
use crate::constants::{
    AIRWAY_MATRIX, BREATHING_MATRIX, CIRCULATION_MATRIX, CRITERIA_MATRIX, DISABILITY_MATRIX,
    EXPOSURE_MATRIX, RESERVES_MATRIX,
};
use crate::criteria::Criterion;
use crate::{TriageError, TriageResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Subcriteria comparison matrix for each criterion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubcriteriaMatrices {
    pub airway: ComparisonMatrix,
    pub breathing: ComparisonMatrix,
    pub circulation: ComparisonMatrix,
    pub disability: ComparisonMatrix,
    pub exposure: ComparisonMatrix,
    pub reserves: ComparisonMatrix,
}

impl SubcriteriaMatrices {
    pub fn get(&self, criterion: Criterion) -> &ComparisonMatrix {
        match criterion {
            Criterion::Airway => &self.airway,
            Criterion::Breathing => &self.breathing,
            Criterion::Circulation => &self.circulation,
            Criterion::Disability => &self.disability,
            Criterion::Exposure => &self.exposure,
            Criterion::Reserves => &self.reserves,
        }
    }
}

impl Default for SubcriteriaMatrices {
    fn default() -> Self {
        Self {
            airway: ComparisonMatrix::from_array(&AIRWAY_MATRIX),
            breathing: ComparisonMatrix::from_array(&BREATHING_MATRIX),
            circulation: ComparisonMatrix::from_array(&CIRCULATION_MATRIX),
            disability: ComparisonMatrix::from_array(&DISABILITY_MATRIX),
            exposure: ComparisonMatrix::from_array(&EXPOSURE_MATRIX),
            reserves: ComparisonMatrix::from_array(&RESERVES_MATRIX),
        }
    }
}

/// Triage configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriageConfig {
    /// Pairwise comparison of the six criteria, in [`Criterion::ALL`] order.
    pub criteria_matrix: ComparisonMatrix,
    pub subcriteria_matrices: SubcriteriaMatrices,
    /// Date treated as "today" when deriving age from a date of birth.
    ///
    /// `None` means the current UTC date at each invocation.
    pub reference_date: Option<NaiveDate>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            criteria_matrix: ComparisonMatrix::from_array(&CRITERIA_MATRIX),
            subcriteria_matrices: SubcriteriaMatrices::default(),
            reference_date: None,
        }
    }
}

impl TriageConfig {
    /// Parses and validates a YAML configuration.
    ///
    /// Omitted keys keep their default values.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::YamlDeserialization`] for malformed YAML (including ragged
    /// matrices and unknown keys), or any error from [`TriageConfig::validate`].
    pub fn from_yaml_str(yaml_text: &str) -> TriageResult<Self> {
        let cfg: Self =
            serde_yaml::from_str(yaml_text).map_err(TriageError::YamlDeserialization)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads, parses and validates a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::FileRead`] if the file cannot be read, otherwise as
    /// [`TriageConfig::from_yaml_str`].
    pub fn from_path(path: &Path) -> TriageResult<Self> {
        let text = std::fs::read_to_string(path).map_err(TriageError::FileRead)?;
        Self::from_yaml_str(&text)
    }

    /// Resolves the configuration from an optional file path, falling back to defaults.
    ///
    /// # Errors
    ///
    /// As [`TriageConfig::from_path`] when a path is given.
    pub fn resolve(path: Option<&Path>) -> TriageResult<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// Checks every matrix is a valid reciprocal matrix of the expected size.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::DimensionMismatch`] when a matrix does not match the number of
    /// criteria or subcriteria, and propagates errors from
    /// [`ComparisonMatrix::validate_reciprocal`].
    pub fn validate(&self) -> TriageResult<()> {
        check_matrix("criteria", &self.criteria_matrix, Criterion::ALL.len())?;
        for criterion in Criterion::ALL {
            check_matrix(
                criterion.name(),
                self.subcriteria_matrices.get(criterion),
                criterion.subcriteria().len(),
            )?;
        }
        Ok(())
    }
}

fn check_matrix(name: &str, matrix: &ComparisonMatrix, expected: usize) -> TriageResult<()> {
    if matrix.size() != expected {
        return Err(TriageError::DimensionMismatch {
            name: name.to_string(),
            expected,
            actual: matrix.size(),
        });
    }
    matrix.validate_reciprocal(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        TriageConfig::default()
            .validate()
            .expect("default matrices should validate");
    }

    #[test]
    fn test_yaml_overrides_keep_defaults_for_missing_keys() {
        let cfg = TriageConfig::from_yaml_str(
            r#"
reference_date: 2026-03-01
subcriteria_matrices:
  airway: [[1.0]]
  breathing:
    - [1.0, 1.0, 1.0, 1.0, 1.0]
    - [1.0, 1.0, 1.0, 1.0, 1.0]
    - [1.0, 1.0, 1.0, 1.0, 1.0]
    - [1.0, 1.0, 1.0, 1.0, 1.0]
    - [1.0, 1.0, 1.0, 1.0, 1.0]
  circulation:
    - [1, 1, 1, 1, 1, 1]
    - [1, 1, 1, 1, 1, 1]
    - [1, 1, 1, 1, 1, 1]
    - [1, 1, 1, 1, 1, 1]
    - [1, 1, 1, 1, 1, 1]
    - [1, 1, 1, 1, 1, 1]
  disability: [[1, 2, 2], [0.5, 1, 1], [0.5, 1, 1]]
  exposure: [[1, 1, 1], [1, 1, 1], [1, 1, 1]]
  reserves: [[1]]
"#,
        )
        .expect("yaml should parse");

        assert_eq!(
            cfg.reference_date,
            Some(NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date"))
        );
        assert_eq!(cfg.criteria_matrix, TriageConfig::default().criteria_matrix);
        assert_eq!(cfg.subcriteria_matrices.disability.get(0, 1), Some(2.0));
    }

    #[test]
    fn test_rejects_wrong_dimension() {
        let err = TriageConfig::from_yaml_str("criteria_matrix: [[1, 2], [0.5, 1]]")
            .expect_err("criteria matrix must be 6x6");
        assert!(matches!(
            err,
            TriageError::DimensionMismatch {
                expected: 6,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_non_reciprocal_override() {
        let mut cfg = TriageConfig::default();
        cfg.subcriteria_matrices.exposure = ComparisonMatrix::from_array(&[
            [1.0, 3.0, 3.0],
            [1.0, 1.0, 1.0],
            [1.0 / 3.0, 1.0, 1.0],
        ]);
        let err = cfg.validate().expect_err("should reject");
        assert!(matches!(err, TriageError::NotReciprocal { name, row: 0, col: 1 } if name == "exposure"));
    }

    #[test]
    fn test_rejects_ragged_and_unknown_keys() {
        assert!(matches!(
            TriageConfig::from_yaml_str("criteria_matrix: [[1, 2], [0.5]]"),
            Err(TriageError::YamlDeserialization(_))
        ));
        assert!(matches!(
            TriageConfig::from_yaml_str("consistency: 0.2"),
            Err(TriageError::YamlDeserialization(_))
        ));
    }

    #[test]
    fn test_from_path_and_resolve() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "reference_date: 2025-12-31").expect("write config");

        let cfg = TriageConfig::resolve(Some(file.path())).expect("config should load");
        assert_eq!(
            cfg.reference_date,
            Some(NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date"))
        );

        assert_eq!(
            TriageConfig::resolve(None).expect("defaults"),
            TriageConfig::default()
        );

        let missing = Path::new("/definitely/not/here/triage.yaml");
        assert!(matches!(
            TriageConfig::from_path(missing),
            Err(TriageError::FileRead(_))
        ));
    }
}
