//! Patient observation records as supplied by the casualty-card store.
//!
//! Field names follow the stored document shape (`airwayStatus`, `pulseRate`, `_id`, ...).
//! Every field is optional. Clinical readings that cannot be parsed become
//! [`ClinicalValue::Unknown`], and null or wrongly typed text, list and nested fields fall
//! back to their empty value, so a single bad entry never rejects a whole record.

use crate::clinical_value::ClinicalValue;
use crate::{TriageError, TriageResult};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Name reported for patients whose card carries no name.
pub const UNKNOWN_PATIENT_NAME: &str = "Unknown";

/// One casualty's clinical observations. Read-only input to the triage engine.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientObservation {
    #[serde(rename = "_id", deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(deserialize_with = "flexible_id")]
    pub card_id: Option<String>,

    #[serde(deserialize_with = "lenient_text")]
    pub airway_status: Option<String>,

    pub breathing_rate: ClinicalValue,
    pub breathing_saturation: ClinicalValue,
    #[serde(deserialize_with = "lenient_text")]
    pub breathing_quality: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub chest_excursion: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub auscultation_lungs: Option<String>,

    #[serde(deserialize_with = "lenient_text")]
    pub external_bleeding: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub pulse_location: Option<String>,
    pub pulse_rate: ClinicalValue,
    #[serde(deserialize_with = "lenient_text")]
    pub pulse_quality: Option<String>,
    pub capillary_refill_time: ClinicalValue,
    #[serde(deserialize_with = "lenient_text")]
    pub skin_status: Option<String>,

    #[serde(deserialize_with = "lenient_text")]
    pub motor_sensory_status: Option<String>,
    pub gcs_total: ClinicalValue,
    pub glasgow_coma_scale_eye: ClinicalValue,
    pub glasgow_coma_scale_verbal: ClinicalValue,
    pub glasgow_coma_scale_motor: ClinicalValue,
    #[serde(deserialize_with = "lenient_text")]
    pub pupil_reaction: Option<String>,

    pub body_temperature: ClinicalValue,
    #[serde(deserialize_with = "lenient_list")]
    pub medications_administered: Vec<Value>,
    #[serde(deserialize_with = "lenient_list")]
    pub procedures_performed: Vec<Value>,

    #[serde(deserialize_with = "lenient_info")]
    pub patient_info: PatientInfo,
}

/// Identification block nested in a casualty card.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientInfo {
    #[serde(deserialize_with = "lenient_text")]
    pub patient_name: Option<String>,
    pub patient_approximate_age: ClinicalValue,
    #[serde(deserialize_with = "lenient_text")]
    pub patient_date_of_birth: Option<String>,
}

impl PatientObservation {
    pub fn patient_id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn card_id(&self) -> &str {
        self.card_id.as_deref().unwrap_or_default()
    }

    /// Display name, falling back to [`UNKNOWN_PATIENT_NAME`].
    pub fn patient_name(&self) -> &str {
        self.patient_info
            .patient_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_PATIENT_NAME)
    }
}

/// Parses a JSON array of patient observations.
///
/// # Errors
///
/// Returns [`TriageError::JsonDeserialization`] if the text is not a JSON array of objects.
pub fn parse_patients_json(json_text: &str) -> TriageResult<Vec<PatientObservation>> {
    serde_json::from_str(json_text).map_err(TriageError::JsonDeserialization)
}

// ============================================================================
// LENIENT FIELD DESERIALIZERS
// ============================================================================

/// Document identifiers arrive as strings, numbers or extended-JSON `{"$oid": ...}` objects.
fn flexible_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Object(mut fields) => match fields.remove("$oid") {
            Some(Value::String(oid)) => Some(oid),
            _ => None,
        },
        _ => None,
    })
}

/// Text fields; anything that is not a string reads as missing.
///
/// Extended-JSON dates (`{"$date": "..."}`) are unwrapped to their string form.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Object(mut fields) => match fields.remove("$date") {
            Some(Value::String(date)) => Some(date),
            _ => None,
        },
        _ => None,
    })
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}

fn lenient_info<'de, D>(deserializer: D) -> Result<PatientInfo, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(PatientInfo::deserialize(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_stored_document_shape() {
        let patient: PatientObservation = serde_json::from_value(json!({
            "_id": { "$oid": "65f0c2a1e4b0a1b2c3d4e5f6" },
            "cardId": 1042,
            "airwayStatus": "partially_obstructed_tongue",
            "breathingRate": "10-12",
            "breathingSaturation": "<85",
            "pulseRate": 128,
            "gcsTotal": "14",
            "medicationsAdministered": [{ "name": "morphine" }, { "name": "txa" }],
            "proceduresPerformed": ["tourniquet"],
            "patientInfo": {
                "patientName": "Jan Kowalski",
                "patientApproximateAge": "45",
                "patientDateOfBirth": null
            }
        }))
        .expect("document should deserialize");

        assert_eq!(patient.patient_id(), "65f0c2a1e4b0a1b2c3d4e5f6");
        assert_eq!(patient.card_id(), "1042");
        assert_eq!(patient.breathing_rate, ClinicalValue::Range(10.0, 12.0));
        assert_eq!(patient.breathing_saturation, ClinicalValue::LessThan(85.0));
        assert_eq!(patient.pulse_rate, ClinicalValue::Exact(128.0));
        assert_eq!(patient.gcs_total, ClinicalValue::Exact(14.0));
        assert_eq!(patient.medications_administered.len(), 2);
        assert_eq!(patient.procedures_performed.len(), 1);
        assert_eq!(patient.patient_name(), "Jan Kowalski");
        assert_eq!(
            patient.patient_info.patient_approximate_age,
            ClinicalValue::Exact(45.0)
        );
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let patient: PatientObservation =
            serde_json::from_value(json!({})).expect("empty object should deserialize");
        assert_eq!(patient, PatientObservation::default());
        assert_eq!(patient.patient_id(), "");
        assert_eq!(patient.patient_name(), UNKNOWN_PATIENT_NAME);
    }

    #[test]
    fn test_blank_name_falls_back_to_unknown() {
        let patient = PatientObservation {
            patient_info: PatientInfo {
                patient_name: Some("   ".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(patient.patient_name(), UNKNOWN_PATIENT_NAME);
    }

    #[test]
    fn test_malformed_fields_do_not_reject_the_batch() {
        let patients = parse_patients_json(
            r#"[
                {"cardId": "A"},
                {"cardId": "B", "medicationsAdministered": null, "proceduresPerformed": "splint"},
                {"cardId": "C", "externalBleeding": true, "pupilReaction": 3},
                {"cardId": "D", "patientInfo": null},
                {"cardId": "E", "patientInfo": {
                    "patientName": 42,
                    "patientDateOfBirth": {"$date": "1940-01-01T00:00:00Z"}
                }},
                {"cardId": "F", "patientInfo": {"patientDateOfBirth": 19400101}},
                {"cardId": 7.5, "_id": true}
            ]"#,
        )
        .expect("malformed fields should not reject the batch");
        assert_eq!(patients.len(), 7);

        assert!(patients[1].medications_administered.is_empty());
        assert!(patients[1].procedures_performed.is_empty());

        assert_eq!(patients[2].external_bleeding, None);
        assert_eq!(patients[2].pupil_reaction, None);

        assert_eq!(patients[3].patient_info, PatientInfo::default());
        assert_eq!(patients[3].patient_name(), UNKNOWN_PATIENT_NAME);

        assert_eq!(patients[4].patient_info.patient_name, None);
        assert_eq!(
            patients[4].patient_info.patient_date_of_birth.as_deref(),
            Some("1940-01-01T00:00:00Z")
        );

        assert_eq!(patients[5].patient_info.patient_date_of_birth, None);

        assert_eq!(patients[6].card_id(), "7.5");
        assert_eq!(patients[6].patient_id(), "");
    }

    #[test]
    fn test_parse_patients_json_rejects_non_array() {
        let err = parse_patients_json(r#"{"cardId": "1"}"#).expect_err("should reject object");
        assert!(matches!(err, TriageError::JsonDeserialization(_)));

        let patients = parse_patients_json(r#"[{"cardId": "A1"}, {"cardId": "A2"}]"#)
            .expect("array should parse");
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[1].card_id(), "A2");
    }
}
