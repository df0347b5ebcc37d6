//! Parsed representation of heterogeneous clinical readings.
//!
//! Field teams record vitals as plain numbers, comparator strings (`">150"`, `"<40"`),
//! dash ranges (`"10-12"`) or free text. Every reading is parsed once into a
//! [`ClinicalValue`] so scoring rules never re-parse strings.

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// A single clinical reading after parsing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ClinicalValue {
    Exact(f64),
    LessThan(f64),
    GreaterThan(f64),
    Range(f64, f64),
    /// Missing, empty or unparsable.
    #[default]
    Unknown,
}

impl ClinicalValue {
    /// Parses a recorded reading.
    ///
    /// Comparators are checked before ranges, so `">10-12"` is a `GreaterThan`. Numbers use a
    /// leading-number rule: `"120 bpm"` parses as `Exact(120.0)`.
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() {
            return Self::Unknown;
        }

        if let Some((_, rest)) = text.split_once('>') {
            return leading_number(rest).map_or(Self::Unknown, Self::GreaterThan);
        }
        if let Some((_, rest)) = text.split_once('<') {
            return leading_number(rest).map_or(Self::Unknown, Self::LessThan);
        }
        if let Some((low, high)) = text.split_once('-') {
            return match (leading_number(low), leading_number(high)) {
                (Some(low), Some(high)) => Self::Range(low, high),
                _ => Self::Unknown,
            };
        }

        leading_number(text).map_or(Self::Unknown, Self::Exact)
    }

    /// Wraps a numeric reading; non-finite numbers become `Unknown`.
    pub fn from_number(value: f64) -> Self {
        if value.is_finite() {
            Self::Exact(value)
        } else {
            Self::Unknown
        }
    }

    /// Best single-number estimate: exact values and range midpoints.
    pub fn point_estimate(&self) -> Option<f64> {
        match *self {
            Self::Exact(value) => Some(value),
            Self::Range(low, high) => Some((low + high) / 2.0),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for ClinicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(value) => write!(f, "{value}"),
            Self::LessThan(value) => write!(f, "<{value}"),
            Self::GreaterThan(value) => write!(f, ">{value}"),
            Self::Range(low, high) => write!(f, "{low}-{high}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Parses the longest numeric prefix of `text` (after leading whitespace).
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (idx, ch) in text.char_indices() {
        match ch {
            '+' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    text[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

impl<'de> Deserialize<'de> for ClinicalValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ClinicalValueVisitor)
    }
}

/// Accepts anything: malformed readings become `Unknown` instead of failing the record.
struct ClinicalValueVisitor;

impl<'de> Visitor<'de> for ClinicalValueVisitor {
    type Value = ClinicalValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a clinical reading string")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(ClinicalValue::from_number(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(ClinicalValue::Exact(value as f64))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(ClinicalValue::Exact(value as f64))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(ClinicalValue::parse(value))
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Self::Value, E> {
        Ok(ClinicalValue::Unknown)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ClinicalValue::Unknown)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ClinicalValue::Unknown)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(ClinicalValue::Unknown)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(ClinicalValue::Unknown)
    }
}
