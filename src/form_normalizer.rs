//! Total parsing of untrusted form input into typed values.
//!
//! Nothing in this module fails: malformed numbers become `0.0` and anything
//! that is not a recognised "on" value is `false`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Text values accepted as "on", compared case-insensitively
const TRUTHY: [&str; 4] = ["1", "true", "yes", "on"];

/// A raw submitted value. HTML forms only ever produce `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// The fields of a single request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormInput {
    fields: HashMap<String, FormValue>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap url-encoded form fields
    pub fn from_text_fields(fields: HashMap<String, String>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k, FormValue::Text(v)))
                .collect(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: FormValue) -> Self {
        self.fields.insert(field.into(), value);
        self
    }

    pub fn with_text(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(field, FormValue::Text(value.into()))
    }

    pub fn get(&self, field: &str) -> Option<&FormValue> {
        self.fields.get(field)
    }

    /// Numeric field with a zero fallback
    pub fn number(&self, field: &str) -> f64 {
        parse_number(self.get(field))
    }

    pub fn flag(&self, field: &str) -> bool {
        parse_flag(self.get(field))
    }

    /// Trimmed text field, empty when absent
    pub fn text(&self, field: &str) -> String {
        match self.get(field) {
            Some(FormValue::Text(s)) => s.trim().to_string(),
            Some(FormValue::Number(n)) => n.to_string(),
            Some(FormValue::Bool(b)) => b.to_string(),
            None => String::new(),
        }
    }
}

pub fn parse_number(value: Option<&FormValue>) -> f64 {
    let parsed = match value {
        Some(FormValue::Number(n)) => *n,
        Some(FormValue::Text(s)) => parse_decimal(s.trim()).unwrap_or(0.0),
        Some(FormValue::Bool(b)) => f64::from(u8::from(*b)),
        None => 0.0,
    };
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// Decimal text, allowing single underscores between digits (`1_000`)
fn parse_decimal(s: &str) -> Option<f64> {
    if !s.contains('_') {
        return s.parse().ok();
    }
    let bytes = s.as_bytes();
    let grouped = bytes.iter().enumerate().all(|(i, b)| {
        *b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });
    if !grouped {
        return None;
    }
    s.replace('_', "").parse().ok()
}

pub fn parse_flag(value: Option<&FormValue>) -> bool {
    match value {
        None => false,
        Some(FormValue::Bool(b)) => *b,
        Some(FormValue::Number(n)) => *n != 0.0,
        Some(FormValue::Text(s)) => {
            let s = s.trim();
            TRUTHY.iter().any(|t| t.eq_ignore_ascii_case(s))
        }
    }
}

/// `"<location> <sector>"` with surrounding whitespace removed
pub fn full_location(location: &str, sector: &str) -> String {
    format!("{location} {sector}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FormValue {
        FormValue::Text(s.to_string())
    }

    #[test]
    fn numbers_fall_back_to_zero() {
        assert_eq!(parse_number(Some(&text("1200"))), 1200.0);
        assert_eq!(parse_number(Some(&text(" 3.5 "))), 3.5);
        assert_eq!(parse_number(Some(&text("1,200"))), 0.0);
        assert_eq!(parse_number(Some(&text(""))), 0.0);
        assert_eq!(parse_number(Some(&text("NaN"))), 0.0);
        assert_eq!(parse_number(Some(&text("inf"))), 0.0);
        assert_eq!(parse_number(Some(&FormValue::Number(7.0))), 7.0);
        assert_eq!(parse_number(None), 0.0);
    }

    #[test]
    fn digit_group_underscores_are_accepted() {
        assert_eq!(parse_number(Some(&text("1_000"))), 1000.0);
        assert_eq!(parse_number(Some(&text("1_200.5"))), 1200.5);
        assert_eq!(parse_number(Some(&text("_1000"))), 0.0);
        assert_eq!(parse_number(Some(&text("1000_"))), 0.0);
        assert_eq!(parse_number(Some(&text("1__000"))), 0.0);
    }

    #[test]
    fn accepted_flag_strings_in_any_case() {
        for s in ["1", "true", "TRUE", "Yes", "yEs", "on", "ON", " on "] {
            assert!(parse_flag(Some(&text(s))), "{s:?} should be on");
        }
    }

    #[test]
    fn every_other_flag_string_is_off() {
        for s in ["0", "false", "no", "off", "", "2", "y", "checked", "1.0"] {
            assert!(!parse_flag(Some(&text(s))), "{s:?} should be off");
        }
        assert!(!parse_flag(None));
    }

    #[test]
    fn numeric_flags_are_truthy_when_nonzero() {
        assert!(parse_flag(Some(&FormValue::Number(2.0))));
        assert!(parse_flag(Some(&FormValue::Number(-1.0))));
        assert!(!parse_flag(Some(&FormValue::Number(0.0))));
        assert!(parse_flag(Some(&FormValue::Bool(true))));
    }

    #[test]
    fn json_values_deserialize_into_variants() {
        let input: FormInput = serde_json::from_str(
            r#"{"Area": 1200, "CarParking": true, "Location": "Saket", "Bedrooms": "3"}"#,
        )
        .unwrap();
        assert_eq!(input.number("Area"), 1200.0);
        assert_eq!(input.number("Bedrooms"), 3.0);
        assert!(input.flag("CarParking"));
        assert_eq!(input.text("Location"), "Saket");
        assert_eq!(input.text("Sector"), "");
    }

    #[test]
    fn full_location_trims_missing_parts() {
        assert_eq!(full_location("Dwarka", "Sector 6"), "Dwarka Sector 6");
        assert_eq!(full_location("Dwarka", ""), "Dwarka");
        assert_eq!(full_location("", ""), "");
    }
}
