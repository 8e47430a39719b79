//! Alignment of submitted fields onto a model's feature schema.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::feature_schema::FeatureSchema;
use crate::form_normalizer::{full_location, FormInput};

/// Column holding `ln(premium(location))`
pub const LOG_PREMIUM: &str = "LogPremium";

lazy_static! {
    static ref DEFAULT_PREMIUMS: BTreeMap<String, f64> = [
        ("Dwarka", 1.10),
        ("Rohini", 1.05),
        ("Saket", 1.20),
        ("Vasant Kunj", 1.30),
        ("Janakpuri", 1.15),
        ("Karol Bagh", 1.25),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
}

/// Which form fields the handler understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSet {
    /// Area, bedrooms and the three original amenities
    Classic,
    /// Classic plus security, power backup, resale and feature score
    Extended,
}

impl FeatureSet {
    pub fn numeric_fields(&self) -> &'static [&'static str] {
        match self {
            FeatureSet::Classic => &["Area", "Bedrooms"],
            FeatureSet::Extended => &["Area", "Bedrooms", "FeatureScore"],
        }
    }

    pub fn flag_fields(&self) -> &'static [&'static str] {
        match self {
            FeatureSet::Classic => &["CarParking", "Gymnasium", "SwimmingPool"],
            FeatureSet::Extended => &[
                "CarParking",
                "Gymnasium",
                "SwimmingPool",
                "24X7Security",
                "PowerBackup",
                "Resale",
            ],
        }
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureSet::Classic => f.write_str("classic"),
            FeatureSet::Extended => f.write_str("extended"),
        }
    }
}

impl FromStr for FeatureSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(FeatureSet::Classic),
            "extended" => Ok(FeatureSet::Extended),
            other => Err(format!("unknown feature set '{other}'")),
        }
    }
}

/// Multiplicative price premium per location
#[derive(Debug, Clone, PartialEq)]
pub struct PremiumTable {
    premiums: BTreeMap<String, f64>,
}

impl Default for PremiumTable {
    fn default() -> Self {
        Self {
            premiums: DEFAULT_PREMIUMS.clone(),
        }
    }
}

impl PremiumTable {
    pub fn new(premiums: BTreeMap<String, f64>) -> Self {
        Self { premiums }
    }

    pub fn default_premiums() -> BTreeMap<String, f64> {
        DEFAULT_PREMIUMS.clone()
    }

    /// Premium for a location, 1.0 when unknown
    pub fn premium(&self, location: &str) -> f64 {
        self.premiums.get(location).copied().unwrap_or(1.0)
    }

    pub fn log_premium(&self, location: &str) -> f64 {
        self.premium(location).ln()
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.premiums.keys().map(String::as_str)
    }
}

/// Normalized values of the fields the active feature set knows about
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticFields {
    pub values: Vec<(&'static str, f64)>,
    pub location: String,
    pub sector: String,
}

impl SemanticFields {
    pub fn from_input(input: &FormInput, feature_set: FeatureSet, premiums: &PremiumTable) -> Self {
        let location = input.text("Location");
        let sector = input.text("Sector");

        let mut values = Vec::new();
        for field in feature_set.numeric_fields() {
            values.push((*field, input.number(field)));
        }
        for field in feature_set.flag_fields() {
            values.push((*field, if input.flag(field) { 1.0 } else { 0.0 }));
        }
        values.push((LOG_PREMIUM, premiums.log_premium(&location)));

        Self {
            values,
            location,
            sector,
        }
    }

    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.iter().find(|(f, _)| *f == field).map(|(_, v)| *v)
    }

    pub fn full_location(&self) -> String {
        full_location(&self.location, &self.sector)
    }
}

/// A single row aligned 1:1 with a [`FeatureSchema`]
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub columns: Vec<String>,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn get(&self, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Zero-filled row with every known field written into its same-named column.
///
/// Fields without a column are dropped. The location's one-hot column is
/// either the bare location name or `Location_<name>`; a bare name that is
/// itself a semantic field never overwrites that field's value.
pub fn build_vector(schema: &FeatureSchema, fields: &SemanticFields) -> FeatureVector {
    let mut values = vec![0.0; schema.len()];

    for (field, value) in &fields.values {
        if let Some(idx) = schema.position(field) {
            values[idx] = *value;
        }
    }

    if !fields.location.is_empty() {
        let prefixed = format!("Location_{}", fields.location);
        let bare = fields.value(&fields.location).is_none().then_some(fields.location.as_str());
        for candidate in bare.into_iter().chain([prefixed.as_str()]) {
            if let Some(idx) = schema.position(candidate) {
                values[idx] = 1.0;
            }
        }
    }

    FeatureVector {
        columns: schema.columns.clone(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_schema::SchemaSource;

    fn schema(cols: &[&str]) -> FeatureSchema {
        FeatureSchema {
            columns: cols.iter().map(|c| c.to_string()).collect(),
            source: SchemaSource::Direct,
        }
    }

    fn dwarka_input() -> FormInput {
        FormInput::new()
            .with_text("Area", "1200")
            .with_text("Bedrooms", "3")
            .with_text("CarParking", "1")
            .with_text("Gymnasium", "0")
            .with_text("SwimmingPool", "0")
            .with_text("Location", "Dwarka")
            .with_text("Sector", "Sector 6")
    }

    #[test]
    fn unknown_location_has_zero_log_premium() {
        let table = PremiumTable::default();
        assert_eq!(table.log_premium("Unknown City"), 0.0);
        assert_eq!(table.log_premium(""), 0.0);
        assert!((table.log_premium("Saket") - 1.2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn dwarka_scenario_vector() {
        let fields =
            SemanticFields::from_input(&dwarka_input(), FeatureSet::Classic, &PremiumTable::default());
        let s = schema(&["Area", "Bedrooms", "CarParking", "Gymnasium", "SwimmingPool", "LogPremium"]);
        let v = build_vector(&s, &fields);
        assert_eq!(v.len(), 6);
        assert_eq!(&v.values[..5], &[1200.0, 3.0, 1.0, 0.0, 0.0]);
        assert!((v.values[5] - 1.10f64.ln()).abs() < 1e-12);
        assert_eq!(fields.full_location(), "Dwarka Sector 6");
    }

    #[test]
    fn vector_follows_schema_order_and_drops_unmatched_fields() {
        let fields =
            SemanticFields::from_input(&dwarka_input(), FeatureSet::Extended, &PremiumTable::default());
        let s = schema(&["Bedrooms", "Unrelated", "Area"]);
        let v = build_vector(&s, &fields);
        assert_eq!(v.values, vec![3.0, 0.0, 1200.0]);
        assert_eq!(v.columns, ["Bedrooms", "Unrelated", "Area"]);
    }

    #[test]
    fn one_hot_location_columns() {
        let fields =
            SemanticFields::from_input(&dwarka_input(), FeatureSet::Classic, &PremiumTable::default());

        let prefixed = build_vector(&schema(&["Location_Dwarka", "Location_Saket", "Area"]), &fields);
        assert_eq!(prefixed.values, vec![1.0, 0.0, 1200.0]);

        let bare = build_vector(&schema(&["Saket", "Dwarka"]), &fields);
        assert_eq!(bare.values, vec![0.0, 1.0]);
    }

    #[test]
    fn location_named_like_a_field_keeps_the_field_value() {
        let input = dwarka_input().with_text("Location", "Area");
        let fields = SemanticFields::from_input(&input, FeatureSet::Classic, &PremiumTable::default());

        let v = build_vector(&schema(&["Area", "Bedrooms", "Location_Area"]), &fields);
        assert_eq!(v.values, vec![1200.0, 3.0, 1.0]);

        let input = dwarka_input().with_text("Location", "LogPremium");
        let fields = SemanticFields::from_input(&input, FeatureSet::Classic, &PremiumTable::default());
        let v = build_vector(&schema(&["LogPremium", "Bedrooms"]), &fields);
        assert_eq!(v.values, vec![0.0, 3.0]);
    }

    #[test]
    fn unknown_city_sets_no_one_hot_column() {
        let input = dwarka_input().with_text("Location", "Unknown City");
        let fields = SemanticFields::from_input(&input, FeatureSet::Classic, &PremiumTable::default());
        assert_eq!(fields.value(LOG_PREMIUM), Some(0.0));

        let v = build_vector(&schema(&["Location_Dwarka", "Location_Saket", "LogPremium"]), &fields);
        assert_eq!(v.values, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_location_never_matches() {
        let input = dwarka_input().with_text("Location", "  ");
        let fields = SemanticFields::from_input(&input, FeatureSet::Classic, &PremiumTable::default());
        let v = build_vector(&schema(&["", "Location_"]), &fields);
        assert_eq!(v.values, vec![0.0, 0.0]);
    }

    #[test]
    fn extended_flags_only_count_in_extended_set() {
        let input = dwarka_input()
            .with_text("24X7Security", "yes")
            .with_text("PowerBackup", "on")
            .with_text("FeatureScore", "7.5");
        let s = schema(&["24X7Security", "PowerBackup", "FeatureScore", "Resale"]);

        let classic = SemanticFields::from_input(&input, FeatureSet::Classic, &PremiumTable::default());
        assert_eq!(build_vector(&s, &classic).values, vec![0.0, 0.0, 0.0, 0.0]);

        let extended = SemanticFields::from_input(&input, FeatureSet::Extended, &PremiumTable::default());
        assert_eq!(build_vector(&s, &extended).values, vec![1.0, 1.0, 7.5, 0.0]);
    }

    #[test]
    fn synthetic_schema_degrades_to_zero_vector() {
        let fields =
            SemanticFields::from_input(&dwarka_input(), FeatureSet::Extended, &PremiumTable::default());
        let v = build_vector(&schema(&["f_0", "f_1", "f_2"]), &fields);
        assert_eq!(v.values, vec![0.0; 3]);
    }

    #[test]
    fn feature_set_parses_case_insensitively() {
        assert_eq!("Classic".parse::<FeatureSet>().unwrap(), FeatureSet::Classic);
        assert_eq!("extended".parse::<FeatureSet>().unwrap(), FeatureSet::Extended);
        assert!("full".parse::<FeatureSet>().is_err());
    }
}
