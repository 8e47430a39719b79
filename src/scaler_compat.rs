//! Decides whether a scaler fitted alongside the model may be applied.

use serde::Serialize;

use crate::artifact::Transformer;
use crate::feature_schema::FeatureSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerVerdict {
    /// Declared names equal the schema, same order
    NamesMatch,
    /// No names declared but the width equals the schema length
    WidthMatch,
    NamesDiffer,
    WidthDiffers,
    /// The scaler declares neither names nor width
    Undeclared,
    Absent,
}

impl ScalerVerdict {
    pub fn is_usable(&self) -> bool {
        matches!(self, ScalerVerdict::NamesMatch | ScalerVerdict::WidthMatch)
    }
}

/// Declared names take precedence over the declared width, so a scaler whose
/// names disagree is never rescued by having the right number of columns.
pub fn check_scaler(scaler: Option<&dyn Transformer>, schema: &FeatureSchema) -> ScalerVerdict {
    let Some(scaler) = scaler else {
        return ScalerVerdict::Absent;
    };

    if let Some(names) = scaler.feature_names_in() {
        return if names == schema.columns.as_slice() {
            ScalerVerdict::NamesMatch
        } else {
            ScalerVerdict::NamesDiffer
        };
    }

    match scaler.n_features_in() {
        Some(n) if n == schema.len() => ScalerVerdict::WidthMatch,
        Some(_) => ScalerVerdict::WidthDiffers,
        None => ScalerVerdict::Undeclared,
    }
}
