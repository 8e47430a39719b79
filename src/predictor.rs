//! Runs the model on an aligned row and renders the result.

use tracing::debug;

use crate::artifact::{Regressor, Transformer};
use crate::errors::{EstimatorError, EstimatorResult};
use crate::feature_vector::FeatureVector;

/// Raw model output for one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPrediction {
    pub value: f64,
    pub scaled: bool,
}

/// Scale the row when a scaler is given, predict, and keep the first output.
pub fn predict_row(
    model: &dyn Regressor,
    scaler: Option<&dyn Transformer>,
    vector: &FeatureVector,
) -> EstimatorResult<RawPrediction> {
    let mut rows = vec![vector.values.clone()];
    let scaled = scaler.is_some();

    if let Some(scaler) = scaler {
        rows = scaler.transform(&rows).map_err(|e| match e {
            EstimatorError::Scaling { .. } => e,
            other => EstimatorError::scaling(other.to_string()),
        })?;
        debug!(message = "Scaled feature row", scaler = scaler.kind());
    }

    let outputs = model.predict(&rows).map_err(|e| match e {
        EstimatorError::Prediction { .. } => e,
        other => EstimatorError::prediction(other.to_string()),
    })?;

    let value = *outputs
        .first()
        .ok_or_else(|| EstimatorError::prediction("model returned no output"))?;
    if !value.is_finite() {
        return Err(EstimatorError::prediction(format!(
            "model produced a non-finite value ({value})"
        )));
    }

    Ok(RawPrediction { value, scaled })
}

/// Two-decimal price with comma thousands separators, e.g. `1,234,567.89`
pub fn format_price(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac:02}")
}

pub fn prediction_text(full_location: &str, value: f64) -> String {
    format!("🏠 Estimated Price in {full_location}: ₹{}", format_price(value))
}
