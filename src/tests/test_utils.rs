// src/tests/test_utils.rs
// Shared fixtures for crate-level scenario tests

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::app_state::AppContext;
use crate::config_loader::EstimatorConfig;
use crate::feature_vector::FeatureSet;
use crate::form_normalizer::FormInput;

pub const CLASSIC_COLUMNS: [&str; 6] = [
    "Area",
    "Bedrooms",
    "CarParking",
    "Gymnasium",
    "SwimmingPool",
    "LogPremium",
];

/// Linear model over the classic columns: 5000 per sq ft, 100k per bedroom
pub fn classic_model() -> Value {
    json!({
        "kind": "linear_regression",
        "coef_": [5000.0, 100000.0, 50000.0, 25000.0, 75000.0, 1000000.0],
        "intercept_": 0.0,
        "feature_names_in_": CLASSIC_COLUMNS
    })
}

pub fn write_artifact(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

/// Context loaded from a temp dir holding the given artifacts
pub fn context_with(artifacts: &[(&str, Value)], feature_set: FeatureSet) -> (AppContext, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    for (name, value) in artifacts {
        write_artifact(dir.path(), name, value);
    }
    let cfg = EstimatorConfig {
        artifact_dir: dir.path().to_path_buf(),
        feature_set,
        ..EstimatorConfig::default()
    };
    (AppContext::from_config(&cfg), dir)
}

pub fn dwarka_form() -> FormInput {
    FormInput::new()
        .with_text("Area", "1200")
        .with_text("Bedrooms", "3")
        .with_text("CarParking", "1")
        .with_text("Gymnasium", "0")
        .with_text("SwimmingPool", "0")
        .with_text("Location", "Dwarka")
        .with_text("Sector", "Sector 6")
}
