//! Discovery of the ordered feature columns a model expects.
//!
//! Models do not always record their column names, so discovery runs a fixed
//! chain of [`SchemaProvider`] strategies and keeps the first answer.

use serde::Serialize;
use std::fmt;

use crate::artifact::Regressor;
use crate::errors::{EstimatorError, EstimatorResult};

/// Where a schema came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaSource {
    Direct,
    NestedEstimator,
    SyntheticWidth,
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchemaSource::Direct => "direct",
            SchemaSource::NestedEstimator => "nested_estimator",
            SchemaSource::SyntheticWidth => "synthetic_width",
        };
        f.write_str(s)
    }
}

/// Ordered column names a feature vector must follow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSchema {
    pub columns: Vec<String>,
    pub source: SchemaSource,
}

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

pub trait SchemaProvider {
    fn discover(&self, model: &dyn Regressor) -> Option<FeatureSchema>;
}

/// Names recorded on the model itself
pub struct DirectSchema;

impl SchemaProvider for DirectSchema {
    fn discover(&self, model: &dyn Regressor) -> Option<FeatureSchema> {
        model.feature_names_in().map(|names| FeatureSchema {
            columns: names.to_vec(),
            source: SchemaSource::Direct,
        })
    }
}

/// Names recorded on the estimator a search wrapper selected
pub struct NestedEstimatorSchema;

impl SchemaProvider for NestedEstimatorSchema {
    fn discover(&self, model: &dyn Regressor) -> Option<FeatureSchema> {
        let names = model.best_estimator()?.feature_names_in()?;
        Some(FeatureSchema {
            columns: names.to_vec(),
            source: SchemaSource::NestedEstimator,
        })
    }
}

/// `f_0 … f_{n-1}` sized by the declared input width
pub struct SyntheticWidthSchema;

impl SchemaProvider for SyntheticWidthSchema {
    fn discover(&self, model: &dyn Regressor) -> Option<FeatureSchema> {
        let n = model.n_features_in()?;
        Some(FeatureSchema {
            columns: (0..n).map(|i| format!("f_{i}")).collect(),
            source: SchemaSource::SyntheticWidth,
        })
    }
}

const PROVIDERS: [&(dyn SchemaProvider + Sync); 3] =
    [&DirectSchema, &NestedEstimatorSchema, &SyntheticWidthSchema];

/// Run the discovery chain; no answer is a configuration error
pub fn discover_schema(model: &dyn Regressor) -> EstimatorResult<FeatureSchema> {
    PROVIDERS
        .iter()
        .find_map(|p| p.discover(model))
        .ok_or(EstimatorError::SchemaUnavailable)
}
