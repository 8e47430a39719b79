use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::artifact::{ModelArtifact, Regressor, ScalerArtifact, Transformer};
use crate::artifact_loader::{load_model, load_scaler, LoadedArtifact};
use crate::config_loader::EstimatorConfig;
use crate::errors::{EstimatorError, EstimatorResult};
use crate::feature_schema::{discover_schema, FeatureSchema};
use crate::feature_vector::{build_vector, FeatureSet, FeatureVector, PremiumTable, SemanticFields};
use crate::form_normalizer::FormInput;
use crate::predictor::{predict_row, prediction_text};
use crate::scaler_compat::{check_scaler, ScalerVerdict};

/// Everything a request needs, built once at startup and only read afterwards
#[derive(Debug)]
pub struct AppContext {
    pub model: Option<LoadedArtifact<ModelArtifact>>,
    pub scaler: Option<LoadedArtifact<ScalerArtifact>>,
    pub premiums: PremiumTable,
    pub feature_set: FeatureSet,
    pub started_at: DateTime<Utc>,
}

/// Outcome of one estimate
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub value: f64,
    pub text: String,
    pub scaled: bool,
    pub vector: FeatureVector,
}

#[derive(Debug, Serialize)]
pub struct ArtifactStatus {
    pub kind: &'static str,
    pub source: String,
    pub sha256: String,
}

#[derive(Debug, Serialize)]
pub struct ContextStatus {
    pub feature_set: FeatureSet,
    pub started_at: DateTime<Utc>,
    pub model: Option<ArtifactStatus>,
    pub scaler: Option<ArtifactStatus>,
    pub schema: Option<FeatureSchema>,
    pub scaler_verdict: Option<ScalerVerdict>,
}

impl AppContext {
    pub fn new(
        model: Option<LoadedArtifact<ModelArtifact>>,
        scaler: Option<LoadedArtifact<ScalerArtifact>>,
        premiums: PremiumTable,
        feature_set: FeatureSet,
    ) -> Self {
        Self {
            model,
            scaler,
            premiums,
            feature_set,
            started_at: Utc::now(),
        }
    }

    /// Load both artifacts as the configuration describes
    pub fn from_config(cfg: &EstimatorConfig) -> Self {
        let scaler = load_scaler(&cfg.artifact_dir, &cfg.scaler_candidates);
        let model = load_model(&cfg.artifact_dir, &cfg.model_candidates);

        let ctx = Self::new(model, scaler, cfg.premium_table(), cfg.feature_set);
        match ctx.schema() {
            Ok(schema) => info!(
                message = "Model schema discovered",
                source = %schema.source,
                columns = schema.len()
            ),
            Err(e) => warn!(message = "Model not ready", error = %e),
        }
        ctx
    }

    pub fn model(&self) -> Option<&dyn Regressor> {
        self.model.as_ref().map(|m| &m.artifact as &dyn Regressor)
    }

    pub fn scaler(&self) -> Option<&dyn Transformer> {
        self.scaler.as_ref().map(|s| &s.artifact as &dyn Transformer)
    }

    pub fn schema(&self) -> EstimatorResult<FeatureSchema> {
        let model = self.model().ok_or(EstimatorError::ModelMissing)?;
        discover_schema(model)
    }

    pub fn is_ready(&self) -> bool {
        self.schema().is_ok()
    }

    /// Normalize, align, optionally scale and predict.
    pub fn estimate(&self, input: &FormInput) -> EstimatorResult<Estimate> {
        let model = self.model().ok_or(EstimatorError::ModelMissing)?;
        let schema = discover_schema(model)?;

        let fields = SemanticFields::from_input(input, self.feature_set, &self.premiums);
        let vector = build_vector(&schema, &fields);

        let verdict = check_scaler(self.scaler(), &schema);
        if !verdict.is_usable() && verdict != ScalerVerdict::Absent {
            debug!(message = "Scaler skipped", verdict = ?verdict);
        }
        let scaler = if verdict.is_usable() { self.scaler() } else { None };

        let raw = predict_row(model, scaler, &vector)?;
        Ok(Estimate {
            value: raw.value,
            text: prediction_text(&fields.full_location(), raw.value),
            scaled: raw.scaled,
            vector,
        })
    }

    pub fn status(&self) -> ContextStatus {
        let schema = self.schema().ok();
        let scaler_verdict = schema.as_ref().map(|s| check_scaler(self.scaler(), s));
        ContextStatus {
            feature_set: self.feature_set,
            started_at: self.started_at,
            model: self.model.as_ref().map(|m| ArtifactStatus {
                kind: m.artifact.kind(),
                source: m.source.display().to_string(),
                sha256: m.sha256.clone(),
            }),
            scaler: self.scaler.as_ref().map(|s| ArtifactStatus {
                kind: s.artifact.kind(),
                source: s.source.display().to_string(),
                sha256: s.sha256.clone(),
            }),
            schema,
            scaler_verdict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{LinearRegression, StandardScaler};
    use std::path::PathBuf;

    fn loaded<T>(artifact: T) -> LoadedArtifact<T> {
        LoadedArtifact {
            artifact,
            source: PathBuf::from("memory"),
            sha256: String::new(),
        }
    }

    fn names(cols: &[&str]) -> Option<Vec<String>> {
        Some(cols.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn missing_model_is_reported() {
        let ctx = AppContext::new(None, None, PremiumTable::default(), FeatureSet::Classic);
        let err = ctx.estimate(&FormInput::new()).unwrap_err();
        assert!(matches!(err, EstimatorError::ModelMissing));
        assert!(!ctx.is_ready());
    }

    #[test]
    fn incompatible_scaler_is_ignored() {
        let model = ModelArtifact::LinearRegression(LinearRegression {
            coef: vec![1.0, 10.0],
            intercept: 0.0,
            feature_names: names(&["Area", "Bedrooms"]),
            n_features: None,
        });
        let scaler = ScalerArtifact::StandardScaler(StandardScaler {
            mean: vec![100.0, 100.0],
            scale: vec![1.0, 1.0],
            feature_names: names(&["Bedrooms", "Area"]),
            n_features: None,
        });
        let ctx = AppContext::new(
            Some(loaded(model)),
            Some(loaded(scaler)),
            PremiumTable::default(),
            FeatureSet::Classic,
        );
        let input = FormInput::new()
            .with_text("Area", "1000")
            .with_text("Bedrooms", "2");
        let est = ctx.estimate(&input).unwrap();
        assert!(!est.scaled);
        assert_eq!(est.vector.values, vec![1000.0, 2.0]);
        assert_eq!(est.value, 1020.0);
        assert_eq!(ctx.status().scaler_verdict, Some(ScalerVerdict::NamesDiffer));
    }
}
