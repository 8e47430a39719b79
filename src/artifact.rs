//! Model and scaler artifacts.
//!
//! Artifacts are JSON documents tagged by `kind`. Every artifact may declare the
//! introspection attributes the runtime relies on (`feature_names_in_`,
//! `n_features_in_`); wrapped models additionally expose `best_estimator_`.
//! The rest of the crate only sees the [`Regressor`] and [`Transformer`] traits.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::{EstimatorError, EstimatorResult};

/// Prediction contract of a model artifact
pub trait Regressor: Debug + Send + Sync {
    /// Predict one value per input row
    fn predict(&self, rows: &[Vec<f64>]) -> EstimatorResult<Vec<f64>>;

    /// Ordered feature names the model was fitted on, if recorded
    fn feature_names_in(&self) -> Option<&[String]>;

    /// Input width the model expects, if known
    fn n_features_in(&self) -> Option<usize>;

    /// Inner model selected by a search wrapper
    fn best_estimator(&self) -> Option<&dyn Regressor> {
        None
    }

    fn kind(&self) -> &'static str;
}

/// Transformation contract of a scaler artifact
pub trait Transformer: Debug + Send + Sync {
    fn transform(&self, rows: &[Vec<f64>]) -> EstimatorResult<Vec<Vec<f64>>>;

    fn feature_names_in(&self) -> Option<&[String]>;

    fn n_features_in(&self) -> Option<usize>;

    fn kind(&self) -> &'static str;
}

/// Any model artifact the loader understands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LinearRegression(LinearRegression),
    TreeEnsemble(TreeEnsemble),
    SearchCv(SearchCv),
}

impl ModelArtifact {
    /// Reject artifacts whose declared attributes contradict their parameters
    pub fn validate(&self) -> EstimatorResult<()> {
        match self {
            ModelArtifact::LinearRegression(m) => m.validate(),
            ModelArtifact::TreeEnsemble(m) => m.validate(),
            ModelArtifact::SearchCv(m) => m.validate(),
        }
    }

    fn inner(&self) -> &dyn Regressor {
        match self {
            ModelArtifact::LinearRegression(m) => m,
            ModelArtifact::TreeEnsemble(m) => m,
            ModelArtifact::SearchCv(m) => m,
        }
    }
}

impl Regressor for ModelArtifact {
    fn predict(&self, rows: &[Vec<f64>]) -> EstimatorResult<Vec<f64>> {
        self.inner().predict(rows)
    }

    fn feature_names_in(&self) -> Option<&[String]> {
        self.inner().feature_names_in()
    }

    fn n_features_in(&self) -> Option<usize> {
        self.inner().n_features_in()
    }

    fn best_estimator(&self) -> Option<&dyn Regressor> {
        self.inner().best_estimator()
    }

    fn kind(&self) -> &'static str {
        self.inner().kind()
    }
}

fn check_declared_names(
    artifact: &str,
    names: Option<&[String]>,
    width: usize,
) -> EstimatorResult<()> {
    if let Some(names) = names {
        if names.len() != width {
            return Err(EstimatorError::invalid_artifact(
                artifact,
                format!("declares {} feature names for {} inputs", names.len(), width),
            ));
        }
    }
    Ok(())
}

fn check_row_width(kind: &str, row: &[f64], expected: Option<usize>) -> EstimatorResult<()> {
    match expected {
        Some(n) if row.len() != n => Err(EstimatorError::prediction(format!(
            "X has {} features, but {kind} is expecting {n} features as input",
            row.len()
        ))),
        _ => Ok(()),
    }
}

/// Ordinary least squares (or any other linear) regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    #[serde(rename = "coef_")]
    pub coef: Vec<f64>,
    #[serde(rename = "intercept_", default)]
    pub intercept: f64,
    #[serde(rename = "feature_names_in_", default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(rename = "n_features_in_", default, skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
}

impl LinearRegression {
    fn validate(&self) -> EstimatorResult<()> {
        if self.coef.is_empty() {
            return Err(EstimatorError::invalid_artifact("linear_regression", "coef_ is empty"));
        }
        if let Some(n) = self.n_features {
            if n != self.coef.len() {
                return Err(EstimatorError::invalid_artifact(
                    "linear_regression",
                    format!("n_features_in_ is {n} but coef_ has {} entries", self.coef.len()),
                ));
            }
        }
        check_declared_names("linear_regression", self.feature_names.as_deref(), self.coef.len())
    }
}

impl Regressor for LinearRegression {
    fn predict(&self, rows: &[Vec<f64>]) -> EstimatorResult<Vec<f64>> {
        rows.iter()
            .map(|row| {
                check_row_width(self.kind(), row, Some(self.coef.len()))?;
                Ok(self.intercept + row.iter().zip(&self.coef).map(|(x, w)| x * w).sum::<f64>())
            })
            .collect()
    }

    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn n_features_in(&self) -> Option<usize> {
        self.n_features.or(Some(self.coef.len()))
    }

    fn kind(&self) -> &'static str {
        "linear_regression"
    }
}

/// A node of a regression tree. Rows with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn evaluate(&self, row: &[f64]) -> EstimatorResult<f64> {
        let mut idx = 0;
        loop {
            let node = self.nodes.get(idx).ok_or_else(|| {
                EstimatorError::prediction(format!("tree references missing node {idx}"))
            })?;
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = row.get(*feature).ok_or_else(|| {
                        EstimatorError::prediction(format!(
                            "tree splits on feature {feature} but X has {} features",
                            row.len()
                        ))
                    })?;
                    idx = if *x <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Average of tree outputs (random forests)
    Mean,
    /// `base_score` plus the sum of tree outputs (gradient boosting)
    Sum,
}

/// Forest or boosted ensemble of regression trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub trees: Vec<RegressionTree>,
    #[serde(default = "default_aggregation")]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    #[serde(rename = "feature_names_in_", default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(rename = "n_features_in_", default, skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
}

fn default_aggregation() -> Aggregation {
    Aggregation::Mean
}

impl TreeEnsemble {
    fn validate(&self) -> EstimatorResult<()> {
        if self.trees.is_empty() {
            return Err(EstimatorError::invalid_artifact("tree_ensemble", "no trees"));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(EstimatorError::invalid_artifact(
                    "tree_ensemble",
                    format!("tree {t} has no nodes"),
                ));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                if let TreeNode::Split {
                    feature, left, right, ..
                } = node
                {
                    // Children must come after their parent so evaluation always terminates.
                    let in_range = |c: usize| c > i && c < tree.nodes.len();
                    if !in_range(*left) || !in_range(*right) {
                        return Err(EstimatorError::invalid_artifact(
                            "tree_ensemble",
                            format!("tree {t} node {i} has out-of-order children"),
                        ));
                    }
                    if let Some(n) = self.n_features {
                        if *feature >= n {
                            return Err(EstimatorError::invalid_artifact(
                                "tree_ensemble",
                                format!("tree {t} node {i} splits on feature {feature} of {n}"),
                            ));
                        }
                    }
                }
            }
        }
        match (self.feature_names.as_deref(), self.n_features) {
            (Some(names), Some(n)) => check_declared_names("tree_ensemble", Some(names), n),
            _ => Ok(()),
        }
    }
}

impl Regressor for TreeEnsemble {
    fn predict(&self, rows: &[Vec<f64>]) -> EstimatorResult<Vec<f64>> {
        rows.iter()
            .map(|row| {
                check_row_width(self.kind(), row, self.n_features_in())?;
                let mut total = 0.0;
                for tree in &self.trees {
                    total += tree.evaluate(row)?;
                }
                Ok(match self.aggregation {
                    Aggregation::Mean => total / self.trees.len() as f64,
                    Aggregation::Sum => self.base_score + total,
                })
            })
            .collect()
    }

    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn n_features_in(&self) -> Option<usize> {
        self.n_features
            .or_else(|| self.feature_names.as_ref().map(Vec::len))
    }

    fn kind(&self) -> &'static str {
        "tree_ensemble"
    }
}

/// Hyper-parameter search result wrapping the selected model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCv {
    #[serde(rename = "best_estimator_")]
    pub best_estimator: Box<ModelArtifact>,
    #[serde(rename = "feature_names_in_", default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(rename = "n_features_in_", default, skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
}

impl SearchCv {
    fn validate(&self) -> EstimatorResult<()> {
        self.best_estimator.validate()?;
        if let (Some(own), Some(inner)) = (self.n_features, self.best_estimator.n_features_in()) {
            if own != inner {
                return Err(EstimatorError::invalid_artifact(
                    "search_cv",
                    format!("n_features_in_ is {own} but best_estimator_ expects {inner}"),
                ));
            }
        }
        match self.n_features_in() {
            Some(n) => check_declared_names("search_cv", self.feature_names.as_deref(), n),
            None => Ok(()),
        }
    }
}

impl Regressor for SearchCv {
    fn predict(&self, rows: &[Vec<f64>]) -> EstimatorResult<Vec<f64>> {
        self.best_estimator.predict(rows)
    }

    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn n_features_in(&self) -> Option<usize> {
        self.n_features.or_else(|| self.best_estimator.n_features_in())
    }

    fn best_estimator(&self) -> Option<&dyn Regressor> {
        Some(&*self.best_estimator)
    }

    fn kind(&self) -> &'static str {
        "search_cv"
    }
}

/// Any scaler artifact the loader understands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    StandardScaler(StandardScaler),
    MinMaxScaler(MinMaxScaler),
}

impl ScalerArtifact {
    pub fn validate(&self) -> EstimatorResult<()> {
        let (kind, a, b, names, n) = match self {
            ScalerArtifact::StandardScaler(s) => (
                "standard_scaler",
                s.mean.len(),
                s.scale.len(),
                s.feature_names.as_deref(),
                s.n_features,
            ),
            ScalerArtifact::MinMaxScaler(s) => (
                "min_max_scaler",
                s.min.len(),
                s.scale.len(),
                s.feature_names.as_deref(),
                s.n_features,
            ),
        };
        if a != b {
            return Err(EstimatorError::invalid_artifact(
                kind,
                format!("parameter lengths differ ({a} vs {b})"),
            ));
        }
        if let Some(n) = n {
            if n != a {
                return Err(EstimatorError::invalid_artifact(
                    kind,
                    format!("n_features_in_ is {n} but parameters cover {a} features"),
                ));
            }
        }
        check_declared_names(kind, names, a)
    }

    fn inner(&self) -> &dyn Transformer {
        match self {
            ScalerArtifact::StandardScaler(s) => s,
            ScalerArtifact::MinMaxScaler(s) => s,
        }
    }
}

impl Transformer for ScalerArtifact {
    fn transform(&self, rows: &[Vec<f64>]) -> EstimatorResult<Vec<Vec<f64>>> {
        self.inner().transform(rows)
    }

    fn feature_names_in(&self) -> Option<&[String]> {
        self.inner().feature_names_in()
    }

    fn n_features_in(&self) -> Option<usize> {
        self.inner().n_features_in()
    }

    fn kind(&self) -> &'static str {
        self.inner().kind()
    }
}

fn check_scaler_width(kind: &str, row: &[f64], expected: usize) -> EstimatorResult<()> {
    if row.len() != expected {
        return Err(EstimatorError::scaling(format!(
            "X has {} features, but {kind} is expecting {expected} features as input",
            row.len()
        )));
    }
    Ok(())
}

/// Standardizes each column to zero mean and unit variance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(rename = "mean_")]
    pub mean: Vec<f64>,
    #[serde(rename = "scale_")]
    pub scale: Vec<f64>,
    #[serde(rename = "feature_names_in_", default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(rename = "n_features_in_", default, skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
}

impl Transformer for StandardScaler {
    fn transform(&self, rows: &[Vec<f64>]) -> EstimatorResult<Vec<Vec<f64>>> {
        rows.iter()
            .map(|row| {
                check_scaler_width(self.kind(), row, self.mean.len())?;
                Ok(row
                    .iter()
                    .zip(self.mean.iter().zip(&self.scale))
                    .map(|(x, (m, s))| if *s == 0.0 { x - m } else { (x - m) / s })
                    .collect())
            })
            .collect()
    }

    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn n_features_in(&self) -> Option<usize> {
        self.n_features.or(Some(self.mean.len()))
    }

    fn kind(&self) -> &'static str {
        "standard_scaler"
    }
}

/// Rescales each column into the range seen during fitting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    #[serde(rename = "min_")]
    pub min: Vec<f64>,
    #[serde(rename = "scale_")]
    pub scale: Vec<f64>,
    #[serde(rename = "feature_names_in_", default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(rename = "n_features_in_", default, skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
}

impl Transformer for MinMaxScaler {
    fn transform(&self, rows: &[Vec<f64>]) -> EstimatorResult<Vec<Vec<f64>>> {
        rows.iter()
            .map(|row| {
                check_scaler_width(self.kind(), row, self.min.len())?;
                Ok(row
                    .iter()
                    .zip(self.scale.iter().zip(&self.min))
                    .map(|(x, (s, m))| x * s + m)
                    .collect())
            })
            .collect()
    }

    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn n_features_in(&self) -> Option<usize> {
        self.n_features.or(Some(self.min.len()))
    }

    fn kind(&self) -> &'static str {
        "min_max_scaler"
    }
}
