use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::feature_vector::{FeatureSet, PremiumTable};

/// Default config file, overridable through `ESTIMATOR_CONFIG`
pub const DEFAULT_CONFIG_FILE: &str = "estimator.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EstimatorConfig {
    pub host: String,
    pub port: u16,
    pub artifact_dir: PathBuf,
    pub scaler_candidates: Vec<String>,
    pub model_candidates: Vec<String>,
    pub feature_set: FeatureSet,
    pub log_level: String,
    #[serde(default = "PremiumTable::default_premiums")]
    pub premiums: BTreeMap<String, f64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            artifact_dir: PathBuf::from("."),
            scaler_candidates: vec!["scalar.json".into(), "scaler.json".into()],
            model_candidates: vec!["newmodel.json".into(), "model.json".into()],
            feature_set: FeatureSet::Extended,
            log_level: "info".into(),
            premiums: PremiumTable::default_premiums(),
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<(), figment::Error> {
        if self.scaler_candidates.is_empty() || self.model_candidates.is_empty() {
            return Err(figment::Error::from(
                "artifact candidate lists must not be empty".to_string(),
            ));
        }
        if let Some((loc, p)) = self.premiums.iter().find(|(_, p)| !(**p > 0.0 && p.is_finite())) {
            return Err(figment::Error::from(format!(
                "premium for '{loc}' must be a positive number, got {p}"
            )));
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(figment::Error::from(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }
        Ok(())
    }

    pub fn premium_table(&self) -> PremiumTable {
        PremiumTable::new(self.premiums.clone())
    }
}

/// Layered figment: defaults, then the TOML file, then `ESTIMATOR_*`
/// variables, then `PORT`.
pub fn figment(config_file: Option<&str>) -> Figment {
    let file = config_file
        .map(str::to_string)
        .or_else(|| std::env::var("ESTIMATOR_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    Figment::from(Serialized::defaults(EstimatorConfig::default()))
        .merge(Toml::file(file))
        .merge(Env::prefixed("ESTIMATOR_").ignore(&["config"]))
        .merge(Env::raw().only(&["port"]))
}

pub fn load_config(config_file: Option<&str>) -> Result<EstimatorConfig, figment::Error> {
    let config: EstimatorConfig = figment(config_file).extract()?;
    config.validate()?;
    Ok(config)
}
