//! Library root for the `estate_estimator` crate

// Core error handling
pub mod api_errors;
pub mod errors;

// Artifacts
pub mod artifact;
pub mod artifact_loader;

// Feature alignment
pub mod feature_schema;
pub mod feature_vector;
pub mod form_normalizer;
pub mod scaler_compat;

// Prediction
pub mod predictor;

// Configuration & CLI
pub mod cli;
pub mod config_loader;
pub mod inspect;

// Web server interface
pub mod app_state;
pub mod page;
pub mod web;


pub use app_state::{AppContext, Estimate};
pub use errors::{EstimatorError, EstimatorResult};
