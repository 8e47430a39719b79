use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    http::header,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Form, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api_errors::AppError;
use crate::app_state::{AppContext, ContextStatus};
use crate::errors::EstimatorError;
use crate::form_normalizer::FormInput;
use crate::page::{render_page, SCRIPT};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: f64,
    pub prediction_text: String,
    pub scaled: bool,
}

/// Form page, prediction endpoints, static script and health checks
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_json))
        .route("/api/status", get(status))
        .route("/static/js/main.js", get(script))
        // health endpoints
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn home(State(ctx): State<Arc<AppContext>>) -> Html<String> {
    Html(render_page(&ctx.premiums, ctx.feature_set, None))
}

/// A missing model wins over any problem with the request body
fn require_model(ctx: &AppContext) -> Result<(), AppError> {
    if ctx.model().is_none() {
        warn!(message = "Prediction requested without a model");
        return Err(AppError::from(EstimatorError::ModelMissing));
    }
    Ok(())
}

#[axum::debug_handler]
async fn predict_form(
    State(ctx): State<Arc<AppContext>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Html<String>, AppError> {
    require_model(&ctx)?;
    let fields = match form {
        Ok(Form(fields)) => fields,
        // Bodies that are not form-encoded read as an empty form.
        Err(FormRejection::InvalidFormContentType(_)) => HashMap::new(),
        Err(rejection) => return Err(AppError::bad_request(rejection.body_text())),
    };

    let input = FormInput::from_text_fields(fields);
    let estimate = ctx.estimate(&input).map_err(|e| {
        warn!(message = "Prediction request failed", error = %e);
        AppError::from(e)
    })?;

    info!(message = "Prediction served", value = estimate.value, scaled = estimate.scaled);
    Ok(Html(render_page(
        &ctx.premiums,
        ctx.feature_set,
        Some(&estimate.text),
    )))
}

#[axum::debug_handler]
async fn predict_json(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<FormInput>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    require_model(&ctx)?;
    let Json(input) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let estimate = ctx.estimate(&input).map_err(|e| {
        warn!(message = "Prediction request failed", error = %e);
        AppError::from(e)
    })?;

    Ok(Json(PredictResponse {
        prediction: estimate.value,
        prediction_text: estimate.text,
        scaled: estimate.scaled,
    }))
}

async fn status(State(ctx): State<Arc<AppContext>>) -> Json<ContextStatus> {
    Json(ctx.status())
}

async fn script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript; charset=utf-8")], SCRIPT)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn readyz(State(ctx): State<Arc<AppContext>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ready": ctx.is_ready() }))
}
