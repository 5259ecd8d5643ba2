//! Prediction form and JSON API.

use axum::{extract::State, response::Html, Form, Json};
use pestiform_molecules::{ErrorKind, Verdict};
use serde::{Deserialize, Serialize};

use crate::handlers::WebError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct PredictForm {
    /// Missing field is treated as an empty identifier
    #[serde(default)]
    pub chemical: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub chemical: String,
    pub label: i64,
    pub result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run the pipeline; any failure becomes an invalid verdict.
async fn classify(state: &SharedState, chemical: &str) -> PredictResponse {
    let (verdict, failure) = match state.pipeline.predict(chemical).await {
        Ok(verdict) => (verdict, None),
        Err(e) => (Verdict::Invalid, Some((e.kind(), e.to_string()))),
    };
    let (error_kind, error) = failure.unzip();
    PredictResponse {
        chemical: chemical.to_string(),
        label: verdict.label(),
        result: verdict.result_text(),
        error_kind,
        error,
    }
}

pub async fn main_page(State(state): State<SharedState>) -> Result<Html<String>, WebError> {
    Ok(Html(state.render_main(None, None)?))
}

pub async fn main_submit(
    State(state): State<SharedState>,
    Form(form): Form<PredictForm>,
) -> Result<Html<String>, WebError> {
    let outcome = classify(&state, &form.chemical).await;
    Ok(Html(state.render_main(Some(&form.chemical), Some(outcome.result))?))
}

pub async fn api_predict(
    State(state): State<SharedState>,
    Json(req): Json<PredictForm>,
) -> Json<PredictResponse> {
    Json(classify(&state, &req.chemical).await)
}
