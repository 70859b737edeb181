use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::{RequestError, SchemaError},
    model::PricingModel,
    schema::FeatureSchema,
    types::{round2, PredictionOut, WELCOME},
};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    mdl: Arc<PricingModel>,
    schema: Arc<FeatureSchema>, // authoritative input order
    log_pred: bool,
}

impl AppState {
    /// Refuses to build state for a model trained on different columns.
    pub fn new(mdl: PricingModel, schema: FeatureSchema, log_pred: bool) -> Result<Self, SchemaError> {
        schema.check_against(mdl.feature_names())?;
        Ok(Self {
            mdl: Arc::new(mdl),
            schema: Arc::new(schema),
            log_pred,
        })
    }

    pub fn model(&self) -> &PricingModel {
        &self.mdl
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/predict", post(predict))
        .with_state(state)
}

// ---------- Handlers ----------

async fn home() -> &'static str {
    WELCOME
}

async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionOut>, RequestError> {
    let out = run_prediction(&state, &body).inspect_err(|e| match e {
        RequestError::Model(err) => tracing::error!(error = %err, "prediction failed"),
        other => tracing::warn!(error = %other, "rejected predict request"),
    })?;
    Ok(Json(out))
}

fn run_prediction(state: &AppState, body: &[u8]) -> Result<PredictionOut, RequestError> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|e| RequestError::InvalidJson(e.to_string()))?;

    // Map incoming object -> ordered vector
    let row = state.schema.extract(&payload)?;

    if state.log_pred {
        log_row(&state.schema, &row);
    }

    let y = state.mdl.predict(&row)?;
    let predicted_cost = round2(y);
    tracing::debug!(raw = y, predicted_cost, "prediction ok");
    Ok(PredictionOut { predicted_cost })
}

fn log_row(schema: &FeatureSchema, row: &[f64]) {
    let nz = row.iter().filter(|x| **x != 0.0).count();
    let mean = if row.is_empty() { 0.0 } else { row.iter().sum::<f64>() / row.len() as f64 };
    let sample: Vec<String> = schema
        .names()
        .zip(row)
        .take(6)
        .map(|(name, v)| format!("{}={:.3}", name, v))
        .collect();
    tracing::info!(
        "recv in_dim={} nonzero={} mean={:.3} sample=[{}]",
        row.len(),
        nz,
        mean,
        sample.join(", ")
    );
}
