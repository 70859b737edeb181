use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;

/// Failures while loading or evaluating the pricing model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("malformed model artifact: {0}")]
    Malformed(String),

    #[error("feature length mismatch: got {got}, expected {expected}")]
    DimensionMismatch { got: usize, expected: usize },

    #[error("input contains a non-finite value for `{0}`")]
    NonFiniteInput(String),

    #[error("model produced a non-finite prediction")]
    NonFiniteOutput,
}

/// The declared column order disagrees with the model artifact.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("schema declares {schema} features but model expects {model}")]
    Length { schema: usize, model: usize },

    #[error("column {index}: schema has `{schema}` but model expects `{model}`")]
    Column {
        index: usize,
        schema: String,
        model: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var} value `{value}`")]
    Invalid { var: &'static str, value: String },
}

/// Per-request failures. Rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("could not convert `{field}` to float: {found}")]
    InvalidValue { field: &'static str, found: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
