use serde::{Deserialize, Serialize};

pub const WELCOME: &str =
    "Welcome to the Dynamic Pricing API. Use the /predict endpoint to get predictions.";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionOut {
    pub predicted_cost: f64,
}

/// Rounds half away from zero to two decimals.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
