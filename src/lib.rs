//! HTTP service that prices ride requests with a pre-trained
//! gradient-boosting regressor.
//!
//! The model is loaded once at startup ([`model::PricingModel::load`]),
//! checked against the declared column order ([`schema::FeatureSchema`]),
//! and shared read-only with every request through [`api::AppState`].

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod schema;
pub mod types;
