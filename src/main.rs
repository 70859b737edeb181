use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ride_pricing::{
    api::{self, AppState},
    config::ServerConfig,
    model::PricingModel,
    schema::FeatureSchema,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ride_pricing=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = ServerConfig::from_env()?;
    tracing::info!(model_path = %cfg.model_path.display(), addr = %cfg.addr, log_pred = cfg.log_pred, "starting");

    let mdl = PricingModel::load(&cfg.model_path)
        .with_context(|| format!("failed to load model from {}", cfg.model_path.display()))?;
    tracing::info!("expected feature names: {:?}", mdl.feature_names());
    tracing::info!("loaded model with {} trees", mdl.n_trees());

    let state = AppState::new(mdl, FeatureSchema::ride_pricing(), cfg.log_pred)
        .context("model columns do not match the ride request schema")?;

    // Warmup so a broken artifact fails here rather than on the first request
    let width = state.model().feature_names().len();
    state.model().predict(&vec![0.0; width])?;
    tracing::info!("warmup predict ok");

    let app = api::router(state);

    tracing::info!("listening on {}", cfg.addr);
    let listener = tokio::net::TcpListener::bind(cfg.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
