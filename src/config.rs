use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

use crate::error::ConfigError;

pub const DEFAULT_MODEL_PATH: &str = "models/gradient_boosting_model.json";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub model_path: PathBuf,
    pub addr: SocketAddr,
    /// Log a summary of every assembled feature row.
    pub log_pred: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Builds the config from any key lookup; unset keys take defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let model_path = get("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        let bind = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let ip: IpAddr = bind.parse().map_err(|_| ConfigError::Invalid {
            var: "BIND_ADDR",
            value: bind.clone(),
        })?;

        let port = match get("PORT") {
            Some(p) => p.parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: p.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            model_path,
            addr: SocketAddr::new(ip, port),
            log_pred: get("LOG_PRED").as_deref() == Some("1"),
        })
    }
}
