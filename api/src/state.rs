use crate::clock::Clock;
use crate::config::Config;
use crate::upstream::ActivityServiceClient;
use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub upstream: ActivityServiceClient,
    pub clock: Arc<dyn Clock>,
    pub registry: Registry,
    pub started_at: Instant,
}

impl AppState {
    /// Build state with a fresh upstream client pointed at
    /// `config.backend_api_url`.
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let upstream = ActivityServiceClient::new(config.backend_api_url.clone())?;
        Ok(Self::with_upstream(config, upstream, clock))
    }

    pub fn with_upstream(
        config: Config,
        upstream: ActivityServiceClient,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let registry = Registry::new();
        if let Err(e) = crate::metrics::register_all(&registry) {
            tracing::error!("Failed to register metrics: {}", e);
        }

        Self {
            config: Arc::new(config),
            upstream,
            clock,
            registry,
            started_at: Instant::now(),
        }
    }
}
