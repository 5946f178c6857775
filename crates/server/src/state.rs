use std::sync::Arc;

use jackett_relay_core::{Config, ResultAggregator, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    aggregator: Arc<ResultAggregator>,
}

impl AppState {
    pub fn new(config: Config, aggregator: Arc<ResultAggregator>) -> Self {
        Self { config, aggregator }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn aggregator(&self) -> &ResultAggregator {
        self.aggregator.as_ref()
    }
}
