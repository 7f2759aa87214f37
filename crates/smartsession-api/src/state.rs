//! Application state.

use std::sync::Arc;

use smartsession_monitor::BroadcastRegistry;
use smartsession_vision::{create_provider, FaceProvider};

use crate::config::ApiConfig;
use crate::error::ApiResult;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub registry: Arc<BroadcastRegistry>,
    pub vision: Arc<dyn FaceProvider>,
}

impl AppState {
    /// Create new application state with the compiled-in detection backend.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let vision = create_provider(&config.vision)?;
        Ok(Self::with_provider(config, vision))
    }

    /// Create state around an explicit detection provider.
    pub fn with_provider(config: ApiConfig, vision: Arc<dyn FaceProvider>) -> Self {
        let registry = BroadcastRegistry::new(config.monitor.broadcast_send_timeout);
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            vision,
        }
    }
}
