use config::Config;
use log::info;
use sse::Manager;
use std::sync::Arc;

pub mod config;
pub mod logging;

/// Builds the process-wide SSE manager from configuration.
pub fn init_sse_manager(config: &Config) -> Manager {
    info!(
        "SSE manager config: keep_alive={}s",
        config.keep_alive().as_secs()
    );

    Manager::builder().keep_alive(config.keep_alive()).build()
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub sse_manager: Arc<Manager>,
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config, sse_manager: &Arc<Manager>) -> Self {
        Self {
            sse_manager: Arc::clone(sse_manager),
            config: app_config,
        }
    }

    pub fn sse_manager_ref(&self) -> &Manager {
        self.sse_manager.as_ref()
    }
}
