use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::dashboard::Dashboard;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single controller. Handlers lock it per action; analysis releases it
    /// while the scoring request is in flight.
    pub dashboard: Arc<Mutex<Dashboard>>,
    pub config: Config,
}

impl AppState {
    pub fn new(dashboard: Dashboard, config: Config) -> Self {
        Self {
            dashboard: Arc::new(Mutex::new(dashboard)),
            config,
        }
    }
}
