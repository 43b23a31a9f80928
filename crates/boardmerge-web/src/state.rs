//! Shared application state

use crate::config::Config;

/// State shared by every request handler
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}
