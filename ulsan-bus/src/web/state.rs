//! Application state for the web layer.

use std::sync::Arc;

use crate::platform::Platform;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Every entity built at bootstrap
    pub platform: Arc<Platform>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(platform: Arc<Platform>) -> Self {
        Self { platform }
    }
}
