//! Shared context for the API layer.

use std::sync::Arc;

use crate::state::AppState;

/// Handler state: the shared `AppState` behind every route.
#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<AppState>,
}

impl ApiContext {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}
