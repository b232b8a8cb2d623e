use std::sync::Arc;
use std::time::Instant;

use crate::proxy::upstream::UpstreamClient;

#[derive(Clone)]
pub struct CoreServices {
    pub upstream: Arc<UpstreamClient>,
}

#[derive(Clone)]
pub struct RuntimeState {
    pub started_at: Instant,
    pub port: u16,
}

// Axum application state
#[derive(Clone)]
pub struct AppState {
    pub core: Arc<CoreServices>,
    pub runtime: Arc<RuntimeState>,
}

impl AppState {
    pub fn new(upstream: Arc<UpstreamClient>, port: u16) -> Self {
        Self {
            core: Arc::new(CoreServices { upstream }),
            runtime: Arc::new(RuntimeState {
                started_at: Instant::now(),
                port,
            }),
        }
    }
}

/// What a proxy handler needs: only the upstream client.
#[derive(Clone)]
pub struct ProxyHandlerState {
    pub upstream: Arc<UpstreamClient>,
}

impl axum::extract::FromRef<AppState> for ProxyHandlerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            upstream: state.core.upstream.clone(),
        }
    }
}

impl axum::extract::FromRef<AppState> for Arc<RuntimeState> {
    fn from_ref(state: &AppState) -> Self {
        state.runtime.clone()
    }
}
