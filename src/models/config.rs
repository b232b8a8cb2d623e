use crate::proxy::config::{ProxyConfig, UpstreamConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
