use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::proxy::config::{CorsConfig, CorsMode};

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
const CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");

fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Skipping unusable CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect()
}

/// Browser access to the playground routes. Same-origin use (the page served
/// at `/`) needs none of this; the layer only matters for other origins.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .expose_headers([REQUEST_ID])
        .allow_credentials(false)
        .max_age(Duration::from_secs(3600));

    match config.mode {
        CorsMode::Permissive => layer.allow_origin(Any).allow_headers(Any),
        CorsMode::Strict => {
            let layer = layer.allow_headers([header::CONTENT_TYPE, REQUEST_ID, CORRELATION_ID]);
            let origins = parse_origins(&config.allowed_origins);
            if origins.is_empty() {
                layer
            } else {
                layer.allow_origin(AllowOrigin::list(origins))
            }
        }
    }
}
