use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

use crate::constants::SCRAPE_PATH;
use crate::modules::system::logger;
use crate::proxy::handlers::errors::{Capability, ProxyError};
use crate::proxy::handlers::extract::JsonBody;
use crate::proxy::mappers::models::ScrapeRequest;
use crate::proxy::mappers::request::map_scrape_request;
use crate::proxy::state::ProxyHandlerState;
use crate::proxy::upstream::UpstreamClient;

pub async fn handle_scrape(
    State(state): State<ProxyHandlerState>,
    JsonBody(req): JsonBody<ScrapeRequest>,
) -> Response {
    match scrape(&state.upstream, req).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => e.into_response_for(Capability::Scrape),
    }
}

async fn scrape(
    upstream: &UpstreamClient,
    req: ScrapeRequest,
) -> Result<serde_json::Value, ProxyError> {
    let body = map_scrape_request(req)?;
    logger::log_info(&format!(
        "Received scrape request: {} ({} element prompts)",
        body.url,
        body.element_prompts.len()
    ));
    upstream.post_json(SCRAPE_PATH, &body).await
}
