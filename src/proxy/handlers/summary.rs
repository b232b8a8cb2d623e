use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

use crate::constants::SUMMARY_PATH;
use crate::modules::system::logger;
use crate::proxy::handlers::errors::Capability;
use crate::proxy::handlers::extract::JsonBody;
use crate::proxy::mappers::models::SummaryRequest;
use crate::proxy::mappers::request::map_summary_request;
use crate::proxy::state::ProxyHandlerState;

pub async fn handle_summary(
    State(state): State<ProxyHandlerState>,
    JsonBody(req): JsonBody<SummaryRequest>,
) -> Response {
    let body = match map_summary_request(req) {
        Ok(body) => body,
        Err(e) => return e.into_response_for(Capability::Summary),
    };
    logger::log_info(&format!(
        "Received summary request: {} chars, type={}",
        body.text.chars().count(),
        body.summary_type
    ));

    match state.upstream.post_json(SUMMARY_PATH, &body).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => e.into_response_for(Capability::Summary),
    }
}
