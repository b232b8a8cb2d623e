use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::constants::IMAGE_GENERATION_PATH;
use crate::modules::system::logger;
use crate::proxy::handlers::errors::Capability;
use crate::proxy::handlers::extract::JsonBody;
use crate::proxy::mappers::models::ImageRequest;
use crate::proxy::mappers::request::map_image_request;
use crate::proxy::state::ProxyHandlerState;

/// Relays the generated image bytes untouched as `image/png`.
pub async fn handle_image_generation(
    State(state): State<ProxyHandlerState>,
    JsonBody(req): JsonBody<ImageRequest>,
) -> Response {
    let body = match map_image_request(req) {
        Ok(body) => body,
        Err(e) => return e.into_response_for(Capability::ImageGeneration),
    };
    logger::log_info(&format!(
        "Received image generation request: model={}, size={}",
        body.model, body.size
    ));

    match state
        .upstream
        .post_for_bytes(IMAGE_GENERATION_PATH, &body)
        .await
    {
        Ok(image) => {
            tracing::debug!("Image generation returned {} bytes", image.len());
            (StatusCode::OK, [(header::CONTENT_TYPE, "image/png")], image).into_response()
        }
        Err(e) => e.into_response_for(Capability::ImageGeneration),
    }
}
