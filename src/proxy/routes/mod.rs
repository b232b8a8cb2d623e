use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::proxy::handlers;
use crate::proxy::health::health_check_handler;
use crate::proxy::middleware::request_context_middleware;
use crate::proxy::state::AppState;
use crate::ui::page::handle_index;

fn build_api_routes() -> Router<AppState> {
    Router::new()
        .route("/scrape", post(handlers::scrape::handle_scrape))
        .route("/ai-scrape", post(handlers::scrape::handle_scrape))
        .route("/summary", post(handlers::summary::handle_summary))
        .route(
            "/image-generation",
            post(handlers::image::handle_image_generation),
        )
        .nest("/prompt-engine", build_prompt_engine_routes())
}

fn build_prompt_engine_routes() -> Router<AppState> {
    use handlers::prompt_engine as pe;

    Router::new()
        .route("/create", post(pe::handle_create))
        .route("/create-and-run", post(pe::handle_create_and_run))
        .route("/run/:id", post(pe::handle_run))
        .route("/get", get(pe::handle_get_by_query))
        .route("/get/:id", get(pe::handle_get))
        .route("/list", get(pe::handle_list))
        .route("/delete/:id", delete(pe::handle_delete))
}

pub fn build_proxy_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(health_check_handler))
        .route("/healthz", get(health_check_handler))
        .nest("/api", build_api_routes())
        .layer(axum::middleware::from_fn(request_context_middleware))
}
