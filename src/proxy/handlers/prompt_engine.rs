use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::constants::PROMPT_ENGINE_PATH;
use crate::modules::system::logger;
use crate::proxy::handlers::errors::{Capability, ProxyError};
use crate::proxy::handlers::extract::{JsonBody, PathParam, QueryParams};
use crate::proxy::mappers::models::{
    CreateAndRunRequest, IdQuery, ListQuery, PromptDefinition, PromptRunRequest,
};
use crate::proxy::mappers::request::{
    map_create_and_run_request, map_create_prompt_request, map_list_query,
    map_run_prompt_request, validate_prompt_engine_id,
};
use crate::proxy::sequencer::{self, prompt_engine_path};
use crate::proxy::state::ProxyHandlerState;
use crate::proxy::upstream::UpstreamClient;

// get/delete relay the upstream text as-is, labelled JSON.
fn raw_json_response(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

fn respond<T: IntoResponse>(result: Result<T, ProxyError>, capability: Capability) -> Response {
    match result {
        Ok(ok) => ok.into_response(),
        Err(e) => e.into_response_for(capability),
    }
}

pub async fn handle_create(
    State(state): State<ProxyHandlerState>,
    JsonBody(req): JsonBody<PromptDefinition>,
) -> Response {
    respond(
        create_prompt(&state.upstream, req).await.map(Json),
        Capability::PromptCreate,
    )
}

async fn create_prompt(
    upstream: &UpstreamClient,
    req: PromptDefinition,
) -> Result<Value, ProxyError> {
    let body = map_create_prompt_request(req)?;
    logger::log_info(&format!(
        "Creating prompt engine ({} declared inputs)",
        body.inputs.as_ref().map(Vec::len).unwrap_or(0)
    ));
    upstream.post_json(PROMPT_ENGINE_PATH, &body).await
}

pub async fn handle_create_and_run(
    State(state): State<ProxyHandlerState>,
    JsonBody(req): JsonBody<CreateAndRunRequest>,
) -> Response {
    let result = match map_create_and_run_request(req) {
        Ok((create, run)) => sequencer::create_and_run(&state.upstream, &create, &run).await,
        Err(e) => Err(e),
    };
    respond(result.map(Json), Capability::PromptCreateAndRun)
}

pub async fn handle_run(
    State(state): State<ProxyHandlerState>,
    PathParam(id): PathParam<String>,
    JsonBody(req): JsonBody<PromptRunRequest>,
) -> Response {
    respond(
        run_prompt(&state.upstream, &id, req).await.map(Json),
        Capability::PromptRun,
    )
}

async fn run_prompt(
    upstream: &UpstreamClient,
    id: &str,
    req: PromptRunRequest,
) -> Result<Value, ProxyError> {
    let id = validate_prompt_engine_id(Some(id))?;
    let body = map_run_prompt_request(req)?;
    logger::log_info(&format!(
        "Running prompt engine {} with {} input values",
        id,
        body.input_values.len()
    ));
    upstream.post_json(&prompt_engine_path(&id), &body).await
}

pub async fn handle_get(
    State(state): State<ProxyHandlerState>,
    PathParam(id): PathParam<String>,
) -> Response {
    respond(
        get_prompt(&state.upstream, Some(&id)).await.map(raw_json_response),
        Capability::PromptGet,
    )
}

pub async fn handle_get_by_query(
    State(state): State<ProxyHandlerState>,
    QueryParams(query): QueryParams<IdQuery>,
) -> Response {
    respond(
        get_prompt(&state.upstream, query.id.as_deref())
            .await
            .map(raw_json_response),
        Capability::PromptGet,
    )
}

async fn get_prompt(upstream: &UpstreamClient, id: Option<&str>) -> Result<String, ProxyError> {
    let id = validate_prompt_engine_id(id)?;
    logger::log_info(&format!("Fetching prompt engine {}", id));
    upstream.get_text(&prompt_engine_path(&id)).await
}

pub async fn handle_list(
    State(state): State<ProxyHandlerState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Response {
    respond(
        list_prompts(&state.upstream, query).await.map(Json),
        Capability::PromptList,
    )
}

async fn list_prompts(upstream: &UpstreamClient, query: ListQuery) -> Result<Value, ProxyError> {
    let pagination = map_list_query(query)?;
    logger::log_info(&format!(
        "Listing prompt engines: page={}, limit={}",
        pagination.page, pagination.limit
    ));
    upstream
        .get_json(PROMPT_ENGINE_PATH, &pagination.as_query())
        .await
}

pub async fn handle_delete(
    State(state): State<ProxyHandlerState>,
    PathParam(id): PathParam<String>,
) -> Response {
    respond(
        delete_prompt(&state.upstream, &id)
            .await
            .map(raw_json_response),
        Capability::PromptDelete,
    )
}

async fn delete_prompt(upstream: &UpstreamClient, id: &str) -> Result<String, ProxyError> {
    let id = validate_prompt_engine_id(Some(id))?;
    logger::log_info(&format!("Deleting prompt engine {}", id));
    upstream.delete_text(&prompt_engine_path(&id)).await
}
