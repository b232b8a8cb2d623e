mod playground_flow;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::proxy::config::ProxyConfig;
use crate::proxy::server::build_app;
use crate::proxy::state::AppState;
use crate::test_utils::MockUpstream;

pub(crate) fn app_for(upstream: &MockUpstream) -> Router {
    build_app(AppState::new(upstream.client(), 0), &ProxyConfig::default())
}

pub(crate) async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .expect("request");
    app.clone().oneshot(request).await.expect("response")
}

pub(crate) async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(&body.to_string())).await
}

pub(crate) async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

pub(crate) async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}
