use std::sync::Arc;

use axum::http::Method;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::proxy::config::ProxyConfig;
use crate::proxy::AxumServer;
use crate::test_utils::{MockReply, MockUpstream};
use crate::ui::format::SummaryView;
use crate::ui::{HttpPlaygroundApi, ObjectUrlRegistry, Orchestrator, ResultSlot, Tab};

async fn start_playground(upstream: &MockUpstream) -> (AxumServer, Orchestrator, ObjectUrlRegistry) {
    let config = ProxyConfig {
        port: 0,
        ..ProxyConfig::default()
    };
    let (server, _handle) = AxumServer::start(&config, upstream.client(), CancellationToken::new())
        .await
        .expect("start server");
    let api = HttpPlaygroundApi::new(&format!("http://{}", server.local_addr())).expect("api");
    let urls = ObjectUrlRegistry::new();
    let orchestrator = Orchestrator::new(Arc::new(api), urls.clone());
    (server, orchestrator, urls)
}

#[tokio::test]
async fn prompt_tab_runs_create_and_run_end_to_end() {
    let upstream = MockUpstream::start(vec![
        (
            Method::POST,
            "/v1/prompt_engine",
            MockReply::json(200, json!({"success": true, "prompt_engine_id": "pe_1"})),
        ),
        (
            Method::POST,
            "/v1/prompt_engine/pe_1",
            MockReply::json(200, json!({"success": true, "result": "Once upon a time\nThe end"})),
        ),
    ])
    .await;
    let (server, mut orch, _) = start_playground(&upstream).await;

    orch.set_prompt("Tell me a story about {about}");
    orch.add_input_row();
    orch.edit_input_row(0, "about", "a cat");
    let submission = orch.begin_submit().expect("submission");
    let outcome = submission.execute().await;
    assert!(orch.complete(submission.generation, outcome));

    match &orch.view().result {
        ResultSlot::Prompt { output, .. } => assert_eq!(output, "Once upon a time\n\nThe end"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(
        upstream.hits()[1].json_body(),
        json!({"input_values": {"about": "a cat"}})
    );
    server.stop();
}

#[tokio::test]
async fn summary_tab_shows_bullets_and_errors() {
    let upstream = MockUpstream::start(vec![(
        Method::POST,
        "/v1/ai/summary",
        MockReply::json(200, json!({"success": true, "summary": ["one", "two"]})),
    )])
    .await;
    let (server, mut orch, _) = start_playground(&upstream).await;
    orch.switch_tab(Tab::Summary);

    let submission = orch.begin_submit().expect("submission");
    let outcome = submission.execute().await;
    orch.complete(submission.generation, outcome);
    assert!(matches!(
        &orch.view().result,
        ResultSlot::Error { error, .. } if error == "Text is required"
    ));

    orch.set_summary_text("Some long article");
    let submission = orch.begin_submit().expect("submission");
    let outcome = submission.execute().await;
    orch.complete(submission.generation, outcome);
    match &orch.view().result {
        ResultSlot::Summary(view) => assert_eq!(
            view,
            &SummaryView::Bullets(vec!["one".to_string(), "two".to_string()])
        ),
        other => panic!("unexpected result: {:?}", other),
    }
    server.stop();
}

#[tokio::test]
async fn image_tab_registers_and_releases_object_url() {
    let upstream = MockUpstream::start(vec![(
        Method::POST,
        "/v1/ai/image_generation",
        MockReply::raw(200, "image/png", b"\x89PNG-bytes"),
    )])
    .await;
    let (server, mut orch, urls) = start_playground(&upstream).await;
    orch.switch_tab(Tab::Image);
    orch.set_image_prompt("a lighthouse at dusk");

    let submission = orch.begin_submit().expect("submission");
    let outcome = submission.execute().await;
    orch.complete(submission.generation, outcome);

    let url = match &orch.view().result {
        ResultSlot::Image { url, model_label } => {
            assert_eq!(model_label, "Stable Diffusion XL");
            url.as_str().to_string()
        }
        other => panic!("unexpected result: {:?}", other),
    };
    let blob = urls.resolve(&url).expect("registered image");
    assert_eq!(blob.bytes.as_ref(), b"\x89PNG-bytes");

    drop(orch);
    assert!(urls.resolve(&url).is_none());
    server.stop();
}

#[tokio::test]
async fn image_tab_failure_shows_upstream_reason() {
    let upstream = MockUpstream::start(vec![(
        Method::POST,
        "/v1/ai/image_generation",
        MockReply::json(401, json!({"message": "Invalid API key"})),
    )])
    .await;
    let (server, mut orch, urls) = start_playground(&upstream).await;
    orch.switch_tab(Tab::Image);
    orch.set_image_prompt("a lighthouse at dusk");

    let submission = orch.begin_submit().expect("submission");
    let outcome = submission.execute().await;
    orch.complete(submission.generation, outcome);

    match &orch.view().result {
        ResultSlot::Error { error, details } => {
            assert_eq!(error, "Failed to generate image");
            assert_eq!(details.as_deref(), Some("Invalid API key"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(urls.live_count(), 0);
    server.stop();
}
