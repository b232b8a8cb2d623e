//! Create-and-run: create a prompt engine, then execute it once.
//!
//! The two calls are not atomic. When the run step fails the created prompt
//! engine stays on the upstream service; nothing here cleans it up.

use serde_json::{json, Value};

use crate::constants::PROMPT_ENGINE_PATH;
use crate::modules::system::logger;
use crate::proxy::handlers::errors::ProxyError;
use crate::proxy::mappers::models::{CreatePromptBody, RunPromptBody};
use crate::proxy::upstream::UpstreamClient;

pub const CREATE_FAILED: &str = "failed to create prompt engine";

pub fn prompt_engine_path(id: &str) -> String {
    format!("{}/{}", PROMPT_ENGINE_PATH, id)
}

/// Pulls the id out of a create response. A response flagged
/// `success: false`, or one without a usable id, yields `None`.
pub fn extract_prompt_engine_id(created: &Value) -> Option<String> {
    if created.get("success").and_then(Value::as_bool) == Some(false) {
        return None;
    }
    created
        .get("prompt_engine_id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

pub async fn create_and_run(
    upstream: &UpstreamClient,
    create: &CreatePromptBody,
    run: &RunPromptBody,
) -> Result<Value, ProxyError> {
    let created = upstream.post_json(PROMPT_ENGINE_PATH, create).await?;
    let id = extract_prompt_engine_id(&created).ok_or_else(|| {
        logger::log_warn(&format!("Create step returned no prompt engine id: {}", created));
        ProxyError::Sequence(CREATE_FAILED.to_string())
    })?;
    logger::log_info(&format!("Created prompt engine {}, running it", id));

    let ran = upstream.post_json(&prompt_engine_path(&id), run).await?;
    let result = ran.get("result").cloned().unwrap_or(Value::Null);
    Ok(json!({ "result": result }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_extracted_from_successful_create() {
        let created = json!({"success": true, "prompt_engine_id": "pe_123"});
        assert_eq!(extract_prompt_engine_id(&created).as_deref(), Some("pe_123"));
    }

    #[test]
    fn explicit_failure_flag_wins_over_id() {
        let created = json!({"success": false, "prompt_engine_id": "pe_123"});
        assert_eq!(extract_prompt_engine_id(&created), None);
    }

    #[test]
    fn missing_or_blank_id_is_none() {
        assert_eq!(extract_prompt_engine_id(&json!({"success": true})), None);
        assert_eq!(
            extract_prompt_engine_id(&json!({"prompt_engine_id": "  "})),
            None
        );
        assert_eq!(extract_prompt_engine_id(&json!({"prompt_engine_id": 42})), None);
    }

    #[test]
    fn run_path_embeds_id() {
        assert_eq!(prompt_engine_path("X"), "/v1/prompt_engine/X");
    }
}
