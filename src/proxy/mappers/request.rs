use std::collections::BTreeMap;

use serde_json::Value;

use super::models::*;
use crate::constants::{
    is_known_image_model, is_known_image_size, DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_SIZE,
    DEFAULT_LIST_LIMIT, DEFAULT_LIST_PAGE, DEFAULT_SUMMARY_TYPE, IMAGE_SIZES,
};
use crate::proxy::handlers::errors::ProxyError;

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn map_scrape_request(req: ScrapeRequest) -> Result<ScrapeBody, ProxyError> {
    let url = non_blank(req.url).ok_or_else(|| ProxyError::validation("URL is required."))?;
    let element_prompts: Vec<String> = req
        .element_prompts
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect();
    if element_prompts.is_empty() {
        return Err(ProxyError::validation(
            "At least one element prompt is required.",
        ));
    }
    Ok(ScrapeBody {
        url,
        element_prompts,
    })
}

pub fn map_summary_request(req: SummaryRequest) -> Result<SummaryBody, ProxyError> {
    let text = non_blank(req.text).ok_or_else(|| ProxyError::validation("Text is required"))?;
    Ok(SummaryBody {
        text,
        summary_type: non_blank(req.summary_type)
            .unwrap_or_else(|| DEFAULT_SUMMARY_TYPE.to_string()),
    })
}

pub fn map_image_request(req: ImageRequest) -> Result<ImageBody, ProxyError> {
    let prompt =
        non_blank(req.prompt).ok_or_else(|| ProxyError::validation("Prompt is required"))?;
    let model = non_blank(req.model).unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());
    if !is_known_image_model(&model) {
        return Err(ProxyError::validation(format!(
            "Unsupported image model: {}",
            model
        )));
    }
    let size = non_blank(req.size).unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string());
    if !is_known_image_size(&size) {
        return Err(ProxyError::validation(format!(
            "Unsupported image size: {} (expected one of {})",
            size,
            IMAGE_SIZES.join(", ")
        )));
    }
    Ok(ImageBody {
        prompt,
        model,
        size,
    })
}

/// The local `query` is sent upstream as `prompt`.
pub fn map_create_prompt_request(req: PromptDefinition) -> Result<CreatePromptBody, ProxyError> {
    let prompt =
        non_blank(req.query).ok_or_else(|| ProxyError::validation("Prompt is required"))?;
    if let Some(inputs) = &req.inputs {
        if let Some(index) = inputs.iter().position(|i| i.key.trim().is_empty()) {
            return Err(ProxyError::validation(format!(
                "inputs[{}].key must not be empty",
                index
            )));
        }
    }
    Ok(CreatePromptBody {
        prompt,
        inputs: req.inputs,
        return_prompt: req.return_prompt.filter(|v| !v.is_null()),
    })
}

pub fn map_run_prompt_request(req: PromptRunRequest) -> Result<RunPromptBody, ProxyError> {
    if req.query.is_some() || req.return_prompt.is_some() {
        tracing::debug!("Ignoring query/return_prompt on run; the stored prompt engine is used");
    }
    let input_values = match (req.input_values, req.inputs) {
        (Some(values), _) => values,
        (None, Some(inputs)) => input_values_from(&inputs)?,
        (None, None) => BTreeMap::new(),
    };
    Ok(RunPromptBody { input_values })
}

fn input_values_from(inputs: &Value) -> Result<BTreeMap<String, String>, ProxyError> {
    match inputs {
        Value::Null => Ok(BTreeMap::new()),
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect()),
        Value::Array(items) => {
            let mut values = BTreeMap::new();
            for item in items {
                let key = item.get("key").and_then(Value::as_str).unwrap_or("");
                match item.get("value").and_then(Value::as_str) {
                    Some(value) if !key.is_empty() => {
                        values.insert(key.to_string(), value.to_string());
                    }
                    _ => {}
                }
            }
            Ok(values)
        }
        _ => Err(ProxyError::validation(
            "inputs must be an object or a list of {key, value}",
        )),
    }
}

/// Builds the create step of create-and-run: one declared input per
/// supplied key, all required.
pub fn map_create_and_run_request(
    req: CreateAndRunRequest,
) -> Result<(CreatePromptBody, RunPromptBody), ProxyError> {
    let prompt =
        non_blank(req.query).ok_or_else(|| ProxyError::validation("Prompt is required"))?;
    let input_values = req.inputs.unwrap_or_default();
    let declared = if input_values.is_empty() {
        None
    } else {
        Some(
            input_values
                .keys()
                .map(|key| PromptInput {
                    key: key.clone(),
                    value: None,
                    optional: false,
                })
                .collect(),
        )
    };
    Ok((
        CreatePromptBody {
            prompt,
            inputs: declared,
            return_prompt: None,
        },
        RunPromptBody { input_values },
    ))
}

pub fn map_list_query(query: ListQuery) -> Result<Pagination, ProxyError> {
    Ok(Pagination {
        page: parse_positive("page", query.page, DEFAULT_LIST_PAGE)?,
        limit: parse_positive("limit", query.limit, DEFAULT_LIST_LIMIT)?,
    })
}

fn parse_positive(field: &str, raw: Option<String>, default: u32) -> Result<u32, ProxyError> {
    match non_blank(raw) {
        None => Ok(default),
        Some(value) => match value.trim().parse::<u32>() {
            Ok(parsed) if parsed > 0 => Ok(parsed),
            _ => Err(ProxyError::validation(format!(
                "{} must be a positive integer (got: {})",
                field, value
            ))),
        },
    }
}

/// Prompt engine ids are opaque upstream tokens; only path-safe ones are
/// accepted so they can be spliced into the upstream URL verbatim.
pub fn validate_prompt_engine_id(id: Option<&str>) -> Result<String, ProxyError> {
    let id = id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ProxyError::validation("Prompt engine id is required"))?;
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ProxyError::validation(format!(
            "Invalid prompt engine id: {}",
            id
        )));
    }
    Ok(id.to_string())
}
