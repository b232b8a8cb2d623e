use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// Local request bodies. Every field is optional at the serde level so a
// missing field surfaces as a validation message rather than a decode error.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub element_prompts: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "type")]
    pub summary_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

/// A declared input slot of a prompt engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptInput {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptDefinition {
    #[serde(default, alias = "prompt")]
    pub query: Option<String>,
    #[serde(default)]
    pub inputs: Option<Vec<PromptInput>>,
    #[serde(default)]
    pub return_prompt: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAndRunRequest {
    #[serde(default, alias = "prompt")]
    pub query: Option<String>,
    #[serde(default)]
    pub inputs: Option<BTreeMap<String, String>>,
}

/// Body of `/prompt-engine/run/:id`. Values may arrive as `input_values`
/// (a key → value map) or as `inputs` in either map or `[{key, value}]` form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptRunRequest {
    #[serde(default)]
    pub input_values: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub inputs: Option<Value>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub return_prompt: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    pub id: Option<String>,
}

// Upstream request bodies.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeBody {
    pub url: String,
    pub element_prompts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryBody {
    pub text: String,
    #[serde(rename = "type")]
    pub summary_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageBody {
    pub prompt: String,
    pub model: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePromptBody {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<PromptInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_prompt: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunPromptBody {
    pub input_values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn as_query(&self) -> [(&'static str, String); 2] {
        [("page", self.page.to_string()), ("limit", self.limit.to_string())]
    }
}
