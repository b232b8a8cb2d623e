use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};
use thiserror::Error;

/// One call the playground page can make against the local proxy routes.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    CreateAndRunPrompt {
        query: String,
        inputs: BTreeMap<String, String>,
    },
    Scrape {
        url: String,
        element_prompts: Vec<String>,
    },
    Summary {
        text: String,
        summary_type: String,
    },
    GenerateImage {
        prompt: String,
        model: String,
        size: String,
    },
}

impl ApiCall {
    pub fn route(&self) -> &'static str {
        match self {
            ApiCall::CreateAndRunPrompt { .. } => "/api/prompt-engine/create-and-run",
            ApiCall::Scrape { .. } => "/api/ai-scrape",
            ApiCall::Summary { .. } => "/api/summary",
            ApiCall::GenerateImage { .. } => "/api/image-generation",
        }
    }

    pub fn body(&self) -> Value {
        match self {
            ApiCall::CreateAndRunPrompt { query, inputs } => {
                json!({ "query": query, "inputs": inputs })
            }
            ApiCall::Scrape {
                url,
                element_prompts,
            } => json!({ "url": url, "element_prompts": element_prompts }),
            ApiCall::Summary { text, summary_type } => json!({ "text": text, "type": summary_type }),
            ApiCall::GenerateImage {
                prompt,
                model,
                size,
            } => json!({ "prompt": prompt, "model": model, "size": size }),
        }
    }

    pub fn expects_image(&self) -> bool {
        matches!(self, ApiCall::GenerateImage { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply {
    Json(Value),
    Image(Bytes),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct ApiFailure {
    pub error: String,
    pub details: Option<String>,
}

impl ApiFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Reads the `{error, details}` body of a failed proxy response. Falls
    /// back to the HTTP status when the body is not usable.
    pub fn from_response_body(status: u16, body: &[u8]) -> Self {
        let parsed: Option<Value> = serde_json::from_slice(body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            error: field("error").unwrap_or_else(|| format!("HTTP error! status: {}", status)),
            details: field("details"),
        }
    }
}

#[async_trait]
pub trait PlaygroundApi: Send + Sync {
    async fn call(&self, call: &ApiCall) -> Result<ApiReply, ApiFailure>;
}

/// Talks to a running playground server over HTTP.
pub struct HttpPlaygroundApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPlaygroundApi {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(crate::constants::USER_AGENT.as_str())
            .build()
            .map_err(|e| format!("failed_to_build_http_client: {}", e))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PlaygroundApi for HttpPlaygroundApi {
    async fn call(&self, call: &ApiCall) -> Result<ApiReply, ApiFailure> {
        let url = format!("{}{}", self.base_url, call.route());
        let response = self
            .client
            .post(&url)
            .json(&call.body())
            .send()
            .await
            .map_err(|e| ApiFailure::new(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiFailure::new(e.to_string()))?;
        if !status.is_success() {
            return Err(ApiFailure::from_response_body(status.as_u16(), &body));
        }

        if call.expects_image() {
            Ok(ApiReply::Image(body))
        } else {
            serde_json::from_slice(&body)
                .map(ApiReply::Json)
                .map_err(|e| ApiFailure::new(format!("Invalid JSON response: {}", e)))
        }
    }
}
