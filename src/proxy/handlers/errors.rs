use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::modules::system::logger;

/// One entry per proxied endpoint. Supplies the headline shown to the user
/// when the call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Scrape,
    Summary,
    ImageGeneration,
    PromptCreate,
    PromptRun,
    PromptCreateAndRun,
    PromptGet,
    PromptList,
    PromptDelete,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Scrape => "scrape",
            Capability::Summary => "summary",
            Capability::ImageGeneration => "image-generation",
            Capability::PromptCreate => "prompt-create",
            Capability::PromptRun => "prompt-run",
            Capability::PromptCreateAndRun => "prompt-create-and-run",
            Capability::PromptGet => "prompt-get",
            Capability::PromptList => "prompt-list",
            Capability::PromptDelete => "prompt-delete",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Capability::Scrape => "An error occurred while scraping",
            Capability::Summary => "An error occurred while summarizing",
            Capability::ImageGeneration => "Error calling JigsawStack API",
            Capability::PromptCreate => "An error occurred while creating the prompt",
            Capability::PromptRun => "An error occurred while running the prompt",
            Capability::PromptCreateAndRun => {
                "An error occurred while creating and running the prompt"
            }
            Capability::PromptGet => "An error occurred while getting the prompt",
            Capability::PromptList => "An error occurred while listing prompts",
            Capability::PromptDelete => "An error occurred while deleting the prompt",
        }
    }
}

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Missing or malformed local input. No upstream call has been made.
    #[error("{0}")]
    Validation(String),

    /// Upstream answered with a failure status or a body we could not use.
    #[error("{detail}")]
    Upstream { status: Option<u16>, detail: String },

    /// A later step of a multi-call workflow could not proceed.
    #[error("{0}")]
    Sequence(String),

    #[error("{0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        ProxyError::Unexpected(e.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

impl ProxyError {
    pub fn validation(message: impl Into<String>) -> Self {
        ProxyError::Validation(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Validation(_) => "validation_error",
            ProxyError::Upstream { .. } => "upstream_error",
            ProxyError::Sequence(_) => "sequence_error",
            ProxyError::Unexpected(_) => "unexpected_error",
        }
    }

    // Single policy: local input problems are 400, everything else is 500.
    // The upstream status, when known, travels in the body instead.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response_for(self, capability: Capability) -> Response {
        let status = self.status_code();
        let kind = self.kind();
        let body = match self {
            ProxyError::Validation(message) => {
                logger::log_info(&format!(
                    "[{}] {}: {}",
                    capability.name(),
                    kind,
                    message
                ));
                ErrorBody {
                    error: message,
                    details: None,
                    upstream_status: None,
                }
            }
            ProxyError::Upstream {
                status: upstream_status,
                detail,
            } => {
                logger::log_warn(&format!(
                    "[{}] {} (status {:?}): {}",
                    capability.name(),
                    kind,
                    upstream_status,
                    detail
                ));
                ErrorBody {
                    error: capability.failure_message().to_string(),
                    details: Some(detail),
                    upstream_status,
                }
            }
            ProxyError::Sequence(detail) | ProxyError::Unexpected(detail) => {
                logger::log_error(&format!("[{}] {}: {}", capability.name(), kind, detail));
                ErrorBody {
                    error: capability.failure_message().to_string(),
                    details: Some(detail),
                    upstream_status: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

// Used for extractor rejections, which happen before a capability is known.
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ProxyError::Validation(message) => ErrorBody {
                error: message,
                details: None,
                upstream_status: None,
            },
            other => ErrorBody {
                error: "An unexpected error occurred".to_string(),
                details: Some(other.to_string()),
                upstream_status: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
