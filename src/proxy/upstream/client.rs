// Upstream client for the JigsawStack API.
// One instance is built from the validated config at startup and shared by
// every handler; the API key never comes from anywhere else.

use bytes::Bytes;
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tokio::time::Duration;

use crate::constants::API_KEY_HEADER;
use crate::proxy::config::UpstreamConfig;
use crate::proxy::handlers::errors::ProxyError;

pub struct UpstreamClient {
    client: Client,
    base_url: String,
    api_key: header::HeaderValue,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, String> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(crate::constants::USER_AGENT.as_str())
            .build()
            .map_err(|e| format!("failed_to_build_http_client: {}", e))?;

        let mut api_key = header::HeaderValue::from_str(config.api_key.trim())
            .map_err(|_| "upstream API key contains invalid header characters".to_string())?;
        api_key.set_sensitive(true);

        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.build_url(path))
            .header(header::CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, self.api_key.clone())
    }

    // Non-success statuses become ProxyError::Upstream; transport failures
    // convert through From<reqwest::Error>.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ProxyError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            tracing::debug!("✓ Upstream request succeeded | {} | {}", response.url().path(), status);
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let body = response.bytes().await.unwrap_or_default();
        tracing::warn!("Upstream {} returned {}", path, status);
        Err(ProxyError::Upstream {
            status: Some(status.as_u16()),
            detail: describe_upstream_failure(status, &body),
        })
    }

    async fn read_json(response: Response) -> Result<Value, ProxyError> {
        let status = response.status();
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ProxyError::Upstream {
            status: Some(status.as_u16()),
            detail: format!("Invalid JSON from upstream: {}", e),
        })
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ProxyError> {
        let response = self.send(self.request(Method::POST, path).json(body)).await?;
        Self::read_json(response).await
    }

    pub async fn post_for_bytes<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Bytes, ProxyError> {
        let response = self.send(self.request(Method::POST, path).json(body)).await?;
        Ok(response.bytes().await?)
    }

    pub async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ProxyError> {
        let response = self
            .send(self.request(Method::GET, path).query(query))
            .await?;
        Self::read_json(response).await
    }

    pub async fn get_text(&self, path: &str) -> Result<String, ProxyError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.text().await?)
    }

    pub async fn delete_text(&self, path: &str) -> Result<String, ProxyError> {
        let response = self.send(self.request(Method::DELETE, path)).await?;
        Ok(response.text().await?)
    }
}

/// Best-effort detail for a failed upstream call: the JSON `error` or
/// `message` string when present, the raw JSON otherwise, and a synthetic
/// status line when the body is not JSON at all.
pub fn describe_upstream_failure(status: StatusCode, body: &[u8]) -> String {
    let Ok(parsed) = serde_json::from_slice::<Value>(body) else {
        return format!("HTTP error! status: {}", status.as_u16());
    };
    for field in ["error", "message"] {
        match parsed.get(field) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(Value::Object(inner)) => {
                if let Some(Value::String(s)) = inner.get("message") {
                    return s.clone();
                }
            }
            _ => {}
        }
    }
    parsed.to_string()
}
