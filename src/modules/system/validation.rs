use crate::models::AppConfig;
use crate::proxy::config::{CorsConfig, CorsMode, ProxyConfig, UpstreamConfig};
use std::fmt;

const MAX_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub field: String,
    pub message: String,
    pub actual_value: Option<String>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual_value {
            Some(val) => write!(f, "  • {}: {} (got: {})", self.field, self.message, val),
            None => write!(f, "  • {}: {}", self.field, self.message),
        }
    }
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            actual_value: None,
        }
    }

    fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            actual_value: Some(value.to_string()),
        }
    }
}

pub fn validate_app_config(config: &AppConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    validate_proxy_config(&config.proxy, &mut errors);
    validate_upstream_config(&config.upstream, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_proxy_config(config: &ProxyConfig, errors: &mut Vec<ConfigError>) {
    if config.port == 0 {
        errors.push(ConfigError::with_value(
            "proxy.port",
            "must be between 1 and 65535",
            config.port,
        ));
    }
    if config.max_body_size == 0 {
        errors.push(ConfigError::with_value(
            "proxy.max_body_size",
            "must be greater than 0",
            config.max_body_size,
        ));
    }
    validate_cors_config(&config.cors, errors);
}

fn validate_upstream_config(config: &UpstreamConfig, errors: &mut Vec<ConfigError>) {
    if config.api_key.trim().is_empty() {
        errors.push(ConfigError::new(
            "upstream.api_key",
            "must not be empty (set JIGSAWSTACK_API_KEY)",
        ));
    }

    match url::Url::parse(config.base_url.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        Ok(parsed) => errors.push(ConfigError::with_value(
            "upstream.base_url",
            "scheme must be http or https",
            parsed.scheme(),
        )),
        Err(_) => errors.push(ConfigError::with_value(
            "upstream.base_url",
            "must be a valid URL",
            &config.base_url,
        )),
    }

    validate_timeout("upstream.request_timeout", config.request_timeout, errors);
    validate_timeout("upstream.connect_timeout", config.connect_timeout, errors);
}

fn validate_timeout(field: &str, value: u64, errors: &mut Vec<ConfigError>) {
    if value == 0 {
        errors.push(ConfigError::with_value(field, "must be greater than 0", value));
    } else if value > MAX_TIMEOUT_SECS {
        errors.push(ConfigError::with_value(
            field,
            "should not exceed 600 seconds (10 minutes)",
            value,
        ));
    }
}

fn validate_cors_config(config: &CorsConfig, errors: &mut Vec<ConfigError>) {
    if matches!(config.mode, CorsMode::Permissive) {
        return;
    }
    for (index, origin) in config.allowed_origins.iter().enumerate() {
        let trimmed = origin.trim();
        let valid = url::Url::parse(trimmed)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
            .unwrap_or(false);
        if !valid {
            errors.push(ConfigError::with_value(
                format!("proxy.cors.allowed_origins[{}]", index),
                "must be an http(s) origin such as http://localhost:3000",
                origin,
            ));
        }
    }
}
