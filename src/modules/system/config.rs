use std::fs;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::models::AppConfig;

const DATA_DIR: &str = ".jigsaw-playground";
const CONFIG_FILE: &str = "config.json";

pub const ENV_DATA_DIR: &str = "PLAYGROUND_DATA_DIR";
pub const ENV_API_KEY: &str = "JIGSAWSTACK_API_KEY";
pub const ENV_BASE_URL: &str = "JIGSAWSTACK_BASE_URL";
pub const ENV_PORT: &str = "PLAYGROUND_PORT";
pub const ENV_ALLOW_LAN_ACCESS: &str = "PLAYGROUND_ALLOW_LAN_ACCESS";

pub fn get_data_dir() -> AppResult<PathBuf> {
    let data_dir = match std::env::var(ENV_DATA_DIR) {
        Ok(env_path) if !env_path.trim().is_empty() => PathBuf::from(env_path),
        _ => dirs::home_dir()
            .ok_or_else(|| AppError::Config("failed_to_resolve_home_dir".to_string()))?
            .join(DATA_DIR),
    };

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }
    Ok(data_dir)
}

pub fn load_app_config() -> AppResult<AppConfig> {
    let config_path = get_data_dir()?.join(CONFIG_FILE);

    if !config_path.exists() {
        let config = AppConfig::new();
        if let Err(e) = save_app_config(&config) {
            tracing::warn!("Failed to write default config to {:?}: {}", config_path, e);
        }
        return Ok(config);
    }

    let content = fs::read_to_string(&config_path)?;
    let config: AppConfig = serde_json::from_str(&content)
        .map_err(|e| AppError::Config(format!("failed_to_parse_config_file: {}", e)))?;
    Ok(config)
}

pub fn save_app_config(config: &AppConfig) -> AppResult<()> {
    let config_path = get_data_dir()?.join(CONFIG_FILE);
    let content = serde_json::to_string_pretty(config)?;
    fs::write(&config_path, content)?;
    Ok(())
}

fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Applies process environment on top of the persisted config. Runs once at
/// startup; nothing downstream reads these variables again.
pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(key) = std::env::var(ENV_API_KEY) {
        if !key.trim().is_empty() {
            tracing::info!("Using upstream API key from environment");
            config.upstream.api_key = key.trim().to_string();
        }
    }

    if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
        if !base_url.trim().is_empty() {
            tracing::info!("Using upstream base URL from environment: {}", base_url);
            config.upstream.base_url = base_url.trim().to_string();
        }
    }

    if let Ok(port) = std::env::var(ENV_PORT) {
        match port.trim().parse::<u16>() {
            Ok(parsed) => {
                tracing::info!("Using port from environment: {}", parsed);
                config.proxy.port = parsed;
            }
            Err(_) => tracing::warn!("Ignoring invalid port value: {}", port),
        }
    }

    if let Ok(allow_lan) = std::env::var(ENV_ALLOW_LAN_ACCESS) {
        match parse_env_bool(&allow_lan) {
            Some(parsed) => {
                config.proxy.allow_lan_access = parsed;
                tracing::info!("Using LAN access setting from environment: {}", parsed);
            }
            None => tracing::warn!("Ignoring invalid LAN access value: {}", allow_lan),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{lock_env, ScopedEnvVar};

    #[test]
    fn missing_config_file_is_created_with_defaults() {
        let _lock = lock_env();
        let dir = tempfile::tempdir().expect("tempdir");
        let _data_dir = ScopedEnvVar::set(ENV_DATA_DIR, dir.path().to_str().expect("utf8 path"));

        let config = load_app_config().expect("load config");
        assert_eq!(config.proxy.port, 8045);
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn persisted_config_round_trips_through_disk() {
        let _lock = lock_env();
        let dir = tempfile::tempdir().expect("tempdir");
        let _data_dir = ScopedEnvVar::set(ENV_DATA_DIR, dir.path().to_str().expect("utf8 path"));

        let mut config = AppConfig::new();
        config.proxy.port = 9100;
        config.upstream.base_url = "http://127.0.0.1:9999".to_string();
        save_app_config(&config).expect("save config");

        let loaded = load_app_config().expect("load config");
        assert_eq!(loaded.proxy.port, 9100);
        assert_eq!(loaded.upstream.base_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn corrupt_config_file_is_reported() {
        let _lock = lock_env();
        let dir = tempfile::tempdir().expect("tempdir");
        let _data_dir = ScopedEnvVar::set(ENV_DATA_DIR, dir.path().to_str().expect("utf8 path"));
        fs::write(dir.path().join(CONFIG_FILE), "{ not json").expect("write config");

        let err = load_app_config().expect_err("corrupt config must fail");
        assert!(err.to_string().contains("failed_to_parse_config_file"));
    }

    #[test]
    fn env_overrides_replace_persisted_values() {
        let _lock = lock_env();
        let _key = ScopedEnvVar::set(ENV_API_KEY, "  sk-from-env  ");
        let _url = ScopedEnvVar::set(ENV_BASE_URL, "http://localhost:7000");
        let _port = ScopedEnvVar::set(ENV_PORT, "9001");
        let _lan = ScopedEnvVar::set(ENV_ALLOW_LAN_ACCESS, "yes");

        let mut config = AppConfig::new();
        apply_env_overrides(&mut config);

        assert_eq!(config.upstream.api_key, "sk-from-env");
        assert_eq!(config.upstream.base_url, "http://localhost:7000");
        assert_eq!(config.proxy.port, 9001);
        assert!(config.proxy.allow_lan_access);
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let _lock = lock_env();
        let _key = ScopedEnvVar::set(ENV_API_KEY, "   ");
        let _url = ScopedEnvVar::unset(ENV_BASE_URL);
        let _port = ScopedEnvVar::set(ENV_PORT, "not-a-port");
        let _lan = ScopedEnvVar::set(ENV_ALLOW_LAN_ACCESS, "maybe");

        let mut config = AppConfig::new();
        config.upstream.api_key = "sk-persisted".to_string();
        apply_env_overrides(&mut config);

        assert_eq!(config.upstream.api_key, "sk-persisted");
        assert_eq!(config.proxy.port, 8045);
        assert!(!config.proxy.allow_lan_access);
    }
}
