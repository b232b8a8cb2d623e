pub mod constants;
pub mod error;
pub mod models;
pub mod modules;
pub mod proxy;
pub mod ui;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use error::{AppError, AppResult};
use modules::system::logger;
use proxy::upstream::UpstreamClient;
use proxy::AxumServer;

fn load_runtime_config() -> AppResult<models::AppConfig> {
    let mut config = modules::system::config::load_app_config()?;
    modules::system::config::apply_env_overrides(&mut config);
    modules::system::validation::validate_app_config(&config).map_err(|errors| {
        AppError::Config(format!(
            "configuration_validation_failed:\n{}",
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        ))
    })?;
    Ok(config)
}

async fn start_runtime(shutdown: CancellationToken) -> AppResult<tokio::task::JoinHandle<()>> {
    let config = load_runtime_config()?;

    info!(
        "Starting playground on port {} (upstream {})",
        config.proxy.port, config.upstream.base_url
    );
    if config.proxy.allow_lan_access {
        warn!("LAN access is enabled (bind address will be 0.0.0.0)");
    } else {
        info!("LAN access is disabled (bind address will be 127.0.0.1)");
    }

    let upstream = Arc::new(UpstreamClient::new(&config.upstream).map_err(AppError::Config)?);
    let (_server, handle) = AxumServer::start(&config.proxy, upstream, shutdown)
        .await
        .map_err(AppError::Server)?;
    Ok(handle)
}

pub fn run() {
    let _log_guard = logger::init_logger();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    runtime.block_on(async {
        let shutdown = CancellationToken::new();
        let handle = match start_runtime(shutdown.clone()).await {
            Ok(handle) => handle,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        };

        info!("Playground is running. Press Ctrl+C to exit.");
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
        }
        info!("Shutting down playground");
        shutdown.cancel();
        if let Err(e) = handle.await {
            warn!("Accept loop ended abnormally: {}", e);
        }
    });
}
