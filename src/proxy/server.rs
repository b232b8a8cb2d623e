use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::proxy::config::ProxyConfig;
use crate::proxy::middleware::cors_layer;
use crate::proxy::routes::build_proxy_routes;
use crate::proxy::state::AppState;
use crate::proxy::upstream::UpstreamClient;

/// Full application router: routes plus the outer CORS and body-limit layers.
pub fn build_app(state: AppState, config: &ProxyConfig) -> Router {
    build_proxy_routes()
        .layer(cors_layer(&config.cors))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .with_state(state)
}

pub struct AxumServer {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
}

impl AxumServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting and asks open connections to finish gracefully.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    pub async fn start(
        config: &ProxyConfig,
        upstream: Arc<UpstreamClient>,
        shutdown: CancellationToken,
    ) -> Result<(Self, JoinHandle<()>), String> {
        let addr = format!("{}:{}", config.bind_host(), config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Address {} binding failed: {}", addr, e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| format!("failed_to_read_local_addr: {}", e))?;

        let state = AppState::new(upstream, local_addr.port());
        let app = build_app(state, config);
        info!(
            "Request body size limit: {} MB",
            config.max_body_size / 1024 / 1024
        );
        info!("Playground server started at http://{}", local_addr);

        let server = Self {
            local_addr,
            shutdown: shutdown.clone(),
        };
        let handle = tokio::spawn(async move {
            use hyper::server::conn::http1;
            use hyper_util::rt::TokioIo;
            use hyper_util::service::TowerToHyperService;

            loop {
                let accepted = tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("Playground server stopped accepting connections");
                        break;
                    }
                    accepted = listener.accept() => accepted,
                };

                match accepted {
                    Ok((stream, _remote_addr)) => {
                        let io = TokioIo::new(stream);
                        let service = TowerToHyperService::new(app.clone());
                        let conn_shutdown = shutdown.clone();

                        tokio::task::spawn(async move {
                            let conn = http1::Builder::new().serve_connection(io, service);
                            tokio::pin!(conn);
                            let result = tokio::select! {
                                result = conn.as_mut() => result,
                                _ = conn_shutdown.cancelled() => {
                                    conn.as_mut().graceful_shutdown();
                                    conn.as_mut().await
                                }
                            };
                            if let Err(err) = result {
                                debug!("Connection handling ended or failed: {:?}", err);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {:?}", e);
                    }
                }
            }
        });

        Ok((server, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::config::UpstreamConfig;

    fn local_config() -> ProxyConfig {
        ProxyConfig {
            port: 0,
            ..ProxyConfig::default()
        }
    }

    fn unused_upstream() -> Arc<UpstreamClient> {
        let config = UpstreamConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "test-key".to_string(),
            ..UpstreamConfig::default()
        };
        Arc::new(UpstreamClient::new(&config).expect("client"))
    }

    #[tokio::test]
    async fn server_answers_health_and_stops_on_cancel() {
        let token = CancellationToken::new();
        let (server, handle) = AxumServer::start(&local_config(), unused_upstream(), token.clone())
            .await
            .expect("start");

        let url = format!("http://{}/health", server.local_addr());
        let body: serde_json::Value = reqwest::get(&url)
            .await
            .expect("health request")
            .json()
            .await
            .expect("health json");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["port"], server.local_addr().port());

        server.stop();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("accept loop exits")
            .expect("join");
        assert!(token.is_cancelled());
    }
}
