#[cfg(test)]
use once_cell::sync::Lazy;
#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Serializes tests that touch process environment.
#[cfg(test)]
pub(crate) fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Restores the previous value of `key` when dropped.
#[cfg(test)]
pub(crate) struct ScopedEnvVar {
    key: &'static str,
    original: Option<String>,
}

#[cfg(test)]
impl ScopedEnvVar {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        let original = std::env::var(key).ok();
        std::env::set_var(key, value);
        Self { key, original }
    }

    pub(crate) fn unset(key: &'static str) -> Self {
        let original = std::env::var(key).ok();
        std::env::remove_var(key);
        Self { key, original }
    }
}

#[cfg(test)]
impl Drop for ScopedEnvVar {
    fn drop(&mut self) {
        match self.original.as_deref() {
            Some(value) => std::env::set_var(self.key, value),
            None => std::env::remove_var(self.key),
        }
    }
}

#[cfg(test)]
mod mock_upstream {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::{
        body::Bytes,
        extract::State,
        http::{header, Method, StatusCode, Uri},
        response::{IntoResponse, Response},
        Router,
    };
    use tokio_util::sync::CancellationToken;

    use crate::proxy::config::UpstreamConfig;
    use crate::proxy::upstream::UpstreamClient;

    pub(crate) const TEST_API_KEY: &str = "test-api-key";

    #[derive(Debug, Clone)]
    pub(crate) struct RecordedHit {
        pub method: Method,
        pub path: String,
        pub query: Option<String>,
        pub api_key: Option<String>,
        pub body: Bytes,
    }

    impl RecordedHit {
        pub(crate) fn json_body(&self) -> serde_json::Value {
            serde_json::from_slice(&self.body).expect("recorded body is JSON")
        }
    }

    #[derive(Debug, Clone)]
    pub(crate) struct MockReply {
        status: StatusCode,
        content_type: &'static str,
        body: Bytes,
    }

    impl MockReply {
        pub(crate) fn json(status: u16, body: serde_json::Value) -> Self {
            Self {
                status: StatusCode::from_u16(status).expect("status"),
                content_type: "application/json",
                body: Bytes::from(body.to_string()),
            }
        }

        pub(crate) fn raw(status: u16, content_type: &'static str, body: &'static [u8]) -> Self {
            Self {
                status: StatusCode::from_u16(status).expect("status"),
                content_type,
                body: Bytes::from_static(body),
            }
        }
    }

    #[derive(Default)]
    struct MockState {
        replies: HashMap<(Method, String), MockReply>,
        hits: Mutex<Vec<RecordedHit>>,
    }

    /// Throwaway upstream bound to an ephemeral local port. Replies are
    /// keyed by method and path; every request is recorded.
    pub(crate) struct MockUpstream {
        addr: SocketAddr,
        state: Arc<MockState>,
        shutdown: CancellationToken,
    }

    async fn mock_handler(
        State(state): State<Arc<MockState>>,
        method: Method,
        uri: Uri,
        headers: axum::http::HeaderMap,
        body: Bytes,
    ) -> Response {
        let path = uri.path().to_string();
        state.hits.lock().expect("hits lock").push(RecordedHit {
            method: method.clone(),
            path: path.clone(),
            query: uri.query().map(str::to_string),
            api_key: headers
                .get(crate::constants::API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body,
        });

        match state.replies.get(&(method, path)) {
            Some(reply) => (
                reply.status,
                [(header::CONTENT_TYPE, reply.content_type)],
                reply.body.clone(),
            )
                .into_response(),
            None => (
                StatusCode::NOT_FOUND,
                axum::Json(serde_json::json!({"message": "no such route"})),
            )
                .into_response(),
        }
    }

    impl MockUpstream {
        pub(crate) async fn start(routes: Vec<(Method, &str, MockReply)>) -> Self {
            let replies = routes
                .into_iter()
                .map(|(method, path, reply)| ((method, path.to_string()), reply))
                .collect();
            let state = Arc::new(MockState {
                replies,
                hits: Mutex::new(Vec::new()),
            });

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind mock upstream");
            let addr = listener.local_addr().expect("mock addr");
            let app = Router::new().fallback(mock_handler).with_state(state.clone());
            let shutdown = CancellationToken::new();
            let stop = shutdown.clone();
            tokio::spawn(async move {
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(stop.cancelled_owned())
                    .await;
            });

            Self {
                addr,
                state,
                shutdown,
            }
        }

        pub(crate) fn base_url(&self) -> String {
            format!("http://{}", self.addr)
        }

        pub(crate) fn client(&self) -> Arc<UpstreamClient> {
            let config = UpstreamConfig {
                base_url: self.base_url(),
                api_key: TEST_API_KEY.to_string(),
                ..UpstreamConfig::default()
            };
            Arc::new(UpstreamClient::new(&config).expect("upstream client"))
        }

        pub(crate) fn hits(&self) -> Vec<RecordedHit> {
            self.state.hits.lock().expect("hits lock").clone()
        }

        pub(crate) fn hit_count(&self) -> usize {
            self.state.hits.lock().expect("hits lock").len()
        }
    }

    impl Drop for MockUpstream {
        fn drop(&mut self) {
            self.shutdown.cancel();
        }
    }
}

#[cfg(test)]
pub(crate) use mock_upstream::{MockReply, MockUpstream, TEST_API_KEY};
