use std::future::Future;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub correlation_id: Option<String>,
}

tokio::task_local! {
    static CURRENT: RequestContext;
}

pub async fn with_request_context<F, T>(ctx: RequestContext, fut: F) -> T
where
    F: Future<Output = T>,
{
    CURRENT.scope(ctx, fut).await
}

pub fn try_get() -> Option<RequestContext> {
    CURRENT.try_with(|ctx| ctx.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn context_is_visible_only_inside_scope() {
        assert!(try_get().is_none());

        let ctx = RequestContext {
            request_id: "req-1".to_string(),
            correlation_id: Some("corr-1".to_string()),
        };
        let seen = with_request_context(ctx, async { try_get() }).await;

        let seen = seen.expect("context inside scope");
        assert_eq!(seen.request_id, "req-1");
        assert_eq!(seen.correlation_id.as_deref(), Some("corr-1"));
        assert!(try_get().is_none());
    }
}
