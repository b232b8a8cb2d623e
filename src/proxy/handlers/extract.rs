use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::proxy::handlers::errors::ProxyError;

/// JSON body extractor whose rejections use the proxy error shape.
/// The content type is not enforced and an empty body decodes as `{}`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ProxyError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ProxyError::validation(format!("Failed to read request body: {}", e)))?;
        parse_json_body(&bytes).map(JsonBody)
    }
}

/// `Query` with the proxy rejection shape.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ProxyError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| QueryParams(value))
            .map_err(|e| ProxyError::validation(format!("Invalid query string: {}", e.body_text())))
    }
}

/// `Path` with the proxy rejection shape.
pub struct PathParam<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParam<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ProxyError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| PathParam(value))
            .map_err(|e| ProxyError::validation(format!("Invalid path parameter: {}", e.body_text())))
    }
}

pub fn parse_json_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProxyError> {
    let raw: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        bytes
    };
    serde_json::from_slice(raw)
        .map_err(|e| ProxyError::validation(format!("Invalid JSON body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::mappers::models::SummaryRequest;

    #[test]
    fn empty_body_decodes_as_empty_object() {
        let req: SummaryRequest = parse_json_body(b"").expect("empty body");
        assert!(req.text.is_none());
    }

    #[test]
    fn malformed_body_is_a_validation_error() {
        let err = parse_json_body::<SummaryRequest>(b"{\"text\": ").expect_err("malformed");
        assert!(matches!(err, ProxyError::Validation(_)));
        assert!(err.to_string().starts_with("Invalid JSON body"));
    }

    #[test]
    fn wrong_field_type_is_a_validation_error() {
        let err = parse_json_body::<SummaryRequest>(br#"{"text": 42}"#).expect_err("wrong type");
        assert!(matches!(err, ProxyError::Validation(_)));
    }
}
