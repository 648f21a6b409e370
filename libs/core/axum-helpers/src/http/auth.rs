//! Shared-secret bearer authentication.
//!
//! Safe methods (GET, HEAD, OPTIONS) pass through; every other method must
//! carry `Authorization: Bearer <token>` matching the configured secret.

use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;

/// The configured API token.
#[derive(Clone)]
pub struct BearerAuth {
    token: Arc<str>,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }

    /// Check the `Authorization` header against the configured token.
    pub fn verify(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let presented = extract_bearer(headers)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        if constant_time_eq(presented.as_bytes(), self.token.as_bytes()) {
            Ok(())
        } else {
            Err(AppError::Unauthorized("Invalid bearer token".to_string()))
        }
    }
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Bearer check for mutating requests.
///
/// ```ignore
/// let routes = Router::new()
///     .route("/items", get(list).post(create))
///     .layer(axum::middleware::from_fn_with_state(
///         BearerAuth::new(config.api_token),
///         require_bearer,
///     ));
/// ```
pub async fn require_bearer(
    State(auth): State<BearerAuth>,
    request: Request,
    next: Next,
) -> Response {
    if is_safe(request.method()) {
        return next.run(request).await;
    }

    match auth.verify(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                "Bearer check failed"
            );
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{HeaderValue, StatusCode},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/things", get(|| async { "list" }).post(|| async { "created" }))
            .layer(middleware::from_fn_with_state(
                BearerAuth::new("s3cret"),
                require_bearer,
            ))
    }

    async fn send(method: &str, authorization: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri("/things");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn test_reads_need_no_token() {
        assert_eq!(send("GET", None).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_write_with_valid_token() {
        let response = send("POST", Some("Bearer s3cret")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_scheme_is_case_insensitive() {
        let response = send("POST", Some("bearer s3cret")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_write_rejections() {
        for value in [
            None,
            Some("Bearer wrong"),
            Some("Basic s3cret"),
            Some("Bearer "),
            Some("s3cret"),
        ] {
            let response = send("POST", value).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "header: {value:?}");
            assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
        }
    }

    #[test]
    fn test_verify_directly() {
        let auth = BearerAuth::new("abc");
        let mut headers = HeaderMap::new();
        assert!(auth.verify(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert!(auth.verify(&headers).is_ok());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abcd"));
        assert!(auth.verify(&headers).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", BearerAuth::new("top-secret"));
        assert!(!rendered.contains("top-secret"));
    }
}
