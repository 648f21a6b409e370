//! Wire-format key casing.
//!
//! Inbound JSON bodies are rewritten camelCase -> snake_case before routing;
//! outbound JSON bodies are rewritten snake_case -> camelCase. Non-JSON
//! payloads, empty bodies and bodies that fail to parse are passed through
//! untouched so the normal extractors report the error.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::casing::{Case, convert_keys};
use crate::errors::AppError;

/// Largest body the middleware will buffer.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Middleware converting JSON keys in both directions.
///
/// ```ignore
/// let app = Router::new()
///     .merge(routes)
///     .layer(axum::middleware::from_fn(case_convert));
/// ```
pub async fn case_convert(request: Request, next: Next) -> Response {
    let request = if carries_body(request.method()) && is_json(request.headers()) {
        let (mut parts, body) = request.into_parts();
        let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "Request body could not be buffered");
                return AppError::BadRequest("Request body too large or unreadable".to_string())
                    .into_response();
            }
        };
        let bytes = rewrite(bytes, Case::Snake);
        set_content_length(&mut parts.headers, bytes.len());
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;

    if !is_json(response.headers()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => {
            let bytes = rewrite(bytes, Case::Camel);
            set_content_length(&mut parts.headers, bytes.len());
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::error!(error = %e, "Response body could not be buffered");
            AppError::InternalServerError(e.to_string()).into_response()
        }
    }
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

fn rewrite(bytes: Bytes, case: Case) -> Bytes {
    if bytes.is_empty() {
        return bytes;
    }

    match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(value) => match serde_json::to_vec(&convert_keys(value, case)) {
            Ok(converted) => Bytes::from(converted),
            Err(_) => bytes,
        },
        Err(_) => bytes,
    }
}

fn set_content_length(headers: &mut HeaderMap, len: usize) {
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
}
