//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{StatusCode, header::CONTENT_LENGTH},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::Error;

/// The maximum number of characters of a request or response body to log at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request body, in bytes, that is read into memory.
pub const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
///
/// Requests with a body larger than [MAX_REQUEST_BODY_BYTES] are rejected
/// with [Error::RequestBodyTooLarge] before reaching a handler.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let content_length = parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if let Some(length) = content_length.filter(|length| *length > MAX_REQUEST_BODY_BYTES) {
        tracing::warn!(
            "Rejected {} {} with a body of {length} bytes",
            parts.method,
            parts.uri
        );
        return Error::RequestBodyTooLarge(MAX_REQUEST_BODY_BYTES).into_response();
    }

    // A body without a Content-Length header can still exceed the limit while streaming.
    let body_text = match read_body_text(body, MAX_REQUEST_BODY_BYTES).await {
        Ok(body_text) => body_text,
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            return Error::RequestBodyTooLarge(MAX_REQUEST_BODY_BYTES).into_response();
        }
    };

    log_body(
        &format!("Received request: {} {}", parts.method, parts.uri),
        "request",
        &body_text,
    );

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = match read_body_text(body, usize::MAX).await {
        Ok(body_text) => body_text,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_body(
        &format!("Sending response: {}", parts.status),
        "response",
        &body_text,
    );

    Response::from_parts(parts, body_text.into())
}

async fn read_body_text(body: Body, limit: usize) -> Result<String, axum::Error> {
    let body_bytes = axum::body::to_bytes(body, limit).await?;

    Ok(String::from_utf8_lossy(&body_bytes).to_string())
}

fn log_body(summary: &str, kind: &str, body: &str) {
    match truncate_body(body) {
        Some(truncated) => {
            tracing::info!("{summary}\nbody: {truncated}...");
            tracing::debug!("Full {kind} body: {body:?}");
        }
        None => tracing::info!("{summary}\nbody: {body:?}"),
    }
}

/// Returns the first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None`
/// if `body` is short enough to be logged in full.
fn truncate_body(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}
