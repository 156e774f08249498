//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::Error;

/// The number of bytes of a request or response body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "Bearer ********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// The value of the authorization header is never logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(body_bytes) => body_bytes,
        Err(error) => return error.into_response(),
    };

    log_request(
        &format!("{} {}", parts.method, parts.uri),
        &redact_authorization(&parts.headers),
        &String::from_utf8_lossy(&body_bytes),
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(body_bytes) => body_bytes,
        Err(error) => return error.into_response(),
    };
    log_response(
        &parts.status.to_string(),
        &parts.headers,
        &String::from_utf8_lossy(&body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Read the whole body. The bytes are passed on unchanged, only the log sees lossy text.
async fn read_body(body: Body) -> Result<Bytes, Error> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|error| Error::Validation(format!("could not read body: {error}")))
}

fn redact_authorization(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    if headers.contains_key(AUTHORIZATION) {
        headers.insert(AUTHORIZATION, HeaderValue::from_static(REDACTED));
    }

    headers
}

/// Cut `body` to at most [LOG_BODY_LENGTH_LIMIT] bytes without splitting a character.
fn truncate_body(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(request_line: &str, headers: &HeaderMap, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {request_line} {headers:?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {request_line} {headers:?}\nbody: {body:?}");
    }
}

fn log_response(status: &str, headers: &HeaderMap, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {status} {headers:?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {status} {headers:?}\nbody: {body:?}");
    }
}
