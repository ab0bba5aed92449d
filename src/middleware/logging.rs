//! Request logging middleware
//!
//! Tags each request with an `x-request-id` (kept when the client sends one),
//! and logs completion with its duration, warning on slow or failed requests.

use std::time::{Duration, Instant};

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Requests slower than this are logged at warn level
pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_millis(1000);

pub async fn log_requests(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = tracing::info_span!("request", request_id = %request_id, method = %method, path = %path);

    let start = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    let elapsed = start.elapsed();

    let _guard = span.enter();
    log_completion(response.status().as_u16(), elapsed);

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }
    response
}

fn log_completion(status: u16, elapsed: Duration) {
    let duration_ms = elapsed.as_millis() as u64;

    if status >= 500 {
        warn!(status = status, duration_ms = duration_ms, "Request failed");
    } else {
        info!(status = status, duration_ms = duration_ms, "Request completed");
    }

    if elapsed > SLOW_REQUEST_THRESHOLD {
        warn!(status = status, duration_ms = duration_ms, "Slow request detected");
    }
}
