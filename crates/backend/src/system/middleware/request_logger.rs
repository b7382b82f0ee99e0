use axum::body::Body;
use axum::http::{header, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that logs one line per HTTP request:
/// request id, duration, response size (when known), status, method and path.
///
/// The request id is echoed back in `x-request-id`.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let request_id = uuid::Uuid::new_v4().to_string();

    let mut response = next.run(req).await;

    let size = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let status = response.status().as_u16();
    let duration = start.elapsed().as_millis();

    if response.status().is_server_error() {
        tracing::warn!(
            "{} | {:>5}ms | {:>8} | {} {:>6} {}",
            &request_id[..8],
            duration,
            size,
            status,
            method,
            uri.path()
        );
    } else {
        tracing::info!(
            "{} | {:>5}ms | {:>8} | {} {:>6} {}",
            &request_id[..8],
            duration,
            size,
            status,
            method,
            uri.path()
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
