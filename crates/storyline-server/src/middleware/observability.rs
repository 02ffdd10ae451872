//! Request ids, tracing spans and request logging.

use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::http::header;
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use super::TRACING_TARGET_REQUEST;

const REQUEST_ID: &str = "x-request-id";

pub trait RouterObservabilityExt<S> {
    /// Tags every request with an `x-request-id`, hides credentials from
    /// traces and opens a span per request.
    fn with_observability(self) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        self.layer(from_fn(log_request))
            .layer(PropagateRequestIdLayer::new(
                header::HeaderName::from_static(REQUEST_ID),
            ))
            .layer(SetSensitiveRequestHeadersLayer::new([
                header::AUTHORIZATION,
                header::COOKIE,
            ]))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(
                header::HeaderName::from_static(REQUEST_ID),
                MakeRequestUuid,
            ))
    }
}

/// Logs method, path, status and latency of every request.
pub async fn log_request(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let response = next.run(request).await;

    tracing::debug!(
        target: TRACING_TARGET_REQUEST,
        method = %method,
        path = %path,
        status = %response.status(),
        duration_ms = start_time.elapsed().as_millis() as u64,
        request_id = request_id.as_deref(),
        "request completed"
    );

    response
}
