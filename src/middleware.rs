//! Request ID middleware for correlating logs with requests.
//!
//! Generates a UUID v4 for each incoming request, wraps the request in a tracing
//! span carrying that ID, and echoes it back in the `x-request-id` response
//! header. Kubelet probe traffic arrives every few seconds, so completions on the
//! probe paths are logged at debug level instead of info.

use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Response header carrying the request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Paths polled by the orchestrator
const PROBE_PATHS: &[&str] = &["/startupz", "/livez", "/readyz", "/health"];

/// Extension type for accessing request ID in handlers if needed.
#[derive(Clone, Debug)]
pub struct RequestId(pub Uuid);

fn is_probe_path(path: &str) -> bool {
    PROBE_PATHS.contains(&path)
}

/// Middleware that generates a request ID and creates a request span.
///
/// This should be the outermost middleware layer so the span wraps
/// all request processing, including other middleware and handlers.
pub async fn request_id_layer(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let quiet = is_probe_path(&path);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();
    request.extensions_mut().insert(RequestId(request_id));

    async move {
        let mut response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        let status = response.status().as_u16();

        tracing::Span::current().record("duration_ms", duration_ms);
        if quiet {
            tracing::debug!(status, duration_ms, "Probe request completed");
        } else {
            tracing::info!(status, duration_ms, "Request completed");
        }

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_paths_are_quiet() {
        assert!(is_probe_path("/livez"));
        assert!(is_probe_path("/readyz"));
        assert!(is_probe_path("/startupz"));
        assert!(!is_probe_path("/api/status"));
        assert!(!is_probe_path("/"));
    }
}
