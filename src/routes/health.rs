//! Probe endpoints for container orchestration.
//!
//! `/startupz`, `/livez` and `/readyz` report the mutable probe flags and answer
//! 503 when the flag is off, so the kubelet reacts to what the dashboard set.
//! `/health` only checks that the process can respond to HTTP.

use axum::{extract::State, http::StatusCode};

use crate::probe::Probe;
use crate::state::AppState;

/// Status line for a probe in the healthy or unhealthy state.
fn status_text(probe: Probe, healthy: bool) -> &'static str {
    match (probe, healthy) {
        (Probe::Startup, true) => "started",
        (Probe::Startup, false) => "not started",
        (Probe::Liveness, true) => "alive",
        (Probe::Liveness, false) => "not alive",
        (Probe::Readiness, true) => "ready",
        (Probe::Readiness, false) => "not ready",
    }
}

async fn probe_response(state: &AppState, probe: Probe) -> (StatusCode, &'static str) {
    let healthy = state.probes.check(probe).await;
    if healthy {
        (StatusCode::OK, status_text(probe, true))
    } else {
        tracing::debug!(%probe, "Probe reporting unhealthy");
        (StatusCode::SERVICE_UNAVAILABLE, status_text(probe, false))
    }
}

/// Startup probe handler.
pub async fn startup(State(state): State<AppState>) -> (StatusCode, &'static str) {
    probe_response(&state, Probe::Startup).await
}

/// Liveness probe handler.
pub async fn liveness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    probe_response(&state, Probe::Liveness).await
}

/// Readiness probe handler.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    probe_response(&state, Probe::Readiness).await
}

/// Process health handler, independent of the probe flags.
pub async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(Probe::Startup, true), "started");
        assert_eq!(status_text(Probe::Liveness, false), "not alive");
        assert_eq!(status_text(Probe::Readiness, false), "not ready");
    }
}
