//! JSON API driving the probe state machine.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::instrument;

use crate::pod::PodInfo;
use crate::probe::PendingTimers;
use crate::state::AppState;
use crate::templates::humanize_duration;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub started: bool,
    pub live: bool,
    pub ready: bool,
    /// Human-readable uptime, e.g. `2m5s`
    pub uptime: String,
    pub uptime_seconds: u64,
    pub pending_timers: PendingTimers,
    pub pod: PodInfo,
}

#[derive(Debug, Serialize)]
pub struct StartedResponse {
    pub started: bool,
}

#[derive(Debug, Serialize)]
pub struct LiveResponse {
    pub live: bool,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessTestResponse {
    pub duration_seconds: u64,
}

/// Current flags, uptime and pending restore timers.
#[instrument(name = "api::status", skip(state))]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.probes.snapshot().await;
    Json(StatusResponse {
        started: snapshot.status.started,
        live: snapshot.status.live,
        ready: snapshot.status.ready,
        uptime: humanize_duration(snapshot.uptime),
        uptime_seconds: snapshot.uptime.as_secs(),
        pending_timers: snapshot.pending,
        pod: (*state.pod).clone(),
    })
}

#[instrument(name = "api::toggle_startup", skip(state))]
pub async fn toggle_startup(State(state): State<AppState>) -> Json<StartedResponse> {
    let started = state.probes.toggle_started().await;
    Json(StartedResponse { started })
}

#[instrument(name = "api::toggle_liveness", skip(state))]
pub async fn toggle_liveness(State(state): State<AppState>) -> Json<LiveResponse> {
    let live = state.probes.toggle_liveness().await;
    Json(LiveResponse { live })
}

#[instrument(name = "api::toggle_readiness", skip(state))]
pub async fn toggle_readiness(State(state): State<AppState>) -> Json<ReadyResponse> {
    let ready = state.probes.toggle_readiness().await;
    Json(ReadyResponse { ready })
}

#[instrument(name = "api::liveness_test", skip(state))]
pub async fn liveness_test(State(state): State<AppState>) -> Json<LivenessTestResponse> {
    let duration_seconds = state.probes.trigger_liveness_failure().await;
    Json(LivenessTestResponse { duration_seconds })
}
