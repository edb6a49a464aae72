//! Dashboard page handler.

use axum::{extract::State, response::Html};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;
use crate::templates::DASHBOARD_TEMPLATE;

/// Renders the dashboard with the current probe state; the page then polls
/// `/api/status` on its own.
#[instrument(name = "dashboard::index", skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let snapshot = state.probes.snapshot().await;
    let probes = &state.config.probes;

    let mut context = tera::Context::new();
    context.insert("status", &snapshot.status);
    context.insert("pending", &snapshot.pending);
    context.insert("uptime_secs", &snapshot.uptime.as_secs());
    context.insert("pod", state.pod.as_ref());
    context.insert(
        "timings",
        &serde_json::json!({
            "min": probes.liveness_restore_min_seconds,
            "max": probes.liveness_restore_max_seconds,
        }),
    );
    context.insert("version", env!("CARGO_PKG_VERSION"));
    context.insert("started_at", &state.started_at.to_rfc3339());

    let html = state.tera.render(DASHBOARD_TEMPLATE, &context)?;
    Ok(Html(html))
}
