//! Shared application state for request handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tera::Tera;

use crate::config::AppConfig;
use crate::pod::PodInfo;
use crate::probe::ProbeMachine;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Holds the single probe state machine for the process, injected once at
/// startup, along with the configuration, templates and pod metadata.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tera: Arc<Tera>,
    pub probes: ProbeMachine,
    pub pod: Arc<PodInfo>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Creates a new application state, building the probe machine from the configured timings.
    pub fn new(config: AppConfig, tera: Tera, pod: PodInfo) -> Self {
        let probes = ProbeMachine::new(config.probes.timings());
        Self {
            config: Arc::new(config),
            tera: Arc::new(tera),
            probes,
            pod: Arc::new(pod),
            started_at: Utc::now(),
        }
    }
}
