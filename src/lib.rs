//! probe-demo: mutable Kubernetes probe state for demonstrations.
//!
//! Serves startup, liveness and readiness endpoints whose answers can be flipped
//! at runtime from a dashboard or JSON API, with timed self-healing for the
//! readiness and liveness failures.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod pod;
pub mod probe;
pub mod routes;
pub mod state;
pub mod templates;

pub use error::AppError;
pub use probe::{ProbeMachine, ProbeStatus, ProbeTimings};
pub use routes::create_router;
pub use state::AppState;
